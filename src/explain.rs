//! Explain output for preset resolution
//!
//! Shows which sources a resolution replays and which one supplied each
//! resulting key, as JSON or as human-readable text.

use preset_engine::{MergeSource, PresetError, ResolvedConfig, Resolver};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One resolved key and where it came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyOrigin {
    pub key: String,
    pub source: MergeSource,
    pub value: Value,
}

/// Explanation of a single resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainOutput {
    /// The preset that was resolved
    pub preset: String,

    /// Merge sources in application order
    pub sources: Vec<MergeSource>,

    /// Resolved keys with their winning source, sorted by key
    pub keys: Vec<KeyOrigin>,

    /// Human-readable explanation
    pub explanation: String,
}

impl ExplainOutput {
    /// Resolve `preset` and explain the result.
    pub fn for_preset(resolver: &Resolver<'_>, preset: &str) -> Result<Self, PresetError> {
        let sources = resolver.merge_sources(preset)?;
        let resolved = resolver.resolve(preset)?;
        Ok(Self::from_resolved(sources, &resolved))
    }

    /// Build from an already resolved configuration.
    pub fn from_resolved(sources: Vec<MergeSource>, resolved: &ResolvedConfig) -> Self {
        let keys: Vec<KeyOrigin> = resolved
            .origins
            .iter()
            .filter_map(|(key, source)| {
                resolved.get(key).map(|value| KeyOrigin {
                    key: key.clone(),
                    source: source.clone(),
                    value: value.clone(),
                })
            })
            .collect();

        let explanation = Self::generate_explanation(&resolved.preset, &sources, &keys);

        Self {
            preset: resolved.preset.clone(),
            sources,
            keys,
            explanation,
        }
    }

    fn generate_explanation(preset: &str, sources: &[MergeSource], keys: &[KeyOrigin]) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Preset: {}", preset));
        lines.push(String::new());
        lines.push("Merge order (later wins):".to_string());
        for (i, source) in sources.iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, source));
        }
        lines.push(String::new());

        if keys.is_empty() {
            lines.push("No options set.".to_string());
        } else {
            let width = keys.iter().map(|k| k.key.len()).max().unwrap_or(0);
            lines.push("Options:".to_string());
            for key in keys {
                lines.push(format!(
                    "  {:<width$}  {}  [{}]",
                    key.key,
                    key.value,
                    key.source,
                    width = width
                ));
            }
        }

        lines.join("\n")
    }

    /// Human-readable form
    pub fn to_human(&self) -> &str {
        &self.explanation
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
