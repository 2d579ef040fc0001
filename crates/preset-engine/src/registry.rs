//! Immutable preset registry.
//!
//! The registry is validated once at construction: names are unique and
//! non-empty, the base preset exists and every parent reference resolves.
//! After that it is a read-only lookup surface and can be shared freely
//! between threads.

use std::collections::HashMap;

use tracing::debug;

use crate::error::PresetError;
use crate::preset::{Preset, DEFAULT_BASE};

/// Catalog of presets in declaration order.
#[derive(Debug, Clone)]
pub struct PresetRegistry {
    presets: Vec<Preset>,
    index: HashMap<String, usize>,
    base: usize,
}

impl PresetRegistry {
    /// Build a registry whose base preset is `_default`.
    pub fn new(presets: Vec<Preset>) -> Result<Self, PresetError> {
        Self::with_base(presets, DEFAULT_BASE)
    }

    /// Build a registry with an explicitly named base preset.
    pub fn with_base(presets: Vec<Preset>, base: &str) -> Result<Self, PresetError> {
        let presets = presets
            .into_iter()
            .map(Preset::normalized)
            .collect::<Result<Vec<_>, _>>()?;

        let mut index = HashMap::with_capacity(presets.len());
        for (i, preset) in presets.iter().enumerate() {
            if preset.name.is_empty() {
                return Err(PresetError::EmptyName);
            }
            if index.insert(preset.name.clone(), i).is_some() {
                return Err(PresetError::DuplicateName(preset.name.clone()));
            }
        }

        let base_idx = *index
            .get(base)
            .ok_or_else(|| PresetError::MissingBase(base.to_string()))?;
        if !presets[base_idx].parents.is_empty() {
            return Err(PresetError::BaseHasParents(base.to_string()));
        }

        for preset in &presets {
            for parent in &preset.parents {
                if !index.contains_key(parent) {
                    return Err(PresetError::DanglingParent {
                        preset: preset.name.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }

        debug!(presets = presets.len(), base, "preset registry built");

        Ok(Self {
            presets,
            index,
            base: base_idx,
        })
    }

    /// Names of all user-selectable presets, in declaration order.
    pub fn list_selectable_names(&self) -> Vec<&str> {
        self.presets
            .iter()
            .filter(|p| !p.is_internal())
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Look up a preset by name.
    pub fn get(&self, name: &str) -> Result<&Preset, PresetError> {
        self.index
            .get(name)
            .map(|&i| &self.presets[i])
            .ok_or_else(|| PresetError::unknown(name))
    }

    /// The base preset.
    pub fn base(&self) -> &Preset {
        &self.presets[self.base]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All presets in declaration order, internal ones included.
    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::Overrides;
    use serde_json::json;

    fn preset(name: &str, value: serde_json::Value) -> Preset {
        match value {
            serde_json::Value::Object(map) => Preset::new(name, map),
            _ => panic!("fixture must be an object"),
        }
    }

    fn sample() -> Vec<Preset> {
        vec![
            preset("_default", json!({"ratelimit": 100})),
            preset("_audio-only", json!({"format": "bestaudio"})),
            preset("youtube", json!({})),
            preset("twitch", json!({"throttledratelimit": 1})),
            preset("twitch-audio", json!({})).with_parents(["_audio-only", "twitch"]),
        ]
    }

    #[test]
    fn test_selectable_names_skip_internal() {
        let registry = PresetRegistry::new(sample()).unwrap();
        assert_eq!(
            registry.list_selectable_names(),
            vec!["youtube", "twitch", "twitch-audio"]
        );
        // Stable across calls
        assert_eq!(
            registry.list_selectable_names(),
            registry.list_selectable_names()
        );
    }

    #[test]
    fn test_get_and_base() {
        let registry = PresetRegistry::new(sample()).unwrap();
        assert_eq!(registry.get("twitch").unwrap().name, "twitch");
        assert_eq!(registry.base().name, "_default");
        assert!(registry.contains("_audio-only"));
        assert_eq!(registry.len(), 5);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_get_unknown() {
        let registry = PresetRegistry::new(sample()).unwrap();
        assert_eq!(
            registry.get("does-not-exist").unwrap_err(),
            PresetError::unknown("does-not-exist")
        );
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut presets = sample();
        presets.push(preset("twitch", json!({})));
        assert_eq!(
            PresetRegistry::new(presets).unwrap_err(),
            PresetError::DuplicateName("twitch".to_string())
        );
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut presets = sample();
        presets.push(Preset::new("", Overrides::new()));
        assert_eq!(PresetRegistry::new(presets).unwrap_err(), PresetError::EmptyName);
    }

    #[test]
    fn test_missing_base_rejected() {
        let presets = vec![preset("youtube", json!({}))];
        assert_eq!(
            PresetRegistry::new(presets).unwrap_err(),
            PresetError::MissingBase("_default".to_string())
        );
    }

    #[test]
    fn test_custom_base() {
        let presets = vec![preset("_root", json!({"a": 1})), preset("x", json!({}))];
        let registry = PresetRegistry::with_base(presets, "_root").unwrap();
        assert_eq!(registry.base().name, "_root");
    }

    #[test]
    fn test_base_with_parents_rejected() {
        let presets = vec![
            preset("_default", json!({})).with_parents(["_other"]),
            preset("_other", json!({})),
        ];
        assert_eq!(
            PresetRegistry::new(presets).unwrap_err(),
            PresetError::BaseHasParents("_default".to_string())
        );
    }

    #[test]
    fn test_dangling_parent_rejected() {
        let mut presets = sample();
        presets.push(preset("kick-audio", json!({})).with_parents(["_audio-only", "kick"]));
        assert_eq!(
            PresetRegistry::new(presets).unwrap_err(),
            PresetError::DanglingParent {
                preset: "kick-audio".to_string(),
                parent: "kick".to_string(),
            }
        );
    }

    #[test]
    fn test_inline_inherits_normalized() {
        let presets = vec![
            preset("_default", json!({})),
            preset("a", json!({"k": 1})),
            preset("b", json!({"_inherits": ["a"]})),
        ];
        let registry = PresetRegistry::new(presets).unwrap();
        let b = registry.get("b").unwrap();
        assert_eq!(b.parents, vec!["a"]);
        assert!(b.overrides.is_empty());
    }

    #[test]
    fn test_registry_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PresetRegistry>();
    }
}
