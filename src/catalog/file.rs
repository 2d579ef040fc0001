//! Catalog files
//!
//! A catalog file lists presets in declaration order:
//!
//! ```toml
//! base = "_default"          # optional
//!
//! [[preset]]
//! name = "_default"
//! [preset.overrides]
//! ratelimit = 6250000
//!
//! [[preset]]
//! name = "twitch-audio"
//! parents = ["_audio-only", "twitch"]
//! notice = "Twitch VODs are downloaded as audio only."
//! ```
//!
//! The same structure is accepted as JSON.

use preset_engine::{Overrides, Preset, DEFAULT_BASE};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parsed catalog file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    /// Base preset name
    #[serde(default = "default_base")]
    pub base: String,

    /// Presets in declaration order
    #[serde(default, rename = "preset")]
    pub presets: Vec<PresetEntry>,
}

fn default_base() -> String {
    DEFAULT_BASE.to_string()
}

/// A single `[[preset]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetEntry {
    pub name: String,

    #[serde(default)]
    pub parents: Vec<String>,

    #[serde(default)]
    pub overrides: Overrides,

    /// Message shown after this preset is selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl CatalogFile {
    /// Interpret an already-parsed document.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Split into engine presets and `(preset, notice)` pairs.
    pub fn into_parts(self) -> (String, Vec<Preset>, Vec<(String, String)>) {
        let mut presets = Vec::with_capacity(self.presets.len());
        let mut notices = Vec::new();
        for entry in self.presets {
            if let Some(notice) = entry.notice {
                notices.push((entry.name.clone(), notice));
            }
            presets.push(Preset::new(entry.name, entry.overrides).with_parents(entry.parents));
        }
        (self.base, presets, notices)
    }
}
