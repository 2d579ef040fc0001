//! The flat configuration produced by one resolution pass.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::preset::Overrides;

/// Which layer of a resolution supplied a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "layer", content = "preset", rename_all = "snake_case")]
pub enum MergeSource {
    /// The registry's base preset
    Base(String),
    /// A declared parent of the target
    Parent(String),
    /// The target preset's own overrides
    Own(String),
    /// A caller-supplied runtime override
    Runtime,
}

impl MergeSource {
    /// Preset name behind this source, if any.
    pub fn preset(&self) -> Option<&str> {
        match self {
            Self::Base(name) | Self::Parent(name) | Self::Own(name) => Some(name),
            Self::Runtime => None,
        }
    }
}

impl fmt::Display for MergeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base(name) => write!(f, "base:{}", name),
            Self::Parent(name) => write!(f, "parent:{}", name),
            Self::Own(name) => write!(f, "preset:{}", name),
            Self::Runtime => write!(f, "runtime"),
        }
    }
}

/// Resolved configuration for one preset.
///
/// Owned by the caller. `origins` records, for every key in `options`, the
/// source whose value won.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    /// Preset that was resolved
    pub preset: String,

    /// Flat option mapping handed to the download client
    pub options: Overrides,

    /// Winning source per key
    pub origins: BTreeMap<String, MergeSource>,
}

impl ResolvedConfig {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.as_u64())
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_i64())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.as_str())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    /// Source that supplied `key`.
    pub fn origin(&self, key: &str) -> Option<&MergeSource> {
        self.origins.get(key)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// The options as a JSON object.
    pub fn to_value(&self) -> Value {
        Value::Object(self.options.clone())
    }

    /// Consume into the bare option mapping.
    pub fn into_options(self) -> Overrides {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ResolvedConfig {
        let mut options = Overrides::new();
        options.insert("ratelimit".to_string(), json!(6250000));
        options.insert("format".to_string(), json!("bestaudio/best"));
        options.insert("nopart".to_string(), json!(true));

        let mut origins = BTreeMap::new();
        origins.insert("ratelimit".to_string(), MergeSource::Base("_default".to_string()));
        origins.insert("format".to_string(), MergeSource::Parent("_audio-only".to_string()));
        origins.insert("nopart".to_string(), MergeSource::Own("bunny".to_string()));

        ResolvedConfig {
            preset: "bunny".to_string(),
            options,
            origins,
        }
    }

    #[test]
    fn test_typed_getters() {
        let config = sample();
        assert_eq!(config.get_u64("ratelimit"), Some(6250000));
        assert_eq!(config.get_i64("ratelimit"), Some(6250000));
        assert_eq!(config.get_str("format"), Some("bestaudio/best"));
        assert_eq!(config.get_bool("nopart"), Some(true));
        assert_eq!(config.get_u64("missing"), None);
        assert_eq!(config.len(), 3);
    }

    #[test]
    fn test_origin_display() {
        let config = sample();
        assert_eq!(config.origin("ratelimit").unwrap().to_string(), "base:_default");
        assert_eq!(config.origin("format").unwrap().to_string(), "parent:_audio-only");
        assert_eq!(config.origin("nopart").unwrap().to_string(), "preset:bunny");
        assert_eq!(MergeSource::Runtime.to_string(), "runtime");
        assert_eq!(MergeSource::Runtime.preset(), None);
    }

    #[test]
    fn test_merge_source_serialization() {
        let json = serde_json::to_value(MergeSource::Parent("twitch".to_string())).unwrap();
        assert_eq!(json, json!({"layer": "parent", "preset": "twitch"}));

        let json = serde_json::to_value(MergeSource::Runtime).unwrap();
        assert_eq!(json, json!({"layer": "runtime"}));
    }

    #[test]
    fn test_to_value() {
        let value = sample().to_value();
        assert_eq!(value["ratelimit"], 6250000);
        assert!(value.get("preset").is_none());
    }
}
