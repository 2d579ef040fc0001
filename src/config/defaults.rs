//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};

/// Built-in default settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Root directory output templates are anchored at (default: ".")
    pub output_root: String,

    /// Log level used when neither -v/-q nor RUST_LOG is given (default: "warn")
    pub log_level: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            output_root: ".".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "output_root": self.output_root,
            "log_level": self.log_level,
            "overrides": {}
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let defaults = BuiltinDefaults::default();
        assert_eq!(defaults.output_root, ".");
        assert_eq!(defaults.log_level, "warn");
    }

    #[test]
    fn test_to_value() {
        let value = BuiltinDefaults::default().to_value();
        assert_eq!(value["output_root"], ".");
        assert!(value["overrides"].as_object().unwrap().is_empty());
        assert!(value.get("browser_profile").is_none());
    }
}
