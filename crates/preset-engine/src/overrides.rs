//! Runtime overrides supplied as text after resolution.
//!
//! An override targets one top-level key. Its text is interpreted according
//! to the type the key already holds in the resolved configuration; when the
//! key is absent the type is inferred from the text itself. Blank text is a
//! no-op.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use tracing::{debug, trace};

use crate::error::PresetError;
use crate::preset::{type_name, PARENTS_KEY};
use crate::resolved::{MergeSource, ResolvedConfig};

/// Scalar type an override's text is coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Integer,
    Float,
    Boolean,
    String,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::Boolean => write!(f, "boolean"),
            Self::String => write!(f, "string"),
        }
    }
}

impl ValueKind {
    /// Kind of an existing value, or `None` for null.
    ///
    /// Lists and mappings cannot be overridden from text.
    fn of(key: &str, raw: &str, value: &Value) -> Result<Option<Self>, PresetError> {
        match value {
            Value::Null => Ok(None),
            Value::Bool(_) => Ok(Some(Self::Boolean)),
            Value::Number(n) if n.is_f64() => Ok(Some(Self::Float)),
            Value::Number(_) => Ok(Some(Self::Integer)),
            Value::String(_) => Ok(Some(Self::String)),
            Value::Array(_) | Value::Object(_) => Err(PresetError::InvalidOverride {
                key: key.to_string(),
                raw: raw.to_string(),
                expected: format!("scalar (key holds a {})", type_name(value)),
            }),
        }
    }

    /// Coerce trimmed text to this kind.
    pub fn coerce(self, text: &str) -> Option<Value> {
        match self {
            Self::Integer => text
                .parse::<i64>()
                .map(Value::from)
                .or_else(|_| text.parse::<u64>().map(Value::from))
                .ok(),
            Self::Float => text
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            Self::Boolean => parse_bool(text).map(Value::Bool),
            Self::String => Some(Value::String(text.to_string())),
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Best-effort typing for a key the configuration does not hold yet:
/// integer, then float, then boolean, else string.
fn infer(text: &str) -> Value {
    [ValueKind::Integer, ValueKind::Float, ValueKind::Boolean]
        .into_iter()
        .find_map(|kind| kind.coerce(text))
        .unwrap_or_else(|| Value::String(text.to_string()))
}

/// One textual override for a top-level key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeOverride {
    pub key: String,
    pub raw: String,
}

impl RuntimeOverride {
    pub fn new(key: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            raw: raw.into(),
        }
    }

    /// Parse a `key=value` assignment. The value may be empty.
    pub fn parse_assignment(text: &str) -> Result<Self, PresetError> {
        match text.split_once('=') {
            Some((key, raw)) if !key.trim().is_empty() => Ok(Self::new(key.trim(), raw)),
            _ => Err(PresetError::InvalidOverride {
                key: text.to_string(),
                raw: text.to_string(),
                expected: "key=value assignment".to_string(),
            }),
        }
    }

    /// Blank overrides leave the resolved value untouched.
    pub fn is_blank(&self) -> bool {
        self.raw.trim().is_empty()
    }

    /// Interpret the text against the key's current value.
    fn to_value(&self, current: Option<&Value>) -> Result<Value, PresetError> {
        let text = self.raw.trim();
        let kind = match current {
            Some(value) => ValueKind::of(&self.key, &self.raw, value)?,
            None => None,
        };

        match kind {
            Some(kind) => kind.coerce(text).ok_or_else(|| PresetError::InvalidOverride {
                key: self.key.clone(),
                raw: self.raw.clone(),
                expected: kind.to_string(),
            }),
            None => Ok(infer(text)),
        }
    }
}

/// Ordered set of runtime overrides. Later entries win for the same key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuntimeOverrides {
    items: Vec<RuntimeOverride>,
}

impl RuntimeOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an override.
    pub fn push(&mut self, key: impl Into<String>, raw: impl Into<String>) {
        self.items.push(RuntimeOverride::new(key, raw));
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, key: impl Into<String>, raw: impl Into<String>) -> Self {
        self.push(key, raw);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuntimeOverride> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Overrides that will actually change something.
    pub fn effective(&self) -> impl Iterator<Item = &RuntimeOverride> {
        self.items.iter().filter(|o| !o.is_blank())
    }

    /// Apply all overrides to a copy of `config`.
    ///
    /// Either every override applies or none does; `config` is never
    /// modified.
    pub fn apply(&self, config: &ResolvedConfig) -> Result<ResolvedConfig, PresetError> {
        let mut out = config.clone();

        for item in &self.items {
            if item.is_blank() {
                trace!(key = %item.key, "blank override skipped");
                continue;
            }
            if item.key.is_empty() || item.key == PARENTS_KEY {
                return Err(PresetError::InvalidOverride {
                    key: item.key.clone(),
                    raw: item.raw.clone(),
                    expected: "non-reserved option key".to_string(),
                });
            }

            let value = item.to_value(out.options.get(&item.key))?;
            debug!(key = %item.key, value = %value, "runtime override applied");
            out.options.insert(item.key.clone(), value);
            out.origins.insert(item.key.clone(), MergeSource::Runtime);
        }

        Ok(out)
    }
}

impl FromIterator<RuntimeOverride> for RuntimeOverrides {
    fn from_iter<T: IntoIterator<Item = RuntimeOverride>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
