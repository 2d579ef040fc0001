//! Preset definitions.
//!
//! A preset is a named set of option overrides plus an ordered list of
//! parents it inherits from. Presets whose name starts with
//! [`INTERNAL_PREFIX`] are internal: they can be inherited from but are
//! never offered for selection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PresetError;

/// Name prefix marking a preset as internal (not user-selectable).
pub const INTERNAL_PREFIX: &str = "_";

/// Reserved override key holding an inline parents declaration.
///
/// This is metadata and never appears in a resolved configuration.
pub const PARENTS_KEY: &str = "_inherits";

/// Conventional name of the base preset applied to every resolution.
pub const DEFAULT_BASE: &str = "_default";

/// Option overrides: top-level key to value.
pub type Overrides = Map<String, Value>;

/// A single named preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Unique preset name
    pub name: String,

    /// Presets inherited from, least specific first
    #[serde(default)]
    pub parents: Vec<String>,

    /// Direct option overrides
    #[serde(default)]
    pub overrides: Overrides,
}

impl Preset {
    /// Create a preset with no parents.
    pub fn new(name: impl Into<String>, overrides: Overrides) -> Self {
        Self {
            name: name.into(),
            parents: Vec::new(),
            overrides,
        }
    }

    /// Set the parents list.
    pub fn with_parents<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parents = parents.into_iter().map(Into::into).collect();
        self
    }

    /// Build a preset from a raw mapping that may carry an `_inherits` list.
    ///
    /// The reserved key is lifted into `parents` and removed from the
    /// overrides.
    pub fn from_mapping(
        name: impl Into<String>,
        mut mapping: Overrides,
    ) -> Result<Self, PresetError> {
        let name = name.into();
        let parents = match mapping.remove(PARENTS_KEY) {
            Some(value) => parse_parents(&name, value)?,
            None => Vec::new(),
        };
        Ok(Self {
            name,
            parents,
            overrides: mapping,
        })
    }

    /// Fold an inline `_inherits` declaration into `parents`.
    ///
    /// Fails if both forms are present, since there is no sensible order to
    /// combine them in.
    pub fn normalized(mut self) -> Result<Self, PresetError> {
        if let Some(value) = self.overrides.remove(PARENTS_KEY) {
            if !self.parents.is_empty() {
                return Err(PresetError::ConflictingParents(self.name));
            }
            self.parents = parse_parents(&self.name, value)?;
        }
        Ok(self)
    }

    /// Whether this preset is internal (inheritance-only).
    pub fn is_internal(&self) -> bool {
        is_internal_name(&self.name)
    }
}

/// Whether a preset name carries the internal marker.
pub fn is_internal_name(name: &str) -> bool {
    name.starts_with(INTERNAL_PREFIX)
}

fn parse_parents(preset: &str, value: Value) -> Result<Vec<String>, PresetError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(PresetError::MalformedParents {
                preset: preset.to_string(),
                reason: format!("expected a list of names, got {}", type_name(&other)),
            })
        }
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            other => Err(PresetError::MalformedParents {
                preset: preset.to_string(),
                reason: format!("parent entries must be strings, got {}", type_name(&other)),
            }),
        })
        .collect()
}

/// Human name of a JSON value's type, used in error messages.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
