//! Error types for preset registration, resolution and runtime overrides.

use std::fmt;

/// Coarse classification of a [`PresetError`].
///
/// Callers use this to decide whether to re-prompt the user (unknown preset,
/// bad override text) or to abort because the catalog itself is broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A requested or referenced preset does not exist.
    UnknownPreset,
    /// A runtime override could not be applied.
    InvalidOverride,
    /// The catalog failed an integrity check at construction time.
    Catalog,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPreset => write!(f, "UNKNOWN_PRESET"),
            Self::InvalidOverride => write!(f, "INVALID_OVERRIDE"),
            Self::Catalog => write!(f, "CATALOG"),
        }
    }
}

/// Errors produced by the registry, the resolver and override application.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PresetError {
    #[error("Unknown preset '{name}'{}", referrer_suffix(.referenced_by))]
    UnknownPreset {
        name: String,
        referenced_by: Option<String>,
    },

    #[error("Invalid override for '{key}': '{raw}' is not a valid {expected}")]
    InvalidOverride {
        key: String,
        raw: String,
        expected: String,
    },

    #[error("Preset name must not be empty")]
    EmptyName,

    #[error("Duplicate preset name: '{0}'")]
    DuplicateName(String),

    #[error("Base preset '{0}' is not in the catalog")]
    MissingBase(String),

    #[error("Base preset '{0}' must not declare parents")]
    BaseHasParents(String),

    #[error("Preset '{preset}' inherits from unknown preset '{parent}'")]
    DanglingParent { preset: String, parent: String },

    #[error("Preset '{preset}': malformed parents declaration: {reason}")]
    MalformedParents { preset: String, reason: String },

    #[error("Preset '{0}' declares parents both as a field and inside its overrides")]
    ConflictingParents(String),
}

fn referrer_suffix(referenced_by: &Option<String>) -> String {
    match referenced_by {
        Some(by) => format!(" (referenced by '{}')", by),
        None => String::new(),
    }
}

impl PresetError {
    /// Shorthand for a top-level lookup miss.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownPreset {
            name: name.into(),
            referenced_by: None,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownPreset { .. } => ErrorKind::UnknownPreset,
            Self::InvalidOverride { .. } => ErrorKind::InvalidOverride,
            Self::EmptyName
            | Self::DuplicateName(_)
            | Self::MissingBase(_)
            | Self::BaseHasParents(_)
            | Self::DanglingParent { .. }
            | Self::MalformedParents { .. }
            | Self::ConflictingParents(_) => ErrorKind::Catalog,
        }
    }
}
