//! Preset catalogs
//!
//! A catalog is a validated [`PresetRegistry`] plus where it came from and
//! any post-selection notices. It is built either from the built-in
//! downloader presets or from a catalog file.

mod builtin;
mod file;

pub use builtin::{builtin_mappings, builtin_notices, builtin_presets, CatalogContext};
pub use file::{CatalogFile, PresetEntry};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use preset_engine::{PresetError, PresetRegistry, DEFAULT_BASE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Settings;
use crate::source::{self, SourceError, SourceFormat};

/// Origin of a catalog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CatalogOrigin {
    Builtin,
    File,
    /// Parsed from text handed in by the caller
    Inline,
}

/// Provenance of a catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogSource {
    pub origin: CatalogOrigin,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of the catalog file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl CatalogSource {
    pub fn builtin() -> Self {
        Self {
            origin: CatalogOrigin::Builtin,
            path: None,
            digest: None,
        }
    }

    /// Catalog text supplied directly; the digest covers that text.
    pub fn inline(content: &str) -> Self {
        Self {
            origin: CatalogOrigin::Inline,
            path: None,
            digest: Some(source::sha256_hex(content.as_bytes())),
        }
    }
}

/// Errors loading or using a catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(String),

    #[error("Catalog file not found: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported catalog format: {0} (expected .toml or .json)")]
    UnsupportedFormat(PathBuf),

    #[error("Invalid catalog: {0}")]
    Engine(#[from] PresetError),

    #[error("Catalog has no selectable presets")]
    NoSelectable,

    #[error("Preset '{0}' is internal and cannot be selected")]
    NotSelectable(String),
}

impl From<SourceError> for CatalogError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Io(e) => Self::Io(e),
            SourceError::Parse(msg) => Self::Parse(msg),
        }
    }
}

/// A validated preset catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    registry: PresetRegistry,
    source: CatalogSource,
    notices: BTreeMap<String, String>,
}

impl Catalog {
    /// The built-in downloader presets.
    pub fn builtin(ctx: &CatalogContext) -> Result<Self, CatalogError> {
        let registry = PresetRegistry::with_base(builtin_presets(ctx)?, DEFAULT_BASE)?;
        let notices = builtin_notices()
            .into_iter()
            .map(|(name, notice)| (name.to_string(), notice))
            .collect();
        debug!(output_root = %ctx.output_root, "using built-in catalog");
        Ok(Self {
            registry,
            source: CatalogSource::builtin(),
            notices,
        })
    }

    /// Load a catalog file (`.toml` or `.json`).
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::NotFound(path.to_path_buf()));
        }
        let format = SourceFormat::for_path(path)
            .ok_or_else(|| CatalogError::UnsupportedFormat(path.to_path_buf()))?;

        let loaded = source::load(path, format)?;
        let source = CatalogSource {
            origin: CatalogOrigin::File,
            path: Some(path.to_string_lossy().to_string()),
            digest: Some(loaded.digest),
        };
        let catalog = Self::from_value(loaded.value, source)?;

        info!(path = %path.display(), presets = catalog.registry.len(), "loaded catalog file");
        Ok(catalog)
    }

    /// Parse catalog text in the given format.
    pub fn parse(content: &str, format: SourceFormat) -> Result<Self, CatalogError> {
        let value = source::parse_str(content, format)?;
        Self::from_value(value, CatalogSource::inline(content))
    }

    fn from_value(value: serde_json::Value, source: CatalogSource) -> Result<Self, CatalogError> {
        let file = CatalogFile::from_value(value).map_err(|e| CatalogError::Parse(e.to_string()))?;
        let (base, presets, notices) = file.into_parts();
        let registry = PresetRegistry::with_base(presets, &base)?;

        Ok(Self {
            registry,
            source,
            notices: notices.into_iter().collect(),
        })
    }

    /// The catalog named by the settings, or the built-in one.
    pub fn from_settings(settings: &Settings) -> Result<Self, CatalogError> {
        match settings.catalog_path {
            Some(ref path) => Self::load(Path::new(path)),
            None => {
                let ctx = CatalogContext::new(
                    absolute_root(&settings.output_root)?,
                    settings.browser_profile.clone(),
                );
                Self::builtin(&ctx)
            }
        }
    }

    pub fn registry(&self) -> &PresetRegistry {
        &self.registry
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    /// Notice to show after `preset` is selected.
    pub fn notice(&self, preset: &str) -> Option<&str> {
        self.notices.get(preset).map(String::as_str)
    }

    /// Pick the preset to resolve.
    ///
    /// An explicit request must name a selectable preset. Without one the
    /// preferred default is used, falling back to the first selectable name.
    pub fn select(
        &self,
        requested: Option<&str>,
        preferred: Option<&str>,
    ) -> Result<String, CatalogError> {
        if let Some(name) = requested.or(preferred) {
            let preset = self.registry.get(name)?;
            if preset.is_internal() {
                return Err(CatalogError::NotSelectable(name.to_string()));
            }
            return Ok(preset.name.clone());
        }

        self.registry
            .list_selectable_names()
            .first()
            .map(|name| name.to_string())
            .ok_or(CatalogError::NoSelectable)
    }
}

/// Make `root` absolute against the current directory.
fn absolute_root(root: &str) -> Result<String, CatalogError> {
    let path = Path::new(root);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = std::env::current_dir()?;
        if root == "." {
            cwd
        } else {
            cwd.join(path)
        }
    };
    Ok(absolute.to_string_lossy().to_string())
}
