//! Resolved options artifact
//!
//! The artifact is what gets handed to the download client: the flat option
//! mapping plus enough provenance to tell which preset, catalog and runtime
//! overrides produced it.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use preset_engine::{MergeSource, Overrides, ResolvedConfig, RuntimeOverride, RuntimeOverrides};
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogSource;

/// Schema version for resolved_options
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "vod-preset/resolved_options@1";

/// Resolved options with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedArtifact {
    pub schema_version: u32,

    pub schema_id: String,

    /// When this artifact was produced
    pub created_at: DateTime<Utc>,

    /// Resolved preset name
    pub preset: String,

    /// Catalog the preset came from
    pub catalog: CatalogSource,

    /// Runtime overrides that changed the output, in application order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runtime_overrides: Vec<RuntimeOverride>,

    /// URLs to download
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<String>,

    /// Flat option mapping for the download client
    pub options: Overrides,

    /// Winning source per option key
    pub origins: BTreeMap<String, MergeSource>,
}

impl ResolvedArtifact {
    /// Wrap a resolution result.
    pub fn new(
        resolved: ResolvedConfig,
        catalog: CatalogSource,
        overrides: &RuntimeOverrides,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            preset: resolved.preset,
            catalog,
            runtime_overrides: overrides.effective().cloned().collect(),
            urls: Vec::new(),
            options: resolved.options,
            origins: resolved.origins,
        }
    }

    /// Attach download URLs
    pub fn with_urls(mut self, urls: Vec<String>) -> Self {
        self.urls = urls;
        self
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write to file
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)
    }
}

/// Split comma-separated URL input. Entries are trimmed; empty ones dropped.
pub fn split_urls(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
