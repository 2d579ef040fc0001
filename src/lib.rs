//! VOD preset front end
//!
//! Loads a preset catalog (built-in downloader presets or a catalog file),
//! resolves a preset with the `preset-engine` crate, applies runtime
//! overrides and emits a resolved options artifact for the download client.

pub mod artifact;
pub mod catalog;
pub mod config;
pub mod explain;
pub mod logging;
pub mod source;

pub use artifact::{split_urls, ResolvedArtifact};
pub use catalog::{Catalog, CatalogContext, CatalogError, CatalogOrigin, CatalogSource};
pub use config::{ConfigError, EffectiveSettings, Settings};
pub use explain::ExplainOutput;
pub use preset_engine::{
    MergeSource, PresetError, PresetRegistry, ResolvedConfig, Resolver, RuntimeOverride,
    RuntimeOverrides,
};
