//! Application settings
//!
//! Settings are merged from four layers, lowest precedence first:
//! 1. Built-in defaults
//! 2. User file (~/.config/vod-preset/config.toml)
//! 3. Environment (BROWSER_PROFILE, VOD_PRESET_CATALOG, VOD_PRESET_OUTPUT_ROOT)
//! 4. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::BuiltinDefaults;
pub use effective::{
    env_layer, ConfigError, EffectiveSettings, Settings, SettingsOrigin, SettingsSource,
    ENV_BROWSER_PROFILE, ENV_CATALOG, ENV_OUTPUT_ROOT,
};
pub use merge::{deep_merge, merge_layers};
