//! Preset composition engine.
//!
//! Presets are named option mappings that inherit from an ordered list of
//! parents. A registry holds an immutable catalog of them plus one base
//! preset applied to every resolution; the resolver turns a preset name into
//! a flat option mapping with a shallow, last-writer-wins merge. Runtime
//! overrides given as text can then be layered on top.
//!
//! The engine performs no I/O. A [`PresetRegistry`] is `Send + Sync` and may
//! be shared across threads once built.

mod error;
mod overrides;
mod preset;
mod registry;
mod resolved;
mod resolver;

pub use error::{ErrorKind, PresetError};
pub use overrides::{RuntimeOverride, RuntimeOverrides, ValueKind};
pub use preset::{is_internal_name, Overrides, Preset, DEFAULT_BASE, INTERNAL_PREFIX, PARENTS_KEY};
pub use registry::PresetRegistry;
pub use resolved::{MergeSource, ResolvedConfig};
pub use resolver::{shallow_merge, Resolver};
