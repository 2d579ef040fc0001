//! Preset resolution.
//!
//! Resolution replays, in order:
//! 1. The base preset's overrides
//! 2. Each declared parent's own overrides, in list order
//! 3. The target preset's own overrides
//!
//! Every layer is applied with a shallow top-level merge: a key present in a
//! later layer replaces the earlier value entirely. Nested mappings are not
//! merged and lists are not concatenated.
//!
//! Inheritance is one level deep. A parent contributes only its own direct
//! overrides; a parent's parents are not pulled in unless the target lists
//! them too. This keeps output identical to existing catalogs, and it means
//! cycles cannot arise.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::error::PresetError;
use crate::overrides::RuntimeOverrides;
use crate::preset::{Overrides, PARENTS_KEY};
use crate::registry::PresetRegistry;
use crate::resolved::{MergeSource, ResolvedConfig};

/// Shallow merge `overlay` onto `base`. Last writer per top-level key wins.
pub fn shallow_merge(mut base: Overrides, overlay: &Overrides) -> Overrides {
    for (key, value) in overlay {
        base.insert(key.clone(), value.clone());
    }
    base
}

/// Resolves preset names against a registry snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    registry: &'a PresetRegistry,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a PresetRegistry) -> Self {
        Self { registry }
    }

    /// Resolve `name` into a flat configuration.
    pub fn resolve(&self, name: &str) -> Result<ResolvedConfig, PresetError> {
        let layers = self.layers(name)?;

        let mut options = Overrides::new();
        let mut origins = BTreeMap::new();
        for (source, overrides) in &layers {
            trace!(preset = name, source = %source, keys = overrides.len(), "applying layer");
            options = shallow_merge(options, overrides);
            origins.extend(overrides.keys().map(|key| (key.clone(), source.clone())));
        }

        options.remove(PARENTS_KEY);
        origins.remove(PARENTS_KEY);

        debug!(preset = name, layers = layers.len(), keys = options.len(), "preset resolved");

        Ok(ResolvedConfig {
            preset: name.to_string(),
            options,
            origins,
        })
    }

    /// Resolve `name`, then apply runtime overrides on top.
    pub fn resolve_with(
        &self,
        name: &str,
        overrides: &RuntimeOverrides,
    ) -> Result<ResolvedConfig, PresetError> {
        let resolved = self.resolve(name)?;
        overrides.apply(&resolved)
    }

    /// The ordered merge sources a resolution of `name` would apply.
    pub fn merge_sources(&self, name: &str) -> Result<Vec<MergeSource>, PresetError> {
        Ok(self
            .layers(name)?
            .into_iter()
            .map(|(source, _)| source)
            .collect())
    }

    fn layers(&self, name: &str) -> Result<Vec<(MergeSource, &'a Overrides)>, PresetError> {
        let target = self.registry.get(name)?;
        let base = self.registry.base();

        let mut layers = Vec::with_capacity(target.parents.len() + 2);
        layers.push((MergeSource::Base(base.name.clone()), &base.overrides));

        // The base resolves to itself; replaying it as "own" would be a no-op.
        if target.name == base.name {
            return Ok(layers);
        }

        for parent_name in &target.parents {
            let parent = self
                .registry
                .get(parent_name)
                .map_err(|_| PresetError::UnknownPreset {
                    name: parent_name.clone(),
                    referenced_by: Some(target.name.clone()),
                })?;
            layers.push((MergeSource::Parent(parent.name.clone()), &parent.overrides));
        }

        layers.push((MergeSource::Own(target.name.clone()), &target.overrides));
        Ok(layers)
    }
}

impl PresetRegistry {
    /// Resolver bound to this registry.
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self)
    }

    /// Shorthand for `self.resolver().resolve(name)`.
    pub fn resolve(&self, name: &str) -> Result<ResolvedConfig, PresetError> {
        self.resolver().resolve(name)
    }
}
