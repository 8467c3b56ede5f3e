//! Just-in-time activation of deferred capabilities.

use crate::module::contract::{ActivationError, ModuleRegistrar};
use crate::module::descriptor::ModuleDescriptor;
use log::info;
use std::collections::{BTreeMap, BTreeSet};

/// Capabilities whose owning module has not been activated yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeferredCapabilities {
    entries: BTreeMap<String, ModuleDescriptor>,
}

impl DeferredCapabilities {
    pub fn new(entries: BTreeMap<String, ModuleDescriptor>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn owner_of(&self, capability: &str) -> Option<&ModuleDescriptor> {
        self.entries.get(capability)
    }

    pub fn is_deferred(&self, capability: &str) -> bool {
        self.entries.contains_key(capability)
    }

    /// Returns sorted pending capability names.
    pub fn capabilities(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Activates the module owning `capability` if it is still deferred.
    ///
    /// On success every capability of that module leaves the table. Returns
    /// `Ok(false)` when the capability is not deferred (already active or
    /// never deferred). A failed activation leaves the table unchanged.
    pub fn resolve(
        &mut self,
        capability: &str,
        registrar: &dyn ModuleRegistrar,
    ) -> Result<bool, ActivationError> {
        let Some(owner) = self.entries.get(capability).cloned() else {
            return Ok(false);
        };

        registrar.activate(&owner)?;
        self.entries.retain(|_, descriptor| *descriptor != owner);
        info!(
            "event=deferred_resolve module=activation status=ok capability={} descriptor={}",
            capability, owner
        );
        Ok(true)
    }

    /// Activates every remaining deferred module once and empties the table.
    ///
    /// Modules run in capability order. Returns the activated descriptors.
    pub fn resolve_all(
        &mut self,
        registrar: &dyn ModuleRegistrar,
    ) -> Result<Vec<ModuleDescriptor>, ActivationError> {
        let mut seen = BTreeSet::new();
        let owners: Vec<ModuleDescriptor> = self
            .entries
            .values()
            .filter(|descriptor| seen.insert((*descriptor).clone()))
            .cloned()
            .collect();

        let mut activated = Vec::with_capacity(owners.len());
        for owner in owners {
            registrar.activate(&owner)?;
            self.entries.retain(|_, descriptor| *descriptor != owner);
            activated.push(owner);
        }
        Ok(activated)
    }
}
