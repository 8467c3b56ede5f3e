//! Compiled module manifest.
//!
//! # Invariants
//! - `eager` and the keys of `triggers` partition `descriptors`.
//! - `descriptors` is the exact, order-sensitive input of the compile that
//!   produced this manifest.
//! - A manifest is replaced on recompilation, never edited in place.

use crate::module::descriptor::ModuleDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Schema version written into every persisted manifest.
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

/// Classification of all descriptors into eager and deferred modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleManifest {
    pub schema_version: u32,
    /// Input list used for invalidation checks.
    pub descriptors: Vec<ModuleDescriptor>,
    /// Modules activated unconditionally, in this order.
    pub eager: Vec<ModuleDescriptor>,
    /// Capability name -> owning deferred module.
    pub deferred: BTreeMap<String, ModuleDescriptor>,
    /// Deferred module -> events that activate it.
    #[serde(default)]
    pub triggers: BTreeMap<ModuleDescriptor, Vec<String>>,
}

impl ModuleManifest {
    /// Creates an empty manifest for the given input list.
    pub fn fresh(descriptors: &[ModuleDescriptor]) -> Self {
        Self {
            schema_version: MANIFEST_SCHEMA_VERSION,
            descriptors: descriptors.to_vec(),
            eager: Vec::new(),
            deferred: BTreeMap::new(),
            triggers: BTreeMap::new(),
        }
    }

    /// Returns the deferred module that owns `capability`, if any.
    pub fn owner_of(&self, capability: &str) -> Option<&ModuleDescriptor> {
        self.deferred.get(capability)
    }

    pub fn is_deferred_capability(&self, capability: &str) -> bool {
        self.deferred.contains_key(capability)
    }

    /// Whether `descriptor` was classified as deferred.
    pub fn is_deferred_module(&self, descriptor: &ModuleDescriptor) -> bool {
        self.triggers.contains_key(descriptor)
    }

    /// Verifies that eager and deferred modules partition the input list.
    pub fn check_partition(&self) -> Result<(), ManifestError> {
        let inputs: BTreeSet<&ModuleDescriptor> = self.descriptors.iter().collect();
        let eager: BTreeSet<&ModuleDescriptor> = self.eager.iter().collect();

        for descriptor in &eager {
            if self.triggers.contains_key(*descriptor) {
                return Err(ManifestError::PartitionViolation {
                    descriptor: (*descriptor).clone(),
                    reason: "classified as both eager and deferred",
                });
            }
            if !inputs.contains(*descriptor) {
                return Err(ManifestError::PartitionViolation {
                    descriptor: (*descriptor).clone(),
                    reason: "eager module is not part of the input list",
                });
            }
        }
        for descriptor in self.triggers.keys() {
            if !inputs.contains(descriptor) {
                return Err(ManifestError::PartitionViolation {
                    descriptor: descriptor.clone(),
                    reason: "deferred module is not part of the input list",
                });
            }
        }
        for descriptor in inputs {
            if !eager.contains(descriptor) && !self.triggers.contains_key(descriptor) {
                return Err(ManifestError::PartitionViolation {
                    descriptor: descriptor.clone(),
                    reason: "module is neither eager nor deferred",
                });
            }
        }
        Ok(())
    }
}

/// Manifest consistency errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    PartitionViolation {
        descriptor: ModuleDescriptor,
        reason: &'static str,
    },
}

impl Display for ManifestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PartitionViolation { descriptor, reason } => {
                write!(f, "manifest partition violated by {descriptor}: {reason}")
            }
        }
    }
}

impl Error for ManifestError {}

#[cfg(test)]
mod tests {
    use super::{ManifestError, ModuleManifest, MANIFEST_SCHEMA_VERSION};
    use crate::module::descriptor::{descriptors_from, ModuleDescriptor};

    fn descriptor(value: &str) -> ModuleDescriptor {
        ModuleDescriptor::new(value).expect("valid descriptor")
    }

    fn classified() -> ModuleManifest {
        let inputs = descriptors_from(["a", "b", "c"]).expect("valid list");
        let mut manifest = ModuleManifest::fresh(&inputs);
        manifest.eager = vec![descriptor("a"), descriptor("c")];
        manifest
            .deferred
            .insert("reports".to_string(), descriptor("b"));
        manifest
            .triggers
            .insert(descriptor("b"), vec!["boot.reports".to_string()]);
        manifest
    }

    #[test]
    fn fresh_manifest_is_empty_and_versioned() {
        let inputs = descriptors_from(["a"]).expect("valid list");
        let manifest = ModuleManifest::fresh(&inputs);
        assert_eq!(manifest.schema_version, MANIFEST_SCHEMA_VERSION);
        assert_eq!(manifest.descriptors, inputs);
        assert!(manifest.eager.is_empty());
        assert!(manifest.deferred.is_empty());
        assert!(manifest.triggers.is_empty());
    }

    #[test]
    fn accepts_exact_partition() {
        let manifest = classified();
        assert!(manifest.check_partition().is_ok());
        assert_eq!(manifest.owner_of("reports"), Some(&descriptor("b")));
        assert!(manifest.is_deferred_module(&descriptor("b")));
        assert!(!manifest.is_deferred_module(&descriptor("a")));
    }

    #[test]
    fn rejects_module_in_both_classes() {
        let mut manifest = classified();
        manifest.eager.push(descriptor("b"));
        let err = manifest.check_partition().unwrap_err();
        assert!(matches!(
            err,
            ManifestError::PartitionViolation { ref descriptor, .. } if descriptor.as_str() == "b"
        ));
    }

    #[test]
    fn rejects_unclassified_module() {
        let mut manifest = classified();
        manifest.eager.pop();
        let err = manifest.check_partition().unwrap_err();
        assert!(matches!(
            err,
            ManifestError::PartitionViolation { ref descriptor, .. } if descriptor.as_str() == "c"
        ));
    }

    #[test]
    fn missing_triggers_field_deserializes_as_empty() {
        let json = r#"{"schema_version":1,"descriptors":["a"],"eager":["a"],"deferred":{}}"#;
        let manifest: ModuleManifest = serde_json::from_str(json).expect("manifest parse");
        assert!(manifest.triggers.is_empty());
        assert!(manifest.check_partition().is_ok());
    }
}
