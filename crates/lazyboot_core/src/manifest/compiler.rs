//! Manifest compilation and cache invalidation.
//!
//! # Responsibility
//! - Decide whether a cached manifest still matches the input list.
//! - Probe every descriptor and classify it as eager or deferred.
//!
//! # Invariants
//! - A probe failure aborts compilation before anything is persisted.
//! - Eager order follows input order exactly.
//! - Duplicate capability keys resolve to the last descriptor that claims them.

use crate::manifest::model::ModuleManifest;
use crate::manifest::store::{ManifestStore, ManifestStoreError};
use crate::module::contract::{FactoryError, ModuleFactory};
use crate::module::descriptor::ModuleDescriptor;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type CompileResult<T> = Result<T, CompileError>;

/// Returns whether `manifest` must be rebuilt for `descriptors`.
///
/// Comparison is exact and order-sensitive.
pub fn should_recompile(manifest: Option<&ModuleManifest>, descriptors: &[ModuleDescriptor]) -> bool {
    match manifest {
        None => true,
        Some(manifest) => manifest.descriptors.as_slice() != descriptors,
    }
}

/// Compiles descriptor lists into manifests and caches them in a store.
pub struct ManifestCompiler<F: ModuleFactory> {
    factory: F,
    store: ManifestStore,
}

impl<F: ModuleFactory> ManifestCompiler<F> {
    pub fn new(factory: F, store: ManifestStore) -> Self {
        Self { factory, store }
    }

    pub fn store(&self) -> &ManifestStore {
        &self.store
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Returns the cached manifest when it matches `descriptors`, otherwise
    /// compiles and persists a fresh one.
    pub fn load_or_compile(&self, descriptors: &[ModuleDescriptor]) -> CompileResult<ModuleManifest> {
        let cached = self.store.load().map_err(CompileError::Store)?;
        match cached {
            Some(manifest) if !should_recompile(Some(&manifest), descriptors) => {
                info!(
                    "event=manifest_load module=manifest status=hit modules={}",
                    descriptors.len()
                );
                Ok(manifest)
            }
            Some(_) => {
                info!("event=manifest_load module=manifest status=stale");
                self.compile(descriptors)
            }
            None => {
                info!("event=manifest_load module=manifest status=miss");
                self.compile(descriptors)
            }
        }
    }

    /// Probes every descriptor, persists the result and returns it.
    pub fn compile(&self, descriptors: &[ModuleDescriptor]) -> CompileResult<ModuleManifest> {
        let started_at = Instant::now();
        let mut manifest = ModuleManifest::fresh(descriptors);

        for descriptor in descriptors {
            let probe = match self.factory.instantiate(descriptor) {
                Ok(probe) => probe,
                Err(err) => {
                    error!(
                        "event=manifest_compile module=manifest status=error descriptor={} error={}",
                        descriptor, err
                    );
                    return Err(CompileError::Instantiate {
                        descriptor: descriptor.clone(),
                        source: err,
                    });
                }
            };

            if !probe.is_deferred() {
                manifest.eager.push(descriptor.clone());
                continue;
            }

            for capability in probe.provides() {
                if let Some(previous) = manifest.deferred.get(&capability) {
                    if previous != descriptor {
                        warn!(
                            "event=capability_override module=manifest status=ok capability={} previous={} owner={}",
                            capability, previous, descriptor
                        );
                    }
                }
                manifest.deferred.insert(capability, descriptor.clone());
            }
            manifest.triggers.insert(descriptor.clone(), probe.when());
        }

        let persisted = self.store.persist(&manifest).map_err(CompileError::Store)?;
        info!(
            "event=manifest_compile module=manifest status=ok modules={} eager={} deferred={} duration_ms={}",
            persisted.descriptors.len(),
            persisted.eager.len(),
            persisted.triggers.len(),
            started_at.elapsed().as_millis()
        );
        Ok(persisted)
    }
}

/// Manifest compilation errors.
#[derive(Debug)]
pub enum CompileError {
    Instantiate {
        descriptor: ModuleDescriptor,
        source: FactoryError,
    },
    Store(ManifestStoreError),
}

impl Display for CompileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Instantiate { descriptor, source } => {
                write!(f, "cannot probe module {descriptor}: {source}")
            }
            Self::Store(err) => write!(f, "manifest cache unavailable: {err}"),
        }
    }
}

impl Error for CompileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Instantiate { source, .. } => Some(source),
            Self::Store(err) => Some(err),
        }
    }
}
