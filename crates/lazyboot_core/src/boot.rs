//! Startup entry point tying manifest compilation to activation.
//!
//! # Responsibility
//! - Load or rebuild the module manifest for the configured descriptors.
//! - Arm deferred modules and activate eager ones.
//!
//! # Invariants
//! - Any compile or activation failure aborts startup; nothing is retried.

use crate::activation::{DeferredCapabilities, DispatchError, ModuleActivator};
use crate::events::bus::EventBus;
use crate::manifest::compiler::{CompileError, ManifestCompiler};
use crate::manifest::model::ModuleManifest;
use crate::manifest::store::ManifestStore;
use crate::module::contract::{ModuleFactory, ModuleRegistrar};
use crate::module::descriptor::ModuleDescriptor;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

/// Result of a successful startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootOutcome {
    pub manifest: ModuleManifest,
    pub deferred: DeferredCapabilities,
}

/// Module repository: compiler plus activator.
pub struct ModuleBoot<F: ModuleFactory, R: ModuleRegistrar + 'static> {
    compiler: ManifestCompiler<F>,
    activator: ModuleActivator<R>,
}

impl<F: ModuleFactory, R: ModuleRegistrar + 'static> ModuleBoot<F, R> {
    pub fn new(factory: F, store: ManifestStore, registrar: Arc<R>) -> Self {
        Self {
            compiler: ManifestCompiler::new(factory, store),
            activator: ModuleActivator::new(registrar),
        }
    }

    pub fn compiler(&self) -> &ManifestCompiler<F> {
        &self.compiler
    }

    pub fn registrar(&self) -> &Arc<R> {
        self.activator.registrar()
    }

    /// Loads the manifest for `descriptors` and activates it on `events`.
    pub fn load<P: 'static>(
        &self,
        descriptors: &[ModuleDescriptor],
        events: &EventBus<P>,
    ) -> Result<BootOutcome, BootError> {
        let started_at = Instant::now();
        let manifest = self
            .compiler
            .load_or_compile(descriptors)
            .map_err(BootError::Compile)?;
        let deferred = self
            .activator
            .activate(&manifest, events)
            .map_err(BootError::Dispatch)?;

        info!(
            "event=modules_boot module=boot status=ok modules={} duration_ms={}",
            descriptors.len(),
            started_at.elapsed().as_millis()
        );
        Ok(BootOutcome { manifest, deferred })
    }
}

/// Startup errors.
#[derive(Debug)]
pub enum BootError {
    Compile(CompileError),
    Dispatch(DispatchError),
}

impl Display for BootError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compile(err) => write!(f, "module manifest compile failed: {err}"),
            Self::Dispatch(err) => write!(f, "module activation failed: {err}"),
        }
    }
}

impl Error for BootError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Compile(err) => Some(err),
            Self::Dispatch(err) => Some(err),
        }
    }
}
