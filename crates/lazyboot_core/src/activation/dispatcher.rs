//! Eager activation and trigger-event arming.
//!
//! # Invariants
//! - Trigger listeners are armed before any eager module runs, so an eager
//!   module that fires a trigger event activates its deferred target.
//! - Eager modules activate in manifest order; the first failure aborts.
//! - Every occurrence of a trigger event calls the registrar again.

use crate::activation::deferred::DeferredCapabilities;
use crate::events::bus::{
    EventBus, EventCall, EventError, ListenerResult, PayloadPolicy, Propagation,
};
use crate::manifest::model::ModuleManifest;
use crate::module::contract::{ActivationError, ModuleRegistrar};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Activates a compiled manifest against a registrar and event bus.
pub struct ModuleActivator<R: ModuleRegistrar + 'static> {
    registrar: Arc<R>,
}

impl<R: ModuleRegistrar + 'static> ModuleActivator<R> {
    pub fn new(registrar: Arc<R>) -> Self {
        Self { registrar }
    }

    pub fn registrar(&self) -> &Arc<R> {
        &self.registrar
    }

    /// Arms deferred modules, activates eager ones and returns the
    /// capability lookup table for just-in-time activation.
    pub fn activate<P: 'static>(
        &self,
        manifest: &ModuleManifest,
        events: &EventBus<P>,
    ) -> Result<DeferredCapabilities, DispatchError> {
        let mut armed = 0usize;
        for (descriptor, triggers) in &manifest.triggers {
            if triggers.is_empty() {
                continue;
            }

            let registrar = Arc::clone(&self.registrar);
            let target = descriptor.clone();
            events
                .listen_many(
                    triggers.as_slice(),
                    PayloadPolicy::Full,
                    Arc::new(move |call: &EventCall<'_, P>| -> ListenerResult {
                        info!(
                            "event=deferred_trigger module=activation status=start descriptor={} trigger={}",
                            target, call.name
                        );
                        registrar.activate(&target)?;
                        Ok(Propagation::Continue)
                    }),
                )
                .map_err(DispatchError::Listen)?;
            armed += triggers.len();
        }

        for descriptor in &manifest.eager {
            if let Err(err) = self.registrar.activate(descriptor) {
                error!(
                    "event=eager_activate module=activation status=error descriptor={} error={}",
                    descriptor, err
                );
                return Err(DispatchError::Activation(err));
            }
        }

        info!(
            "event=manifest_activate module=activation status=ok eager={} armed_listeners={} deferred_capabilities={}",
            manifest.eager.len(),
            armed,
            manifest.deferred.len()
        );
        Ok(DeferredCapabilities::new(manifest.deferred.clone()))
    }
}

/// Manifest activation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    Listen(EventError),
    Activation(ActivationError),
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Listen(err) => write!(f, "cannot arm trigger listener: {err}"),
            Self::Activation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Listen(err) => Some(err),
            Self::Activation(err) => Some(err),
        }
    }
}
