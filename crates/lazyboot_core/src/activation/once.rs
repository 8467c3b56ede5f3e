//! Deduplicating registrar wrapper.

use crate::module::contract::{ActivationError, ModuleRegistrar};
use crate::module::descriptor::ModuleDescriptor;
use log::debug;
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Forwards each descriptor to the inner registrar at most once.
///
/// A descriptor is marked pending while the inner registrar runs, so an
/// activation that fires its own trigger event is not forwarded again. It is
/// recorded as active only after the inner activation succeeds; a failed
/// activation clears the pending mark and may be retried by a later trigger.
pub struct OnceRegistrar<R: ModuleRegistrar> {
    inner: R,
    state: Mutex<OnceState>,
}

#[derive(Default)]
struct OnceState {
    active: Vec<ModuleDescriptor>,
    pending: BTreeSet<ModuleDescriptor>,
}

impl<R: ModuleRegistrar> OnceRegistrar<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            state: Mutex::new(OnceState::default()),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn is_active(&self, descriptor: &ModuleDescriptor) -> bool {
        self.lock_state().active.contains(descriptor)
    }

    /// Active descriptors in activation order.
    pub fn active(&self) -> Vec<ModuleDescriptor> {
        self.lock_state().active.clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, OnceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R: ModuleRegistrar> ModuleRegistrar for OnceRegistrar<R> {
    fn activate(&self, descriptor: &ModuleDescriptor) -> Result<(), ActivationError> {
        {
            let mut state = self.lock_state();
            if state.active.contains(descriptor) || !state.pending.insert(descriptor.clone()) {
                debug!(
                    "event=module_activate module=activation status=skipped descriptor={}",
                    descriptor
                );
                return Ok(());
            }
        }

        // Lock is released while the inner registrar runs; activation may
        // fire events that activate other modules.
        let result = self.inner.activate(descriptor);

        let mut state = self.lock_state();
        state.pending.remove(descriptor);
        result?;
        state.active.push(descriptor.clone());
        Ok(())
    }
}
