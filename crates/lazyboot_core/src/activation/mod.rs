//! Module activation from a compiled manifest.
//!
//! # Responsibility
//! - Activate eager modules in manifest order.
//! - Arm trigger-event listeners for deferred modules.
//! - Expose deferred capabilities for just-in-time activation.
//!
//! # Invariants
//! - Deduplication of repeated activations belongs to the registrar;
//!   `OnceRegistrar` provides it for hosts that need it.

pub mod deferred;
pub mod dispatcher;
pub mod once;

pub use deferred::DeferredCapabilities;
pub use dispatcher::{DispatchError, ModuleActivator};
pub use once::OnceRegistrar;
