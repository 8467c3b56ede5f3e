//! Deferred module activation for lazyboot hosts.
//!
//! Compiles an ordered module list into a cached eager/deferred manifest,
//! activates it against an event bus, and registers view lifecycle
//! callbacks on the same bus.

pub mod activation;
pub mod boot;
pub mod config;
pub mod events;
pub mod logging;
pub mod manifest;
pub mod module;
pub mod view;

pub use activation::{DeferredCapabilities, DispatchError, ModuleActivator, OnceRegistrar};
pub use boot::{BootError, BootOutcome, ModuleBoot};
pub use config::{BootConfig, ConfigError};
pub use events::bus::{
    EventBus, EventCall, EventError, Listener, ListenerResult, PayloadPolicy, Propagation,
};
pub use events::pattern::EventPattern;
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use manifest::compiler::{should_recompile, CompileError, CompileResult, ManifestCompiler};
pub use manifest::model::{ManifestError, ModuleManifest, MANIFEST_SCHEMA_VERSION};
pub use manifest::store::{ManifestStore, ManifestStoreError, StoreResult};
pub use module::contract::{
    ActivationError, FactoryError, ModuleFactory, ModuleInstance, ModuleRegistrar,
};
pub use module::descriptor::{descriptors_from, DescriptorError, ModuleDescriptor};
pub use view::callback::{CallbackRef, ClassResolver, ResolveError, ViewCallback, ViewHandler};
pub use view::name::{normalize_view_name, ViewEventKind, ViewLike};
pub use view::registrar::ViewEvents;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
