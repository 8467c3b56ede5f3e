//! Collaborator contracts for probing and activating modules.
//!
//! The host application owns module construction and service registration.
//! Core only classifies descriptors and decides when activation happens.

use crate::module::descriptor::ModuleDescriptor;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Live or probe instance of one module.
pub trait ModuleInstance {
    /// Whether activation should wait for a trigger event or capability request.
    fn is_deferred(&self) -> bool;

    /// Capability names this module supplies when deferred.
    fn provides(&self) -> Vec<String> {
        Vec::new()
    }

    /// Event names that should activate this module when deferred.
    fn when(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Produces module instances from descriptors.
pub trait ModuleFactory {
    fn instantiate(
        &self,
        descriptor: &ModuleDescriptor,
    ) -> Result<Box<dyn ModuleInstance>, FactoryError>;
}

/// Performs the side-effecting registration of one module's services.
///
/// Implementations must tolerate repeated calls for the same descriptor;
/// see [`crate::activation::OnceRegistrar`] for a deduplicating wrapper.
pub trait ModuleRegistrar: Send + Sync {
    fn activate(&self, descriptor: &ModuleDescriptor) -> Result<(), ActivationError>;
}

impl<R: ModuleRegistrar + ?Sized> ModuleRegistrar for std::sync::Arc<R> {
    fn activate(&self, descriptor: &ModuleDescriptor) -> Result<(), ActivationError> {
        (**self).activate(descriptor)
    }
}

/// Probe instantiation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactoryError {
    UnknownDescriptor(ModuleDescriptor),
    Failed {
        descriptor: ModuleDescriptor,
        message: String,
    },
}

impl FactoryError {
    pub fn failed(descriptor: &ModuleDescriptor, message: impl Into<String>) -> Self {
        Self::Failed {
            descriptor: descriptor.clone(),
            message: message.into(),
        }
    }
}

impl Display for FactoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownDescriptor(descriptor) => {
                write!(f, "no module is known for descriptor: {descriptor}")
            }
            Self::Failed {
                descriptor,
                message,
            } => write!(f, "failed to instantiate module {descriptor}: {message}"),
        }
    }
}

impl Error for FactoryError {}

/// Module activation errors raised by a registrar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationError {
    UnknownDescriptor(ModuleDescriptor),
    Failed {
        descriptor: ModuleDescriptor,
        message: String,
    },
}

impl ActivationError {
    pub fn failed(descriptor: &ModuleDescriptor, message: impl Into<String>) -> Self {
        Self::Failed {
            descriptor: descriptor.clone(),
            message: message.into(),
        }
    }

    pub fn descriptor(&self) -> &ModuleDescriptor {
        match self {
            Self::UnknownDescriptor(descriptor) => descriptor,
            Self::Failed { descriptor, .. } => descriptor,
        }
    }
}

impl Display for ActivationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownDescriptor(descriptor) => {
                write!(f, "cannot activate unknown module: {descriptor}")
            }
            Self::Failed {
                descriptor,
                message,
            } => write!(f, "failed to activate module {descriptor}: {message}"),
        }
    }
}

impl Error for ActivationError {}
