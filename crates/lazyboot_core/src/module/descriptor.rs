//! Module descriptor identity.
//!
//! # Invariants
//! - A descriptor is never blank; its value is kept exactly as supplied.
//! - Descriptors are compared by exact string value; ordering is lexical.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque identifier naming one activatable module, e.g. `app.reports`.
///
/// The host application supplies descriptors at startup; the factory is the
/// only component that knows how to turn one into a live module.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleDescriptor(String);

impl ModuleDescriptor {
    /// Creates a descriptor from raw input, kept verbatim.
    pub fn new(value: impl Into<String>) -> Result<Self, DescriptorError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DescriptorError::Empty);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for ModuleDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ModuleDescriptor {
    type Error = DescriptorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ModuleDescriptor {
    type Error = DescriptorError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ModuleDescriptor> for String {
    fn from(value: ModuleDescriptor) -> Self {
        value.0
    }
}

impl AsRef<str> for ModuleDescriptor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Builds an ordered descriptor list from raw strings.
///
/// Fails on the first empty entry; order and duplicates are preserved.
pub fn descriptors_from<I, S>(values: I) -> Result<Vec<ModuleDescriptor>, DescriptorError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(ModuleDescriptor::new).collect()
}

/// Descriptor construction errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    Empty,
}

impl Display for DescriptorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "module descriptor must not be empty"),
        }
    }
}

impl Error for DescriptorError {}
