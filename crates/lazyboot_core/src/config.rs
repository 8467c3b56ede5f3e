//! Startup configuration.
//!
//! # Responsibility
//! - Describe where the manifest cache lives and which modules to boot.
//! - Carry logging settings for `init_logging`.
//!
//! # Invariants
//! - `manifest_path` is never empty.
//! - `log_level` is always one of `trace|debug|info|warn|error`.
//! - Module order in `modules` is preserved; it drives cache invalidation.

use crate::logging::{default_log_level, normalize_level};
use crate::module::descriptor::{descriptors_from, DescriptorError, ModuleDescriptor};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Host startup settings, usually read from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BootConfig {
    /// Location of the compiled manifest cache.
    pub manifest_path: PathBuf,
    /// Ordered module descriptors.
    #[serde(default)]
    pub modules: Vec<String>,
    #[serde(default = "default_level_string")]
    pub log_level: String,
    /// Absolute directory for rolling log files; logging stays off when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_level_string() -> String {
    default_log_level().to_string()
}

impl BootConfig {
    pub fn with_manifest_path(manifest_path: impl Into<PathBuf>) -> Self {
        Self {
            manifest_path: manifest_path.into(),
            modules: Vec::new(),
            log_level: default_level_string(),
            log_dir: None,
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validated()
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Ordered descriptors for `modules`.
    pub fn descriptors(&self) -> Result<Vec<ModuleDescriptor>, ConfigError> {
        descriptors_from(self.modules.iter().cloned()).map_err(ConfigError::Descriptor)
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        if self.manifest_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "manifest_path must not be empty".to_string(),
            ));
        }
        self.log_level = normalize_level(&self.log_level)
            .map_err(ConfigError::Invalid)?
            .to_string();
        self.descriptors()?;
        Ok(self)
    }
}

/// Configuration loading errors.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Descriptor(DescriptorError),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "config is not valid JSON: {err}"),
            Self::Descriptor(err) => write!(f, "config lists an invalid module: {err}"),
            Self::Invalid(message) => write!(f, "config is invalid: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Descriptor(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}
