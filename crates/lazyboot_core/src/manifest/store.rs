//! Durable manifest cache file.
//!
//! # Responsibility
//! - Read a previously compiled manifest back from disk.
//! - Write compiled manifests as self-describing, versioned JSON.
//!
//! # Invariants
//! - Missing, empty, malformed or foreign-schema content loads as `None`.
//! - Writes go to a sibling temp file first and are renamed into place, so
//!   readers never observe a partially written manifest.

use crate::manifest::model::{ModuleManifest, MANIFEST_SCHEMA_VERSION};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub type StoreResult<T> = Result<T, ManifestStoreError>;

/// File-backed manifest store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted manifest.
    ///
    /// Returns `Ok(None)` on every cache-miss shape. Only I/O failures other
    /// than "not found" or undecodable bytes are surfaced as errors.
    pub fn load(&self) -> StoreResult<Option<ModuleManifest>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("event=manifest_read module=manifest status=miss reason=missing");
                return Ok(None);
            }
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                warn!("event=manifest_read module=manifest status=miss reason=not_utf8");
                return Ok(None);
            }
            Err(err) => {
                error!(
                    "event=manifest_read module=manifest status=error path={} error={}",
                    self.path.display(),
                    err
                );
                return Err(ManifestStoreError::io(&self.path, err));
            }
        };

        Ok(decode_manifest(&raw))
    }

    /// Writes `manifest` and returns the normalized form a later `load` yields.
    pub fn persist(&self, manifest: &ModuleManifest) -> StoreResult<ModuleManifest> {
        let started_at = Instant::now();
        let encoded = serde_json::to_vec_pretty(manifest).map_err(ManifestStoreError::Encode)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|err| ManifestStoreError::io(parent, err))?;
        }

        let temp_path = self.temp_path();
        if let Err(err) = std::fs::write(&temp_path, &encoded) {
            error!(
                "event=manifest_write module=manifest status=error path={} error={}",
                temp_path.display(),
                err
            );
            return Err(ManifestStoreError::io(&temp_path, err));
        }
        if let Err(err) = std::fs::rename(&temp_path, &self.path) {
            let _ = std::fs::remove_file(&temp_path);
            error!(
                "event=manifest_write module=manifest status=error path={} error={}",
                self.path.display(),
                err
            );
            return Err(ManifestStoreError::io(&self.path, err));
        }

        info!(
            "event=manifest_write module=manifest status=ok bytes={} duration_ms={}",
            encoded.len(),
            started_at.elapsed().as_millis()
        );
        Ok(manifest.clone())
    }

    /// Deletes the persisted manifest. Returns whether a file was removed.
    pub fn clear(&self) -> StoreResult<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("event=manifest_clear module=manifest status=ok");
                Ok(true)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(ManifestStoreError::io(&self.path, err)),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "manifest".to_string());
        self.path
            .with_file_name(format!(".{file_name}.{}.tmp", std::process::id()))
    }
}

fn decode_manifest(raw: &str) -> Option<ModuleManifest> {
    if raw.trim().is_empty() {
        info!("event=manifest_read module=manifest status=miss reason=empty");
        return None;
    }

    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            warn!("event=manifest_read module=manifest status=miss reason=malformed error={err}");
            return None;
        }
    };
    if value.is_null() {
        info!("event=manifest_read module=manifest status=miss reason=empty");
        return None;
    }

    let version = value.get("schema_version").and_then(serde_json::Value::as_u64);
    if version != Some(u64::from(MANIFEST_SCHEMA_VERSION)) {
        warn!(
            "event=manifest_read module=manifest status=miss reason=schema_mismatch found={:?} expected={}",
            version, MANIFEST_SCHEMA_VERSION
        );
        return None;
    }

    match serde_json::from_value::<ModuleManifest>(value) {
        Ok(manifest) => Some(manifest),
        Err(err) => {
            warn!("event=manifest_read module=manifest status=miss reason=malformed error={err}");
            None
        }
    }
}

/// Manifest persistence errors.
#[derive(Debug)]
pub enum ManifestStoreError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Encode(serde_json::Error),
}

impl ManifestStoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Display for ManifestStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "manifest file `{}` is not accessible: {source}", path.display())
            }
            Self::Encode(err) => write!(f, "failed to encode manifest: {err}"),
        }
    }
}

impl Error for ManifestStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
        }
    }
}
