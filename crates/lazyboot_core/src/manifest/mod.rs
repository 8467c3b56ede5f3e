//! Module manifest: model, durable cache and compiler.
//!
//! # Responsibility
//! - Classify descriptors into eager and deferred modules once.
//! - Reuse the classification across runs until the input list changes.
//!
//! # Invariants
//! - Cache misses are never errors; they trigger recompilation.
//! - Persisted manifests carry an explicit schema version.

pub mod compiler;
pub mod model;
pub mod store;
