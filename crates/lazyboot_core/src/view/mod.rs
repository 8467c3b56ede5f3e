//! View lifecycle event registration.
//!
//! # Responsibility
//! - Normalize view names and derive `creating:`/`composing:` event names.
//! - Register direct and class-based callbacks on the shared event bus.
//!
//! # Invariants
//! - No state is held here beyond the bus subscriptions themselves.

pub mod callback;
pub mod name;
pub mod registrar;
