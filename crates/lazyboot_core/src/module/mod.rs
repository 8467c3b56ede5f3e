//! Module identity and collaborator contracts.
//!
//! # Responsibility
//! - Define the descriptor type supplied by the host application.
//! - Define factory/registrar seams used by compile and activation.
//!
//! # Invariants
//! - Core never constructs modules itself; it always goes through
//!   `ModuleFactory` or `ModuleRegistrar`.

pub mod contract;
pub mod descriptor;
