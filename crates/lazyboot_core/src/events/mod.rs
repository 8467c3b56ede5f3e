//! Synchronous event bus with exact and wildcard subscriptions.

pub mod bus;
pub mod pattern;
