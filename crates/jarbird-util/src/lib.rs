//! Shared utilities for Jarbird.
//!
//! Cross-cutting concerns used by every other Jarbird crate: the unified
//! error type and a couple of filesystem helpers.

pub mod errors;
pub mod fs;
