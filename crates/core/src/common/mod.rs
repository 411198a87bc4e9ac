//! Common types shared across the crate.
//!
//! This module provides:
//! 1. **Errors:** Configuration errors raised at construction and usage errors raised by
//!    policy operations.

/// Configuration and policy usage errors.
pub mod error;

pub use error::{ConfigError, PolicyError};
