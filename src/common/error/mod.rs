//! Unified error types for the gridshift library.
//!
//! This module provides a single error type covering failures from the
//! source spreadsheet service, the destination sheet service, and the job
//! store, presenting a consistent API to users.

// Submodule declarations
pub mod types;

// Re-exports
pub use types::{Error, Result};
