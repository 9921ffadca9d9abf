//! Error handling.
//!
//! This module provides:
//! - Error type definitions for the store, initialization and probes
//! - Categorization of HTTP client errors into probe errors
//!
//! Errors are split by how far they may travel:
//! - **Store / initialization errors** abort the running command
//! - **Probe errors** stay inside the engine and become an `Error` status

mod categorization;
mod types;

// Re-export public API
pub use categorization::categorize_reqwest_error;
pub use types::{DatabaseError, InitializationError, InvalidStatusCode, ProbeError};
