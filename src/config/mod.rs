//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, limits, windows)
//! - The library `Config` struct
//! - CLI option types and parsing

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{
    Cli, Command, Config, ExtensionArgs, GlobalOpts, LogFormat, LogLevel, ReferenceArgs,
    ReportArgs, ValidateArgs,
};
