//! Operator commands.
//!
//! This module maps the four subcommands onto the library:
//! - `validate`: runs the validation engine
//! - `report`: builds a report bundle and hands it to the report services
//! - `count`: counts the videos due for validation
//! - `reset`: resets the validation state of an extension
//!
//! Configuration problems (unsupported extension, missing sender) are not
//! errors: they are logged and returned as a `CommandOutcome` before the
//! store is opened.

mod commands;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::{Command, Config};
use crate::engine::ValidationReport;
use crate::initialization::init_client;
use crate::report::ReportBundle;
use crate::storage::ValidationStatus;
use crate::validator::{HttpProbe, ValidatorRegistry};

pub use commands::{count, open_store, report, reset, selection_settings, validate};

/// What a command did.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Validated(ValidationReport),
    /// `bundle` is `None` when there was nothing to report
    Reported { bundle: Option<ReportBundle> },
    Counted {
        total: i64,
        by_status: Vec<(ValidationStatus, i64)>,
    },
    Reset { rows: u64 },
    /// The extension is not one of the configured online-media extensions
    UnsupportedExtension(String),
    /// `report` needs a sender address
    MissingSender,
}

/// Runs `command` with the built-in validators and the HTTP probe.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or queried, the HTTP client
/// cannot be built, or a report service fails.
pub async fn run(config: Config, command: Command) -> Result<CommandOutcome> {
    let registry = ValidatorRegistry::with_builtin();
    match command {
        Command::Validate(args) => {
            let client = init_client(&config).context("Failed to initialize HTTP client")?;
            let probe = Arc::new(HttpProbe::new(client));
            validate(&config, &args, registry, probe).await
        }
        Command::Report(args) => report(&config, &args, registry).await,
        Command::Count(args) => count(&config, &args).await,
        Command::Reset(args) => reset(&config, &args).await,
    }
}
