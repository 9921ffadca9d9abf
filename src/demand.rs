//! The parameter set of one validation or report run.

use serde::Serialize;

use crate::config::{DEFAULT_LIMIT, DEFAULT_REPORT_DAYS};

/// What to validate or report on.
///
/// Built by the operator commands and passed unchanged through selection,
/// validation and report aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatorDemand {
    /// Platform tag, compared case-insensitively
    pub extension: String,
    /// Maximum number of candidates per run, 0 = unlimited
    pub limit: u32,
    /// Report window in days
    pub days: u32,
    /// Only handle videos embedded in live content
    pub referenced_only: bool,
    /// Page subtree for referenced-only mode, 0 = every site root
    pub reference_root: i64,
    /// Report recipients
    pub recipients: Vec<String>,
}

impl Default for ValidatorDemand {
    fn default() -> Self {
        Self {
            extension: String::new(),
            limit: DEFAULT_LIMIT,
            days: DEFAULT_REPORT_DAYS,
            referenced_only: false,
            reference_root: 0,
            recipients: Vec::new(),
        }
    }
}

impl ValidatorDemand {
    /// The extension as stored in the registry (trimmed, lowercase).
    pub fn normalized_extension(&self) -> String {
        self.extension.trim().to_lowercase()
    }
}

/// Splits a comma separated recipient list, dropping blank entries.
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}
