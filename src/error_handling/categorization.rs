//! Error categorization.
//!
//! Maps transport-level `reqwest` failures onto `ProbeError` so that the
//! engine can log why a probe failed without caring about the HTTP stack.

use super::types::ProbeError;

/// Categorizes a `reqwest::Error` into a `ProbeError`.
///
/// Status codes win over transport flags, then timeouts over connect errors,
/// matching the order in which `reqwest` sets them.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> ProbeError {
    if let Some(status) = error.status() {
        return ProbeError::Status(status.as_u16());
    }

    if error.is_timeout() {
        ProbeError::Timeout
    } else if error.is_connect() {
        ProbeError::Connect(error.to_string())
    } else if error.is_body() || error.is_decode() {
        ProbeError::Decode(error.to_string())
    } else {
        ProbeError::Request(error.to_string())
    }
}
