//! Error type definitions.
//!
//! Store and initialization errors abort a command. Probe errors are always
//! absorbed by the validation engine and turned into a status code.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Schema migration error.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
}

/// Why an oEmbed probe did not confirm a video as online.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The request did not finish within the probe timeout.
    #[error("oEmbed request timed out")]
    Timeout,

    /// The TCP/TLS connection could not be established.
    #[error("oEmbed connection failed: {0}")]
    Connect(String),

    /// The endpoint answered with a non-success status.
    #[error("oEmbed endpoint returned HTTP {0}")]
    Status(u16),

    /// The endpoint answered with an empty body.
    #[error("oEmbed endpoint returned an empty body")]
    EmptyBody,

    /// The body could not be read or is not valid UTF-8.
    #[error("oEmbed body could not be decoded: {0}")]
    Decode(String),

    /// The body is text but not an oEmbed object.
    #[error("oEmbed body is malformed: {0}")]
    Malformed(String),

    /// Any other request failure (builder, redirect loop, ...).
    #[error("oEmbed request failed: {0}")]
    Request(String),
}

/// A persisted `validation_status` value that is not a known status code.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Unknown validation status code: {0}")]
pub struct InvalidStatusCode(pub i64);
