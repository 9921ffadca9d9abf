//! Row types of the file registry and reference tables.

use log::warn;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use strum_macros::EnumIter;

use crate::error_handling::InvalidStatusCode;

/// Validation state persisted in `sys_file.validation_status`.
///
/// The numeric codes follow HTTP semantics and are stored as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    /// Never validated, or reset.
    Unvalidated,
    /// The oEmbed probe confirmed the video.
    Success,
    /// Not referenced by any live content, so not probed.
    Skip,
    /// No media id, or the probe failed.
    Error,
}

impl ValidationStatus {
    /// Numeric code stored in the database.
    pub fn code(self) -> i64 {
        match self {
            ValidationStatus::Unvalidated => 0,
            ValidationStatus::Success => 200,
            ValidationStatus::Skip => 410,
            ValidationStatus::Error => 404,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Unvalidated => "unvalidated",
            ValidationStatus::Success => "success",
            ValidationStatus::Skip => "skip",
            ValidationStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<i64> for ValidationStatus {
    type Error = InvalidStatusCode;

    fn try_from(code: i64) -> Result<Self, InvalidStatusCode> {
        match code {
            0 => Ok(ValidationStatus::Unvalidated),
            200 => Ok(ValidationStatus::Success),
            410 => Ok(ValidationStatus::Skip),
            404 => Ok(ValidationStatus::Error),
            other => Err(InvalidStatusCode(other)),
        }
    }
}

/// One online-media file from `sys_file`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoRecord {
    pub uid: i64,
    /// Lowercase platform tag, e.g. `youtube`
    pub extension: String,
    /// The host system lost the file; such rows are never selected.
    pub missing: bool,
    /// Storage identifier, e.g. `/user_upload/intro.youtube`
    pub identifier: String,
    pub name: String,
    pub title: Option<String>,
    /// Placeholder payload the media id is extracted from
    pub media_source: Option<String>,
    pub validation_status: ValidationStatus,
    /// Unix timestamp of the last validation, 0 = never
    pub validation_date: i64,
}

impl VideoRecord {
    /// Title for operator output, falling back to the file name.
    pub fn display_title(&self) -> &str {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title,
            _ => &self.name,
        }
    }
}

/// Unknown status codes written by other tools decode as `Unvalidated`, so
/// the row is picked up again and its status overwritten.
impl<'r> FromRow<'r, SqliteRow> for VideoRecord {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let uid: i64 = row.try_get("uid")?;
        let code: i64 = row.try_get("validation_status")?;
        let validation_status = ValidationStatus::try_from(code).unwrap_or_else(|e| {
            warn!("File {}: {}, treating it as unvalidated", uid, e);
            ValidationStatus::Unvalidated
        });

        Ok(Self {
            uid,
            extension: row.try_get("extension")?,
            missing: row.try_get("missing")?,
            identifier: row.try_get("identifier")?,
            name: row.try_get("name")?,
            title: row.try_get("title")?,
            media_source: row.try_get("media_source")?,
            validation_status,
            validation_date: row.try_get("validation_date")?,
        })
    }
}

/// "File `file_id` is embedded in record `host_record_id` of `host_table` on
/// page `page_id`".
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ContentReference {
    #[sqlx(rename = "uid_local")]
    pub file_id: i64,
    #[sqlx(rename = "tablenames")]
    pub host_table: String,
    #[sqlx(rename = "uid_foreign")]
    pub host_record_id: i64,
    #[sqlx(rename = "pid")]
    pub page_id: i64,
}

/// A video selected for validation or reporting.
///
/// `has_active_reference` is only computed in referenced-only mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoCandidate {
    pub video: VideoRecord,
    pub has_active_reference: Option<bool>,
}

/// The status/date pair written after a validation attempt.
///
/// Both fields always travel together so a row never ends up with a fresh
/// date and a stale status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationUpdate {
    pub status: ValidationStatus,
    pub validation_date: i64,
}
