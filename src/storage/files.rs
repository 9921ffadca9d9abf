//! Mutations and counters on the `sys_file` registry.
//!
//! `update_properties_by_file` and `reset_validation_state` are the only two
//! statements that write validation state.

use sqlx::{Row, SqlitePool};
use strum::IntoEnumIterator;

use crate::error_handling::DatabaseError;
use crate::storage::models::{ValidationStatus, ValidationUpdate, VideoRecord};

pub(crate) const VIDEO_COLUMNS: &str = "f.uid, f.extension, f.missing, f.identifier, f.name, \
     f.title, f.media_source, f.validation_status, f.validation_date";

/// Writes status and date of one file in a single statement.
///
/// Returns the number of rows changed (0 if the uid does not exist).
pub async fn update_properties_by_file(
    pool: &SqlitePool,
    file_uid: i64,
    update: &ValidationUpdate,
) -> Result<u64, DatabaseError> {
    let result = sqlx::query(
        "UPDATE sys_file SET validation_status = ?, validation_date = ? WHERE uid = ?",
    )
    .bind(update.status.code())
    .bind(update.validation_date)
    .bind(file_uid)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Sets status and date back to 0 for every file of `extension`.
///
/// Idempotent; returns the number of rows matched.
pub async fn reset_validation_state(
    pool: &SqlitePool,
    extension: &str,
) -> Result<u64, DatabaseError> {
    let result = sqlx::query(
        "UPDATE sys_file SET validation_status = 0, validation_date = 0 WHERE extension = ?",
    )
    .bind(extension.trim().to_lowercase())
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Counts the non-missing files of `extension` last validated at or before
/// `cutoff`. No limit applies.
pub async fn count_videos(
    pool: &SqlitePool,
    extension: &str,
    cutoff: i64,
) -> Result<i64, DatabaseError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM sys_file WHERE extension = ? AND missing = 0 AND validation_date <= ?",
    )
    .bind(extension.trim().to_lowercase())
    .bind(cutoff)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Per-status breakdown of the non-missing files of `extension`.
///
/// Every known status is present in the result, in declaration order. Rows
/// with an unknown status code are ignored.
pub async fn count_by_status(
    pool: &SqlitePool,
    extension: &str,
) -> Result<Vec<(ValidationStatus, i64)>, DatabaseError> {
    let rows = sqlx::query(
        "SELECT validation_status, COUNT(*) AS total FROM sys_file \
         WHERE extension = ? AND missing = 0 GROUP BY validation_status",
    )
    .bind(extension.trim().to_lowercase())
    .fetch_all(pool)
    .await?;

    let mut counts: Vec<(ValidationStatus, i64)> =
        ValidationStatus::iter().map(|s| (s, 0)).collect();
    for row in rows {
        let code: i64 = row.get("validation_status");
        let total: i64 = row.get("total");
        if let Ok(status) = ValidationStatus::try_from(code) {
            if let Some(entry) = counts.iter_mut().find(|(s, _)| *s == status) {
                entry.1 = total;
            }
        }
    }
    Ok(counts)
}

/// Loads one file by uid.
pub async fn find_video(
    pool: &SqlitePool,
    file_uid: i64,
) -> Result<Option<VideoRecord>, DatabaseError> {
    let video = sqlx::query_as::<_, VideoRecord>(&format!(
        "SELECT {} FROM sys_file f WHERE f.uid = ?",
        VIDEO_COLUMNS
    ))
    .bind(file_uid)
    .fetch_optional(pool)
    .await?;
    Ok(video)
}
