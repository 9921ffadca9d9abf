//! Reference filter: is a file embedded in live content on allowed pages?
//!
//! `sys_file_reference.tablenames` names the host table dynamically, so the
//! host record cannot be joined in SQL. Each reference is resolved with its
//! own query against the named table instead.

use std::collections::HashSet;
use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error_handling::DatabaseError;
use crate::storage::models::ContentReference;

static TABLE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid table name regex"));

/// Columns a host table needs for the liveness check.
const HOST_COLUMNS: [&str; 4] = ["uid", "pid", "deleted", "hidden"];

/// Visible references of `file_uid` located on one of `allowed_pages`.
///
/// `allowed_pages` is bound as one `IN` list; callers chunk it.
pub async fn references_for_file(
    pool: &SqlitePool,
    file_uid: i64,
    allowed_pages: &[i64],
) -> Result<Vec<ContentReference>, DatabaseError> {
    if allowed_pages.is_empty() {
        return Ok(Vec::new());
    }

    let mut query_builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT uid_local, tablenames, uid_foreign, pid FROM sys_file_reference \
         WHERE table_local = 'sys_file' AND deleted = 0 AND hidden = 0 AND uid_local = ",
    );
    query_builder.push_bind(file_uid);
    push_page_filter(&mut query_builder, "pid", allowed_pages);
    query_builder.push(" ORDER BY uid");

    let references = query_builder
        .build_query_as::<ContentReference>()
        .fetch_all(pool)
        .await?;
    Ok(references)
}

/// True if `host_table` has a visible, non-deleted row `record_uid` located
/// on one of `allowed_pages`.
///
/// Invalid or unknown table names, and tables lacking one of the
/// `uid`/`pid`/`deleted`/`hidden` columns, are treated as "no live record".
pub async fn live_record_exists(
    pool: &SqlitePool,
    host_table: &str,
    record_uid: i64,
    allowed_pages: &[i64],
) -> Result<bool, DatabaseError> {
    if allowed_pages.is_empty() {
        return Ok(false);
    }
    if !TABLE_NAME.is_match(host_table) {
        warn!("Ignoring reference to invalid table name {:?}", host_table);
        return Ok(false);
    }
    let columns = table_columns(pool, host_table).await?;
    if columns.is_empty() {
        warn!("Ignoring reference to unknown table {}", host_table);
        return Ok(false);
    }
    if let Some(missing) = HOST_COLUMNS
        .iter()
        .find(|column| !columns.iter().any(|c| c.eq_ignore_ascii_case(column)))
    {
        warn!(
            "Ignoring reference to table {} without a {} column",
            host_table, missing
        );
        return Ok(false);
    }

    let mut query_builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT 1 FROM \"{}\" WHERE deleted = 0 AND hidden = 0 AND uid = ",
        host_table
    ));
    query_builder.push_bind(record_uid);
    push_page_filter(&mut query_builder, "pid", allowed_pages);
    query_builder.push(" LIMIT 1");

    let found = query_builder.build().fetch_optional(pool).await?;
    Ok(found.is_some())
}

/// True if at least one reference of `file_uid` on an allowed page resolves
/// to a live host record on an allowed page.
///
/// Stops at the first live host record. `allowed_pages` is split into chunks
/// of `chunk_size` page ids; the answer does not depend on the chunk size.
pub async fn has_active_reference(
    pool: &SqlitePool,
    file_uid: i64,
    allowed_pages: &[i64],
    chunk_size: usize,
) -> Result<bool, DatabaseError> {
    let chunk_size = chunk_size.max(1);
    let mut checked = HashSet::new();

    for chunk in allowed_pages.chunks(chunk_size) {
        for reference in references_for_file(pool, file_uid, chunk).await? {
            if !checked.insert((reference.host_table.clone(), reference.host_record_id)) {
                continue;
            }
            if live_record_in_any_chunk(pool, &reference, allowed_pages, chunk_size).await? {
                debug!(
                    "File {} is referenced by {}:{} on page {}",
                    file_uid, reference.host_table, reference.host_record_id, reference.page_id
                );
                return Ok(true);
            }
        }
    }

    Ok(false)
}

async fn live_record_in_any_chunk(
    pool: &SqlitePool,
    reference: &ContentReference,
    allowed_pages: &[i64],
    chunk_size: usize,
) -> Result<bool, DatabaseError> {
    for chunk in allowed_pages.chunks(chunk_size) {
        if live_record_exists(pool, &reference.host_table, reference.host_record_id, chunk).await? {
            return Ok(true);
        }
    }
    Ok(false)
}

async fn table_columns(pool: &SqlitePool, table: &str) -> Result<Vec<String>, DatabaseError> {
    let columns = sqlx::query_scalar::<_, String>("SELECT name FROM pragma_table_info(?)")
        .bind(table)
        .fetch_all(pool)
        .await?;
    Ok(columns)
}

/// Appends ` AND <column> IN (?, ?, ...)`.
pub(crate) fn push_page_filter(
    query_builder: &mut QueryBuilder<'_, Sqlite>,
    column: &str,
    page_ids: &[i64],
) {
    query_builder.push(format!(" AND {} IN (", column));
    let mut separated = query_builder.separated(", ");
    for page_id in page_ids {
        separated.push_bind(*page_id);
    }
    separated.push_unseparated(")");
}
