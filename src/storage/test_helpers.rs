//! Shared test helpers for storage module tests.
//!
//! This module provides common utilities for database setup and fixture rows
//! (files, pages, sites, content elements, references).

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};

use crate::storage::models::ValidationStatus;
use crate::storage::run_migrations;

/// Creates a test database pool with migrations applied.
/// Uses an in-memory database for fast test execution. Every in-memory
/// connection is its own database, so the pool holds exactly one.
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Fixture for one `sys_file` row.
#[derive(Debug, Clone)]
pub struct TestVideo {
    pub extension: String,
    pub media_source: Option<String>,
    pub title: Option<String>,
    pub status: ValidationStatus,
    pub validation_date: i64,
    pub missing: bool,
}

impl TestVideo {
    pub fn new(extension: &str, media_source: Option<&str>) -> Self {
        Self {
            extension: extension.to_string(),
            media_source: media_source.map(str::to_string),
            title: None,
            status: ValidationStatus::Unvalidated,
            validation_date: 0,
            missing: false,
        }
    }

    pub fn youtube(media_id: &str) -> Self {
        Self::new("youtube", Some(media_id))
    }

    pub fn vimeo(media_id: &str) -> Self {
        Self::new("vimeo", Some(media_id))
    }

    pub fn validated(mut self, status: ValidationStatus, validation_date: i64) -> Self {
        self.status = status;
        self.validation_date = validation_date;
        self
    }

    pub fn titled(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn missing(mut self) -> Self {
        self.missing = true;
        self
    }
}

/// Inserts a `sys_file` row and returns its uid.
pub async fn insert_video(pool: &SqlitePool, video: TestVideo) -> i64 {
    let name = format!(
        "{}.{}",
        video.media_source.as_deref().unwrap_or("unknown"),
        video.extension
    );
    sqlx::query(
        "INSERT INTO sys_file (
            extension, missing, identifier, name, title, media_source,
            validation_status, validation_date
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING uid",
    )
    .bind(&video.extension)
    .bind(video.missing)
    .bind(format!("/user_upload/{}", name))
    .bind(&name)
    .bind(&video.title)
    .bind(&video.media_source)
    .bind(video.status.code())
    .bind(video.validation_date)
    .fetch_one(pool)
    .await
    .expect("Failed to insert test video")
    .get::<i64, _>(0)
}

/// Inserts a visible page.
pub async fn insert_page(pool: &SqlitePool, uid: i64, pid: i64) {
    insert_page_with_flags(pool, uid, pid, false, false).await;
}

/// Inserts a page with explicit hidden/deleted flags.
pub async fn insert_page_with_flags(
    pool: &SqlitePool,
    uid: i64,
    pid: i64,
    hidden: bool,
    deleted: bool,
) {
    sqlx::query("INSERT INTO pages (uid, pid, sorting, hidden, deleted) VALUES (?, ?, ?, ?, ?)")
        .bind(uid)
        .bind(pid)
        .bind(uid * 256)
        .bind(hidden)
        .bind(deleted)
        .execute(pool)
        .await
        .expect("Failed to insert test page");
}

/// Registers a site with the given root page.
pub async fn insert_site(pool: &SqlitePool, identifier: &str, root_page_id: i64) {
    sqlx::query("INSERT INTO sites (identifier, root_page_id) VALUES (?, ?)")
        .bind(identifier)
        .bind(root_page_id)
        .execute(pool)
        .await
        .expect("Failed to insert test site");
}

/// Inserts a `tt_content` row.
pub async fn insert_content(pool: &SqlitePool, uid: i64, pid: i64, hidden: bool, deleted: bool) {
    sqlx::query("INSERT INTO tt_content (uid, pid, header, hidden, deleted) VALUES (?, ?, ?, ?, ?)")
        .bind(uid)
        .bind(pid)
        .bind(format!("Content {}", uid))
        .bind(hidden)
        .bind(deleted)
        .execute(pool)
        .await
        .expect("Failed to insert test content");
}

/// Inserts a visible file reference from `host_table:host_uid` on page `pid`.
pub async fn insert_reference(
    pool: &SqlitePool,
    file_uid: i64,
    host_table: &str,
    host_uid: i64,
    pid: i64,
) {
    sqlx::query(
        "INSERT INTO sys_file_reference (uid_local, table_local, tablenames, uid_foreign, pid)
         VALUES (?, 'sys_file', ?, ?, ?)",
    )
    .bind(file_uid)
    .bind(host_table)
    .bind(host_uid)
    .bind(pid)
    .execute(pool)
    .await
    .expect("Failed to insert test reference");
}
