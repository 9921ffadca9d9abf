// Shared test helpers for database setup and test data creation.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tempfile::TempDir;

use video_validator::app::open_store;
use video_validator::{Config, OEmbedProbe, ProbeError};

/// Config pointing at a fresh database inside `dir`, with a sender configured.
#[allow(dead_code)] // Used by other test files
pub fn test_config(dir: &TempDir) -> Config {
    Config {
        db_path: dir.path().join("registry.db"),
        mail_from: Some("noreply@example.com".to_string()),
        ..Default::default()
    }
}

/// Opens the store of `config` (creating and migrating it) and returns the raw pool.
#[allow(dead_code)] // Used by other test files
pub async fn create_test_pool(config: &Config) -> SqlitePool {
    let pool = open_store(config).await.expect("Failed to open test store");
    pool.as_ref().clone()
}

/// Inserts a `sys_file` row and returns its uid.
#[allow(dead_code)] // Used by other test files
pub async fn insert_video(
    pool: &SqlitePool,
    extension: &str,
    media_source: Option<&str>,
    status: i64,
    validation_date: i64,
) -> i64 {
    let name = format!("{}.{}", media_source.unwrap_or("unknown"), extension);
    sqlx::query(
        "INSERT INTO sys_file (
            extension, missing, identifier, name, title, media_source,
            validation_status, validation_date
        ) VALUES (?, 0, ?, ?, ?, ?, ?, ?)
        RETURNING uid",
    )
    .bind(extension)
    .bind(format!("/user_upload/{}", name))
    .bind(&name)
    .bind(format!("Video {}", name))
    .bind(media_source)
    .bind(status)
    .bind(validation_date)
    .fetch_one(pool)
    .await
    .expect("Failed to insert test video")
    .get::<i64, _>(0)
}

/// Reads `(validation_status, validation_date)` of one file.
#[allow(dead_code)] // Used by other test files
pub async fn video_state(pool: &SqlitePool, uid: i64) -> (i64, i64) {
    sqlx::query_as::<_, (i64, i64)>(
        "SELECT validation_status, validation_date FROM sys_file WHERE uid = ?",
    )
    .bind(uid)
    .fetch_one(pool)
    .await
    .expect("Failed to load test video")
}

/// Probe that answers from a fixed list of online media ids and records every URL.
#[allow(dead_code)] // Used by other test files
pub struct StubProbe {
    online_ids: Vec<&'static str>,
    pub requested: Mutex<Vec<String>>,
}

#[allow(dead_code)] // Used by other test files
impl StubProbe {
    pub fn new(online_ids: &[&'static str]) -> Arc<Self> {
        Arc::new(Self {
            online_ids: online_ids.to_vec(),
            requested: Mutex::new(Vec::new()),
        })
    }

    pub fn request_count(&self) -> usize {
        self.requested.lock().expect("lock").len()
    }
}

#[async_trait]
impl OEmbedProbe for StubProbe {
    async fn fetch(&self, url: &str) -> Result<String, ProbeError> {
        self.requested.lock().expect("lock").push(url.to_string());
        if self.online_ids.iter().any(|id| url.contains(id)) {
            Ok(r#"{"type":"video","title":"Stub"}"#.to_string())
        } else {
            Err(ProbeError::Status(404))
        }
    }
}
