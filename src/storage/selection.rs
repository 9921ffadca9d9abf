//! Candidate selection for validation runs and reports.
//!
//! Both selections filter `sys_file` by extension and the missing flag, and
//! can be narrowed to files referenced from a page subtree. In that mode the
//! page id list is bound in chunks sized by the store's bind parameter limit;
//! chunk results are merged by uid, so the result does not depend on the
//! chunk size.

use std::collections::BTreeMap;

use log::{debug, info};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::config::{
    DEFAULT_MAX_BIND_PARAMETERS, FALLBACK_WINDOW_DAYS, MAX_PAGE_TREE_DEPTH,
    RESERVED_BIND_PARAMETERS, SECONDS_PER_DAY,
};
use crate::demand::ValidatorDemand;
use crate::error_handling::DatabaseError;
use crate::storage::files::VIDEO_COLUMNS;
use crate::storage::models::{ValidationStatus, VideoCandidate, VideoRecord};
use crate::storage::page_tree::allowed_page_ids;
use crate::storage::references::{has_active_reference, push_page_filter};

/// Store limits that shape the selection queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSettings {
    /// Bind parameter limit of the store
    pub max_bind_parameters: usize,
    /// Page tree depth below each reference root
    pub max_page_depth: u32,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            max_bind_parameters: DEFAULT_MAX_BIND_PARAMETERS,
            max_page_depth: MAX_PAGE_TREE_DEPTH,
        }
    }
}

impl SelectionSettings {
    /// Number of page ids bound per statement.
    pub fn chunk_size(&self) -> usize {
        self.max_bind_parameters
            .saturating_sub(RESERVED_BIND_PARAMETERS)
            .max(1)
    }
}

/// Upper bound on `validation_date` for validation candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cutoff {
    /// Only never-validated (or reset) files. When none are left the
    /// selection falls back once to files last checked a week ago or earlier.
    Unvalidated,
    /// Files last validated at or before this timestamp. No fallback.
    At(i64),
}

impl Cutoff {
    fn bound(self) -> i64 {
        match self {
            Cutoff::Unvalidated => 0,
            Cutoff::At(timestamp) => timestamp,
        }
    }
}

/// Date/status part of the WHERE clause.
#[derive(Debug, Clone, Copy)]
enum DateFilter {
    DueAt(i64),
    ValidatedSince {
        status: ValidationStatus,
        after: i64,
    },
}

/// Selects the files a validation run should check.
///
/// Ordered oldest validation first, then by uid, truncated to `demand.limit`
/// (0 = unlimited). In referenced-only mode every candidate carries
/// `has_active_reference`; candidates without a live reference are kept so
/// the engine can mark them as skipped.
pub async fn select_for_validation(
    pool: &SqlitePool,
    demand: &ValidatorDemand,
    cutoff: Cutoff,
    now: i64,
    settings: &SelectionSettings,
) -> Result<Vec<VideoCandidate>, DatabaseError> {
    let candidates = select_candidates(
        pool,
        demand,
        DateFilter::DueAt(cutoff.bound()),
        demand.limit,
        settings,
    )
    .await?;

    if candidates.is_empty() && cutoff == Cutoff::Unvalidated {
        let fallback = now - FALLBACK_WINDOW_DAYS * SECONDS_PER_DAY;
        info!(
            "No unvalidated {} videos left, re-checking videos validated before {}",
            demand.normalized_extension(),
            fallback
        );
        return select_candidates(
            pool,
            demand,
            DateFilter::DueAt(fallback),
            demand.limit,
            settings,
        )
        .await;
    }

    Ok(candidates)
}

/// Selects the files validated with `status` within the last `demand.days`
/// days. No limit and no fallback apply.
pub async fn select_for_report(
    pool: &SqlitePool,
    demand: &ValidatorDemand,
    status: ValidationStatus,
    now: i64,
    settings: &SelectionSettings,
) -> Result<Vec<VideoCandidate>, DatabaseError> {
    let after = now - SECONDS_PER_DAY * i64::from(demand.days);
    select_candidates(
        pool,
        demand,
        DateFilter::ValidatedSince { status, after },
        0,
        settings,
    )
    .await
}

async fn select_candidates(
    pool: &SqlitePool,
    demand: &ValidatorDemand,
    filter: DateFilter,
    limit: u32,
    settings: &SelectionSettings,
) -> Result<Vec<VideoCandidate>, DatabaseError> {
    let extension = demand.normalized_extension();

    if !demand.referenced_only {
        let videos = fetch_videos(pool, &extension, filter, None, limit).await?;
        return Ok(videos
            .into_iter()
            .map(|video| VideoCandidate {
                video,
                has_active_reference: None,
            })
            .collect());
    }

    let allowed_pages =
        allowed_page_ids(pool, demand.reference_root, settings.max_page_depth).await?;
    if allowed_pages.is_empty() {
        debug!(
            "No pages below reference root {}, nothing can be referenced",
            demand.reference_root
        );
        return Ok(Vec::new());
    }

    let chunk_size = settings.chunk_size();
    let mut merged: BTreeMap<i64, VideoRecord> = BTreeMap::new();
    for chunk in allowed_pages.chunks(chunk_size) {
        for video in fetch_videos(pool, &extension, filter, Some(chunk), limit).await? {
            merged.entry(video.uid).or_insert(video);
        }
    }

    let mut videos: Vec<VideoRecord> = merged.into_values().collect();
    videos.sort_by_key(|video| (video.validation_date, video.uid));
    if limit > 0 {
        videos.truncate(limit as usize);
    }

    let mut candidates = Vec::with_capacity(videos.len());
    for video in videos {
        let has_reference =
            has_active_reference(pool, video.uid, &allowed_pages, chunk_size).await?;
        candidates.push(VideoCandidate {
            video,
            has_active_reference: Some(has_reference),
        });
    }
    Ok(candidates)
}

/// One statement: filters, optional reference narrowing to `pages`, order and
/// limit.
async fn fetch_videos(
    pool: &SqlitePool,
    extension: &str,
    filter: DateFilter,
    pages: Option<&[i64]>,
    limit: u32,
) -> Result<Vec<VideoRecord>, DatabaseError> {
    let mut query_builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT {} FROM sys_file f WHERE f.extension = ",
        VIDEO_COLUMNS
    ));
    query_builder.push_bind(extension.to_string());
    query_builder.push(" AND f.missing = 0");

    match filter {
        DateFilter::DueAt(cutoff) => {
            query_builder.push(" AND f.validation_date <= ");
            query_builder.push_bind(cutoff);
        }
        DateFilter::ValidatedSince { status, after } => {
            query_builder.push(" AND f.validation_status = ");
            query_builder.push_bind(status.code());
            query_builder.push(" AND f.validation_date > ");
            query_builder.push_bind(after);
        }
    }

    if let Some(pages) = pages {
        // Files with a visible reference on a visible page of this chunk.
        query_builder.push(
            " AND f.uid IN (SELECT sr.uid_local FROM sys_file_reference sr \
             JOIN pages p ON p.uid = sr.pid AND p.deleted = 0 AND p.hidden = 0 \
             WHERE sr.table_local = 'sys_file' AND sr.deleted = 0 AND sr.hidden = 0",
        );
        push_page_filter(&mut query_builder, "sr.pid", pages);
        query_builder.push(")");
    }

    query_builder.push(" ORDER BY f.validation_date ASC, f.uid ASC");
    if limit > 0 {
        query_builder.push(" LIMIT ");
        query_builder.push_bind(i64::from(limit));
    }

    let videos = query_builder
        .build_query_as::<VideoRecord>()
        .fetch_all(pool)
        .await?;
    Ok(videos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_helpers::{
        create_test_pool, insert_content, insert_page, insert_reference, insert_site,
        insert_video, TestVideo,
    };

    const NOW: i64 = 1_700_000_000;
    const DAY: i64 = SECONDS_PER_DAY;

    fn demand(extension: &str, limit: u32) -> ValidatorDemand {
        ValidatorDemand {
            extension: extension.to_string(),
            limit,
            ..Default::default()
        }
    }

    fn referenced(extension: &str, limit: u32, root: i64) -> ValidatorDemand {
        ValidatorDemand {
            referenced_only: true,
            reference_root: root,
            ..demand(extension, limit)
        }
    }

    fn uids(candidates: &[VideoCandidate]) -> Vec<i64> {
        candidates.iter().map(|c| c.video.uid).collect()
    }

    #[tokio::test]
    async fn test_unknown_extension_selects_nothing() {
        let pool = create_test_pool().await;
        insert_video(&pool, TestVideo::youtube("dQw4w9WgXcQ")).await;

        let rows = select_for_validation(
            &pool,
            &demand("myvideo", 1),
            Cutoff::At(NOW),
            NOW,
            &SelectionSettings::default(),
        )
        .await
        .expect("select");
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_filters_extension_case_insensitively_and_skips_missing() {
        let pool = create_test_pool().await;
        let yt = insert_video(&pool, TestVideo::youtube("dQw4w9WgXcQ")).await;
        insert_video(&pool, TestVideo::youtube("aaaaaaaaaaa").missing()).await;
        insert_video(&pool, TestVideo::vimeo("123456789")).await;

        let rows = select_for_validation(
            &pool,
            &demand("YouTube", 5),
            Cutoff::At(NOW),
            NOW,
            &SelectionSettings::default(),
        )
        .await
        .expect("select");
        assert_eq!(uids(&rows), vec![yt]);
        assert_eq!(rows[0].has_active_reference, None);
    }

    #[tokio::test]
    async fn test_unvalidated_first_then_limit() {
        let pool = create_test_pool().await;
        let checked = insert_video(
            &pool,
            TestVideo::youtube("aaaaaaaaaaa").validated(ValidationStatus::Success, NOW - 30 * DAY),
        )
        .await;
        let fresh_a = insert_video(&pool, TestVideo::youtube("bbbbbbbbbbb")).await;
        let fresh_b = insert_video(&pool, TestVideo::youtube("ccccccccccc")).await;
        insert_video(&pool, TestVideo::youtube("ddddddddddd")).await;

        let rows = select_for_validation(
            &pool,
            &demand("youtube", 2),
            Cutoff::Unvalidated,
            NOW,
            &SelectionSettings::default(),
        )
        .await
        .expect("select");
        assert_eq!(uids(&rows), vec![fresh_a, fresh_b]);
        assert!(!uids(&rows).contains(&checked));
    }

    #[tokio::test]
    async fn test_unknown_status_code_does_not_break_selection() {
        let pool = create_test_pool().await;
        let odd = insert_video(&pool, TestVideo::youtube("aaaaaaaaaaa")).await;
        let fresh = insert_video(&pool, TestVideo::youtube("bbbbbbbbbbb")).await;
        sqlx::query("UPDATE sys_file SET validation_status = 301 WHERE uid = ?")
            .bind(odd)
            .execute(&pool)
            .await
            .expect("update");

        let rows = select_for_validation(
            &pool,
            &demand("youtube", 10),
            Cutoff::Unvalidated,
            NOW,
            &SelectionSettings::default(),
        )
        .await
        .expect("select");
        assert_eq!(uids(&rows), vec![odd, fresh]);
        assert_eq!(rows[0].video.validation_status, ValidationStatus::Unvalidated);
    }

    #[tokio::test]
    async fn test_limit_zero_is_unlimited() {
        let pool = create_test_pool().await;
        for id in ["aaaaaaaaaaa", "bbbbbbbbbbb", "ccccccccccc"] {
            insert_video(&pool, TestVideo::youtube(id)).await;
        }

        let rows = select_for_validation(
            &pool,
            &demand("youtube", 0),
            Cutoff::Unvalidated,
            NOW,
            &SelectionSettings::default(),
        )
        .await
        .expect("select");
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn test_fallback_equals_explicit_week_old_cutoff() {
        let pool = create_test_pool().await;
        let old = insert_video(
            &pool,
            TestVideo::youtube("aaaaaaaaaaa").validated(ValidationStatus::Success, NOW - 10 * DAY),
        )
        .await;
        let older = insert_video(
            &pool,
            TestVideo::youtube("bbbbbbbbbbb").validated(ValidationStatus::Error, NOW - 20 * DAY),
        )
        .await;
        insert_video(
            &pool,
            TestVideo::youtube("ccccccccccc").validated(ValidationStatus::Success, NOW - DAY),
        )
        .await;

        let settings = SelectionSettings::default();
        let with_fallback = select_for_validation(
            &pool,
            &demand("youtube", 10),
            Cutoff::Unvalidated,
            NOW,
            &settings,
        )
        .await
        .expect("select");
        let explicit = select_for_validation(
            &pool,
            &demand("youtube", 10),
            Cutoff::At(NOW - 7 * DAY),
            NOW,
            &settings,
        )
        .await
        .expect("select");

        assert_eq!(uids(&with_fallback), vec![older, old]);
        assert_eq!(with_fallback, explicit);
    }

    #[tokio::test]
    async fn test_explicit_cutoff_never_falls_back() {
        let pool = create_test_pool().await;
        insert_video(
            &pool,
            TestVideo::youtube("aaaaaaaaaaa").validated(ValidationStatus::Success, NOW - 10 * DAY),
        )
        .await;

        let rows = select_for_validation(
            &pool,
            &demand("youtube", 10),
            Cutoff::At(NOW - 30 * DAY),
            NOW,
            &SelectionSettings::default(),
        )
        .await
        .expect("select");
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_fallback_with_nothing_old_enough_stays_empty() {
        let pool = create_test_pool().await;
        insert_video(
            &pool,
            TestVideo::youtube("aaaaaaaaaaa").validated(ValidationStatus::Success, NOW - DAY),
        )
        .await;

        let rows = select_for_validation(
            &pool,
            &demand("youtube", 10),
            Cutoff::Unvalidated,
            NOW,
            &SelectionSettings::default(),
        )
        .await
        .expect("select");
        assert!(rows.is_empty());
    }

    /// Site root 1 with pages 2..=7; videos referenced on several pages.
    async fn seed_referenced(pool: &SqlitePool) -> (i64, i64, i64, i64) {
        insert_page(pool, 1, 0).await;
        for uid in 2..=7 {
            insert_page(pool, uid, 1).await;
        }
        insert_site(pool, "main", 1).await;

        // Live on two pages: must appear once.
        let live = insert_video(pool, TestVideo::youtube("aaaaaaaaaaa")).await;
        insert_content(pool, 100, 2, false, false).await;
        insert_content(pool, 101, 7, false, false).await;
        insert_reference(pool, live, "tt_content", 100, 2).await;
        insert_reference(pool, live, "tt_content", 101, 7).await;

        // Referenced, but only from hidden content.
        let dead = insert_video(pool, TestVideo::youtube("bbbbbbbbbbb")).await;
        insert_content(pool, 102, 4, true, false).await;
        insert_reference(pool, dead, "tt_content", 102, 4).await;

        // Not referenced anywhere.
        let orphan = insert_video(pool, TestVideo::youtube("ccccccccccc")).await;

        // Referenced on the site root itself, which is outside the subtree.
        let on_root = insert_video(pool, TestVideo::youtube("ddddddddddd")).await;
        insert_content(pool, 103, 1, false, false).await;
        insert_reference(pool, on_root, "tt_content", 103, 1).await;

        (live, dead, orphan, on_root)
    }

    #[tokio::test]
    async fn test_referenced_only_tags_candidates() {
        let pool = create_test_pool().await;
        let (live, dead, orphan, on_root) = seed_referenced(&pool).await;

        let rows = select_for_validation(
            &pool,
            &referenced("youtube", 10, 0),
            Cutoff::Unvalidated,
            NOW,
            &SelectionSettings::default(),
        )
        .await
        .expect("select");

        assert_eq!(uids(&rows), vec![live, dead]);
        assert_eq!(rows[0].has_active_reference, Some(true));
        assert_eq!(rows[1].has_active_reference, Some(false));
        assert!(!uids(&rows).contains(&orphan));
        assert!(!uids(&rows).contains(&on_root));
    }

    #[tokio::test]
    async fn test_chunked_selection_equals_unchunked() {
        let pool = create_test_pool().await;
        seed_referenced(&pool).await;
        let wide = SelectionSettings::default();
        // chunk_size() == 1
        let narrow = SelectionSettings {
            max_bind_parameters: RESERVED_BIND_PARAMETERS + 1,
            ..Default::default()
        };
        assert_eq!(narrow.chunk_size(), 1);

        for limit in [0, 1, 2] {
            let a = select_for_validation(
                &pool,
                &referenced("youtube", limit, 0),
                Cutoff::Unvalidated,
                NOW,
                &wide,
            )
            .await
            .expect("select");
            let b = select_for_validation(
                &pool,
                &referenced("youtube", limit, 0),
                Cutoff::Unvalidated,
                NOW,
                &narrow,
            )
            .await
            .expect("select");
            assert_eq!(a, b, "limit {}", limit);
        }
    }

    #[tokio::test]
    async fn test_referenced_only_without_pages_is_empty() {
        let pool = create_test_pool().await;
        insert_video(&pool, TestVideo::youtube("aaaaaaaaaaa")).await;

        let rows = select_for_validation(
            &pool,
            &referenced("youtube", 10, 0),
            Cutoff::Unvalidated,
            NOW,
            &SelectionSettings::default(),
        )
        .await
        .expect("select");
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_report_selects_status_within_window() {
        let pool = create_test_pool().await;
        let recent_ok = insert_video(
            &pool,
            TestVideo::youtube("aaaaaaaaaaa").validated(ValidationStatus::Success, NOW - DAY),
        )
        .await;
        let recent_err = insert_video(
            &pool,
            TestVideo::youtube("bbbbbbbbbbb").validated(ValidationStatus::Error, NOW - 2 * DAY),
        )
        .await;
        insert_video(
            &pool,
            TestVideo::youtube("ccccccccccc").validated(ValidationStatus::Success, NOW - 8 * DAY),
        )
        .await;
        insert_video(
            &pool,
            TestVideo::youtube("ddddddddddd").validated(ValidationStatus::Skip, NOW - DAY),
        )
        .await;

        let report_demand = ValidatorDemand {
            extension: "youtube".to_string(),
            days: 7,
            ..Default::default()
        };
        let settings = SelectionSettings::default();

        let ok = select_for_report(&pool, &report_demand, ValidationStatus::Success, NOW, &settings)
            .await
            .expect("select");
        let err = select_for_report(&pool, &report_demand, ValidationStatus::Error, NOW, &settings)
            .await
            .expect("select");
        assert_eq!(uids(&ok), vec![recent_ok]);
        assert_eq!(uids(&err), vec![recent_err]);
    }

    #[tokio::test]
    async fn test_report_ignores_limit() {
        let pool = create_test_pool().await;
        for id in ["aaaaaaaaaaa", "bbbbbbbbbbb", "ccccccccccc"] {
            insert_video(
                &pool,
                TestVideo::youtube(id).validated(ValidationStatus::Success, NOW - DAY),
            )
            .await;
        }
        let report_demand = ValidatorDemand {
            extension: "youtube".to_string(),
            limit: 1,
            days: 7,
            ..Default::default()
        };

        let rows = select_for_report(
            &pool,
            &report_demand,
            ValidationStatus::Success,
            NOW,
            &SelectionSettings::default(),
        )
        .await
        .expect("select");
        assert_eq!(rows.len(), 3);
    }
}
