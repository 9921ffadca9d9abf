//! Report aggregation.
//!
//! Collects the videos validated as `Error` and `Success` within the report
//! window into a self-contained `ReportBundle`. Rendering and delivery are left
//! to `ReportService` implementations.

mod services;

use chrono::DateTime;
use log::info;
use serde::Serialize;

use crate::demand::ValidatorDemand;
use crate::error_handling::DatabaseError;
use crate::storage::{
    select_for_report, DbPool, SelectionSettings, ValidationStatus, VideoCandidate,
};
use crate::validator::{ValidatorRegistry, VideoValidator};

pub use services::{deliver_report, JsonReportService, LogReportService, ReportService};

/// One video in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub uid: i64,
    pub title: String,
    pub identifier: String,
    pub name: String,
    pub extension: String,
    pub status: ValidationStatus,
    pub validation_date: i64,
    /// `None` if the stored metadata holds no media id
    pub media_id: Option<String>,
    /// Public watch URL, if a media id was found
    pub url: Option<String>,
}

impl ReportEntry {
    fn from_candidate(candidate: &VideoCandidate, validator: Option<&dyn VideoValidator>) -> Self {
        let video = &candidate.video;
        let media_id = validator.and_then(|v| v.online_media_id(video));
        let url = match (validator, media_id.as_deref()) {
            (Some(v), Some(id)) => Some(v.build_url(id)),
            _ => None,
        };
        Self {
            uid: video.uid,
            title: video.display_title().to_string(),
            identifier: video.identifier.clone(),
            name: video.name.clone(),
            extension: video.extension.clone(),
            status: video.validation_status,
            validation_date: video.validation_date,
            media_id,
            url,
        }
    }
}

/// Everything needed to render a report without querying the store again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportBundle {
    pub subject: String,
    pub extension: String,
    pub days: u32,
    pub referenced_only: bool,
    pub reference_root: i64,
    pub recipients: Vec<String>,
    pub sender: String,
    /// RFC 3339 timestamp
    pub generated_at: String,
    pub number_of_videos: usize,
    pub valid_videos: Vec<ReportEntry>,
    pub invalid_videos: Vec<ReportEntry>,
}

/// Builds report bundles from the file registry.
#[derive(Debug, Clone)]
pub struct ReportAggregator {
    pool: DbPool,
    registry: ValidatorRegistry,
    settings: SelectionSettings,
}

impl ReportAggregator {
    pub fn new(pool: DbPool, registry: ValidatorRegistry, settings: SelectionSettings) -> Self {
        Self {
            pool,
            registry,
            settings,
        }
    }

    /// Builds the report for `demand` as of `now`.
    ///
    /// Returns `Ok(None)` when no video was validated as `Error` or `Success`
    /// within the window.
    pub async fn build_report(
        &self,
        demand: &ValidatorDemand,
        sender: &str,
        now: i64,
    ) -> Result<Option<ReportBundle>, DatabaseError> {
        let invalid =
            select_for_report(&self.pool, demand, ValidationStatus::Error, now, &self.settings)
                .await?;
        let valid =
            select_for_report(&self.pool, demand, ValidationStatus::Success, now, &self.settings)
                .await?;

        if invalid.is_empty() && valid.is_empty() {
            return Ok(None);
        }

        let extension = demand.normalized_extension();
        let validator = self.registry.resolve(&extension);
        let entries = |candidates: &[VideoCandidate]| -> Vec<ReportEntry> {
            candidates
                .iter()
                .map(|c| ReportEntry::from_candidate(c, validator.as_deref()))
                .collect()
        };
        let invalid_videos = entries(&invalid);
        let valid_videos = entries(&valid);

        info!(
            "Report for {}: {} invalid, {} valid video(s) in the last {} day(s)",
            extension,
            invalid_videos.len(),
            valid_videos.len(),
            demand.days
        );

        Ok(Some(ReportBundle {
            subject: format!("{} validation report", extension),
            extension,
            days: demand.days,
            referenced_only: demand.referenced_only,
            reference_root: demand.reference_root,
            recipients: demand.recipients.clone(),
            sender: sender.to_string(),
            generated_at: DateTime::from_timestamp(now, 0)
                .map(|at| at.to_rfc3339())
                .unwrap_or_default(),
            number_of_videos: invalid_videos.len() + valid_videos.len(),
            valid_videos,
            invalid_videos,
        }))
    }
}
