//! Validation engine.
//!
//! Resolves the validator for a demand, selects the candidates and checks
//! them one after another. Every checked video gets exactly one
//! status/date write. Probe failures only affect the video being checked;
//! store failures abort the run.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use log::{debug, error, info, warn};
use serde::Serialize;

use crate::demand::ValidatorDemand;
use crate::error_handling::DatabaseError;
use crate::storage::{
    select_for_validation, update_properties_by_file, Cutoff, DbPool, SelectionSettings,
    ValidationStatus, ValidationUpdate, VideoCandidate, VideoRecord,
};
use crate::validator::{OEmbedProbe, ValidatorRegistry, VideoValidator};

/// Called after a video's new status has been written.
pub type ValidationObserver = Arc<dyn Fn(&VideoRecord, ValidationStatus, i64) + Send + Sync>;

/// How a validation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every candidate was checked.
    Completed,
    /// The selection returned nothing, even after the fallback.
    NoCandidates,
    /// No validator handles the extension; nothing was touched.
    NoValidator,
}

/// Result of one validation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub outcome: RunOutcome,
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub elapsed_seconds: f64,
}

impl ValidationReport {
    fn new(outcome: RunOutcome, total: usize) -> Self {
        Self {
            outcome,
            total,
            succeeded: 0,
            skipped: 0,
            failed: 0,
            elapsed_seconds: 0.0,
        }
    }

    fn record(&mut self, status: ValidationStatus) {
        match status {
            ValidationStatus::Success => self.succeeded += 1,
            ValidationStatus::Skip => self.skipped += 1,
            ValidationStatus::Error => self.failed += 1,
            ValidationStatus::Unvalidated => {}
        }
    }

    fn finish(mut self, start_time: Instant) -> Self {
        self.elapsed_seconds = start_time.elapsed().as_secs_f64();
        self
    }
}

/// Runs validation demands against the file registry.
pub struct ValidationEngine {
    pool: DbPool,
    registry: ValidatorRegistry,
    probe: Arc<dyn OEmbedProbe>,
    settings: SelectionSettings,
    observers: Vec<ValidationObserver>,
}

impl ValidationEngine {
    pub fn new(pool: DbPool, registry: ValidatorRegistry, probe: Arc<dyn OEmbedProbe>) -> Self {
        Self {
            pool,
            registry,
            probe,
            settings: SelectionSettings::default(),
            observers: Vec::new(),
        }
    }

    /// Overrides the store limits used for candidate selection.
    pub fn with_settings(mut self, settings: SelectionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Registers a callback that sees every written status.
    pub fn on_validated<F>(&mut self, observer: F)
    where
        F: Fn(&VideoRecord, ValidationStatus, i64) + Send + Sync + 'static,
    {
        self.observers.push(Arc::new(observer));
    }

    /// Validates the candidates of `demand`.
    ///
    /// # Errors
    ///
    /// Returns a `DatabaseError` if selecting candidates or writing a status
    /// fails. Videos written before the failure keep their new status.
    pub async fn validate(
        &self,
        demand: &ValidatorDemand,
    ) -> Result<ValidationReport, DatabaseError> {
        let start_time = Instant::now();
        let extension = demand.normalized_extension();

        // Resolved before selection: an unknown platform must not touch the store.
        let Some(validator) = self.registry.resolve(&extension) else {
            warn!("No validator found for extension \"{}\"", extension);
            return Ok(ValidationReport::new(RunOutcome::NoValidator, 0).finish(start_time));
        };

        let now = Utc::now().timestamp();
        let candidates =
            select_for_validation(&self.pool, demand, Cutoff::Unvalidated, now, &self.settings)
                .await?;
        if candidates.is_empty() {
            info!("No {} videos to validate", extension);
            return Ok(ValidationReport::new(RunOutcome::NoCandidates, 0).finish(start_time));
        }

        let total = candidates.len();
        info!("Validating {} {} video(s)", total, extension);
        let mut report = ValidationReport::new(RunOutcome::Completed, total);

        for (index, candidate) in candidates.iter().enumerate() {
            let status = self.check(validator.as_ref(), candidate).await;
            let update = ValidationUpdate {
                status,
                validation_date: Utc::now().timestamp(),
            };
            update_properties_by_file(&self.pool, candidate.video.uid, &update).await?;
            report.record(status);

            for observer in &self.observers {
                observer(&candidate.video, status, update.validation_date);
            }
            info!("Processed {}/{} videos", index + 1, total);
        }

        let report = report.finish(start_time);
        info!(
            "Validated {} {} video(s) ({} success, {} skip, {} error) in {:.1}s",
            report.total,
            extension,
            report.succeeded,
            report.skipped,
            report.failed,
            report.elapsed_seconds
        );
        Ok(report)
    }

    /// Decides the new status of one candidate. Never fails.
    async fn check(
        &self,
        validator: &dyn VideoValidator,
        candidate: &VideoCandidate,
    ) -> ValidationStatus {
        let video = &candidate.video;
        debug!(
            "Checking video {} \"{}\" ({})",
            video.uid,
            video.display_title(),
            video.identifier
        );

        let Some(media_id) = validator.online_media_id(video) else {
            warn!(
                "Video {} \"{}\": no media id found",
                video.uid,
                video.display_title()
            );
            return ValidationStatus::Error;
        };

        if candidate.has_active_reference == Some(false) {
            warn!(
                "Video {} \"{}\": not referenced by live content, skipped",
                video.uid,
                video.display_title()
            );
            return ValidationStatus::Skip;
        }

        let url = validator.build_url(&media_id);
        debug!("Video {} watch URL: {}", video.uid, url);
        if validator.is_video_online(self.probe.as_ref(), &media_id).await {
            info!("Video {} \"{}\" is online", video.uid, video.display_title());
            ValidationStatus::Success
        } else {
            error!(
                "Video {} \"{}\" is not available: {}",
                video.uid,
                video.display_title(),
                url
            );
            ValidationStatus::Error
        }
    }
}
