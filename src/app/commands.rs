//! Command implementations.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use log::{info, warn};

use super::CommandOutcome;
use crate::config::{
    Config, ExtensionArgs, ReportArgs, ValidateArgs, MAX_PAGE_TREE_DEPTH,
};
use crate::demand::{parse_recipients, ValidatorDemand};
use crate::engine::ValidationEngine;
use crate::report::{
    deliver_report, JsonReportService, LogReportService, ReportAggregator, ReportService,
};
use crate::storage::{
    count_by_status, count_videos, init_db_pool_with_path, reset_validation_state,
    run_migrations, DbPool, SelectionSettings,
};
use crate::validator::{OEmbedProbe, ValidatorRegistry};

/// Opens the store at `config.db_path` and applies pending migrations.
pub async fn open_store(config: &Config) -> Result<DbPool> {
    let pool = init_db_pool_with_path(&config.db_path)
        .await
        .with_context(|| format!("Failed to open database {}", config.db_path.display()))?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    Ok(pool)
}

/// Selection limits derived from the configuration.
pub fn selection_settings(config: &Config) -> SelectionSettings {
    SelectionSettings {
        max_bind_parameters: config.max_bind_parameters,
        max_page_depth: MAX_PAGE_TREE_DEPTH,
    }
}

fn check_extension(config: &Config, extension: &str) -> Option<CommandOutcome> {
    if config.is_extension_allowed(extension) {
        return None;
    }
    warn!(
        "Extension \"{}\" is not an allowed online-media extension ({})",
        extension.trim(),
        config.allowed_extensions.join(", ")
    );
    Some(CommandOutcome::UnsupportedExtension(extension.trim().to_string()))
}

/// `validate`: checks up to `limit` videos and records their status.
pub async fn validate(
    config: &Config,
    args: &ValidateArgs,
    registry: ValidatorRegistry,
    probe: Arc<dyn OEmbedProbe>,
) -> Result<CommandOutcome> {
    if let Some(outcome) = check_extension(config, &args.extension) {
        return Ok(outcome);
    }

    let demand = ValidatorDemand {
        extension: args.extension.trim().to_string(),
        limit: args.limit,
        referenced_only: args.reference.referenced_only,
        reference_root: args.reference.reference_root,
        ..Default::default()
    };

    let pool = open_store(config).await?;
    let engine =
        ValidationEngine::new(pool, registry, probe).with_settings(selection_settings(config));
    let report = engine
        .validate(&demand)
        .await
        .context("Validation run failed")?;
    Ok(CommandOutcome::Validated(report))
}

/// `report`: builds the report of the last `days` days.
pub async fn report(
    config: &Config,
    args: &ReportArgs,
    registry: ValidatorRegistry,
) -> Result<CommandOutcome> {
    let Some(sender) = config.sender() else {
        warn!("No sender address configured (--mail-from), cannot send a report");
        return Ok(CommandOutcome::MissingSender);
    };
    if let Some(outcome) = check_extension(config, &args.extension) {
        return Ok(outcome);
    }

    let demand = ValidatorDemand {
        extension: args.extension.trim().to_string(),
        days: args.days,
        referenced_only: args.reference.referenced_only,
        reference_root: args.reference.reference_root,
        recipients: parse_recipients(&args.recipients),
        ..Default::default()
    };

    let pool = open_store(config).await?;
    let aggregator = ReportAggregator::new(pool, registry, selection_settings(config));
    let bundle = aggregator
        .build_report(&demand, sender, Utc::now().timestamp())
        .await
        .context("Failed to build report")?;

    match &bundle {
        Some(bundle) => {
            let mut services: Vec<Box<dyn ReportService>> = vec![Box::new(LogReportService)];
            if let Some(output) = &args.output {
                services.push(Box::new(JsonReportService::new(output.clone())));
            }
            deliver_report(bundle, &services).await?;
            info!("Report for {} created", bundle.extension);
        }
        None => warn!(
            "No validated {} videos in the last {} day(s), nothing to report",
            demand.normalized_extension(),
            demand.days
        ),
    }
    Ok(CommandOutcome::Reported { bundle })
}

/// `count`: number of videos due for validation now, plus a per-status
/// breakdown.
pub async fn count(config: &Config, args: &ExtensionArgs) -> Result<CommandOutcome> {
    if let Some(outcome) = check_extension(config, &args.extension) {
        return Ok(outcome);
    }

    let pool = open_store(config).await?;
    let total = count_videos(&pool, &args.extension, Utc::now().timestamp())
        .await
        .context("Failed to count videos")?;
    let by_status = count_by_status(&pool, &args.extension)
        .await
        .context("Failed to count videos by status")?;
    Ok(CommandOutcome::Counted { total, by_status })
}

/// `reset`: sets status and date of every video of the extension back to 0.
pub async fn reset(config: &Config, args: &ExtensionArgs) -> Result<CommandOutcome> {
    if let Some(outcome) = check_extension(config, &args.extension) {
        return Ok(outcome);
    }

    let pool = open_store(config).await?;
    let rows = reset_validation_state(&pool, &args.extension)
        .await
        .context("Failed to reset validation state")?;
    info!(
        "Reset the validation state of {} {} video(s)",
        rows,
        args.extension.trim().to_lowercase()
    );
    Ok(CommandOutcome::Reset { rows })
}
