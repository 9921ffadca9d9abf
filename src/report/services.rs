//! Report delivery services.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{info, warn};

use super::ReportBundle;

/// Renders or delivers a report bundle.
#[async_trait]
pub trait ReportService: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    async fn make_report(&self, bundle: &ReportBundle) -> Result<()>;
}

/// Writes a summary of the bundle through the logger.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReportService;

#[async_trait]
impl ReportService for LogReportService {
    fn name(&self) -> &str {
        "log"
    }

    async fn make_report(&self, bundle: &ReportBundle) -> Result<()> {
        info!(
            "{}: {} video(s) in the last {} day(s), {} invalid, {} valid",
            bundle.subject,
            bundle.number_of_videos,
            bundle.days,
            bundle.invalid_videos.len(),
            bundle.valid_videos.len()
        );
        for entry in &bundle.invalid_videos {
            warn!(
                "Invalid: {} \"{}\" {} {}",
                entry.uid,
                entry.title,
                entry.identifier,
                entry.url.as_deref().unwrap_or("(no media id)")
            );
        }
        if bundle.recipients.is_empty() {
            info!("No recipients given, report not addressed to anyone");
        } else {
            info!(
                "Report from {} for {}",
                bundle.sender,
                bundle.recipients.join(", ")
            );
        }
        Ok(())
    }
}

/// Writes the bundle as pretty JSON to a file, or to stdout for `-`.
#[derive(Debug, Clone)]
pub struct JsonReportService {
    output: PathBuf,
}

impl JsonReportService {
    pub fn new(output: PathBuf) -> Self {
        Self { output }
    }

    fn writes_to_stdout(&self) -> bool {
        self.output.as_os_str() == "-"
    }
}

#[async_trait]
impl ReportService for JsonReportService {
    fn name(&self) -> &str {
        "json"
    }

    async fn make_report(&self, bundle: &ReportBundle) -> Result<()> {
        let json =
            serde_json::to_string_pretty(bundle).context("Failed to serialize report bundle")?;

        if self.writes_to_stdout() {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json).context("Failed to write report to stdout")?;
            return Ok(());
        }

        tokio::fs::write(&self.output, json)
            .await
            .with_context(|| format!("Failed to write report to {}", self.output.display()))?;
        info!("Report written to {}", self.output.display());
        Ok(())
    }
}

/// Hands `bundle` to every service in order. The first failure aborts.
pub async fn deliver_report(
    bundle: &ReportBundle,
    services: &[Box<dyn ReportService>],
) -> Result<()> {
    for service in services {
        service
            .make_report(bundle)
            .await
            .with_context(|| format!("Report service '{}' failed", service.name()))?;
    }
    Ok(())
}
