//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `video_validator` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use video_validator::initialization::init_logger_with;
use video_validator::{run, Cli, CommandOutcome, Config, RunOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // Try loading from current directory first, then from the executable's directory
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();
    let config = Config::from(&cli.global);

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    match run(config, cli.command).await {
        Ok(outcome) => {
            print_outcome(&outcome);
            Ok(())
        }
        Err(e) => {
            eprintln!("video_validator error: {:#}", e);
            process::exit(1);
        }
    }
}

fn print_outcome(outcome: &CommandOutcome) {
    match outcome {
        CommandOutcome::Validated(report) => match report.outcome {
            RunOutcome::Completed => println!(
                "✅ Validated {} video{} ({} success, {} skip, {} error) in {:.1}s",
                report.total,
                if report.total == 1 { "" } else { "s" },
                report.succeeded,
                report.skipped,
                report.failed,
                report.elapsed_seconds
            ),
            RunOutcome::NoCandidates => println!("No videos to validate"),
            RunOutcome::NoValidator => println!("No validator found for this extension"),
        },
        CommandOutcome::Reported { bundle: Some(bundle) } => println!(
            "✅ Report created: {} video{} ({} invalid, {} valid)",
            bundle.number_of_videos,
            if bundle.number_of_videos == 1 { "" } else { "s" },
            bundle.invalid_videos.len(),
            bundle.valid_videos.len()
        ),
        CommandOutcome::Reported { bundle: None } => println!("No videos to report"),
        CommandOutcome::Counted { total, by_status } => {
            println!("{} video{} due for validation", total, if *total == 1 { "" } else { "s" });
            for (status, count) in by_status {
                println!("   {}: {}", status, count);
            }
        }
        CommandOutcome::Reset { rows } => println!("Reset {} video{}", rows, if *rows == 1 { "" } else { "s" }),
        CommandOutcome::UnsupportedExtension(extension) => {
            println!("Extension \"{}\" is not allowed, nothing done", extension)
        }
        CommandOutcome::MissingSender => {
            println!("No sender address configured, report not created")
        }
    }
}
