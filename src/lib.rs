//! video_validator library: reachability audit for online-media files
//!
//! This library checks whether the YouTube and Vimeo videos registered in a
//! CMS file registry are still online. Each check probes the platform's oEmbed
//! endpoint and records a status and date on the file row. Reports of valid
//! and invalid videos are built from those records.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use video_validator::{
//!     init_client, init_db_pool_with_path, run_migrations, HttpProbe, ValidationEngine,
//!     ValidatorDemand, ValidatorRegistry, Config,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let pool = init_db_pool_with_path(&config.db_path).await?;
//! run_migrations(&pool).await?;
//!
//! let probe = Arc::new(HttpProbe::new(init_client(&config)?));
//! let engine = ValidationEngine::new(pool, ValidatorRegistry::with_builtin(), probe);
//! let demand = ValidatorDemand {
//!     extension: "youtube".to_string(),
//!     limit: 20,
//!     ..Default::default()
//! };
//!
//! let report = engine.validate(&demand).await?;
//! println!("{} checked, {} online, {} offline", report.total, report.succeeded, report.failed);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime.

pub mod app;
pub mod config;
mod demand;
pub mod engine;
mod error_handling;
pub mod initialization;
pub mod report;
pub mod storage;
pub mod validator;

// Re-export public API
pub use app::{run, CommandOutcome};
pub use config::{Cli, Command, Config, LogFormat, LogLevel};
pub use demand::{parse_recipients, ValidatorDemand};
pub use engine::{RunOutcome, ValidationEngine, ValidationReport};
pub use error_handling::{DatabaseError, InitializationError, InvalidStatusCode, ProbeError};
pub use initialization::{init_client, init_logger_with};
pub use report::{ReportAggregator, ReportBundle, ReportEntry, ReportService};
pub use storage::{
    init_db_pool_with_path, run_migrations, DbPool, ValidationStatus, VideoRecord,
};
pub use validator::{
    HttpProbe, OEmbedProbe, ValidatorRegistry, VideoValidator, VimeoValidator, YoutubeValidator,
};
