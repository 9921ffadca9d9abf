//! Configuration types and CLI options.
//!
//! This module defines the library-side `Config` plus the `clap` types used by
//! the binary. Every global option can also be set through a `VIDEO_VALIDATOR_*`
//! environment variable.

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::constants::{
    DB_PATH, DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_LIMIT, DEFAULT_MAX_BIND_PARAMETERS,
    DEFAULT_REPORT_DAYS, DEFAULT_USER_AGENT, PROBE_TIMEOUT_SECS, TCP_CONNECT_TIMEOUT_SECS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// Carries what the host CMS would otherwise keep in global state: which
/// online-media extensions exist, the report sender address and the
/// store/network limits.
///
/// # Examples
///
/// ```no_run
/// use video_validator::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     db_path: PathBuf::from("./cms.db"),
///     mail_from: Some("noreply@example.com".to_string()),
///     ..Default::default()
/// };
/// assert!(config.is_extension_allowed("YouTube"));
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// Online-media extensions known to the host system (lowercase)
    pub allowed_extensions: Vec<String>,

    /// Sender address for reports; `report` refuses to run without it
    pub mail_from: Option<String>,

    /// Per-probe timeout in seconds
    pub timeout_seconds: u64,

    /// TCP connect timeout in seconds
    pub connect_timeout_seconds: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Bind parameter limit of the store, drives page id chunking
    pub max_bind_parameters: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            db_path: PathBuf::from(DB_PATH),
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            mail_from: None,
            timeout_seconds: PROBE_TIMEOUT_SECS,
            connect_timeout_seconds: TCP_CONNECT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_bind_parameters: DEFAULT_MAX_BIND_PARAMETERS,
        }
    }
}

impl Config {
    /// Returns true if `extension` is one of the configured online-media
    /// extensions. Comparison ignores case and surrounding whitespace.
    pub fn is_extension_allowed(&self, extension: &str) -> bool {
        let wanted = extension.trim().to_lowercase();
        !wanted.is_empty()
            && self
                .allowed_extensions
                .iter()
                .any(|allowed| allowed.trim().to_lowercase() == wanted)
    }

    /// Returns the configured sender address, if it is non-blank.
    pub fn sender(&self) -> Option<&str> {
        self.mail_from
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Command-line interface.
///
/// # Examples
///
/// ```bash
/// video_validator validate --extension youtube --limit 20
/// video_validator validate --extension vimeo --referenced-only --reference-root 12
/// video_validator report --extension youtube --days 7 --recipients a@example.com,b@example.com
/// video_validator count --extension youtube
/// video_validator reset --extension youtube
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "video_validator",
    version,
    about = "Checks whether YouTube/Vimeo videos registered in the CMS are still online."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info, env = "VIDEO_VALIDATOR_LOG_LEVEL")]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain, env = "VIDEO_VALIDATOR_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Database path (SQLite file)
    #[arg(long, global = true, default_value = DB_PATH, env = "VIDEO_VALIDATOR_DB_PATH")]
    pub db_path: PathBuf,

    /// Comma separated list of known online-media extensions
    #[arg(
        long,
        global = true,
        value_delimiter = ',',
        default_values = ["youtube", "vimeo"],
        env = "VIDEO_VALIDATOR_ALLOWED_EXTENSIONS"
    )]
    pub allowed_extensions: Vec<String>,

    /// Sender address used for reports
    #[arg(long, global = true, env = "VIDEO_VALIDATOR_MAIL_FROM")]
    pub mail_from: Option<String>,

    /// Per-probe timeout in seconds (at least 1)
    #[arg(
        long,
        global = true,
        default_value_t = PROBE_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..),
        env = "VIDEO_VALIDATOR_TIMEOUT_SECONDS"
    )]
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, global = true, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Maximum bind parameters per statement (page id chunk size)
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_BIND_PARAMETERS, env = "VIDEO_VALIDATOR_MAX_BIND_PARAMETERS")]
    pub max_bind_parameters: usize,
}

impl From<&GlobalOpts> for Config {
    fn from(opts: &GlobalOpts) -> Self {
        Self {
            log_level: opts.log_level.clone(),
            log_format: opts.log_format.clone(),
            db_path: opts.db_path.clone(),
            allowed_extensions: opts
                .allowed_extensions
                .iter()
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            mail_from: opts.mail_from.clone(),
            timeout_seconds: opts.timeout_seconds,
            connect_timeout_seconds: TCP_CONNECT_TIMEOUT_SECS.min(opts.timeout_seconds.max(1)),
            user_agent: opts.user_agent.clone(),
            max_bind_parameters: opts.max_bind_parameters,
        }
    }
}

/// Operator subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Video validation of a media extension (e.g. YouTube)
    Validate(ValidateArgs),
    /// Build a report of valid and invalid videos of the last days
    Report(ReportArgs),
    /// Count the videos of a media extension
    Count(ExtensionArgs),
    /// Reset all validation states of a media extension
    Reset(ExtensionArgs),
}

/// Arguments of `validate`.
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Media extension (e.g. youtube)
    #[arg(long, default_value = "youtube")]
    pub extension: String,

    /// Number of videos to be checked (0 = all)
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    pub limit: u32,

    #[command(flatten)]
    pub reference: ReferenceArgs,
}

/// Arguments of `report`.
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Media extension (e.g. youtube)
    #[arg(long)]
    pub extension: String,

    /// Report window in days
    #[arg(long, default_value_t = DEFAULT_REPORT_DAYS)]
    pub days: u32,

    /// Comma separated list of report recipients
    #[arg(long, default_value = "")]
    pub recipients: String,

    /// Also write the report bundle as JSON to this file ("-" for stdout)
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub reference: ReferenceArgs,
}

/// Arguments of `count` and `reset`.
#[derive(Debug, Args)]
pub struct ExtensionArgs {
    /// Media extension (e.g. youtube)
    #[arg(long)]
    pub extension: String,
}

/// Reference filter options shared by `validate` and `report`.
#[derive(Debug, Args)]
pub struct ReferenceArgs {
    /// Only handle videos referenced by visible content on visible pages (1/0)
    #[arg(
        long = "referenced-only",
        alias = "referencedOnly",
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub referenced_only: bool,

    /// Page tree root where references are searched (0 = every site root)
    #[arg(long = "reference-root", alias = "referenceRoot", default_value_t = 0)]
    pub reference_root: i64,
}
