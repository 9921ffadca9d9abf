//! Configuration constants.
//!
//! Defaults and fixed operational parameters shared by the CLI and the library.

/// Default SQLite database path.
pub const DB_PATH: &str = "./video_validator.db";

/// Extensions accepted when no explicit list is configured.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["youtube", "vimeo"];

/// Seconds in one day, used for the report window and the fallback window.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// When no unvalidated video is left, the run re-checks videos whose last
/// validation is at least this many days old.
pub const FALLBACK_WINDOW_DAYS: i64 = 7;

/// Page tree traversal depth below each root page.
pub const MAX_PAGE_TREE_DEPTH: u32 = 99;

/// Largest number of bind parameters a single statement may carry.
/// SQLite builds before 3.32 cap this at 999.
pub const DEFAULT_MAX_BIND_PARAMETERS: usize = 999;

/// Bind parameters used by a candidate query besides the page id list
/// (extension, missing flag, date bounds, status, limit and a small margin).
pub const RESERVED_BIND_PARAMETERS: usize = 8;

/// Default number of videos checked per `validate` run.
pub const DEFAULT_LIMIT: u32 = 10;

/// Default report window in days.
pub const DEFAULT_REPORT_DAYS: u32 = 7;

// Network operation timeouts
/// Whole-request timeout for one oEmbed probe
pub const PROBE_TIMEOUT_SECS: u64 = 10;
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;

/// oEmbed responses larger than this are treated as malformed.
pub const MAX_OEMBED_BODY_SIZE: usize = 256 * 1024;

/// Default oEmbed response format requested by probes.
pub const DEFAULT_OEMBED_FORMAT: &str = "json";

/// Default User-Agent string for oEmbed probes.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "video_validator/",
    env!("CARGO_PKG_VERSION"),
    " (+oEmbed availability check)"
);
