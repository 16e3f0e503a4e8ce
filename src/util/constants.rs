// cloudrun-logs - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

use chrono::{DateTime, NaiveDate, Utc};

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "cloudrun-logs";

/// Application identifier used for config directories.
pub const APP_ID: &str = "cloudrun-logs";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name the MCP server reports in its `initialize` response.
pub const MCP_SERVER_NAME: &str = "cloudrun-logs-mcp";

/// MCP protocol revision implemented by the stdio server.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

// =============================================================================
// Query defaults
// =============================================================================

/// Region used when the caller does not name one.
pub const DEFAULT_REGION: &str = "us-central1";

/// Default maximum number of log entries for the CLI and MCP front ends.
/// The core itself treats `limit <= 0` as unbounded.
pub const DEFAULT_LOG_LIMIT: i64 = 100;

/// Severity label used when a raw log record carries none.
pub const DEFAULT_SEVERITY: &str = "DEFAULT";

/// Display label for a service that reports no status conditions.
pub const UNKNOWN_STATUS: &str = "Unknown";

/// Zero time (0001-01-01T00:00:00Z) stamped on records whose timestamp is
/// missing or unparsable. Far enough from any real event that a fallback
/// value is recognisable in output.
pub fn zero_time() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

// =============================================================================
// Filter grammar
// =============================================================================

/// Base clause restricting every query to Cloud Run revisions.
pub const BASE_RESOURCE_CLAUSE: &str = "resource.type=\"cloud_run_revision\"";

/// Separator placed between filter clauses.
pub const CLAUSE_SEPARATOR: &str = " AND ";

// =============================================================================
// Service descriptor annotations
// =============================================================================

/// Annotation carrying the free-text service description.
pub const DESCRIPTION_ANNOTATION: &str = "description";

/// Annotation set by the deploy tooling to the image of the latest deployment.
/// Its presence drives the update-time approximation.
pub const USER_IMAGE_ANNOTATION: &str = "client.knative.dev/user-image";

// =============================================================================
// Remote API
// =============================================================================

/// Base URL of the Cloud Logging API.
pub const DEFAULT_LOGGING_ENDPOINT: &str = "https://logging.googleapis.com";

/// Base URL of the Cloud Run Admin API.
pub const DEFAULT_RUN_ENDPOINT: &str = "https://run.googleapis.com";

/// Entries requested per `entries:list` page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Minimum configurable page size.
pub const MIN_PAGE_SIZE: u32 = 1;

/// Largest page size the logging API accepts.
pub const MAX_PAGE_SIZE: u32 = 1_000;

/// Per-request timeout for remote calls (seconds).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Minimum configurable request timeout (seconds).
pub const MIN_REQUEST_TIMEOUT_SECS: u64 = 1;

/// Maximum configurable request timeout (seconds).
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;

/// Maximum number of response-body bytes quoted in a status error.
pub const MAX_ERROR_BODY_PREVIEW: usize = 512;

// =============================================================================
// Access tokens
// =============================================================================

/// Environment variables checked, in order, for a ready-made access token.
pub const ACCESS_TOKEN_ENV_VARS: &[&str] =
    &["CLOUDRUN_LOGS_ACCESS_TOKEN", "CLOUDSDK_AUTH_ACCESS_TOKEN"];

/// Program invoked to print an access token when no env var is set.
pub const GCLOUD_PROGRAM: &str = "gcloud";

/// Arguments passed to [`GCLOUD_PROGRAM`].
pub const GCLOUD_TOKEN_ARGS: &[&str] = &["auth", "print-access-token"];

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log levels accepted in `[logging] level`.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Maximum size of a config file in bytes.
pub const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024; // 64 KB
