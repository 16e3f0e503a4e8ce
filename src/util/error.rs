// cloudrun-logs - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Every variant names the operation that failed so the front ends can
// print a single human-readable cause without structured error codes.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all cloudrun-logs operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum AppError {
    /// A log or service query failed.
    Query(QueryError),

    /// Configuration loading failed.
    Config(ConfigError),

    /// Rendering results to the output stream failed.
    Render(RenderError),

    /// I/O error on a front-end channel (stdin/stdout of the MCP server).
    Io {
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query(e) => write!(f, "Query error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Render(e) => write!(f, "Output error: {e}"),
            Self::Io { operation, source } => {
                write!(f, "I/O error during {operation}: {source}")
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Query(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Render(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Remote errors
// ---------------------------------------------------------------------------

/// Failures talking to the logging or control-plane APIs.
///
/// The core treats these as opaque; they only ever travel inside a
/// [`QueryError`] that says which step they interrupted.
#[derive(Debug)]
pub enum RemoteError {
    /// No access token could be resolved.
    Auth { reason: String },

    /// The token helper program could not be started.
    AuthCommand {
        program: &'static str,
        source: io::Error,
    },

    /// Transport-level failure (connect, TLS, timeout, body read).
    Http { url: String, source: reqwest::Error },

    /// The API answered with a non-success status.
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// The response body was not the expected JSON shape.
    Decode {
        url: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth { reason } => write!(f, "no access token available: {reason}"),
            Self::AuthCommand { program, source } => {
                write!(f, "failed to run '{program}' for an access token: {source}")
            }
            Self::Http { url, source } => write!(f, "request to {url} failed: {source}"),
            Self::Status { url, status, body } => {
                write!(f, "{url} returned HTTP {status}")?;
                if !body.is_empty() {
                    write!(f, ": {body}")?;
                }
                Ok(())
            }
            Self::Decode { url, source } => {
                write!(f, "unexpected response body from {url}: {source}")
            }
        }
    }
}

impl std::error::Error for RemoteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::AuthCommand { source, .. } => Some(source),
            Self::Http { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Query errors
// ---------------------------------------------------------------------------

/// Errors surfaced by the log and service query entry points.
#[derive(Debug)]
pub enum QueryError {
    /// The request carried no project identifier.
    MissingProjectId,

    /// A start/end time was not a valid RFC 3339 timestamp.
    InvalidTimestamp {
        field: &'static str,
        value: String,
        source: chrono::ParseError,
    },

    /// The remote session could not be established.
    Session {
        operation: &'static str,
        source: RemoteError,
    },

    /// Pulling the next batch of log records failed mid-stream.
    Iteration { source: RemoteError },

    /// The caller cancelled the operation.
    Cancelled { operation: &'static str },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingProjectId => write!(f, "a project id is required"),
            Self::InvalidTimestamp {
                field,
                value,
                source,
            } => write!(
                f,
                "invalid {field} '{value}' (expected RFC 3339, e.g. 2023-01-01T00:00:00Z): {source}"
            ),
            Self::Session { operation, source } => write!(f, "{operation}: {source}"),
            Self::Iteration { source } => write!(f, "reading log entries: {source}"),
            Self::Cancelled { operation } => write!(f, "{operation} was cancelled"),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidTimestamp { source, .. } => Some(source),
            Self::Session { source, .. } => Some(source),
            Self::Iteration { source } => Some(source),
            _ => None,
        }
    }
}

impl From<QueryError> for AppError {
    fn from(e: QueryError) -> Self {
        Self::Query(e)
    }
}

// ---------------------------------------------------------------------------
// Render errors
// ---------------------------------------------------------------------------

/// Errors writing text or JSON output.
#[derive(Debug)]
pub enum RenderError {
    /// Writing to the output stream failed.
    Io(io::Error),

    /// JSON serialisation failed.
    Json(serde_json::Error),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "write failed: {e}"),
            Self::Json(e) => write!(f, "JSON encoding failed: {e}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}

impl From<io::Error> for RenderError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<RenderError> for AppError {
    fn from(e: RenderError) -> Self {
        Self::Render(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Config file exceeds the maximum allowed size.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Config '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for cloudrun-logs results.
pub type Result<T> = std::result::Result<T, AppError>;
