// cloudrun-logs - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// dependency on the remote wire formats.
//
// These types are the shared vocabulary across all layers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

// =============================================================================
// Query input
// =============================================================================

/// Structured log query. All optional fields narrow the result set and are
/// AND-combined by the filter builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Project whose logs are read. Validated by the caller, not the core.
    pub project_id: String,

    /// Restrict to one Cloud Run service. `None` or empty = all services.
    pub service_name: Option<String>,

    /// Inclusive lower time bound. `None` = unbounded.
    pub start_time: Option<DateTime<Utc>>,

    /// Inclusive upper time bound. `None` = unbounded.
    pub end_time: Option<DateTime<Utc>>,

    /// Minimum severity label (e.g. `ERROR`). `None` or empty = any.
    pub min_severity: Option<String>,

    /// Free-text terms, each matched against the text payload. Empty
    /// strings are ignored.
    pub keywords: Vec<String>,

    /// Maximum number of entries returned. `<= 0` means unbounded.
    pub limit: i64,
}

impl FilterOptions {
    /// Options for `project_id` with every optional field unset.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            ..Default::default()
        }
    }

    /// The limit as a count, or `None` when the query is unbounded.
    pub fn bounded_limit(&self) -> Option<usize> {
        usize::try_from(self.limit).ok().filter(|&n| n > 0)
    }
}

// =============================================================================
// Normalised output
// =============================================================================

/// A single log event, normalised across payload shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub severity: String,
    pub message: String,
    pub labels: HashMap<String, String>,
}

/// Metadata of one Cloud Run service.
///
/// `update_time` is an approximation: when the descriptor carries a
/// deployed-image annotation it is the moment the listing was fetched,
/// otherwise it equals `create_time`. It is never a true last-modified
/// timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceInfo {
    pub name: String,
    pub description: String,
    pub url: String,

    /// Status of the first reported condition. `None` when the descriptor
    /// has no conditions.
    pub status: Option<String>,

    pub region: String,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

// =============================================================================
// Raw remote records
// =============================================================================

/// Shape of a log record's payload as delivered by the logging API.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Plain text payload.
    Text(String),

    /// Generic key/value payload (structured JSON logging).
    Structured(serde_json::Map<String, serde_json::Value>),

    /// Any other shape, e.g. audit-log protocol buffers rendered as JSON.
    Other(serde_json::Value),
}

/// One unprocessed log record.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLogRecord {
    /// Time the event occurred.
    pub timestamp: Option<DateTime<Utc>>,

    /// Time the logging service received the event.
    pub receive_timestamp: Option<DateTime<Utc>>,

    pub severity: Option<String>,
    pub labels: HashMap<String, String>,
    pub payload: Payload,
}

/// One entry of a service descriptor's condition list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCondition {
    /// Condition type, e.g. `Ready`.
    pub kind: String,

    /// `True`, `False` or `Unknown`.
    pub status: String,

    pub reason: Option<String>,
    pub message: Option<String>,
}

/// One unprocessed service descriptor from the control-plane listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawService {
    pub name: String,
    pub annotations: HashMap<String, String>,

    /// Creation time as sent by the API; parsed leniently by the normaliser.
    pub creation_timestamp: String,

    pub url: String,
    pub conditions: Vec<RawCondition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_limit() {
        let mut opts = FilterOptions::new("proj");
        assert_eq!(opts.bounded_limit(), None);
        opts.limit = -5;
        assert_eq!(opts.bounded_limit(), None);
        opts.limit = 3;
        assert_eq!(opts.bounded_limit(), Some(3));
    }

    #[test]
    fn test_service_info_serialises_missing_status_as_null() {
        let info = ServiceInfo {
            name: "api".to_string(),
            description: String::new(),
            url: "https://api.example.run.app".to_string(),
            status: None,
            region: "us-central1".to_string(),
            create_time: crate::util::constants::zero_time(),
            update_time: crate::util::constants::zero_time(),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert!(json["status"].is_null());
        assert_eq!(json["create_time"], "0001-01-01T00:00:00Z");
    }
}
