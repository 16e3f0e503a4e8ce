// cloudrun-logs - app/request.rs
//
// Boundary input shared by the CLI and MCP front ends. Everything arrives
// as strings; this is where project ids are checked and timestamps parsed,
// before any remote call is made.

use crate::core::model::FilterOptions;
use crate::util::error::QueryError;
use chrono::{DateTime, Utc};

/// A log query as the front ends receive it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogRequest {
    pub project_id: String,
    pub service_name: Option<String>,
    /// RFC 3339; empty = unbounded.
    pub start_time: Option<String>,
    /// RFC 3339; empty = unbounded.
    pub end_time: Option<String>,
    pub log_level: Option<String>,
    pub keywords: Vec<String>,
    /// `None` = the front end's default; `<= 0` = unbounded.
    pub limit: Option<i64>,
}

impl LogRequest {
    /// Validate and convert into [`FilterOptions`].
    ///
    /// Fails on an empty project id or a malformed timestamp.
    pub fn into_filter_options(self, default_limit: i64) -> Result<FilterOptions, QueryError> {
        let project_id = self.project_id.trim().to_string();
        if project_id.is_empty() {
            return Err(QueryError::MissingProjectId);
        }

        let start_time = parse_optional("start time", self.start_time.as_deref())?;
        let end_time = parse_optional("end time", self.end_time.as_deref())?;

        Ok(FilterOptions {
            project_id,
            service_name: non_empty(self.service_name),
            start_time,
            end_time,
            min_severity: non_empty(self.log_level),
            keywords: self.keywords,
            limit: self.limit.unwrap_or(default_limit),
        })
    }
}

/// Parse an RFC 3339 timestamp (any offset) into UTC.
pub fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, QueryError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|source| QueryError::InvalidTimestamp {
            field,
            value: value.to_string(),
            source,
        })
}

fn parse_optional(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, QueryError> {
    match value {
        Some(v) if !v.trim().is_empty() => parse_timestamp(field, v).map(Some),
        _ => Ok(None),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
