// cloudrun-logs - core/filter.rs
//
// Renders FilterOptions into the logging API's filter expression.
// All clauses are AND-combined in a fixed order.
// Core layer: pure logic, no I/O.

use crate::core::model::FilterOptions;
use crate::util::constants::{BASE_RESOURCE_CLAUSE, CLAUSE_SEPARATOR};
use chrono::{DateTime, SecondsFormat, Utc};

/// Ordered list of filter clauses, joined once at the end.
///
/// Always starts with the Cloud Run resource-type clause. Values are placed
/// inside double quotes verbatim.
#[derive(Debug, Clone)]
pub struct FilterBuilder {
    clauses: Vec<String>,
}

impl Default for FilterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self {
            clauses: vec![BASE_RESOURCE_CLAUSE.to_string()],
        }
    }

    pub fn service_name(mut self, name: &str) -> Self {
        if !name.is_empty() {
            self.clauses.push(service_clause(name));
        }
        self
    }

    pub fn start_time(mut self, start: DateTime<Utc>) -> Self {
        self.clauses.push(start_clause(start));
        self
    }

    pub fn end_time(mut self, end: DateTime<Utc>) -> Self {
        self.clauses.push(end_clause(end));
        self
    }

    pub fn min_severity(mut self, level: &str) -> Self {
        if !level.is_empty() {
            self.clauses.push(severity_clause(level));
        }
        self
    }

    /// Adds a text match for `keyword`; empty keywords add nothing.
    pub fn keyword(mut self, keyword: &str) -> Self {
        if !keyword.is_empty() {
            self.clauses.push(keyword_clause(keyword));
        }
        self
    }

    /// Clauses accumulated so far, base clause first.
    pub fn clauses(&self) -> &[String] {
        &self.clauses
    }

    pub fn build(self) -> String {
        self.clauses.join(CLAUSE_SEPARATOR)
    }
}

/// Build the filter expression for `opts`.
///
/// Order: base, service, start, end, severity, then one clause per keyword.
/// The project id is not part of the expression; it selects the resource
/// the query runs against.
pub fn build_filter(opts: &FilterOptions) -> String {
    let mut builder = FilterBuilder::new();

    if let Some(ref name) = opts.service_name {
        builder = builder.service_name(name);
    }
    if let Some(start) = opts.start_time {
        builder = builder.start_time(start);
    }
    if let Some(end) = opts.end_time {
        builder = builder.end_time(end);
    }
    if let Some(ref level) = opts.min_severity {
        builder = builder.min_severity(level);
    }
    for keyword in &opts.keywords {
        builder = builder.keyword(keyword);
    }

    builder.build()
}

/// RFC 3339 in UTC with whole seconds, e.g. `2023-01-01T00:00:00Z`.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn service_clause(name: &str) -> String {
    format!("resource.labels.service_name=\"{name}\"")
}

pub fn start_clause(start: DateTime<Utc>) -> String {
    format!("timestamp>=\"{}\"", format_timestamp(start))
}

pub fn end_clause(end: DateTime<Utc>) -> String {
    format!("timestamp<=\"{}\"", format_timestamp(end))
}

pub fn severity_clause(level: &str) -> String {
    format!("severity>=\"{level}\"")
}

pub fn keyword_clause(keyword: &str) -> String {
    format!("textPayload:\"{keyword}\"")
}
