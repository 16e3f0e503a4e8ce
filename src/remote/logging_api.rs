// cloudrun-logs - remote/logging_api.rs
//
// Cloud Logging `entries:list` client. Pages are fetched lazily as the
// consumer pulls records, so a query that stops at its limit never asks
// for the next page.

use crate::core::model::{Payload, RawLogRecord};
use crate::remote::auth::TokenProvider;
use crate::remote::{send_json, LogSource, RecordStream};
use crate::util::error::RemoteError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{stream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// HTTP implementation of [`LogSource`].
#[derive(Debug, Clone)]
pub struct CloudLoggingClient {
    http: reqwest::Client,
    endpoint: String,
    tokens: TokenProvider,
    page_size: u32,
}

/// Paging position between two `entries:list` calls.
#[derive(Debug)]
enum Cursor {
    First,
    Next(String),
    Done,
}

impl CloudLoggingClient {
    pub fn new(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        tokens: TokenProvider,
        page_size: u32,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            tokens,
            page_size,
        }
    }

    fn entries_url(&self) -> String {
        format!("{}/v2/entries:list", self.endpoint.trim_end_matches('/'))
    }

    /// Fetch the page at `cursor`, returning its entries and the cursor
    /// after it. `Ok(None)` once the previous page had no next token.
    async fn next_page(
        &self,
        token: String,
        project_id: &str,
        filter: &str,
        cursor: Cursor,
    ) -> Result<Option<(Vec<WireLogEntry>, Cursor)>, RemoteError> {
        let page_token = match cursor {
            Cursor::Done => return Ok(None),
            Cursor::First => None,
            Cursor::Next(t) => Some(t),
        };

        let url = self.entries_url();
        let body = ListEntriesRequest {
            resource_names: vec![format!("projects/{project_id}")],
            filter,
            page_size: self.page_size,
            page_token,
        };

        let page: ListEntriesResponse = send_json(
            self.http.post(&url).bearer_auth(&token).json(&body),
            &url,
        )
        .await?;

        tracing::debug!(
            entries = page.entries.len(),
            has_next = page.next_page_token.is_some(),
            "Fetched log page"
        );

        let next = match page.next_page_token {
            Some(t) if !t.is_empty() => Cursor::Next(t),
            _ => Cursor::Done,
        };
        Ok(Some((page.entries, next)))
    }
}

#[async_trait]
impl LogSource for CloudLoggingClient {
    async fn open_entries<'a>(
        &'a self,
        project_id: &'a str,
        filter: &'a str,
    ) -> Result<RecordStream<'a>, RemoteError> {
        let token = self.tokens.access_token().await?;

        let pages = stream::try_unfold(Cursor::First, move |cursor| {
            self.next_page(token.clone(), project_id, filter, cursor)
        });

        let records = pages
            .map_ok(|entries| {
                stream::iter(
                    entries
                        .into_iter()
                        .map(|e| Ok::<_, RemoteError>(RawLogRecord::from(e))),
                )
            })
            .try_flatten();

        Ok(records.boxed())
    }
}

// =============================================================================
// Wire format
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListEntriesRequest<'a> {
    resource_names: Vec<String>,
    filter: &'a str,
    page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ListEntriesResponse {
    entries: Vec<WireLogEntry>,
    next_page_token: Option<String>,
}

/// `LogEntry` resource as returned by the logging API. Only the fields the
/// normaliser reads are decoded.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireLogEntry {
    timestamp: Option<String>,
    receive_timestamp: Option<String>,
    severity: Option<String>,
    labels: HashMap<String, String>,
    text_payload: Option<String>,
    json_payload: Option<serde_json::Map<String, serde_json::Value>>,
    proto_payload: Option<serde_json::Value>,
}

impl From<WireLogEntry> for RawLogRecord {
    fn from(wire: WireLogEntry) -> Self {
        // The API sets at most one payload field; an entry with none has an
        // empty message.
        let payload = if let Some(text) = wire.text_payload {
            Payload::Text(text)
        } else if let Some(map) = wire.json_payload {
            Payload::Structured(map)
        } else if let Some(other) = wire.proto_payload {
            Payload::Other(other)
        } else {
            Payload::Text(String::new())
        };

        RawLogRecord {
            timestamp: wire.timestamp.as_deref().and_then(parse_rfc3339),
            receive_timestamp: wire.receive_timestamp.as_deref().and_then(parse_rfc3339),
            severity: wire.severity,
            labels: wire.labels,
            payload,
        }
    }
}

fn parse_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
