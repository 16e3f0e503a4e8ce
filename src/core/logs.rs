// cloudrun-logs - core/logs.rs
//
// Log result normaliser: drains a lazy stream of raw records into a capped,
// ordered Vec<LogEntry>, flattening each payload shape into message text.
//
// Core layer: no logging, no retries. A stream error or cancellation
// discards everything collected so far.

use crate::core::model::{LogEntry, Payload, RawLogRecord};
use crate::util::constants::{zero_time, DEFAULT_SEVERITY};
use crate::util::error::{QueryError, RemoteError};
use futures::{Stream, StreamExt};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Key looked up in structured payloads for the human-readable message.
const MESSAGE_KEY: &str = "message";

impl Payload {
    /// Flatten the payload into message text.
    ///
    /// - `Text`: verbatim.
    /// - `Structured`: the `message` field when it is a string, else the
    ///   whole map as compact JSON.
    /// - `Other`: compact JSON.
    pub fn message(&self) -> String {
        match self {
            Payload::Text(text) => text.clone(),
            Payload::Structured(map) => match map.get(MESSAGE_KEY) {
                Some(Value::String(msg)) => msg.clone(),
                _ => Value::Object(map.clone()).to_string(),
            },
            Payload::Other(value) => value.to_string(),
        }
    }
}

/// Convert one raw record into a [`LogEntry`].
///
/// Missing event timestamps fall back to the receive timestamp, then to the
/// zero time. Missing severity becomes `DEFAULT`.
pub fn normalize_record(raw: RawLogRecord) -> LogEntry {
    let message = raw.payload.message();
    LogEntry {
        timestamp: raw
            .timestamp
            .or(raw.receive_timestamp)
            .unwrap_or_else(zero_time),
        severity: raw
            .severity
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SEVERITY.to_string()),
        message,
        labels: raw.labels,
    }
}

/// Pull records from `records` until the stream ends or `cap` entries
/// have been collected (`None` drains the stream).
///
/// No record is pulled past the cap. Every pull races `cancel`; a
/// cancelled token or a stream error returns `Err` and drops the partial
/// result.
pub async fn collect_entries<S>(
    mut records: S,
    cap: Option<usize>,
    cancel: &CancellationToken,
) -> Result<Vec<LogEntry>, QueryError>
where
    S: Stream<Item = Result<RawLogRecord, RemoteError>> + Unpin,
{
    let mut entries = Vec::new();

    loop {
        if cap.is_some_and(|n| entries.len() >= n) {
            break;
        }

        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(QueryError::Cancelled {
                    operation: "reading log entries",
                });
            }
            next = records.next() => next,
        };

        match next {
            None => break,
            Some(Ok(raw)) => entries.push(normalize_record(raw)),
            Some(Err(source)) => return Err(QueryError::Iteration { source }),
        }
    }

    Ok(entries)
}
