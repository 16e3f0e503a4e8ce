// cloudrun-logs - tests/e2e_query.rs
//
// End-to-end tests for the query pipeline: boundary request parsing, filter
// construction, paging through a record source, normalisation, and the MCP
// tool dispatch on top of it.
//
// The remote APIs are replaced by in-memory sources implementing the same
// capability traits the HTTP clients implement; everything between the
// request and the rendered output is the real code path.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use cloudrun_logs::app::query::{fetch_logs, fetch_services};
use cloudrun_logs::app::request::LogRequest;
use cloudrun_logs::core::model::{Payload, RawCondition, RawLogRecord, RawService};
use cloudrun_logs::mcp::tools::{ToolDefaults, ToolHandler};
use cloudrun_logs::remote::{LogSource, RecordStream, ServiceSource};
use cloudrun_logs::util::constants::zero_time;
use cloudrun_logs::util::error::{QueryError, RemoteError};
use futures::{stream, StreamExt};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

// =============================================================================
// Fakes
// =============================================================================

/// In-memory log source that counts pulled records and remembers the
/// filter it was opened with.
#[derive(Default)]
struct FakeLogs {
    records: Vec<RawLogRecord>,
    /// Yield a page failure after this many records.
    fail_after: Option<usize>,
    /// Refuse to open a session at all.
    fail_open: bool,
    pulled: Arc<AtomicUsize>,
    seen_filter: Mutex<Option<String>>,
}

#[async_trait]
impl LogSource for FakeLogs {
    async fn open_entries<'a>(
        &'a self,
        _project_id: &'a str,
        filter: &'a str,
    ) -> Result<RecordStream<'a>, RemoteError> {
        *self.seen_filter.lock().unwrap() = Some(filter.to_string());
        if self.fail_open {
            return Err(RemoteError::Auth {
                reason: "no credentials in test".to_string(),
            });
        }

        let mut items: Vec<Result<RawLogRecord, RemoteError>> =
            self.records.iter().cloned().map(Ok).collect();
        if let Some(n) = self.fail_after {
            items.truncate(n);
            items.push(Err(RemoteError::Status {
                url: "https://logging.test/v2/entries:list".to_string(),
                status: 503,
                body: "backend unavailable".to_string(),
            }));
        }

        let pulled = Arc::clone(&self.pulled);
        Ok(stream::iter(items)
            .inspect(move |_| {
                pulled.fetch_add(1, Ordering::SeqCst);
            })
            .boxed())
    }
}

/// Log source whose session never opens.
struct HangingLogs;

#[async_trait]
impl LogSource for HangingLogs {
    async fn open_entries<'a>(
        &'a self,
        _project_id: &'a str,
        _filter: &'a str,
    ) -> Result<RecordStream<'a>, RemoteError> {
        futures::future::pending().await
    }
}

#[derive(Default)]
struct FakeServices {
    items: Vec<RawService>,
    seen_region: Mutex<Option<String>>,
}

#[async_trait]
impl ServiceSource for FakeServices {
    async fn list_services(
        &self,
        _project_id: &str,
        region: &str,
    ) -> Result<Vec<RawService>, RemoteError> {
        *self.seen_region.lock().unwrap() = Some(region.to_string());
        Ok(self.items.clone())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn text_records(n: usize) -> Vec<RawLogRecord> {
    (0..n)
        .map(|i| RawLogRecord {
            timestamp: Some(ts(i as i64)),
            receive_timestamp: None,
            severity: Some("INFO".to_string()),
            labels: HashMap::new(),
            payload: Payload::Text(format!("line {i}")),
        })
        .collect()
}

fn request(project: &str) -> LogRequest {
    LogRequest {
        project_id: project.to_string(),
        ..Default::default()
    }
}

// =============================================================================
// Log queries
// =============================================================================

/// A limit of 3 over ten records returns the first three and stops pulling.
#[tokio::test]
async fn e2e_logs_respect_limit() {
    let source = FakeLogs {
        records: text_records(10),
        ..Default::default()
    };
    let opts = LogRequest {
        limit: Some(3),
        ..request("demo")
    }
    .into_filter_options(100)
    .unwrap();

    let entries = fetch_logs(&source, &opts, &CancellationToken::new())
        .await
        .unwrap();

    let messages: Vec<_> = entries.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, ["line 0", "line 1", "line 2"]);
    assert_eq!(source.pulled.load(Ordering::SeqCst), 3);
}

/// A non-positive limit drains the whole source.
#[tokio::test]
async fn e2e_logs_unbounded_limit() {
    let source = FakeLogs {
        records: text_records(7),
        ..Default::default()
    };
    let opts = LogRequest {
        limit: Some(0),
        ..request("demo")
    }
    .into_filter_options(100)
    .unwrap();

    let entries = fetch_logs(&source, &opts, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(entries.len(), 7);
}

/// Every requested criterion reaches the source as one ordered filter.
#[tokio::test]
async fn e2e_logs_filter_reaches_source() {
    let source = FakeLogs::default();
    let opts = LogRequest {
        project_id: "demo".to_string(),
        service_name: Some("api".to_string()),
        start_time: Some("2024-01-01T00:00:00Z".to_string()),
        end_time: Some("2024-01-01T01:00:00+01:00".to_string()),
        log_level: Some("ERROR".to_string()),
        keywords: vec!["timeout".to_string(), String::new()],
        limit: None,
    }
    .into_filter_options(100)
    .unwrap();

    fetch_logs(&source, &opts, &CancellationToken::new())
        .await
        .unwrap();

    let filter = source.seen_filter.lock().unwrap().clone().unwrap();
    assert_eq!(
        filter,
        "resource.type=\"cloud_run_revision\" AND \
         resource.labels.service_name=\"api\" AND \
         timestamp>=\"2024-01-01T00:00:00Z\" AND \
         timestamp<=\"2024-01-01T00:00:00Z\" AND \
         severity>=\"ERROR\" AND \
         textPayload:\"timeout\""
    );
}

/// Structured and non-text payloads are normalised into messages.
#[tokio::test]
async fn e2e_logs_payload_shapes() {
    let mut structured = serde_json::Map::new();
    structured.insert("message".to_string(), json!("hi"));
    let mut no_message = serde_json::Map::new();
    no_message.insert("code".to_string(), json!(7));

    let records = vec![
        RawLogRecord {
            timestamp: Some(ts(0)),
            receive_timestamp: None,
            severity: None,
            labels: HashMap::new(),
            payload: Payload::Structured(structured),
        },
        RawLogRecord {
            timestamp: None,
            receive_timestamp: Some(ts(5)),
            severity: Some("WARNING".to_string()),
            labels: HashMap::from([("instanceId".to_string(), "abc".to_string())]),
            payload: Payload::Structured(no_message),
        },
    ];
    let source = FakeLogs {
        records,
        ..Default::default()
    };
    let opts = request("demo").into_filter_options(100).unwrap();

    let entries = fetch_logs(&source, &opts, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(entries[0].message, "hi");
    assert_eq!(entries[0].severity, "DEFAULT");
    assert_eq!(entries[1].message, r#"{"code":7}"#);
    assert_eq!(entries[1].timestamp, ts(5));
    assert_eq!(entries[1].labels["instanceId"], "abc");
}

/// A page failure after two records discards them and reports the failure.
#[tokio::test]
async fn e2e_logs_mid_stream_failure() {
    let source = FakeLogs {
        records: text_records(5),
        fail_after: Some(2),
        ..Default::default()
    };
    let opts = request("demo").into_filter_options(100).unwrap();

    let result = fetch_logs(&source, &opts, &CancellationToken::new()).await;
    match result {
        Err(QueryError::Iteration {
            source: RemoteError::Status { status, .. },
        }) => assert_eq!(status, 503),
        other => panic!("expected Iteration error, got {other:?}"),
    }
}

/// A session that cannot be opened is reported as a session failure.
#[tokio::test]
async fn e2e_logs_session_failure() {
    let source = FakeLogs {
        fail_open: true,
        ..Default::default()
    };
    let opts = request("demo").into_filter_options(100).unwrap();

    let err = fetch_logs(&source, &opts, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            QueryError::Session {
                source: RemoteError::Auth { .. },
                ..
            }
        ),
        "expected Session error, got {err:?}"
    );
    assert!(err.to_string().contains("opening log session"));
}

/// Cancelling while the session is still opening returns promptly.
#[tokio::test]
async fn e2e_logs_cancelled_while_opening() {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let opts = request("demo").into_filter_options(100).unwrap();
    let err = fetch_logs(&HangingLogs, &opts, &cancel).await.unwrap_err();
    assert!(matches!(err, QueryError::Cancelled { .. }), "got {err:?}");
}

/// Missing project ids and bad timestamps fail before any remote call.
#[test]
fn e2e_request_validation() {
    assert!(matches!(
        request("  ").into_filter_options(100),
        Err(QueryError::MissingProjectId)
    ));

    let bad = LogRequest {
        start_time: Some("yesterday".to_string()),
        ..request("demo")
    };
    assert!(matches!(
        bad.into_filter_options(100),
        Err(QueryError::InvalidTimestamp { field: "start time", .. })
    ));
}

// =============================================================================
// Service queries
// =============================================================================

/// An empty listing is an empty result, queried in the default region.
#[tokio::test]
async fn e2e_services_empty_listing_default_region() {
    let source = FakeServices::default();
    let services = fetch_services(&source, "demo", "", &CancellationToken::new())
        .await
        .unwrap();

    assert!(services.is_empty());
    assert_eq!(
        source.seen_region.lock().unwrap().as_deref(),
        Some("us-central1")
    );
}

/// Descriptors are normalised in listing order.
#[tokio::test]
async fn e2e_services_normalised() {
    let source = FakeServices {
        items: vec![
            RawService {
                name: "api".to_string(),
                annotations: HashMap::from([(
                    "description".to_string(),
                    "Public API".to_string(),
                )]),
                creation_timestamp: "2024-03-01T12:00:00Z".to_string(),
                url: "https://api-xyz.a.run.app".to_string(),
                conditions: vec![RawCondition {
                    kind: "Ready".to_string(),
                    status: "True".to_string(),
                    ..Default::default()
                }],
            },
            RawService {
                name: "worker".to_string(),
                creation_timestamp: "not a time".to_string(),
                ..Default::default()
            },
        ],
        ..Default::default()
    };

    let services = fetch_services(&source, "demo", "europe-west1", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(services.len(), 2);
    assert_eq!(services[0].name, "api");
    assert_eq!(services[0].description, "Public API");
    assert_eq!(services[0].status.as_deref(), Some("True"));
    assert_eq!(services[0].region, "europe-west1");
    assert_eq!(
        services[0].create_time,
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    );

    assert_eq!(services[1].status, None);
    assert_eq!(services[1].create_time, zero_time());
    assert_eq!(services[1].update_time, zero_time());
}

// =============================================================================
// MCP tools
// =============================================================================

fn handler(logs: FakeLogs, services: FakeServices) -> ToolHandler<FakeLogs, FakeServices> {
    ToolHandler::new(
        logs,
        services,
        ToolDefaults {
            limit: 100,
            region: "us-central1".to_string(),
        },
    )
}

/// `get_logs` returns the entries as a pretty JSON array in a text block.
#[tokio::test]
async fn e2e_tool_get_logs() {
    let tools = handler(
        FakeLogs {
            records: text_records(4),
            ..Default::default()
        },
        FakeServices::default(),
    );

    let result = tools
        .call(
            json!({"name": "get_logs", "arguments": {"project_id": "demo", "limit": 2}}),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(result["isError"], false);
    let text = result["content"][0]["text"].as_str().unwrap();
    let entries: serde_json::Value = serde_json::from_str(text).unwrap();
    assert_eq!(entries.as_array().unwrap().len(), 2);
    assert_eq!(entries[0]["message"], "line 0");
    assert_eq!(entries[0]["severity"], "INFO");
}

/// Query failures become error results rather than protocol errors.
#[tokio::test]
async fn e2e_tool_failure_is_error_result() {
    let tools = handler(
        FakeLogs {
            fail_open: true,
            ..Default::default()
        },
        FakeServices::default(),
    );

    let result = tools
        .call(
            json!({"name": "get_logs", "arguments": {"project_id": "demo"}}),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(result["isError"], true);
    assert!(result["content"][0]["text"]
        .as_str()
        .unwrap()
        .starts_with("failed to fetch logs"));

    let missing = tools
        .call(
            json!({"name": "get_services", "arguments": {}}),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(missing["isError"], true);
}

/// `get_services` falls back to the configured default region.
#[tokio::test]
async fn e2e_tool_get_services_default_region() {
    let tools = handler(FakeLogs::default(), FakeServices::default());

    let result = tools
        .call(
            json!({"name": "get_services", "arguments": {"project_id": "demo"}}),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(result["isError"], false);
    assert_eq!(result["content"][0]["text"], "[]");
}

/// Unknown tools are rejected as invalid params.
#[tokio::test]
async fn e2e_tool_unknown_name() {
    let tools = handler(FakeLogs::default(), FakeServices::default());
    let err = tools
        .call(json!({"name": "delete_everything"}), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.code, cloudrun_logs::mcp::protocol::INVALID_PARAMS);
}
