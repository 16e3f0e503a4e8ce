// cloudrun-logs - mcp/server.rs
//
// Newline-delimited JSON-RPC loop. The reader dispatches each line; every
// `tools/call` runs on its own task with its own cancellation token, and a
// single writer task owns the output stream so responses never interleave.

use crate::mcp::protocol::{
    request_key, Incoming, Response, RpcError, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
};
use crate::mcp::tools::{list_tools, ToolHandler};
use crate::remote::{LogSource, ServiceSource};
use crate::util::constants::{APP_VERSION, MCP_PROTOCOL_VERSION, MCP_SERVER_NAME};
use crate::util::error::AppError;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// In-flight calls by request key. The generation tells apart two calls
/// that reuse one request id.
type InFlight = Arc<Mutex<HashMap<String, (u64, CancellationToken)>>>;

/// Serve requests from `input` until EOF, writing responses to `output`.
///
/// Outstanding tool calls are awaited before returning.
pub async fn serve<R, W, L, S>(
    input: R,
    output: W,
    handler: Arc<ToolHandler<L, S>>,
) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
    L: LogSource + 'static,
    S: ServiceSource + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<Response>();
    let writer = tokio::spawn(write_responses(output, rx));

    let in_flight: InFlight = Arc::new(Mutex::new(HashMap::new()));
    let mut tasks = JoinSet::new();
    let mut generation: u64 = 0;
    let mut lines = input.lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(source) => {
                return Err(AppError::Io {
                    operation: "reading MCP input",
                    source,
                })
            }
        };

        while let Some(joined) = tasks.try_join_next() {
            if let Err(e) = joined {
                tracing::warn!(error = %e, "Tool call task failed");
            }
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let message: Incoming = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "Unparsable MCP message");
                let _ = tx.send(Response::failure(
                    Value::Null,
                    RpcError::new(PARSE_ERROR, format!("parse error: {e}")),
                ));
                continue;
            }
        };

        let Incoming { id, method, params } = message;
        match (id, method) {
            (Some(id), Some(method)) => {
                if method == "tools/call" {
                    let token = CancellationToken::new();
                    let key = request_key(&id);
                    generation += 1;
                    let call_generation = generation;
                    let replaced = in_flight
                        .lock()
                        .await
                        .insert(key.clone(), (call_generation, token.clone()));
                    if replaced.is_some() {
                        tracing::warn!(
                            request = %key,
                            "Request id reused while a call is in flight"
                        );
                    }

                    let handler = Arc::clone(&handler);
                    let in_flight = Arc::clone(&in_flight);
                    let tx = tx.clone();
                    tasks.spawn(async move {
                        let outcome = handler.call(params, &token).await;
                        {
                            let mut calls = in_flight.lock().await;
                            if calls.get(&key).is_some_and(|(g, _)| *g == call_generation) {
                                calls.remove(&key);
                            }
                        }
                        if token.is_cancelled() {
                            tracing::debug!(request = %key, "Dropping response to cancelled call");
                            return;
                        }
                        let _ = tx.send(Response::from_result(id, outcome));
                    });
                } else {
                    let _ = tx.send(Response::from_result(id, handle_request(&method)));
                }
            }
            (None, Some(method)) => handle_notification(&method, &params, &in_flight).await,
            (Some(id), None) => {
                let _ = tx.send(Response::failure(
                    id,
                    RpcError::new(INVALID_REQUEST, "missing method"),
                ));
            }
            (None, None) => tracing::debug!("Ignoring client response"),
        }
    }

    tracing::debug!(pending = tasks.len(), "Input closed; waiting for tool calls");
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::warn!(error = %e, "Tool call task failed");
        }
    }

    drop(tx);
    match writer.await {
        Ok(result) => result.map_err(|source| AppError::Io {
            operation: "writing MCP output",
            source,
        }),
        Err(e) => Err(AppError::Io {
            operation: "writing MCP output",
            source: std::io::Error::other(e),
        }),
    }
}

/// Synchronous methods answered inline by the reader.
fn handle_request(method: &str) -> Result<Value, RpcError> {
    match method {
        "initialize" => Ok(json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": { "name": MCP_SERVER_NAME, "version": APP_VERSION }
        })),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(list_tools()),
        other => Err(RpcError::new(
            METHOD_NOT_FOUND,
            format!("method not found: {other}"),
        )),
    }
}

async fn handle_notification(method: &str, params: &Value, in_flight: &InFlight) {
    match method {
        "notifications/cancelled" => {
            let Some(request_id) = params.get("requestId") else {
                tracing::debug!("Cancellation without requestId");
                return;
            };
            let key = request_key(request_id);
            match in_flight.lock().await.get(&key) {
                Some((_, token)) => {
                    tracing::info!(request = %key, "Cancelling tool call");
                    token.cancel();
                }
                None => tracing::debug!(request = %key, "Cancellation for unknown request"),
            }
        }
        "notifications/initialized" => tracing::info!("Client initialised"),
        other => tracing::debug!(method = %other, "Ignoring notification"),
    }
}

async fn write_responses<W>(
    mut output: W,
    mut rx: mpsc::UnboundedReceiver<Response>,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = match serde_json::to_string(&response) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialise response");
                continue;
            }
        };
        line.push('\n');
        output.write_all(line.as_bytes()).await?;
        output.flush().await?;
    }
    output.shutdown().await
}
