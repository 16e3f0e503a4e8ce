// cloudrun-logs - mcp/tools.rs
//
// Tool catalogue and dispatch for `tools/list` and `tools/call`.
// Query failures become `isError` tool results; malformed calls become
// JSON-RPC errors.

use crate::app::query::{fetch_logs, fetch_services};
use crate::app::request::LogRequest;
use crate::core::render::to_json_string;
use crate::mcp::protocol::RpcError;
use crate::remote::{LogSource, ServiceSource};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

pub const GET_LOGS_TOOL: &str = "get_logs";
pub const GET_SERVICES_TOOL: &str = "get_services";

/// Defaults applied to omitted tool arguments.
#[derive(Debug, Clone)]
pub struct ToolDefaults {
    pub limit: i64,
    pub region: String,
}

/// Executes tool calls against the two remote capabilities.
pub struct ToolHandler<L, S> {
    logs: L,
    services: S,
    defaults: ToolDefaults,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GetLogsArgs {
    project_id: Option<String>,
    service_name: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    log_level: Option<String>,
    /// Non-string items are skipped.
    keywords: Vec<Value>,
    /// Clients may send the limit as a float.
    limit: Option<serde_json::Number>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GetServicesArgs {
    project_id: Option<String>,
    region: Option<String>,
}

/// `CallToolResult` with a single text block.
fn text_result(text: String, is_error: bool) -> Value {
    json!({
        "content": [{"type": "text", "text": text}],
        "isError": is_error
    })
}

impl<L, S> ToolHandler<L, S>
where
    L: LogSource,
    S: ServiceSource,
{
    pub fn new(logs: L, services: S, defaults: ToolDefaults) -> Self {
        Self {
            logs,
            services,
            defaults,
        }
    }

    /// Handle `tools/call` params.
    pub async fn call(&self, params: Value, cancel: &CancellationToken) -> Result<Value, RpcError> {
        let call: ToolCall = serde_json::from_value(params)
            .map_err(|e| RpcError::invalid_params(format!("invalid tools/call params: {e}")))?;

        tracing::info!(tool = %call.name, "Tool call");

        let outcome = match call.name.as_str() {
            GET_LOGS_TOOL => self.get_logs(parse_args(call.arguments)?, cancel).await,
            GET_SERVICES_TOOL => self.get_services(parse_args(call.arguments)?, cancel).await,
            other => return Err(RpcError::invalid_params(format!("unknown tool: {other}"))),
        };

        Ok(match outcome {
            Ok(text) => text_result(text, false),
            Err(message) => {
                tracing::warn!(tool = %call.name, error = %message, "Tool call failed");
                text_result(message, true)
            }
        })
    }

    async fn get_logs(
        &self,
        args: GetLogsArgs,
        cancel: &CancellationToken,
    ) -> Result<String, String> {
        let request = LogRequest {
            project_id: args.project_id.unwrap_or_default(),
            service_name: args.service_name,
            start_time: args.start_time,
            end_time: args.end_time,
            log_level: args.log_level,
            keywords: args
                .keywords
                .into_iter()
                .filter_map(|k| k.as_str().map(str::to_string))
                .collect(),
            limit: args.limit.as_ref().and_then(number_to_limit),
        };

        let opts = request
            .into_filter_options(self.defaults.limit)
            .map_err(|e| e.to_string())?;
        let entries = fetch_logs(&self.logs, &opts, cancel)
            .await
            .map_err(|e| format!("failed to fetch logs: {e}"))?;
        to_json_string(&entries).map_err(|e| e.to_string())
    }

    async fn get_services(
        &self,
        args: GetServicesArgs,
        cancel: &CancellationToken,
    ) -> Result<String, String> {
        let project_id = args.project_id.unwrap_or_default();
        if project_id.trim().is_empty() {
            return Err(crate::util::error::QueryError::MissingProjectId.to_string());
        }
        let region = args
            .region
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| self.defaults.region.clone());

        let services = fetch_services(&self.services, project_id.trim(), &region, cancel)
            .await
            .map_err(|e| format!("failed to list services: {e}"))?;
        to_json_string(&services).map_err(|e| e.to_string())
    }
}

fn parse_args<T: serde::de::DeserializeOwned + Default>(arguments: Value) -> Result<T, RpcError> {
    if arguments.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(arguments)
        .map_err(|e| RpcError::invalid_params(format!("invalid tool arguments: {e}")))
}

/// Integers pass through; floats are truncated toward zero.
fn number_to_limit(n: &serde_json::Number) -> Option<i64> {
    n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))
}

/// `tools/list` result.
pub fn list_tools() -> Value {
    json!({
        "tools": [
            {
                "name": GET_LOGS_TOOL,
                "description": "Fetch Cloud Run logs",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "project_id": {"type": "string", "description": "Google Cloud project id"},
                        "service_name": {"type": "string", "description": "Cloud Run service name (optional)"},
                        "start_time": {"type": "string", "description": "Start of the time range, RFC 3339 e.g. 2023-01-01T00:00:00Z (optional)"},
                        "end_time": {"type": "string", "description": "End of the time range, RFC 3339 e.g. 2023-01-01T00:00:00Z (optional)"},
                        "log_level": {"type": "string", "description": "Minimum severity: INFO, WARNING, ERROR, ... (optional)"},
                        "keywords": {"type": "array", "items": {"type": "string"}, "description": "Text to search for (optional)"},
                        "limit": {"type": "number", "description": "Maximum number of entries (optional, default 100)"}
                    },
                    "required": ["project_id"]
                }
            },
            {
                "name": GET_SERVICES_TOOL,
                "description": "List Cloud Run services",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "project_id": {"type": "string", "description": "Google Cloud project id"},
                        "region": {"type": "string", "description": "Cloud Run region (optional, default us-central1)"}
                    },
                    "required": ["project_id"]
                }
            }
        ]
    })
}
