// cloudrun-logs - app/query.rs
//
// Query entry points used by both front ends. Each call owns its filter
// string, remote session, and accumulator; nothing is shared between
// concurrent queries. The session is dropped on every exit path.

use crate::core::filter::build_filter;
use crate::core::logs::collect_entries;
use crate::core::model::{FilterOptions, LogEntry, ServiceInfo};
use crate::core::services::{normalize_services, resolve_region};
use crate::remote::{LogSource, ServiceSource};
use crate::util::error::QueryError;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

/// Fetch log entries matching `opts`, at most `opts.limit` when positive.
pub async fn fetch_logs<S>(
    source: &S,
    opts: &FilterOptions,
    cancel: &CancellationToken,
) -> Result<Vec<LogEntry>, QueryError>
where
    S: LogSource + ?Sized,
{
    let filter = build_filter(opts);
    tracing::debug!(
        project = %opts.project_id,
        filter = %filter,
        limit = opts.limit,
        "Querying log entries"
    );

    let records = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            return Err(QueryError::Cancelled {
                operation: "opening log session",
            });
        }
        opened = source.open_entries(&opts.project_id, &filter) => {
            opened.map_err(|source| QueryError::Session {
                operation: "opening log session",
                source,
            })?
        }
    };

    let entries = collect_entries(records, opts.bounded_limit(), cancel).await?;
    tracing::debug!(count = entries.len(), "Log query complete");
    Ok(entries)
}

/// List the services of `project_id` in `region` (default region when
/// empty).
pub async fn fetch_services<S>(
    source: &S,
    project_id: &str,
    region: &str,
    cancel: &CancellationToken,
) -> Result<Vec<ServiceInfo>, QueryError>
where
    S: ServiceSource + ?Sized,
{
    let region = resolve_region(region);
    tracing::debug!(project = %project_id, region = %region, "Listing services");

    let items = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            return Err(QueryError::Cancelled {
                operation: "listing services",
            });
        }
        listed = source.list_services(project_id, region) => {
            listed.map_err(|source| QueryError::Session {
                operation: "listing services",
                source,
            })?
        }
    };

    let services = normalize_services(items, region, Utc::now());
    tracing::debug!(count = services.len(), "Service listing complete");
    Ok(services)
}
