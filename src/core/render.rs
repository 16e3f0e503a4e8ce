// cloudrun-logs - core/render.rs
//
// Text and JSON rendering of normalised results.
// Core layer: writes to any Write trait object.

use crate::core::filter::format_timestamp;
use crate::core::model::{LogEntry, ServiceInfo};
use crate::util::constants::UNKNOWN_STATUS;
use crate::util::error::RenderError;
use serde::Serialize;
use std::io::Write;

/// Render log entries as human-readable text.
///
/// One `[timestamp] SEVERITY: message` line per entry, followed by a
/// sorted labels line when the entry has labels.
pub fn write_logs_text<W: Write>(entries: &[LogEntry], mut writer: W) -> Result<(), RenderError> {
    if entries.is_empty() {
        writeln!(writer, "No log entries found.")?;
        return Ok(());
    }

    for entry in entries {
        writeln!(
            writer,
            "[{}] {}: {}",
            format_timestamp(entry.timestamp),
            entry.severity,
            entry.message
        )?;

        if !entry.labels.is_empty() {
            let mut labels: Vec<_> = entry.labels.iter().collect();
            labels.sort();
            let joined = labels
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(writer, "  Labels: {joined}")?;
        }

        writeln!(writer)?;
    }

    writeln!(writer, "Total: {} log entries.", entries.len())?;
    Ok(())
}

/// Render a service listing as human-readable text.
pub fn write_services_text<W: Write>(
    services: &[ServiceInfo],
    project_id: &str,
    region: &str,
    mut writer: W,
) -> Result<(), RenderError> {
    if services.is_empty() {
        writeln!(writer, "No services found.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "Cloud Run services in project {project_id} (region: {region}):"
    )?;
    writeln!(writer)?;

    for service in services {
        writeln!(writer, "Name: {}", service.name)?;
        if !service.description.is_empty() {
            writeln!(writer, "Description: {}", service.description)?;
        }
        writeln!(writer, "URL: {}", service.url)?;
        writeln!(
            writer,
            "Status: {}",
            service.status.as_deref().unwrap_or(UNKNOWN_STATUS)
        )?;
        writeln!(writer, "Created: {}", format_timestamp(service.create_time))?;
        // Approximate; see ServiceInfo::update_time.
        writeln!(writer, "Updated: {}", format_timestamp(service.update_time))?;
        writeln!(writer)?;
    }

    writeln!(writer, "Total: {} services.", services.len())?;
    Ok(())
}

/// Render any records as a pretty-printed JSON array.
pub fn write_json<W: Write, T: Serialize>(items: &[T], mut writer: W) -> Result<(), RenderError> {
    serde_json::to_writer_pretty(&mut writer, items)?;
    writeln!(writer)?;
    Ok(())
}

/// Pretty-printed JSON array as a string (MCP tool results).
pub fn to_json_string<T: Serialize>(items: &[T]) -> Result<String, RenderError> {
    Ok(serde_json::to_string_pretty(items)?)
}
