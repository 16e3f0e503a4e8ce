// cloudrun-logs - remote/mod.rs
//
// Remote access layer: the two capabilities the query entry points consume,
// plus their HTTP implementations against the Cloud Logging and Cloud Run
// Admin REST APIs.
// Dependencies: core model types, util.

pub mod auth;
pub mod logging_api;
pub mod run_api;

use crate::core::model::{RawLogRecord, RawService};
use crate::util::constants::MAX_ERROR_BODY_PREVIEW;
use crate::util::error::RemoteError;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::de::DeserializeOwned;

/// Lazy, finite, non-restartable sequence of raw log records. `None` from
/// the stream is the completion marker.
pub type RecordStream<'a> = BoxStream<'a, Result<RawLogRecord, RemoteError>>;

/// Log-query capability.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Establish a session for `project_id` and return the record stream
    /// for `filter`. Session failures come back from this call; paging
    /// failures come back as stream items. The session lives exactly as
    /// long as the returned stream.
    async fn open_entries<'a>(
        &'a self,
        project_id: &'a str,
        filter: &'a str,
    ) -> Result<RecordStream<'a>, RemoteError>;
}

/// Service-listing capability.
#[async_trait]
pub trait ServiceSource: Send + Sync {
    /// List every service descriptor of `project_id` in `region`.
    async fn list_services(
        &self,
        project_id: &str,
        region: &str,
    ) -> Result<Vec<RawService>, RemoteError>;
}

/// Build the HTTP client shared by both API clients.
pub fn build_http_client(timeout: std::time::Duration) -> Result<reqwest::Client, RemoteError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .build()
        .map_err(|source| RemoteError::Http {
            url: "<client setup>".to_string(),
            source,
        })
}

/// Send `request` and decode a JSON success body into `T`.
///
/// Non-success statuses become [`RemoteError::Status`] with a truncated
/// body excerpt.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    url: &str,
) -> Result<T, RemoteError> {
    let response = request.send().await.map_err(|source| RemoteError::Http {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|source| RemoteError::Http {
        url: url.to_string(),
        source,
    })?;

    if !status.is_success() {
        return Err(RemoteError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body: body_preview(&body),
        });
    }

    serde_json::from_str(&body).map_err(|source| RemoteError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Trimmed body, cut to [`MAX_ERROR_BODY_PREVIEW`] bytes on a char boundary.
fn body_preview(body: &str) -> String {
    let body = body.trim();
    if body.len() <= MAX_ERROR_BODY_PREVIEW {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_PREVIEW;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
