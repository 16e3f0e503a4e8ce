// cloudrun-logs - app/backend.rs
//
// Wires the HTTP clients for both remote capabilities from validated config.

use crate::platform::config::AppConfig;
use crate::remote::auth::TokenProvider;
use crate::remote::build_http_client;
use crate::remote::logging_api::CloudLoggingClient;
use crate::remote::run_api::CloudRunClient;
use crate::util::error::QueryError;
use std::time::Duration;

/// The remote clients a front end queries through.
#[derive(Debug, Clone)]
pub struct Backend {
    pub logs: CloudLoggingClient,
    pub services: CloudRunClient,
}

impl Backend {
    /// Build both clients on one shared HTTP connection pool.
    pub fn from_config(config: &AppConfig, tokens: TokenProvider) -> Result<Self, QueryError> {
        let http = build_http_client(Duration::from_secs(config.request_timeout_secs)).map_err(
            |source| QueryError::Session {
                operation: "creating HTTP client",
                source,
            },
        )?;

        tracing::debug!(
            logging = %config.logging_endpoint,
            run = %config.run_endpoint,
            page_size = config.page_size,
            timeout_secs = config.request_timeout_secs,
            "Remote clients configured"
        );

        Ok(Self {
            logs: CloudLoggingClient::new(
                http.clone(),
                config.logging_endpoint.clone(),
                tokens.clone(),
                config.page_size,
            ),
            services: CloudRunClient::new(http, config.run_endpoint.clone(), tokens),
        })
    }
}
