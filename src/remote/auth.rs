// cloudrun-logs - remote/auth.rs
//
// Access-token resolution. Credentials are owned by the platform tooling:
// this module only reads a token that already exists (environment) or asks
// the gcloud CLI to print one. Tokens are never logged or persisted.

use crate::util::constants::{ACCESS_TOKEN_ENV_VARS, GCLOUD_PROGRAM, GCLOUD_TOKEN_ARGS};
use crate::util::error::RemoteError;
use std::fmt;
use tokio::process::Command;

/// Where bearer tokens for API calls come from.
#[derive(Clone)]
pub enum TokenProvider {
    /// A fixed token.
    Static(String),

    /// Environment variables, then `gcloud auth print-access-token`.
    Ambient,
}

impl fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(_) => f.write_str("Static(<redacted>)"),
            Self::Ambient => f.write_str("Ambient"),
        }
    }
}

impl TokenProvider {
    /// Resolve a bearer token. Called once per query session.
    pub async fn access_token(&self) -> Result<String, RemoteError> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::Ambient => {
                if let Some(token) = first_env_token(|name| std::env::var(name).ok()) {
                    tracing::debug!("Using access token from environment");
                    return Ok(token);
                }
                gcloud_token().await
            }
        }
    }
}

/// First non-empty token among [`ACCESS_TOKEN_ENV_VARS`], via `lookup`.
fn first_env_token(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    ACCESS_TOKEN_ENV_VARS
        .iter()
        .filter_map(|&name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

async fn gcloud_token() -> Result<String, RemoteError> {
    tracing::debug!(program = GCLOUD_PROGRAM, "Requesting access token");

    let output = Command::new(GCLOUD_PROGRAM)
        .args(GCLOUD_TOKEN_ARGS)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| RemoteError::AuthCommand {
            program: GCLOUD_PROGRAM,
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RemoteError::Auth {
            reason: format!(
                "'{GCLOUD_PROGRAM} {}' exited with {}: {}",
                GCLOUD_TOKEN_ARGS.join(" "),
                output.status,
                stderr.trim()
            ),
        });
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(RemoteError::Auth {
            reason: format!("'{GCLOUD_PROGRAM}' printed an empty token"),
        });
    }
    Ok(token)
}
