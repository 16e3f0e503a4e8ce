// cloudrun-logs - bin/cloudrun-logs-mcp.rs
//
// MCP server entry point. stdin/stdout carry the JSON-RPC stream, so all
// diagnostics go to stderr through the logging subsystem.

use clap::Parser;
use cloudrun_logs::app::backend::Backend;
use cloudrun_logs::mcp::server::serve;
use cloudrun_logs::mcp::tools::{ToolDefaults, ToolHandler};
use cloudrun_logs::platform::config::{self, PlatformPaths};
use cloudrun_logs::remote::auth::TokenProvider;
use cloudrun_logs::util::{constants, logging};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;

/// cloudrun-logs-mcp - Cloud Run log and service tools over MCP (stdio).
#[derive(Parser, Debug)]
#[command(name = "cloudrun-logs-mcp", version, about)]
struct Cli {
    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Read configuration from this file instead of the platform default.
    #[arg(long = "config")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match cli.config.as_deref() {
        Some(path) => config::load_config_file(path),
        None => Ok(config::load_config(&PlatformPaths::resolve())),
    };
    let (config, warnings) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            logging::init(cli.debug, None);
            tracing::error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    logging::init(cli.debug, config.log_level.as_deref());
    for warning in &warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    let backend = match Backend::from_config(&config, TokenProvider::Ambient) {
        Ok(backend) => backend,
        Err(e) => {
            tracing::error!(error = %e, "Failed to set up remote clients");
            std::process::exit(1);
        }
    };

    let handler = Arc::new(ToolHandler::new(
        backend.logs,
        backend.services,
        ToolDefaults {
            limit: config.default_limit,
            region: config.default_region.clone(),
        },
    ));

    tracing::info!(
        version = constants::APP_VERSION,
        protocol = constants::MCP_PROTOCOL_VERSION,
        "MCP server listening on stdio"
    );

    if let Err(e) = serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), handler).await {
        tracing::error!(error = %e, "MCP server stopped");
        std::process::exit(1);
    }
    tracing::info!("MCP server shut down");
}
