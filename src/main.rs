// cloudrun-logs - main.rs
//
// CLI entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading and logging initialisation (debug mode support)
// 3. Log / service queries, cancelled on Ctrl-C
// 4. Text or JSON output on stdout

use clap::{Args, Parser, Subcommand};
use cloudrun_logs::app::backend::Backend;
use cloudrun_logs::app::query::{fetch_logs, fetch_services};
use cloudrun_logs::app::request::LogRequest;
use cloudrun_logs::core::render::{write_json, write_logs_text, write_services_text};
use cloudrun_logs::platform::config::{self, AppConfig, PlatformPaths};
use cloudrun_logs::remote::auth::TokenProvider;
use cloudrun_logs::util::error::{QueryError, Result};
use cloudrun_logs::util::{constants, logging};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// cloudrun-logs - query Cloud Run logs and services.
///
/// Builds a Cloud Logging filter from the given options, pages through the
/// matching entries, and prints them as text or JSON.
#[derive(Parser, Debug)]
#[command(name = "cloudrun-logs", version, about)]
struct Cli {
    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    /// Read configuration from this file instead of the platform default.
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch log entries for a project, optionally narrowed to one service.
    Logs(LogsArgs),
    /// List the services deployed in a region.
    Services(ServicesArgs),
}

#[derive(Args, Debug)]
struct LogsArgs {
    /// Google Cloud project id (defaults to [defaults] project_id).
    #[arg(short = 'p', long = "project")]
    project: Option<String>,

    /// Cloud Run service name.
    #[arg(short = 's', long = "service")]
    service: Option<String>,

    /// Start of the time range, RFC 3339 (e.g. 2024-01-01T00:00:00Z).
    #[arg(long = "start-time")]
    start_time: Option<String>,

    /// End of the time range, RFC 3339.
    #[arg(long = "end-time")]
    end_time: Option<String>,

    /// Minimum severity (DEBUG, INFO, WARNING, ERROR, ...).
    #[arg(short = 'l', long = "level")]
    level: Option<String>,

    /// Text to search for in the payload; repeatable.
    #[arg(short = 'k', long = "keyword")]
    keywords: Vec<String>,

    /// Maximum number of entries; 0 or less fetches everything.
    #[arg(short = 'n', long = "limit", allow_negative_numbers = true)]
    limit: Option<i64>,

    /// Print JSON instead of text.
    #[arg(short = 'j', long = "json")]
    json: bool,
}

#[derive(Args, Debug)]
struct ServicesArgs {
    /// Google Cloud project id (defaults to [defaults] project_id).
    #[arg(short = 'p', long = "project")]
    project: Option<String>,

    /// Region to list (defaults to [defaults] region, else us-central1).
    #[arg(short = 'r', long = "region")]
    region: Option<String>,

    /// Print JSON instead of text.
    #[arg(short = 'j', long = "json")]
    json: bool,
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
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init(cli.debug, config.log_level.as_deref());
    for warning in &warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "cloudrun-logs starting"
    );

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted; cancelling query");
            interrupt.cancel();
        }
    });

    if let Err(e) = run(cli.command, &config, &cancel).await {
        tracing::error!(error = %e, "Command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Command, config: &AppConfig, cancel: &CancellationToken) -> Result<()> {
    let backend = Backend::from_config(config, TokenProvider::Ambient)?;

    match command {
        Command::Logs(args) => {
            let request = LogRequest {
                project_id: project_or_default(args.project, config),
                service_name: args.service,
                start_time: args.start_time,
                end_time: args.end_time,
                log_level: args.level,
                keywords: args.keywords,
                limit: args.limit,
            };
            let opts = request.into_filter_options(config.default_limit)?;
            let entries = fetch_logs(&backend.logs, &opts, cancel).await?;

            let out = std::io::stdout().lock();
            if args.json {
                write_json(&entries, out)?;
            } else {
                write_logs_text(&entries, out)?;
            }
        }
        Command::Services(args) => {
            let project_id = project_or_default(args.project, config);
            if project_id.trim().is_empty() {
                return Err(QueryError::MissingProjectId.into());
            }
            let region = args
                .region
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| config.default_region.clone());
            let services =
                fetch_services(&backend.services, project_id.trim(), &region, cancel).await?;

            let out = std::io::stdout().lock();
            if args.json {
                write_json(&services, out)?;
            } else {
                write_services_text(&services, project_id.trim(), &region, out)?;
            }
        }
    }
    Ok(())
}

fn project_or_default(project: Option<String>, config: &AppConfig) -> String {
    project
        .filter(|p| !p.trim().is_empty())
        .or_else(|| config.default_project.clone())
        .unwrap_or_default()
}
