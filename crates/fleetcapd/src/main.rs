//! fleetcapd — reserved-capacity coverage for a compute fleet.
//!
//! # Usage
//!
//! ```text
//! fleetcapd serve --config /etc/fleetcap/fleetcap.toml --port 8080
//! fleetcapd report --config /etc/fleetcap/fleetcap.toml --region us-east-1 --format text
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use fleetcap_api::format::{render, Format};
use fleetcapd::app;

#[derive(Parser)]
#[command(name = "fleetcapd", about = "Reserved-capacity coverage per instance family")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve capacity summaries over HTTP.
    Serve {
        /// Path to fleetcap.toml.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on (overrides the config file).
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print one capacity summary and exit.
    Report {
        /// Path to fleetcap.toml.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Region to summarize (defaults to the configured region).
        #[arg(long)]
        region: Option<String>,

        /// Output format: text, json, or chat.
        #[arg(long, default_value = "text", value_parser = parse_format)]
        format: Format,
    },
}

fn parse_format(s: &str) -> Result<Format, String> {
    Format::parse(s).ok_or_else(|| format!("unknown format {s:?} (expected text, json, or chat)"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,fleetcapd=debug,fleetcap=debug")
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config, port } => run_serve(config, port).await,
        Command::Report {
            config,
            region,
            format,
        } => run_report(config, region, format).await,
    }
}

async fn run_serve(config_path: Option<PathBuf>, port: Option<u16>) -> anyhow::Result<()> {
    let config = app::load_config(config_path.as_deref())?;
    let service = Arc::new(app::build_service(&config)?);
    let auth = app::authenticator(&config);

    info!(
        regions = ?service.source().regions(),
        default_region = ?service.default_region(),
        "fleetcap service initialized"
    );

    let router = fleetcap_api::build_router(service, auth);
    let addr = SocketAddr::from(([0, 0, 0, 0], port.unwrap_or(config.service.port)));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("fleetcap service stopped");
    Ok(())
}

async fn run_report(
    config_path: Option<PathBuf>,
    region: Option<String>,
    format: Format,
) -> anyhow::Result<()> {
    let config = app::load_config(config_path.as_deref())?;
    let service = app::build_service(&config)?;

    let report = service.summarize(region.as_deref()).await?;
    println!("{}", render(&report, format).trim_end());
    Ok(())
}
