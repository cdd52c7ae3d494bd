//! Web archive replay gateway.
//!
//! Assembles the route table from configuration at startup, then
//! hands the frozen router to the HTTP transport.

use std::path::PathBuf;

use clap::Parser;
use serde_yaml::Mapping;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use replay_gateway::config::load_yaml_config;
use replay_gateway::routing::{create_cdx_router, create_router};

#[derive(Parser)]
#[command(name = "replay-gateway", about = "Web archive replay gateway")]
struct Args {
    /// YAML configuration file layered over the built-in defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Serve only the CDX API access points.
    #[arg(long)]
    cdx_server: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "replay_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut passed = match &args.config {
        Some(path) => load_yaml_config(path)?,
        None => Mapping::new(),
    };

    if let Some(port) = args.port {
        passed.insert("port".into(), port.into());
    }

    let router = if args.cdx_server {
        create_cdx_router(passed)?
    } else {
        create_router(passed)?
    };

    tracing::info!(
        port = router.port(),
        routes = router.routes().len(),
        collections = router.registry().len(),
        "router assembled"
    );

    replay_gateway::http::serve(router).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
