use clap::Parser;
use std::sync::Arc;
use swarm_client::cli::Cli;
use swarm_client::os::raise_nofile_limit;
use swarm_client::{AdmissionController, FlowTracker};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(false)).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let config = Arc::new(cli.into_config()?);

    raise_nofile_limit()?;

    if config.client_addresses.is_empty() {
        info!(servers = ?config.server_addresses, "Dialing");
    } else {
        info!(
            servers = ?config.server_addresses,
            clients = ?config.client_addresses,
            "Dialing from bound addresses"
        );
    }

    let tracker = FlowTracker::new();
    AdmissionController::new(config, tracker).run().await;
    Ok(())
}
