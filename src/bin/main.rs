//! dns-registrar binary entry point.

use clap::{Parser, Subcommand};
use dns_registrar::{registrar, telemetry, Config, Registrar, RpcInfoExporter};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Publish DNS host records for services outside the mesh registry.
#[derive(Parser, Debug)]
#[command(name = "dns-registrar")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML).
    #[arg(short, long, default_value = "dns-registrar.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Publish or overwrite the record for DOMAIN + SUFFIX.
    Update {
        /// Record name (e.g., "svc").
        #[arg(long)]
        domain: String,
        /// Address the name resolves to.
        #[arg(long)]
        address: String,
        /// Zone suffix (e.g., ".ns.svc.cluster.local").
        #[arg(long)]
        suffix: String,
    },
    /// Retract the record for DOMAIN + SUFFIX.
    Delete {
        /// Record name (e.g., "svc").
        #[arg(long)]
        domain: String,
        /// Zone suffix (e.g., ".ns.svc.cluster.local").
        #[arg(long)]
        suffix: String,
    },
    /// Serve the RPC interface exporter until interrupted.
    Exporter,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown requested");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration
    let config: Config = config::Config::builder()
        .add_source(config::File::from(args.config.clone()))
        .add_source(
            config::Environment::with_prefix("DNS_REGISTRAR")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    // Initialize telemetry
    telemetry::init(&config.telemetry).map_err(|e| e as Box<dyn std::error::Error>)?;

    info!(config_file = %args.config.display(), "Starting dns-registrar");

    match args.command {
        Command::Update {
            domain,
            address,
            suffix,
        } => {
            let backend = registrar::from_config(&config.registrar)?;
            if let Err(e) = backend.update(&domain, &address, &suffix).await {
                error!(domain = %domain, suffix = %suffix, "Update failed: {}", e);
                return Err(e.into());
            }
            info!(domain = %domain, address = %address, suffix = %suffix, "Record published");
        }
        Command::Delete { domain, suffix } => {
            let backend = registrar::from_config(&config.registrar)?;
            if let Err(e) = backend.delete(&domain, &suffix).await {
                error!(domain = %domain, suffix = %suffix, "Delete failed: {}", e);
                return Err(e.into());
            }
            info!(domain = %domain, suffix = %suffix, "Record retracted");
        }
        Command::Exporter => {
            let exporter = RpcInfoExporter::new(&config.exporter)?;
            let listener = TcpListener::bind(config.exporter.listen_addr).await?;
            exporter.serve(listener, shutdown_signal()).await?;
        }
    }

    info!("dns-registrar done");
    Ok(())
}
