//! Telehub Server
//!
//! Device telemetry hub with a supervised registry actor hierarchy.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use kameo::actor::{ActorRef, Spawn};
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use telehub::actors::registry::{track, DeviceRegistry};
use telehub::actors::{DeviceReply, Supervisor, SupervisorReply};
use telehub::config::HubConfig;
use telehub::messages::{DeviceMsg, SupervisorMsg};

/// Telehub Device Telemetry Server
#[derive(Parser, Debug)]
#[command(name = "telehub")]
#[command(about = "Telehub Device Telemetry Server", long_about = None)]
struct Args {
    /// Path to the hub configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Don't register seed devices from the configuration
    #[arg(long)]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("telehub=info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting telehub v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => match HubConfig::load(path).await {
            Ok(config) => {
                info!("Loaded configuration from: {}", path.display());
                config
            }
            Err(e) => {
                error!("Failed to load configuration from {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => HubConfig::default(),
    };

    let supervisor = Supervisor::spawn(config.hub_name.clone());

    let registry = match supervisor.ask(SupervisorMsg::GetRegistry).await {
        Ok(SupervisorReply::Registry(registry)) => registry,
        Ok(other) => {
            error!("Unexpected reply to registry lookup: {:?}", other);
            std::process::exit(1);
        }
        Err(e) => {
            error!("Failed to reach supervisor: {}", e);
            std::process::exit(1);
        }
    };

    if !args.no_seed && !config.seed_devices.is_empty() {
        seed_devices(&registry, &config).await;
    }

    info!("Telemetry hub '{}' ready", config.hub_name);

    shutdown_signal().await;

    match supervisor.ask(SupervisorMsg::Shutdown).await {
        Ok(SupervisorReply::ShuttingDown) => {}
        Ok(other) => warn!("Unexpected reply to shutdown request: {:?}", other),
        Err(e) => warn!("Failed to deliver shutdown request: {}", e),
    }
    let _ = supervisor.stop_gracefully().await;

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while supervisor.is_alive() && tokio::time::Instant::now() < deadline {
        sleep(Duration::from_millis(20)).await;
    }

    info!("Shutdown complete");
    Ok(())
}

/// Register the configured seed devices and log their last reading
async fn seed_devices(registry: &ActorRef<DeviceRegistry>, config: &HubConfig) {
    for seed in &config.seed_devices {
        match track(
            registry,
            seed.group.clone(),
            seed.device.clone(),
            Duration::from_secs(3),
        )
        .await
        {
            Ok(registered) => {
                info!("Tracking device {}-{}", seed.group, seed.device);

                if let Some(value) = seed.initial_reading {
                    if let Err(e) = registered
                        .device
                        .ask(DeviceMsg::RecordTemperature {
                            request_id: 0,
                            value,
                        })
                        .await
                    {
                        warn!("Failed to record initial reading: {}", e);
                    }
                }

                match registered
                    .device
                    .ask(DeviceMsg::ReadTemperature { request_id: 1 })
                    .await
                {
                    Ok(DeviceReply::Temperature {
                        value: Some(value), ..
                    }) => {
                        info!("  last reading: {}", value);
                    }
                    Ok(DeviceReply::Temperature { value: None, .. }) => {
                        info!("  no readings yet");
                    }
                    Ok(other) => warn!("Unexpected reply from device: {:?}", other),
                    Err(e) => warn!("Failed to query device: {}", e),
                }
            }
            Err(e) => {
                warn!(
                    "Failed to track device {}-{}: {}",
                    seed.group, seed.device, e
                );
            }
        }
    }
}

/// Wait for a shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down...");
        },
    }
}
