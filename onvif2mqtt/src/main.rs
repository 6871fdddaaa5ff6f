use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use onvif2mqtt::logging::{self, LoggingMode};
use onvif2mqtt::{Config, Gateway, MqttBus};

/// Bridge ONVIF camera events to MQTT
#[derive(Parser, Debug)]
#[command(name = "onvif2mqtt")]
#[command(version)]
pub struct Args {
    /// Path of the YAML configuration file
    #[arg(short, long, env = "ONVIF2MQTT_CONFIG", default_value = "config.yml")]
    pub config: PathBuf,

    /// Log output format
    #[arg(long, env = "ONVIF2MQTT_LOG_MODE", value_enum, default_value_t = LoggingMode::Development)]
    pub log_mode: LoggingMode,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.log_mode).context("Failed to initialize logging")?;

    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
    if config.cameras.is_empty() {
        tracing::warn!("No cameras configured");
    }

    let bus = Arc::new(
        MqttBus::connect(&config.mqtt)
            .await
            .context("Failed to connect to MQTT broker")?,
    );

    let gateway = Gateway::start(&config, bus.clone()).await;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutting down");

    gateway.shutdown().await;
    bus.disconnect().await;
    Ok(())
}
