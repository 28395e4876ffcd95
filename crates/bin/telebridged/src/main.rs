//! # telebridged — telebridge daemon
//!
//! Composition root that wires a bus and a device driver together.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars) and fail fast when invalid
//! - Initialize structured logging
//! - Construct the bus (MQTT broker or in-process)
//! - Construct the device and start its driver
//! - Run until a driver task ends or SIGINT is received
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::process::ExitCode;
use std::sync::Arc;

use telebridge_adapter_mqtt::MqttBus;
use telebridge_adapter_virtual::{VirtualLight, VirtualMeter};
use telebridge_app::bus::InProcessBus;
use telebridge_app::driver::{DriverHandles, DriverSettings, LightDriver, MeterDriver};
use telebridge_app::ports::{Bus, share};
use telebridge_domain::error::BridgeError;
use tracing_subscriber::EnvFilter;

use crate::config::{BusKind, Config, DriverKind};

const LOCAL_BUS_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            println!("telebridged: {}", error_chain(&err));
            return ExitCode::FAILURE;
        }
    };

    let filter = EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|err| {
        println!("telebridged: ignoring invalid log filter: {err}");
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .init();

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %error_chain(&*err), "telebridged stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let settings = config.driver_settings()?;
    tracing::info!(
        name = %settings.name,
        base_uri = %settings.base_uri,
        driver = ?config.driver.kind,
        bus = ?config.bus.kind,
        "starting telebridged"
    );

    match config.bus.kind {
        BusKind::Local => {
            let bus = Arc::new(InProcessBus::new(LOCAL_BUS_CAPACITY));
            serve(bus, config, &settings).await?;
        }
        BusKind::Mqtt => {
            let (bus, event_loop) = MqttBus::connect(&config.bus.mqtt);
            let result = serve(bus, config, &settings).await;
            event_loop.abort();
            result?;
        }
    }
    Ok(())
}

async fn serve<B>(bus: B, config: &Config, settings: &DriverSettings) -> Result<(), BridgeError>
where
    B: Bus + Clone + 'static,
{
    let mut handles = start_driver(bus, config, settings).await?;

    tokio::select! {
        ended = handles.wait() => match ended {
            Some(Err(err)) => tracing::error!(error = %err, "driver task failed"),
            _ => tracing::warn!("driver tasks ended"),
        },
        signal = tokio::signal::ctrl_c() => {
            if let Err(err) = signal {
                tracing::warn!(error = %err, "failed to listen for shutdown signal");
            }
            tracing::info!("shutting down");
        }
    }

    handles.abort();
    Ok(())
}

async fn start_driver<B>(
    bus: B,
    config: &Config,
    settings: &DriverSettings,
) -> Result<DriverHandles, BridgeError>
where
    B: Bus + Clone + 'static,
{
    match config.driver.kind {
        DriverKind::Meter => {
            let meter = VirtualMeter::new(config.meter.peak_watts, config.meter.lifetime_wh);
            let summaries = meter.poll_summary(settings.poll_interval);
            Ok(MeterDriver::start(bus, summaries, settings).await)
        }
        DriverKind::Light => LightDriver::start(bus, share(VirtualLight::new()), settings).await,
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
