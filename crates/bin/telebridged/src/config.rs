//! Configuration loading — TOML file with environment variable overrides.
//!
//! Reads `telebridge.toml` from the working directory, or the file named by
//! `TELEBRIDGE_CONFIG`. The file may be absent, but the service name, base
//! URI and poll interval must then come from the environment. Environment
//! variables take precedence over file values. Validation is eager: a bad
//! configuration stops the daemon before any task starts.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use telebridge_adapter_mqtt::MqttConfig;
use telebridge_app::driver::DriverSettings;
use telebridge_domain::duration::parse_duration;
use telebridge_domain::error::DurationError;

const DEFAULT_PATH: &str = "telebridge.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service identity and cadence.
    pub service: ServiceConfig,
    /// Which device driver to run.
    pub driver: DriverConfig,
    /// Which bus to publish on.
    pub bus: BusConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Simulated meter parameters.
    pub meter: MeterConfig,
    /// Extra metadata merged onto the service URI.
    pub metadata: BTreeMap<String, String>,
}

/// Service identity. Every field is required.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: Option<String>,
    pub base_uri: Option<String>,
    /// Duration string such as `"30s"`.
    pub poll_interval: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub kind: DriverKind,
}

/// Supported device drivers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// Push-mode energy meter.
    #[default]
    Meter,
    /// Pull-mode light with command intake.
    Light,
}

impl FromStr for DriverKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "meter" => Ok(Self::Meter),
            "light" => Ok(Self::Light),
            other => Err(ConfigError::Validation(format!(
                "unknown driver kind {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    pub kind: BusKind,
    pub mqtt: MqttConfig,
}

/// Supported buses.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusKind {
    /// External MQTT broker.
    #[default]
    Mqtt,
    /// In-process bus, nothing leaves the daemon.
    Local,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "telebridged=info,telebridge=info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MeterConfig {
    /// Production at solar noon, in watts.
    pub peak_watts: u64,
    /// Lifetime energy already recorded at startup, in watt-hours.
    pub lifetime_wh: u64,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            peak_watts: 4000,
            lifetime_wh: 0,
        }
    }
}

impl Config {
    /// Load configuration from the config file (if present), apply
    /// environment-variable overrides, then validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, if
    /// an override is malformed, or if validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("TELEBRIDGE_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = var("TELEBRIDGE_NAME") {
            self.service.name = Some(val);
        }
        if let Some(val) = var("TELEBRIDGE_BASE_URI") {
            self.service.base_uri = Some(val);
        }
        if let Some(val) = var("TELEBRIDGE_POLL_INTERVAL") {
            self.service.poll_interval = Some(val);
        }
        if let Some(val) = var("TELEBRIDGE_DRIVER") {
            self.driver.kind = val.parse()?;
        }
        if let Some(val) = var("TELEBRIDGE_MQTT_HOST") {
            self.bus.mqtt.broker_host = val;
        }
        if let Some(val) = var("TELEBRIDGE_MQTT_PORT") {
            self.bus.mqtt.broker_port = val.parse().map_err(|_| {
                ConfigError::Validation(format!("invalid MQTT port {val:?}"))
            })?;
        }
        if let Some(val) = var("TELEBRIDGE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.driver_settings().map(drop)
    }

    /// Settings handed to the selected driver.
    ///
    /// # Errors
    ///
    /// Returns an error if a required service key is missing or empty, or
    /// if the poll interval is malformed or zero.
    pub fn driver_settings(&self) -> Result<DriverSettings, ConfigError> {
        let name = required(self.service.name.as_deref(), "service.name")?;
        let base_uri = required(self.service.base_uri.as_deref(), "service.base_uri")?;
        let interval = required(self.service.poll_interval.as_deref(), "service.poll_interval")?;
        let poll_interval = parse_duration(interval)?;
        if poll_interval == Duration::ZERO {
            return Err(ConfigError::Validation(
                "service.poll_interval must be greater than zero".to_string(),
            ));
        }
        if self.bus.kind == BusKind::Mqtt && self.bus.mqtt.broker_port == 0 {
            return Err(ConfigError::Validation(
                "bus.mqtt.broker_port must be non-zero".to_string(),
            ));
        }

        Ok(DriverSettings {
            base_uri: base_uri.to_string(),
            name: name.to_string(),
            poll_interval,
            metadata: self.metadata.clone(),
        })
    }
}

fn required<'a>(value: Option<&'a str>, key: &'static str) -> Result<&'a str, ConfigError> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingKey(key)),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// A required key is absent.
    #[error("missing required configuration key {0}")]
    MissingKey(&'static str),
    /// The poll interval is not a valid duration string.
    #[error("invalid poll interval")]
    InvalidDuration(#[from] DurationError),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
