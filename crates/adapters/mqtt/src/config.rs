//! Broker connection settings, read from the `[bus.mqtt]` table.

use std::time::Duration;

use rumqttc::MqttOptions;
use serde::Deserialize;

/// Where and how to reach the MQTT broker.
///
/// Every field has a default, so an empty table connects to a local broker.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub broker_host: String,
    pub broker_port: u16,
    /// Must be unique per broker; a second client with the same id evicts the first.
    pub client_id: String,
    pub keep_alive_secs: u16,
    /// Bound of the client request queue and of every subscription channel.
    pub channel_capacity: usize,
    /// Pause before the event loop retries a failed connection.
    pub reconnect_delay_secs: u16,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            client_id: "telebridge".to_string(),
            keep_alive_secs: 30,
            channel_capacity: 64,
            reconnect_delay_secs: 5,
        }
    }
}

impl MqttConfig {
    /// Client options for `rumqttc`.
    #[must_use]
    pub fn options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(
            self.client_id.as_str(),
            self.broker_host.as_str(),
            self.broker_port,
        );
        options.set_keep_alive(Duration::from_secs(u64::from(self.keep_alive_secs)));
        options
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.channel_capacity.max(1)
    }

    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(u64::from(self.reconnect_delay_secs.max(1)))
    }
}
