//! # telebridge-adapter-mqtt
//!
//! MQTT adapter: carries bus messages over an MQTT broker.
//!
//! ## Mapping
//! - a bus URI is used verbatim as the MQTT topic
//! - a [`Message`] travels as its CBOR frame ([`Message::to_bytes`])
//! - metadata is published retained on `{uri}/!meta/{key}` as UTF-8 text
//!
//! Frames that fail to decode are logged and dropped. Connection errors are
//! logged and the event loop retries after a short pause; active
//! subscriptions are restored on every reconnect after the first connection.
//!
//! ## Dependency rule
//! Depends on `telebridge-app` (for the [`Bus`] port) and `telebridge-domain`.

pub mod config;
pub mod error;
mod subscriptions;

use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, Packet, QoS};
use telebridge_app::ports::Bus;
use telebridge_domain::error::BusError;
use telebridge_domain::payload::Message;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub use config::MqttConfig;
pub use error::MqttError;

use subscriptions::Subscriptions;

/// Topic carrying metadata `key` for `uri`.
#[must_use]
pub fn metadata_topic(uri: &str, key: &str) -> String {
    format!("{uri}/!meta/{key}")
}

/// [`Bus`] implementation backed by an MQTT broker.
#[derive(Clone)]
pub struct MqttBus {
    client: AsyncClient,
    subscriptions: Arc<Subscriptions>,
}

impl MqttBus {
    /// Create the client and spawn its event loop.
    ///
    /// The returned handle runs until aborted; the connection is established
    /// lazily by the event loop.
    #[must_use]
    pub fn connect(config: &MqttConfig) -> (Self, JoinHandle<()>) {
        let capacity = config.capacity();
        let (client, event_loop) = AsyncClient::new(config.options(), capacity);
        let subscriptions = Arc::new(Subscriptions::new(capacity));

        tracing::info!(
            host = %config.broker_host,
            port = config.broker_port,
            client_id = %config.client_id,
            "starting MQTT bus"
        );
        let handle = tokio::spawn(drive(
            event_loop,
            client.clone(),
            Arc::clone(&subscriptions),
            config.reconnect_delay(),
        ));

        (
            Self {
                client,
                subscriptions,
            },
            handle,
        )
    }
}

impl Bus for MqttBus {
    async fn publish(&self, uri: &str, message: Message) -> Result<(), BusError> {
        let frame = message.to_bytes().map_err(MqttError::Frame)?;
        self.client
            .publish(uri, QoS::AtLeastOnce, false, frame)
            .await
            .map_err(MqttError::Client)?;
        Ok(())
    }

    async fn subscribe(&self, uri: &str) -> Result<mpsc::Receiver<Message>, BusError> {
        let rx = self.subscriptions.register(uri);
        self.client
            .subscribe(uri, QoS::AtLeastOnce)
            .await
            .map_err(MqttError::Client)?;
        tracing::debug!(topic = uri, "subscribed");
        Ok(rx)
    }

    async fn set_metadata(&self, uri: &str, key: &str, value: &str) -> Result<(), BusError> {
        self.client
            .publish(
                metadata_topic(uri, key),
                QoS::AtLeastOnce,
                true,
                value.as_bytes().to_vec(),
            )
            .await
            .map_err(MqttError::Client)?;
        Ok(())
    }
}

/// Broker session history.
///
/// Subscriptions made through [`Bus::subscribe`] are queued on the client
/// and reach the broker with the first connection; only later connections
/// need them replayed.
#[derive(Debug, Default)]
struct Session {
    connected_before: bool,
}

impl Session {
    /// Topics to subscribe again after a `ConnAck`.
    fn on_connected(&mut self, subscriptions: &Subscriptions) -> Vec<String> {
        if std::mem::replace(&mut self.connected_before, true) {
            subscriptions.topics()
        } else {
            Vec::new()
        }
    }
}

async fn drive(
    mut event_loop: EventLoop,
    client: AsyncClient,
    subscriptions: Arc<Subscriptions>,
    reconnect_delay: Duration,
) {
    let mut session = Session::default();
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                subscriptions.dispatch(&publish.topic, &publish.payload);
            }
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                tracing::info!("connected to MQTT broker");
                // the request queue is drained by this loop, so never await it here
                for topic in session.on_connected(&subscriptions) {
                    if let Err(err) = client.try_subscribe(topic.as_str(), QoS::AtLeastOnce) {
                        tracing::warn!(topic = %topic, error = %err, "failed to restore subscription");
                    }
                }
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(error = %err, "MQTT connection error, retrying");
                tokio::time::sleep(reconnect_delay).await;
            }
        }
    }
}
