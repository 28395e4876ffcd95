//! MQTT adapter error types.

use telebridge_domain::error::{BridgeError, BusError, PayloadError};

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The rumqttc client rejected a request.
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),

    /// A message could not be framed for, or read from, the wire.
    #[error("failed to frame MQTT payload")]
    Frame(#[source] PayloadError),
}

impl From<MqttError> for BusError {
    fn from(err: MqttError) -> Self {
        Self::Transport(Box::new(err))
    }
}

impl From<MqttError> for BridgeError {
    fn from(err: MqttError) -> Self {
        Self::Bus(err.into())
    }
}
