//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`BridgeError`]
//! via `#[from]` when crossing a port boundary.

use std::error::Error as StdError;

/// Boxed error type used to carry transport or driver specific sources.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Top-level error for the bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("device error")]
    Device(#[from] DeviceError),

    #[error("payload error")]
    Payload(#[from] PayloadError),

    #[error("bus error")]
    Bus(#[from] BusError),
}

/// Failure reported by a device adapter.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The device or remote API could not be reached.
    #[error("device unavailable")]
    Unavailable,

    /// A value sent to the device is outside of what it accepts.
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: i64 },

    /// Driver-level I/O failure.
    #[error("device I/O failure")]
    Io(#[source] BoxError),
}

/// Failure while building or reading a wire payload.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// A payload-type number was not in `a.b.c.d` form.
    #[error("invalid payload object number: {0:?}")]
    InvalidPoNum(String),

    #[error("failed to encode payload")]
    Encode(#[source] serde_cbor::Error),

    #[error("failed to decode payload")]
    Decode(#[source] serde_cbor::Error),
}

/// Failure while talking to the message bus.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// The bus connection or subscription has been closed.
    #[error("bus closed")]
    Closed,

    /// The underlying transport rejected the operation.
    #[error("bus transport error")]
    Transport(#[source] BoxError),
}

/// Failure while parsing a duration string such as `"30s"`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,

    #[error("negative durations are not supported: {0:?}")]
    Negative(String),

    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },

    #[error("invalid number in duration {0:?}")]
    InvalidNumber(String),

    #[error("duration {0:?} overflows")]
    Overflow(String),
}
