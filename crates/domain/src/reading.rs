//! Timestamped, identified measurements ready for publication.

use serde::{Deserialize, Serialize};

use crate::id::SignalId;
use crate::time::UnixNanos;

/// Canonical measurement emitted on an output signal.
///
/// Field names on the wire are `UUID`, `Time` and `Value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading<V> {
    #[serde(rename = "UUID")]
    pub uuid: SignalId,
    #[serde(rename = "Time")]
    pub time: UnixNanos,
    #[serde(rename = "Value")]
    pub value: V,
}

impl<V> Reading<V> {
    #[must_use]
    pub fn new(uuid: SignalId, time: UnixNanos, value: V) -> Self {
        Self { uuid, time, value }
    }
}
