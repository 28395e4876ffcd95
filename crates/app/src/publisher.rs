//! Publisher — encodes readings and emits them on the interface's signals.

use std::collections::BTreeMap;

use serde::Serialize;
use telebridge_domain::error::BridgeError;
use telebridge_domain::payload::{Message, PayloadObject, PoNum};
use telebridge_domain::reading::Reading;
use telebridge_domain::signal::SignalSpec;

use crate::interface::{Interface, Service};
use crate::ports::Bus;

/// Metadata key carrying a signal's unit of measure.
pub const UNIT_OF_MEASURE: &str = "UnitofMeasure";

/// Emits readings for one registered interface.
pub struct Publisher<B> {
    bus: B,
    service: Service,
    interface: Interface,
    po_num: PoNum,
}

impl<B: Bus> Publisher<B> {
    /// Publish on `interface`, encoding readings under `po_num`.
    pub fn new(bus: B, service: Service, interface: Interface, po_num: PoNum) -> Self {
        Self {
            bus,
            service,
            interface,
            po_num,
        }
    }

    #[must_use]
    pub fn interface(&self) -> &Interface {
        &self.interface
    }

    /// Attach static metadata: the unit of every signal that has one, then
    /// each `extra` pair on the service URI.
    ///
    /// Returns the number of pairs written. Failures are logged and skipped.
    pub async fn register(&self, specs: &[SignalSpec], extra: &BTreeMap<String, String>) -> usize {
        let mut pairs: Vec<(String, &str, &str)> = Vec::new();
        for spec in specs {
            if let Some(unit) = spec.unit {
                pairs.push((self.interface.signal_uri(spec.name), UNIT_OF_MEASURE, unit));
            }
        }
        for (key, value) in extra {
            pairs.push((self.service.uri().to_string(), key.as_str(), value.as_str()));
        }

        let mut written = 0;
        for (uri, key, value) in pairs {
            match self.bus.set_metadata(&uri, key, value).await {
                Ok(()) => written += 1,
                Err(err) => tracing::warn!(%err, %uri, key, "failed to set metadata"),
            }
        }
        written
    }

    /// Encode `reading` and emit it on `signal`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Payload`] if encoding fails or
    /// [`BridgeError::Bus`] if the bus rejects the message.
    pub async fn publish<V: Serialize + Sync>(
        &self,
        signal: &str,
        reading: &Reading<V>,
    ) -> Result<(), BridgeError> {
        let po = PayloadObject::encode(self.po_num, reading)?;
        self.bus
            .publish(&self.interface.signal_uri(signal), Message::single(po))
            .await?;
        Ok(())
    }
}
