//! Service and interface addressing on the bus.
//!
//! A driver registers one service, exposing one interface. Output signals
//! and input slots hang off the interface URI:
//!
//! ```text
//! {base}/{name}/{service_type}/{iface_name}/{iface_type}/signal/{signal}
//! {base}/{name}/{service_type}/{iface_name}/{iface_type}/slot/{slot}
//! ```

/// A registered service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    uri: String,
}

impl Service {
    /// Register service `name` of type `service_type` under `base_uri`.
    ///
    /// Trailing slashes on `base_uri` are ignored.
    #[must_use]
    pub fn new(base_uri: &str, name: &str, service_type: &str) -> Self {
        let base = base_uri.trim_end_matches('/');
        Self {
            uri: format!("{base}/{name}/{service_type}"),
        }
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Register interface `name` of type `iface_type` on this service.
    #[must_use]
    pub fn interface(&self, name: &str, iface_type: &str) -> Interface {
        Interface {
            uri: format!("{}/{name}/{iface_type}", self.uri),
        }
    }
}

/// A registered interface exposing named signals and slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    uri: String,
}

impl Interface {
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// URI readings for output `signal` are published on.
    #[must_use]
    pub fn signal_uri(&self, signal: &str) -> String {
        format!("{}/signal/{signal}", self.uri)
    }

    /// URI commands for input `slot` are received on.
    #[must_use]
    pub fn slot_uri(&self, slot: &str) -> String {
        format!("{}/slot/{slot}", self.uri)
    }
}
