//! Output signal descriptors.

use crate::id::SignalId;

/// Watts.
pub const UNIT_WATT: &str = "W";
/// Watt-hours.
pub const UNIT_WATT_HOUR: &str = "Wh";

/// A named output signal with its derived identifier and optional unit.
///
/// The set of specs a driver publishes is fixed when the driver is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalSpec {
    pub name: &'static str,
    pub unit: Option<&'static str>,
    pub id: SignalId,
}

impl SignalSpec {
    /// Describe signal `name`, deriving its identifier once.
    #[must_use]
    pub fn new(name: &'static str, unit: Option<&'static str>) -> Self {
        Self {
            name,
            unit,
            id: SignalId::for_signal(name),
        }
    }
}
