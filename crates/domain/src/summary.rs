//! Device snapshots produced by adapters on each poll.

use serde::{Deserialize, Serialize};

/// Energy meter snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterSummary {
    /// Instantaneous production, in watts.
    pub current_power: u64,
    /// Energy produced since installation, in watt-hours.
    pub energy_lifetime: u64,
    /// Energy produced since local midnight, in watt-hours.
    pub energy_today: u64,
}

/// Light snapshot. Also the value of the light's `info` reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightStatus {
    #[serde(rename = "State")]
    pub state: bool,
    #[serde(rename = "Brightness")]
    pub brightness: i64,
}
