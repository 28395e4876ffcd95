//! Actuation commands received from the bus.

use serde::{Deserialize, Serialize};

/// Requested light state. Both fields are applied, state first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    #[serde(rename = "State")]
    pub state: bool,
    #[serde(rename = "Brightness")]
    pub brightness: i64,
}
