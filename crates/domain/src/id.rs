//! Deterministic signal identifiers backed by name-based UUIDs.
//!
//! Every output signal is tagged with a [`SignalId`] derived from a fixed
//! namespace root and the signal name, so the same signal keeps the same
//! identifier across restarts and across deployments.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Namespace root shared by every deployment of this driver family.
pub const NAMESPACE_ROOT: uuid::Uuid =
    uuid::Uuid::from_u128(0xd8b6_1708_2797_11e6_836b_0cc4_7a0f_7eea);

/// Stable identifier for a logical signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalId(uuid::Uuid);

impl SignalId {
    /// Derive the identifier of `name` under `root` (UUID version 3).
    #[must_use]
    pub fn derive(root: uuid::Uuid, name: &str) -> Self {
        Self(uuid::Uuid::new_v3(&root, name.as_bytes()))
    }

    /// Derive the identifier of `name` under [`NAMESPACE_ROOT`].
    #[must_use]
    pub fn for_signal(name: &str) -> Self {
        Self::derive(NAMESPACE_ROOT, name)
    }

    /// Access the inner UUID.
    #[must_use]
    pub fn as_uuid(self) -> uuid::Uuid {
        self.0
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SignalId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_derive_same_id_when_called_twice() {
        assert_eq!(
            SignalId::for_signal("CurrentPower"),
            SignalId::for_signal("CurrentPower")
        );
    }

    #[test]
    fn should_derive_distinct_ids_for_distinct_names() {
        let names = ["CurrentPower", "EnergyLifetime", "EnergyToday", "info"];
        for (i, a) in names.iter().enumerate() {
            for b in &names[i + 1..] {
                assert_ne!(SignalId::for_signal(a), SignalId::for_signal(b));
            }
        }
    }

    #[test]
    fn should_match_known_values_across_restarts() {
        assert_eq!(
            SignalId::for_signal("CurrentPower").to_string(),
            "fb0e67f7-9eb9-3fa9-904e-28afca625564"
        );
        assert_eq!(
            SignalId::for_signal("EnergyLifetime").to_string(),
            "b3838e2d-62d7-35f3-8641-9009003f6e33"
        );
        assert_eq!(
            SignalId::for_signal("EnergyToday").to_string(),
            "7f59f2e8-9c47-3ab0-b4a4-cb7645b791d4"
        );
        assert_eq!(
            SignalId::for_signal("info").to_string(),
            "07317ac4-694e-3f79-bf5e-ed58e50e9291"
        );
    }

    #[test]
    fn should_depend_on_namespace_root() {
        let other_root = uuid::Uuid::from_u128(1);
        assert_ne!(
            SignalId::derive(other_root, "CurrentPower"),
            SignalId::for_signal("CurrentPower")
        );
    }

    #[test]
    fn should_produce_version_3_uuids() {
        assert_eq!(SignalId::for_signal("info").as_uuid().get_version_num(), 3);
    }

    #[test]
    fn should_parse_display_output() {
        let id = SignalId::for_signal("EnergyToday");
        let parsed: SignalId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn should_return_error_when_parsing_invalid_uuid() {
        assert!(SignalId::from_str("not-a-uuid").is_err());
    }
}
