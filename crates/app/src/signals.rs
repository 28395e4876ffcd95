//! Signal sets — the fixed list of output signals a driver publishes and how
//! one device snapshot expands into one reading per signal.

use serde::Serialize;
use telebridge_domain::payload::{LIGHT_STATE, PoNum, TIMESERIES_READING};
use telebridge_domain::reading::Reading;
use telebridge_domain::signal::{SignalSpec, UNIT_WATT, UNIT_WATT_HOUR};
use telebridge_domain::summary::{LightStatus, MeterSummary};

use crate::normalizer::Normalizer;

/// A reading addressed to a named output signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedReading<V> {
    pub signal: &'static str,
    pub reading: Reading<V>,
}

/// The output signals of one driver.
pub trait SignalSet: Send + Sync {
    /// Device snapshot consumed on each poll.
    type Status: std::fmt::Debug + Send + Sync + 'static;
    /// Value carried by each reading.
    type Value: Serialize + Send + Sync;

    /// Payload-type number readings are encoded under.
    const PO_NUM: PoNum;

    /// Signals published by this set, in publication order.
    fn specs(&self) -> &[SignalSpec];

    /// Expand one snapshot into one reading per signal, in [`specs`](Self::specs) order.
    fn expand(
        &self,
        status: &Self::Status,
        normalizer: &Normalizer,
    ) -> Vec<NamedReading<Self::Value>>;
}

/// `CurrentPower` (W), `EnergyLifetime` (Wh) and `EnergyToday` (Wh).
#[derive(Debug, Clone)]
pub struct MeterSignals {
    specs: [SignalSpec; 3],
}

impl Default for MeterSignals {
    fn default() -> Self {
        Self {
            specs: [
                SignalSpec::new("CurrentPower", Some(UNIT_WATT)),
                SignalSpec::new("EnergyLifetime", Some(UNIT_WATT_HOUR)),
                SignalSpec::new("EnergyToday", Some(UNIT_WATT_HOUR)),
            ],
        }
    }
}

impl SignalSet for MeterSignals {
    type Status = MeterSummary;
    type Value = u64;

    const PO_NUM: PoNum = TIMESERIES_READING;

    fn specs(&self) -> &[SignalSpec] {
        &self.specs
    }

    fn expand(&self, summary: &MeterSummary, normalizer: &Normalizer) -> Vec<NamedReading<u64>> {
        let [power, lifetime, today] = &self.specs;
        [
            (power, summary.current_power),
            (lifetime, summary.energy_lifetime),
            (today, summary.energy_today),
        ]
        .into_iter()
        .map(|(spec, value)| NamedReading {
            signal: spec.name,
            reading: normalizer.normalize(spec.id, value),
        })
        .collect()
    }
}

/// A single `info` signal carrying the whole [`LightStatus`].
#[derive(Debug, Clone)]
pub struct LightSignals {
    specs: [SignalSpec; 1],
}

impl Default for LightSignals {
    fn default() -> Self {
        Self {
            specs: [SignalSpec::new("info", None)],
        }
    }
}

impl SignalSet for LightSignals {
    type Status = LightStatus;
    type Value = LightStatus;

    const PO_NUM: PoNum = LIGHT_STATE;

    fn specs(&self) -> &[SignalSpec] {
        &self.specs
    }

    fn expand(
        &self,
        status: &LightStatus,
        normalizer: &Normalizer,
    ) -> Vec<NamedReading<LightStatus>> {
        let [info] = &self.specs;
        vec![NamedReading {
            signal: info.name,
            reading: normalizer.normalize(info.id, *status),
        }]
    }
}
