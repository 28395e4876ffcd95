//! Drivers — wire a bus and a device into running poll and command tasks.
//!
//! The caller constructs the bus and the device explicitly and hands them
//! over; the driver owns nothing global. Each driver registers one service
//! with one interface:
//!
//! | Driver | Service type | Interface | Signals | Slots |
//! |--------|--------------|-----------|---------|-------|
//! | [`MeterDriver`] | `s.meter` | `meter1` / `i.meter` | `CurrentPower`, `EnergyLifetime`, `EnergyToday` | — |
//! | [`LightDriver`] | `s.vlight` | `vlight` / `i.xbos.light` | `info` | `state` |

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use telebridge_domain::error::BridgeError;
use telebridge_domain::summary::MeterSummary;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};

use crate::intake::CommandIntake;
use crate::interface::Service;
use crate::ports::{Bus, Light, SharedDevice};
use crate::publisher::Publisher;
use crate::scheduler::PollScheduler;
use crate::signals::{LightSignals, MeterSignals, SignalSet};

pub const METER_SERVICE_TYPE: &str = "s.meter";
pub const METER_INTERFACE: &str = "meter1";
pub const METER_INTERFACE_TYPE: &str = "i.meter";

pub const LIGHT_SERVICE_TYPE: &str = "s.vlight";
pub const LIGHT_INTERFACE: &str = "vlight";
pub const LIGHT_INTERFACE_TYPE: &str = "i.xbos.light";
/// Input slot accepting light commands.
pub const STATE_SLOT: &str = "state";

/// Settings shared by every driver, resolved from configuration at startup.
#[derive(Debug, Clone)]
pub struct DriverSettings {
    /// Base addressing prefix.
    pub base_uri: String,
    /// Service name under the base prefix.
    pub name: String,
    /// Poll period.
    pub poll_interval: Duration,
    /// Extra metadata attached to the service URI at registration.
    pub metadata: BTreeMap<String, String>,
}

/// Handles to the tasks a driver spawned.
pub struct DriverHandles {
    tasks: JoinSet<()>,
}

impl DriverHandles {
    /// Wait until any driver task ends.
    ///
    /// Returns `None` if no task was running.
    pub async fn wait(&mut self) -> Option<Result<(), JoinError>> {
        self.tasks.join_next().await
    }

    /// Abort every driver task.
    pub fn abort(&mut self) {
        self.tasks.abort_all();
    }

    /// Number of tasks still tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Push-mode energy meter driver.
pub struct MeterDriver;

impl MeterDriver {
    /// Register the meter interface and publish every summary received.
    ///
    /// The returned handles complete when `summaries` closes.
    pub async fn start<B>(
        bus: B,
        summaries: mpsc::Receiver<MeterSummary>,
        settings: &DriverSettings,
    ) -> DriverHandles
    where
        B: Bus + 'static,
    {
        let service = Service::new(&settings.base_uri, &settings.name, METER_SERVICE_TYPE);
        let interface = service.interface(METER_INTERFACE, METER_INTERFACE_TYPE);
        let signals = MeterSignals::default();
        let publisher = Publisher::new(bus, service, interface, MeterSignals::PO_NUM);
        publisher.register(signals.specs(), &settings.metadata).await;

        tracing::info!(
            interface = publisher.interface().uri(),
            "meter driver started"
        );

        let scheduler = PollScheduler::new(signals, publisher);
        let mut tasks = JoinSet::new();
        tasks.spawn(async move { scheduler.run_push(summaries).await });
        DriverHandles { tasks }
    }
}

/// Pull-mode light driver with command intake.
pub struct LightDriver;

impl LightDriver {
    /// Register the light interface, subscribe to its `state` slot and spawn
    /// the poll and command tasks. Both tasks share `light`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Bus`] if the slot subscription fails.
    ///
    /// # Panics
    ///
    /// The poll task panics if `settings.poll_interval` is zero.
    pub async fn start<B, L>(
        bus: B,
        light: SharedDevice<L>,
        settings: &DriverSettings,
    ) -> Result<DriverHandles, BridgeError>
    where
        B: Bus + Clone + 'static,
        L: Light + 'static,
    {
        let service = Service::new(&settings.base_uri, &settings.name, LIGHT_SERVICE_TYPE);
        let interface = service.interface(LIGHT_INTERFACE, LIGHT_INTERFACE_TYPE);
        let signals = LightSignals::default();
        let slot = interface.slot_uri(STATE_SLOT);
        let publisher = Publisher::new(bus.clone(), service, interface, LightSignals::PO_NUM);
        publisher.register(signals.specs(), &settings.metadata).await;

        let commands = bus.subscribe(&slot).await?;
        let intake = CommandIntake::new(Arc::clone(&light));
        let scheduler = PollScheduler::new(signals, publisher);
        let period = settings.poll_interval;

        tracing::info!(
            interface = scheduler.publisher().interface().uri(),
            poll_interval = ?period,
            "light driver started"
        );

        let mut tasks = JoinSet::new();
        tasks.spawn(async move { intake.run(commands).await });
        tasks.spawn(async move { scheduler.run_pull(light, period).await });
        Ok(DriverHandles { tasks })
    }
}
