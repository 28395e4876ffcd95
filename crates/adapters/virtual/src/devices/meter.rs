//! Virtual energy meter — a simulated solar installation.
//!
//! Production follows a half-sine between 06:00 and 18:00 UTC, peaking at
//! noon. Energy counters integrate the power seen at each poll over the time
//! elapsed since the previous one; today's counter restarts at each UTC
//! date change.

use std::f64::consts::PI;
use std::time::Duration;

use chrono::Timelike;
use telebridge_app::poller::spawn_poller;
use telebridge_app::ports::{StatusSource, share};
use telebridge_domain::error::DeviceError;
use telebridge_domain::summary::MeterSummary;
use telebridge_domain::time::{Timestamp, now};
use tokio::sync::mpsc;

const SUNRISE_HOUR: f64 = 6.0;
const DAYLIGHT_HOURS: f64 = 12.0;
const SUMMARY_BUFFER: usize = 4;

/// A simulated meter that owns its polling cadence.
#[derive(Debug)]
pub struct VirtualMeter {
    peak_watts: u64,
    lifetime_wh: f64,
    today_wh: f64,
    last_sample: Option<Timestamp>,
}

impl VirtualMeter {
    /// A meter peaking at `peak_watts`, with `lifetime_wh` already recorded.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(peak_watts: u64, lifetime_wh: u64) -> Self {
        Self {
            peak_watts,
            lifetime_wh: lifetime_wh as f64,
            today_wh: 0.0,
            last_sample: None,
        }
    }

    /// Start polling every `period` and return the stream of summaries.
    ///
    /// Polling stops when the receiver is dropped.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero or when called outside of a tokio runtime.
    pub fn poll_summary(self, period: Duration) -> mpsc::Receiver<MeterSummary> {
        tracing::info!(peak_watts = self.peak_watts, ?period, "virtual meter polling");
        spawn_poller(share(self), period, SUMMARY_BUFFER)
    }

    /// Simulated production at `at`, in watts.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn power_at(&self, at: Timestamp) -> u64 {
        let hour = f64::from(at.hour())
            + f64::from(at.minute()) / 60.0
            + f64::from(at.second()) / 3600.0;
        let phase = (hour - SUNRISE_HOUR) / DAYLIGHT_HOURS;
        if !(0.0..=1.0).contains(&phase) {
            return 0;
        }
        (self.peak_watts as f64 * (PI * phase).sin()).round().max(0.0) as u64
    }

    /// Advance the simulation to `at` and return the resulting summary.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn sample_at(&mut self, at: Timestamp) -> MeterSummary {
        let power = self.power_at(at);

        if let Some(previous) = self.last_sample {
            if previous.date_naive() != at.date_naive() {
                self.today_wh = 0.0;
            }
            let elapsed = (at - previous).num_milliseconds().max(0) as f64 / 1000.0;
            let energy = power as f64 * elapsed / 3600.0;
            self.lifetime_wh += energy;
            self.today_wh += energy;
        }
        self.last_sample = Some(at);

        MeterSummary {
            current_power: power,
            energy_lifetime: self.lifetime_wh as u64,
            energy_today: self.today_wh as u64,
        }
    }
}

impl StatusSource for VirtualMeter {
    type Status = MeterSummary;

    async fn get_status(&mut self) -> Result<MeterSummary, DeviceError> {
        Ok(self.sample_at(now()))
    }
}
