//! Device ports — the opaque capabilities a device adapter exposes.
//!
//! The adapter owns all live device or session state. Both the poll path
//! and the command path reach it through a [`SharedDevice`], so a poll can
//! never interleave with a half-applied command.

use std::future::Future;
use std::sync::Arc;

use telebridge_domain::error::DeviceError;
use telebridge_domain::summary::LightStatus;
use tokio::sync::Mutex;

/// A device that can report a snapshot of its current state.
pub trait StatusSource: Send {
    /// Snapshot type produced on each poll.
    type Status: std::fmt::Debug + Send + Sync + 'static;

    /// Query the device for its current state.
    fn get_status(&mut self) -> impl Future<Output = Result<Self::Status, DeviceError>> + Send;
}

/// A dimmable light that reports [`LightStatus`] and accepts actuation.
pub trait Light: StatusSource<Status = LightStatus> {
    /// Switch the light on (`true`) or off (`false`).
    fn set_state(&mut self, on: bool) -> impl Future<Output = Result<(), DeviceError>> + Send;

    /// Set the brightness level.
    fn set_brightness(&mut self, level: i64)
    -> impl Future<Output = Result<(), DeviceError>> + Send;
}

/// Single-owner handle to a device, shared by the poll and command tasks.
pub type SharedDevice<D> = Arc<Mutex<D>>;

/// Wrap a device so it can be shared between tasks.
pub fn share<D>(device: D) -> SharedDevice<D> {
    Arc::new(Mutex::new(device))
}
