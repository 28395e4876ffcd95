//! Virtual light — on/off state plus a brightness level.

use telebridge_app::ports::{Light, StatusSource};
use telebridge_domain::error::DeviceError;
use telebridge_domain::summary::LightStatus;

/// Highest accepted brightness level.
pub const MAX_BRIGHTNESS: i64 = 100;

/// A simulated dimmable light. Starts off, at brightness 0.
#[derive(Debug, Default)]
pub struct VirtualLight {
    status: LightStatus,
}

impl VirtualLight {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusSource for VirtualLight {
    type Status = LightStatus;

    async fn get_status(&mut self) -> Result<LightStatus, DeviceError> {
        Ok(self.status)
    }
}

impl Light for VirtualLight {
    async fn set_state(&mut self, on: bool) -> Result<(), DeviceError> {
        tracing::debug!(on, "virtual light switched");
        self.status.state = on;
        Ok(())
    }

    async fn set_brightness(&mut self, level: i64) -> Result<(), DeviceError> {
        if !(0..=MAX_BRIGHTNESS).contains(&level) {
            return Err(DeviceError::OutOfRange {
                field: "brightness",
                value: level,
            });
        }
        tracing::debug!(level, "virtual light dimmed");
        self.status.brightness = level;
        Ok(())
    }
}
