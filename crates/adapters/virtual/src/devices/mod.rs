//! Virtual devices.

mod light;
mod meter;

pub use light::VirtualLight;
pub use meter::VirtualMeter;
