//! # telebridge-adapter-virtual
//!
//! Simulated devices standing in for real hardware or vendor APIs.
//!
//! ## Provided devices
//!
//! | Device | Port | Behaviour |
//! |--------|------|-----------|
//! | [`VirtualLight`] | `Light` | Holds on/off state and a 0–100 brightness level |
//! | [`VirtualMeter`] | `StatusSource<Status = MeterSummary>` | Simulated solar production; owns its polling cadence |
//!
//! ## Dependency rule
//!
//! Depends on `telebridge-app` (port traits) and `telebridge-domain` only.

mod devices;

pub use devices::{VirtualLight, VirtualMeter};
