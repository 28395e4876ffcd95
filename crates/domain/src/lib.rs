//! # telebridge-domain
//!
//! Pure domain model for the telebridge device/telemetry bridge.
//!
//! ## Responsibilities
//! - Foundational types: signal identifiers, error conventions, timestamps
//! - Define **Readings** (timestamped, identified measurements ready for the bus)
//! - Define **Summaries** (device snapshots produced by an adapter on each poll)
//! - Define **Commands** (actuation requests received from the bus)
//! - Define the **wire payload** framing (payload-type numbers + CBOR objects)
//! - Parse poll interval duration strings
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod command;
pub mod duration;
pub mod payload;
pub mod reading;
pub mod signal;
pub mod summary;
