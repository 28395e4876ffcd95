//! # telebridge-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `Bus` — publish messages, subscribe to slots, attach metadata
//!   - `StatusSource` — read a device snapshot
//!   - `Light` — a status source that can also be actuated
//! - Provide the use-cases:
//!   - `Normalizer` — stamp raw values into readings
//!   - `Publisher` — encode readings and emit them on named signals
//!   - `PollScheduler` — pull-mode and push-mode poll loops
//!   - `CommandIntake` — validate, decode and apply actuation commands
//!   - `LightDriver` / `MeterDriver` — wire the above into running tasks
//! - Provide **in-process infrastructure** (a local bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `telebridge-domain` only (plus `tokio` for tasks, channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod bus;
pub mod driver;
pub mod intake;
pub mod interface;
pub mod normalizer;
pub mod poller;
pub mod ports;
pub mod publisher;
pub mod scheduler;
pub mod signals;
