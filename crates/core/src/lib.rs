// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! phasebus-core: shared, process-wide state for the phasebus dispatch engine
//!
//! This crate provides:
//! - The `Event` trait, cancel flags and the built-in `DeadEvent`
//! - Compact per-event-type identities (`EventId`, `EventKey`)
//! - Per-event-type phase graphs with deterministic, cycle-checked ordering
//! - `EventRegistry`, the shared handle every bus is built against
//! - `BusConfig`, loadable from TOML

pub mod config;
pub mod error;
pub mod event;
pub mod identity;
pub mod phase;
pub mod registry;

pub use config::BusConfig;
pub use error::{ConfigError, EventError, PhaseError, RegistryError};
pub use event::{CancelFlag, DeadEvent, Event, DEFAULT_PHASE};
pub use identity::{EventId, EventKey};
pub use phase::PhaseGraph;
pub use registry::{EventRegistry, OrderingSubscriber, SubscriptionId};
