// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! phasebus dispatch engine
//!
//! Listener model, per-bus listener sets, compiled dispatch chains and the
//! buses that post events through them.

mod bus;
mod cache;
mod chain;
mod composite;
mod error;
mod gate;
mod inbox;
pub mod listener;
mod listeners;

pub use bus::{Dispatch, EventBus, ListenerScope};
pub use composite::{CompositeBuilder, CompositeListener};
pub use error::{BusError, ListenerError, ListenerPanic, ListenerResult};
pub use gate::{DispatchGate, ManagedBus};
pub use listener::{priority, ListenerBuilder, ListenerInfo, SingularListener};
