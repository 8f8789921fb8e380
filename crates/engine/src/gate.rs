// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch gate and the managed bus it guards
//!
//! While the gate is disabled every post fails with
//! [`BusError::DispatchDisabled`] before any listener runs. Registration is
//! unaffected, which is the point: listeners can be bulk-registered without a
//! stray post reaching a half-registered bus.

use crate::bus::{Dispatch, EventBus, ListenerScope};
use crate::composite::CompositeListener;
use crate::error::BusError;
use crate::listener::SingularListener;
use phasebus_core::{BusConfig, Event, EventKey, EventRegistry};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct GateState {
    disabled: AtomicBool,
    reason: Mutex<Option<String>>,
}

/// Cloneable handle to a bus's dispatch switch
#[derive(Clone, Default)]
pub struct DispatchGate {
    state: Arc<GateState>,
}

impl DispatchGate {
    /// An enabled gate
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disable_dispatch(&self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::debug!(reason = %reason, "dispatch disabled");
        *self.state.reason.lock().unwrap_or_else(|e| e.into_inner()) = Some(reason);
        self.state.disabled.store(true, Ordering::Release);
    }

    pub fn enable_dispatch(&self) {
        self.state.disabled.store(false, Ordering::Release);
        self.state
            .reason
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        tracing::debug!("dispatch enabled");
    }

    pub fn is_enabled(&self) -> bool {
        !self.state.disabled.load(Ordering::Acquire)
    }

    /// Why dispatch is disabled, or `None` while enabled
    pub fn disabled_reason(&self) -> Option<String> {
        if self.is_enabled() {
            return None;
        }
        self.state
            .reason
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl std::fmt::Debug for DispatchGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchGate")
            .field("disabled_reason", &self.disabled_reason())
            .finish()
    }
}

/// An [`EventBus`] behind a [`DispatchGate`]
pub struct ManagedBus {
    bus: EventBus,
    gate: DispatchGate,
}

impl ManagedBus {
    pub fn new(registry: EventRegistry) -> Self {
        Self::with_config(registry, &BusConfig::default())
    }

    /// Starts disabled when the config names a `dispatch_disabled` reason
    pub fn with_config(registry: EventRegistry, config: &BusConfig) -> Self {
        let gate = DispatchGate::new();
        if let Some(reason) = &config.dispatch_disabled {
            gate.disable_dispatch(reason.clone());
        }
        Self {
            bus: EventBus::with_config(registry, config),
            gate,
        }
    }

    /// Handle that toggles dispatch on this bus without owning it
    pub fn gate(&self) -> DispatchGate {
        self.gate.clone()
    }

    pub fn disable_dispatch(&self, reason: impl Into<String>) {
        self.gate.disable_dispatch(reason);
    }

    pub fn enable_dispatch(&self) {
        self.gate.enable_dispatch();
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn name(&self) -> &str {
        self.bus.name()
    }

    pub fn close(&self) {
        self.bus.close();
    }
}

impl Dispatch for ManagedBus {
    fn post_mut<E: Event>(&self, event: &mut E) -> Result<(), BusError> {
        if let Some(reason) = self.gate.disabled_reason() {
            let event_type = EventKey::of::<E>().name();
            tracing::debug!(bus = self.name(), event_type, reason = %reason, "post rejected");
            return Err(BusError::DispatchDisabled {
                bus: self.name().to_string(),
                event_type,
                reason,
            });
        }
        self.bus.post_mut(event)
    }
}

impl ListenerScope for ManagedBus {
    fn register<E: Event>(&self, listener: &SingularListener<E>) -> Result<(), BusError> {
        self.bus.register(listener)
    }

    fn unregister<E: Event>(&self, listener: &SingularListener<E>) -> Result<(), BusError> {
        self.bus.unregister(listener)
    }

    fn register_composite(&self, composite: &CompositeListener) -> Result<(), BusError> {
        self.bus.register_composite(composite)
    }

    fn unregister_composite(&self, composite: &CompositeListener) -> Result<(), BusError> {
        self.bus.unregister_composite(composite)
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
