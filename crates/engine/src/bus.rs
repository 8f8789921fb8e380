// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event bus
//!
//! Registration mutates the listener set and marks the event type's cache
//! slot stale. Each post first recompiles every stale slot, then looks the
//! event's slot up by id and runs it.
//!
//! A bus is `Send` but not `Sync`: registration and dispatch on one bus are
//! serialized by ownership. No borrow of the listener set or cache is held
//! while listeners run.

use crate::cache::{ChainCache, Slot};
use crate::chain::DispatchChain;
use crate::composite::CompositeListener;
use crate::error::BusError;
use crate::inbox::InvalidationInbox;
use crate::listener::SingularListener;
use crate::listeners::ListenerSet;
use phasebus_core::{
    BusConfig, DeadEvent, Event, EventId, EventKey, EventRegistry, SubscriptionId,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::Arc;

/// Posting events
pub trait Dispatch {
    /// Dispatches a caller-owned event in place
    fn post_mut<E: Event>(&self, event: &mut E) -> Result<(), BusError>;

    /// Dispatches `event` and hands the same instance back
    fn post<E: Event>(&self, mut event: E) -> Result<E, BusError> {
        self.post_mut(&mut event)?;
        Ok(event)
    }
}

/// Registering and unregistering listeners
pub trait ListenerScope {
    fn register<E: Event>(&self, listener: &SingularListener<E>) -> Result<(), BusError>;

    /// Removes one registration of `listener`
    fn unregister<E: Event>(&self, listener: &SingularListener<E>) -> Result<(), BusError>;

    /// Registers every member; nothing is registered if any member fails
    /// validation
    fn register_composite(&self, composite: &CompositeListener) -> Result<(), BusError>;

    /// Unregisters every member; nothing is removed if any member is missing
    fn unregister_composite(&self, composite: &CompositeListener) -> Result<(), BusError>;
}

pub struct EventBus {
    name: String,
    registry: EventRegistry,
    catch_panics: bool,
    listeners: RefCell<ListenerSet>,
    cache: RefCell<ChainCache>,
    inbox: Arc<InvalidationInbox>,
    subscription: Cell<Option<SubscriptionId>>,
    closed: Cell<bool>,
}

impl EventBus {
    /// Bus with the default configuration
    pub fn new(registry: EventRegistry) -> Self {
        Self::with_config(registry, &BusConfig::default())
    }

    pub fn with_config(registry: EventRegistry, config: &BusConfig) -> Self {
        let inbox = Arc::new(InvalidationInbox::new());
        let subscription = registry.subscribe(Arc::clone(&inbox) as _);
        tracing::debug!(bus = %config.name, "event bus created");
        Self {
            name: config.name.clone(),
            registry,
            catch_panics: config.catch_panics,
            listeners: RefCell::new(ListenerSet::new()),
            cache: RefCell::new(ChainCache::new(config.cache_capacity())),
            inbox,
            subscription: Cell::new(Some(subscription)),
            closed: Cell::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    /// Total registrations across all event types
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn listener_count_of<E: Event>(&self) -> usize {
        self.listeners.borrow().count_of(EventKey::of::<E>())
    }

    /// Current registrations for `E`, in registration order
    pub fn listeners<E: Event>(&self) -> Vec<SingularListener<E>> {
        self.listeners.borrow().listeners::<E>().to_vec()
    }

    /// Closes the bus, releasing its listeners and chains
    ///
    /// Register and post fail with [`BusError::Closed`] afterwards. Closing
    /// twice is a no-op.
    pub fn close(&self) {
        if self.closed.replace(true) {
            return;
        }
        if let Some(id) = self.subscription.take() {
            self.registry.unsubscribe(id);
        }
        self.listeners.borrow_mut().clear();
        self.cache.borrow_mut().clear();
        tracing::debug!(bus = %self.name, "event bus closed");
    }

    fn ensure_open(&self, key: EventKey) -> Result<(), BusError> {
        if self.closed.get() {
            return Err(BusError::Closed {
                bus: self.name.clone(),
                event_type: key.name(),
            });
        }
        Ok(())
    }

    /// Applies pending ordering changes and recompiles stale slots
    fn refresh(&self) -> Result<(), BusError> {
        let changed = self.inbox.drain();
        if !changed.is_empty() {
            let listeners = self.listeners.borrow();
            let mut cache = self.cache.borrow_mut();
            for key in changed {
                if listeners.contains_type(key) {
                    cache.invalidate(key);
                }
            }
        }

        let dirty = self.cache.borrow_mut().take_dirty();
        if dirty.is_empty() {
            return Ok(());
        }

        let listeners = self.listeners.borrow();
        let mut cache = self.cache.borrow_mut();
        let mut pending = dirty.into_iter();
        while let Some(key) = pending.next() {
            match self.compile(&listeners, key) {
                Ok((id, slot)) => cache.install(id, slot),
                Err(err) => {
                    cache.restore_dirty(std::iter::once(key).chain(pending));
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    fn compile(
        &self,
        listeners: &ListenerSet,
        key: EventKey,
    ) -> Result<(EventId, Slot), BusError> {
        let id = self.registry.id_of_key(key)?;
        let slot = listeners.compile(key, &self.registry)?;
        tracing::debug!(
            bus = %self.name,
            event_type = key.name(),
            id = id.get(),
            listeners = listeners.count_of(key),
            "compiled dispatch chain"
        );
        Ok((id, slot))
    }

    fn track<E: Event>(&self, listener: &SingularListener<E>, action: &'static str) {
        tracing::trace!(
            bus = %self.name,
            event_type = listener.event_type().name(),
            phase = listener.phase(),
            priority = listener.priority(),
            "{action} listener"
        );
    }
}

impl Dispatch for EventBus {
    fn post_mut<E: Event>(&self, event: &mut E) -> Result<(), BusError> {
        let key = EventKey::of::<E>();
        self.ensure_open(key)?;
        self.refresh()?;

        let id = self.registry.id_of::<E>()?;
        let slot = self.cache.borrow_mut().slot(id);
        match slot {
            Slot::Inert => {}
            Slot::DeadEvent => {
                self.post_mut(&mut DeadEvent::new(key, id))?;
            }
            Slot::Chain(chain) => {
                let chain = chain.downcast_ref::<DispatchChain<E>>().ok_or_else(|| {
                    BusError::SlotMismatch {
                        bus: self.name.clone(),
                        event_type: key.name(),
                    }
                })?;
                chain.invoke(event, self.catch_panics).map_err(|failure| {
                    tracing::debug!(
                        bus = %self.name,
                        event_type = key.name(),
                        position = failure.position,
                        listeners = chain.len(),
                        error = %failure.source,
                        "listener failed"
                    );
                    BusError::DispatchFailure {
                        bus: self.name.clone(),
                        event_type: key.name(),
                        position: failure.position,
                        source: failure.source,
                    }
                })?;
            }
        }

        event.finish();
        Ok(())
    }
}

impl ListenerScope for EventBus {
    fn register<E: Event>(&self, listener: &SingularListener<E>) -> Result<(), BusError> {
        let key = EventKey::of::<E>();
        self.ensure_open(key)?;
        listener.prepare(&self.registry)?;
        self.listeners.borrow_mut().push(listener.clone());
        self.cache.borrow_mut().invalidate(key);
        self.track(listener, "registered");
        Ok(())
    }

    fn unregister<E: Event>(&self, listener: &SingularListener<E>) -> Result<(), BusError> {
        let key = EventKey::of::<E>();
        self.ensure_open(key)?;
        if !self.listeners.borrow_mut().remove(listener) {
            return Err(BusError::UnknownListener {
                bus: self.name.clone(),
                event_type: key.name(),
            });
        }
        self.cache.borrow_mut().invalidate(key);
        self.track(listener, "unregistered");
        Ok(())
    }

    fn register_composite(&self, composite: &CompositeListener) -> Result<(), BusError> {
        let members = composite.erased_members();
        for member in members {
            self.ensure_open(member.info().event_type())?;
            member.prepare(&self.registry)?;
        }

        let mut listeners = self.listeners.borrow_mut();
        let mut cache = self.cache.borrow_mut();
        for member in members {
            member.add_to(&mut listeners);
            cache.invalidate(member.info().event_type());
        }
        tracing::trace!(
            bus = %self.name,
            owner = composite.owner(),
            members = members.len(),
            "registered composite listener"
        );
        Ok(())
    }

    fn unregister_composite(&self, composite: &CompositeListener) -> Result<(), BusError> {
        let members = composite.erased_members();

        // A member may appear more than once; each appearance needs its own
        // registration.
        let mut needed: HashMap<usize, usize> = HashMap::new();
        for member in members {
            *needed.entry(member.identity()).or_default() += 1;
        }

        let mut listeners = self.listeners.borrow_mut();
        for member in members {
            let key = member.info().event_type();
            self.ensure_open(key)?;
            let required = needed.get(&member.identity()).copied().unwrap_or(1);
            if member.occurrences_in(&listeners) < required {
                return Err(BusError::UnknownListener {
                    bus: self.name.clone(),
                    event_type: key.name(),
                });
            }
        }

        let mut cache = self.cache.borrow_mut();
        for member in members {
            member.remove_from(&mut listeners);
            cache.invalidate(member.info().event_type());
        }
        tracing::trace!(
            bus = %self.name,
            owner = composite.owner(),
            members = members.len(),
            "unregistered composite listener"
        );
        Ok(())
    }
}

impl Default for EventBus {
    /// Bus on the process-wide registry
    fn default() -> Self {
        Self::new(EventRegistry::global())
    }
}

impl Drop for EventBus {
    fn drop(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.registry.unsubscribe(id);
        }
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
