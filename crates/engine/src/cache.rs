// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Id-indexed cache of compiled dispatch chains

use phasebus_core::{EventId, EventKey};
use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;

/// What a post of one event type does
#[derive(Clone)]
pub(crate) enum Slot {
    /// Re-post as a `DeadEvent`
    DeadEvent,
    /// Do nothing; the dead-event type's own terminal case
    Inert,
    /// A `DispatchChain<E>` for the slot's event type
    Chain(Arc<dyn Any + Send + Sync>),
}

impl Slot {
    /// Slot of an event type without listeners
    pub(crate) fn fallback_for(key: EventKey) -> Self {
        if key.is_dead_event() {
            Slot::Inert
        } else {
            Slot::DeadEvent
        }
    }
}

/// Dense slot array plus the set of event types whose slot is stale
pub(crate) struct ChainCache {
    slots: Vec<Slot>,
    dirty: HashSet<EventKey>,
}

impl ChainCache {
    pub(crate) fn new(capacity: usize) -> Self {
        let slots = (0..capacity.max(1))
            .map(|index| {
                if index == EventId::DEAD_EVENT.index() {
                    Slot::Inert
                } else {
                    Slot::DeadEvent
                }
            })
            .collect();
        Self {
            slots,
            dirty: HashSet::new(),
        }
    }

    /// Slot for `id`, growing the array if needed
    pub(crate) fn slot(&mut self, id: EventId) -> Slot {
        self.ensure_capacity(id);
        self.slots.get(id.index()).cloned().unwrap_or(Slot::DeadEvent)
    }

    pub(crate) fn install(&mut self, id: EventId, slot: Slot) {
        self.ensure_capacity(id);
        if let Some(existing) = self.slots.get_mut(id.index()) {
            *existing = slot;
        }
    }

    pub(crate) fn invalidate(&mut self, key: EventKey) {
        self.dirty.insert(key);
    }

    pub(crate) fn take_dirty(&mut self) -> Vec<EventKey> {
        self.dirty.drain().collect()
    }

    pub(crate) fn is_dirty(&self, key: EventKey) -> bool {
        self.dirty.contains(&key)
    }

    /// Marks keys stale again after a failed compile
    pub(crate) fn restore_dirty(&mut self, keys: impl IntoIterator<Item = EventKey>) {
        self.dirty.extend(keys);
    }

    /// Drops every compiled chain and pending invalidation
    pub(crate) fn clear(&mut self) {
        let capacity = self.slots.len();
        *self = Self::new(capacity);
    }

    fn ensure_capacity(&mut self, id: EventId) {
        let needed = id.index() + 1;
        if needed <= self.slots.len() {
            return;
        }
        let grown = needed.max(self.slots.len() * 2);
        tracing::trace!(from = self.slots.len(), to = grown, "growing chain cache");
        self.slots.resize(grown, Slot::DeadEvent);
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
