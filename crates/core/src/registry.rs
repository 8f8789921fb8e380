// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide event registry
//!
//! Holds the state every bus shares: event ids and per-type phase graphs.
//! Buses receive a handle explicitly; [`EventRegistry::global`] is the one
//! lazily initialized instance that is never torn down.

use crate::error::RegistryError;
use crate::event::Event;
use crate::identity::{EventId, EventKey, IdentityTable};
use crate::phase::PhaseGraph;
use std::any::TypeId;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, RwLock};

/// Receives phase-ordering changes
///
/// Called synchronously from inside [`EventRegistry::add_phase_ordering`],
/// after the registry's own locks are released.
pub trait OrderingSubscriber: Send + Sync {
    fn ordering_changed(&self, event_type: EventKey);
}

impl<F> OrderingSubscriber for F
where
    F: Fn(EventKey) + Send + Sync,
{
    fn ordering_changed(&self, event_type: EventKey) {
        self(event_type)
    }
}

/// Handle for removing an ordering subscriber
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct RegistryInner {
    ids: IdentityTable,
    phases: Mutex<HashMap<TypeId, PhaseGraph>>,
    subscribers: RwLock<Vec<(SubscriptionId, Arc<dyn OrderingSubscriber>)>>,
    next_subscription: AtomicU64,
}

/// Shared event-type registry; cloning yields another handle to the same state
#[derive(Clone)]
pub struct EventRegistry {
    inner: Arc<RegistryInner>,
}

static GLOBAL: OnceLock<EventRegistry> = OnceLock::new();

impl EventRegistry {
    /// Creates an isolated registry
    pub fn new() -> Self {
        Self::with_identity_table(IdentityTable::new())
    }

    /// The process-wide registry
    pub fn global() -> Self {
        GLOBAL.get_or_init(Self::new).clone()
    }

    fn with_identity_table(ids: IdentityTable) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                ids,
                phases: Mutex::new(HashMap::new()),
                subscribers: RwLock::new(Vec::new()),
                next_subscription: AtomicU64::new(1),
            }),
        }
    }

    /// Registry whose next freshly assigned event id is `next`
    #[doc(hidden)]
    pub fn with_next_id(next: u32) -> Self {
        Self::with_identity_table(IdentityTable::starting_at(next))
    }

    /// Id of `E`, assigned on first use
    pub fn id_of<E: Event>(&self) -> Result<EventId, RegistryError> {
        self.id_of_key(EventKey::of::<E>())
    }

    pub fn id_of_key(&self, key: EventKey) -> Result<EventId, RegistryError> {
        self.inner.ids.id_of(key)
    }

    /// Id of `key` if one was already assigned
    pub fn lookup(&self, key: EventKey) -> Option<EventId> {
        self.inner.ids.get(key)
    }

    /// Number of event types with an assigned id, including `DeadEvent`
    pub fn known_event_types(&self) -> usize {
        self.inner.ids.len()
    }

    /// Canonical phase order of `E`, building its graph on first reference
    pub fn phase_order<E: Event>(&self) -> Result<Arc<[String]>, RegistryError> {
        let mut phases = self.inner.phases.lock().unwrap_or_else(|e| e.into_inner());
        let graph = Self::graph_of::<E>(&mut phases)?;
        Ok(graph.order())
    }

    /// Requires phase `before` of `E` to run before phase `after`
    ///
    /// On success every compiled chain for `E` becomes stale and every
    /// subscriber is notified before this returns. On conflict the previous
    /// ordering is kept.
    pub fn add_phase_ordering<E: Event>(
        &self,
        before: &str,
        after: &str,
    ) -> Result<(), RegistryError> {
        let key = EventKey::of::<E>();
        let changed = {
            let mut phases = self.inner.phases.lock().unwrap_or_else(|e| e.into_inner());
            let graph = Self::graph_of::<E>(&mut phases)?;
            let changed = graph
                .add_ordering(before, after)
                .map_err(|source| RegistryError::OrderingConflict {
                    event_type: key.name(),
                    source,
                })?;
            if changed {
                tracing::debug!(
                    event_type = key.name(),
                    before,
                    after,
                    order = ?graph.order(),
                    "phase ordering changed"
                );
            }
            changed
        };

        if changed {
            self.notify(key);
        }
        Ok(())
    }

    /// Registers `subscriber` for phase-ordering changes
    pub fn subscribe(&self, subscriber: Arc<dyn OrderingSubscriber>) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_subscription.fetch_add(1, Ordering::SeqCst));
        self.inner
            .subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, subscriber));
        id
    }

    /// Removes a subscriber; returns false if it was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self
            .inner
            .subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner());
        let before = subs.len();
        subs.retain(|(sub_id, _)| *sub_id != id);
        subs.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    fn notify(&self, key: EventKey) {
        // Snapshot so subscribers may (un)subscribe from inside the callback
        let subscribers: Vec<Arc<dyn OrderingSubscriber>> = self
            .inner
            .subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, sub)| Arc::clone(sub))
            .collect();
        for subscriber in subscribers {
            subscriber.ordering_changed(key);
        }
    }

    fn graph_of<E: Event>(
        phases: &mut HashMap<TypeId, PhaseGraph>,
    ) -> Result<&mut PhaseGraph, RegistryError> {
        let key = EventKey::of::<E>();
        match phases.entry(key.type_id()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let graph = PhaseGraph::with_defaults(E::PHASES).map_err(|source| {
                    RegistryError::OrderingConflict {
                        event_type: key.name(),
                        source,
                    }
                })?;
                Ok(entry.insert(graph))
            }
        }
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
