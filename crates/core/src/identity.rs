// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compact per-event-type identities
//!
//! Every event type gets a dense integer id the first time it is seen. Ids are
//! permanent, never reused, and index directly into a bus's chain cache.
//! Id 0 always belongs to [`DeadEvent`].

use crate::error::RegistryError;
use crate::event::DeadEvent;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::RwLock;

/// Dense identifier of an event type within one registry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(u32);

impl EventId {
    /// Reserved id of the built-in dead-event fallback
    pub const DEAD_EVENT: EventId = EventId(0);

    pub fn get(self) -> u32 {
        self.0
    }

    /// Slot index into a dense, id-indexed array
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Runtime type tag of an event type
///
/// Equality and hashing only consider the `TypeId`; the name is carried for
/// diagnostics.
#[derive(Clone, Copy, Debug)]
pub struct EventKey {
    type_id: TypeId,
    name: &'static str,
}

impl EventKey {
    pub fn of<E: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<E>(),
            name: std::any::type_name::<E>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_dead_event(&self) -> bool {
        self.type_id == TypeId::of::<DeadEvent>()
    }
}

impl PartialEq for EventKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for EventKey {}

impl Hash for EventKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

struct IdState {
    ids: HashMap<TypeId, EventId>,
    next: u32,
}

/// Type → id table, internally synchronized for first-use races across buses
pub(crate) struct IdentityTable {
    state: RwLock<IdState>,
}

impl IdentityTable {
    pub(crate) fn new() -> Self {
        Self::starting_at(EventId::DEAD_EVENT.0 + 1)
    }

    /// Table whose next freshly assigned id is `next`
    pub(crate) fn starting_at(next: u32) -> Self {
        let mut ids = HashMap::new();
        ids.insert(TypeId::of::<DeadEvent>(), EventId::DEAD_EVENT);
        Self {
            state: RwLock::new(IdState { ids, next }),
        }
    }

    /// Returns the id of `key`, assigning the next free one on first use
    pub(crate) fn id_of(&self, key: EventKey) -> Result<EventId, RegistryError> {
        if let Some(id) = self.get(key) {
            return Ok(id);
        }

        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        // Another thread may have won the race between the two locks
        if let Some(id) = state.ids.get(&key.type_id) {
            return Ok(*id);
        }

        let id = EventId(state.next);
        state.next = state
            .next
            .checked_add(1)
            .ok_or(RegistryError::IdentityOverflow {
                event_type: key.name,
            })?;
        state.ids.insert(key.type_id, id);
        tracing::trace!(event_type = key.name, id = id.0, "assigned event id");
        Ok(id)
    }

    /// Returns the id of `key` without assigning one
    pub(crate) fn get(&self, key: EventKey) -> Option<EventId> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .ids
            .get(&key.type_id)
            .copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.state.read().unwrap_or_else(|e| e.into_inner()).ids.len()
    }
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
