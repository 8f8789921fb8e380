// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-bus listener set, the source of truth for registration

use crate::cache::Slot;
use crate::chain::DispatchChain;
use crate::listener::SingularListener;
use phasebus_core::{Event, EventKey, EventRegistry, RegistryError};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Listeners of one event type, in registration order
trait TypeListeners: Send {
    fn len(&self) -> usize;
    fn compile(&self, registry: &EventRegistry) -> Result<Slot, RegistryError>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct TypedListeners<E: Event>(Vec<SingularListener<E>>);

impl<E: Event> TypeListeners for TypedListeners<E> {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn compile(&self, registry: &EventRegistry) -> Result<Slot, RegistryError> {
        if self.0.is_empty() {
            return Ok(Slot::fallback_for(EventKey::of::<E>()));
        }
        let order = registry.phase_order::<E>()?;
        let chain = DispatchChain::compile(&self.0, &order);
        Ok(Slot::Chain(Arc::new(chain)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Listener records of one bus, keyed by event type
#[derive(Default)]
pub(crate) struct ListenerSet {
    by_type: HashMap<TypeId, Box<dyn TypeListeners>>,
    total: usize,
}

impl ListenerSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push<E: Event>(&mut self, listener: SingularListener<E>) {
        let entry = self
            .by_type
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(TypedListeners::<E>(Vec::new())));
        match entry.as_any_mut().downcast_mut::<TypedListeners<E>>() {
            Some(typed) => typed.0.push(listener),
            None => *entry = Box::new(TypedListeners(vec![listener])),
        }
        self.total += 1;
    }

    /// Removes the first record with the listener's identity
    pub(crate) fn remove<E: Event>(&mut self, listener: &SingularListener<E>) -> bool {
        let type_id = TypeId::of::<E>();
        let Some(typed) = self.typed_mut::<E>() else {
            return false;
        };
        let Some(position) = typed.iter().position(|l| l.same_as(listener)) else {
            return false;
        };
        typed.remove(position);
        let emptied = typed.is_empty();
        if emptied {
            self.by_type.remove(&type_id);
        }
        self.total -= 1;
        true
    }

    /// How many times this listener is registered
    pub(crate) fn occurrences<E: Event>(&self, listener: &SingularListener<E>) -> usize {
        self.listeners::<E>()
            .iter()
            .filter(|l| l.same_as(listener))
            .count()
    }

    pub(crate) fn listeners<E: Event>(&self) -> &[SingularListener<E>] {
        self.by_type
            .get(&TypeId::of::<E>())
            .and_then(|entry| entry.as_any().downcast_ref::<TypedListeners<E>>())
            .map(|typed| typed.0.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn contains_type(&self, key: EventKey) -> bool {
        self.by_type.contains_key(&key.type_id())
    }

    pub(crate) fn count_of(&self, key: EventKey) -> usize {
        self.by_type
            .get(&key.type_id())
            .map_or(0, |entry| entry.len())
    }

    pub(crate) fn len(&self) -> usize {
        self.total
    }

    pub(crate) fn clear(&mut self) {
        self.by_type.clear();
        self.total = 0;
    }

    /// Builds the cache slot for `key` from its current listeners
    pub(crate) fn compile(
        &self,
        key: EventKey,
        registry: &EventRegistry,
    ) -> Result<Slot, RegistryError> {
        match self.by_type.get(&key.type_id()) {
            Some(entry) => entry.compile(registry),
            None => Ok(Slot::fallback_for(key)),
        }
    }

    fn typed_mut<E: Event>(&mut self) -> Option<&mut Vec<SingularListener<E>>> {
        self.by_type
            .get_mut(&TypeId::of::<E>())
            .and_then(|entry| entry.as_any_mut().downcast_mut::<TypedListeners<E>>())
            .map(|typed| &mut typed.0)
    }
}

#[cfg(test)]
#[path = "listeners_tests.rs"]
mod tests;
