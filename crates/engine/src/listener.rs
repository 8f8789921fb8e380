// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener records
//!
//! A [`SingularListener`] is one callback bound to one event type, together
//! with the phase and priority that place it in a dispatch chain. Listeners
//! are identified by the record they point to: clones are the same listener,
//! two separately built listeners are not, even with identical callbacks.

use crate::error::ListenerResult;
use crate::listeners::ListenerSet;
use phasebus_core::{Event, EventKey, EventRegistry, RegistryError, DEFAULT_PHASE};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Common priority values; higher runs earlier within a phase
pub mod priority {
    pub const HIGHEST: i32 = i32::MAX;
    pub const HIGH: i32 = i32::MAX / 2;
    pub const NORMAL: i32 = 0;
    pub const LOW: i32 = i32::MIN / 2;
    pub const LOWEST: i32 = i32::MIN;
}

/// Read-only view of where a listener sits in dispatch order
pub trait ListenerInfo {
    fn event_type(&self) -> EventKey;
    fn phase(&self) -> &str;
    fn priority(&self) -> i32;
}

type Callback<E> = dyn Fn(&mut E) -> ListenerResult + Send + Sync;

struct Record<E> {
    phase: String,
    priority: i32,
    callback: Box<Callback<E>>,
}

/// One callback for one event type
pub struct SingularListener<E: Event> {
    record: Arc<Record<E>>,
}

impl<E: Event> SingularListener<E> {
    /// Listener in the default phase with normal priority
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&mut E) -> ListenerResult + Send + Sync + 'static,
    {
        Self::builder().build(callback)
    }

    /// Listener whose callback cannot fail
    pub fn infallible<F>(callback: F) -> Self
    where
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        Self::builder().build_infallible(callback)
    }

    pub fn builder() -> ListenerBuilder<E> {
        ListenerBuilder::new()
    }

    pub fn event_type(&self) -> EventKey {
        EventKey::of::<E>()
    }

    pub fn phase(&self) -> &str {
        &self.record.phase
    }

    pub fn priority(&self) -> i32 {
        self.record.priority
    }

    /// Whether both handles refer to the same registered record
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.record, &other.record)
    }

    pub(crate) fn invoke(&self, event: &mut E) -> ListenerResult {
        (self.record.callback)(event)
    }

    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.record) as *const () as usize
    }

    /// Resolves the event type's id and phase graph so that overflow and bad
    /// phase declarations fail now rather than at the next post
    pub(crate) fn prepare(&self, registry: &EventRegistry) -> Result<(), RegistryError> {
        registry.id_of::<E>()?;
        registry.phase_order::<E>()?;
        Ok(())
    }
}

impl<E: Event> Clone for SingularListener<E> {
    fn clone(&self) -> Self {
        Self {
            record: Arc::clone(&self.record),
        }
    }
}

impl<E: Event> fmt::Debug for SingularListener<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingularListener")
            .field("event_type", &self.event_type().name())
            .field("phase", &self.record.phase)
            .field("priority", &self.record.priority)
            .finish()
    }
}

impl<E: Event> ListenerInfo for SingularListener<E> {
    fn event_type(&self) -> EventKey {
        EventKey::of::<E>()
    }

    fn phase(&self) -> &str {
        &self.record.phase
    }

    fn priority(&self) -> i32 {
        self.record.priority
    }
}

/// Builder for [`SingularListener`]
pub struct ListenerBuilder<E: Event> {
    phase: String,
    priority: i32,
    _event: PhantomData<fn(&mut E)>,
}

impl<E: Event> ListenerBuilder<E> {
    fn new() -> Self {
        Self {
            phase: DEFAULT_PHASE.to_string(),
            priority: priority::NORMAL,
            _event: PhantomData,
        }
    }

    pub fn phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = phase.into();
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn build<F>(self, callback: F) -> SingularListener<E>
    where
        F: Fn(&mut E) -> ListenerResult + Send + Sync + 'static,
    {
        SingularListener {
            record: Arc::new(Record {
                phase: self.phase,
                priority: self.priority,
                callback: Box::new(callback),
            }),
        }
    }

    pub fn build_infallible<F>(self, callback: F) -> SingularListener<E>
    where
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        self.build(move |event: &mut E| {
            callback(event);
            Ok(())
        })
    }
}

/// Type-erased listener, as held by composites
pub(crate) trait ErasedListener: Send + Sync {
    fn info(&self) -> &dyn ListenerInfo;
    fn identity(&self) -> usize;
    fn prepare(&self, registry: &EventRegistry) -> Result<(), RegistryError>;
    fn add_to(&self, set: &mut ListenerSet);
    fn remove_from(&self, set: &mut ListenerSet) -> bool;
    fn occurrences_in(&self, set: &ListenerSet) -> usize;
}

impl<E: Event> ErasedListener for SingularListener<E> {
    fn info(&self) -> &dyn ListenerInfo {
        self
    }

    fn identity(&self) -> usize {
        SingularListener::identity(self)
    }

    fn prepare(&self, registry: &EventRegistry) -> Result<(), RegistryError> {
        SingularListener::prepare(self, registry)
    }

    fn add_to(&self, set: &mut ListenerSet) {
        set.push(self.clone());
    }

    fn remove_from(&self, set: &mut ListenerSet) -> bool {
        set.remove(self)
    }

    fn occurrences_in(&self, set: &ListenerSet) -> usize {
        set.occurrences(self)
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
