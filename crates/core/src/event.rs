// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event types
//!
//! An event type is any `'static` type implementing [`Event`]. It may declare
//! default phases and opt into cancellation by exposing a [`CancelFlag`].

use crate::error::EventError;
use crate::identity::{EventId, EventKey};

/// Phase every event type has unless it declares otherwise
pub const DEFAULT_PHASE: &str = "default";

/// Mutable cancel state carried by cancelable events
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CancelFlag(bool);

impl CancelFlag {
    pub fn new() -> Self {
        Self(false)
    }

    pub fn get(&self) -> bool {
        self.0
    }

    pub fn set(&mut self, canceled: bool) {
        self.0 = canceled;
    }
}

/// A type that can be posted to an event bus
pub trait Event: 'static {
    /// Declared phases, in execution order.
    ///
    /// `"default"` is appended after the last declared phase unless it is
    /// listed explicitly. An empty list yields just `"default"`.
    const PHASES: &'static [&'static str] = &[];

    /// Cancel flag of this event, if the type is cancelable
    fn cancel_flag(&self) -> Option<&CancelFlag> {
        None
    }

    fn cancel_flag_mut(&mut self) -> Option<&mut CancelFlag> {
        None
    }

    fn is_cancelable(&self) -> bool {
        self.cancel_flag().is_some()
    }

    fn is_canceled(&self) -> bool {
        self.cancel_flag().is_some_and(CancelFlag::get)
    }

    fn set_canceled(&mut self, canceled: bool) -> Result<(), EventError> {
        match self.cancel_flag_mut() {
            Some(flag) => {
                flag.set(canceled);
                Ok(())
            }
            None => Err(EventError::NotCancelable {
                event_type: std::any::type_name::<Self>(),
            }),
        }
    }

    fn cancel(&mut self) -> Result<(), EventError> {
        self.set_canceled(true)
    }

    fn resume(&mut self) -> Result<(), EventError> {
        self.set_canceled(false)
    }

    /// Called after every successful dispatch, e.g. to clear data held by a
    /// reused instance. Not called when a listener fails.
    fn finish(&mut self) {}
}

/// Posted in place of an event that had no listeners on the bus
#[derive(Clone, Copy, Debug)]
pub struct DeadEvent {
    event_type: EventKey,
    event_id: EventId,
}

impl DeadEvent {
    pub fn new(event_type: EventKey, event_id: EventId) -> Self {
        Self {
            event_type,
            event_id,
        }
    }

    /// Type of the event nobody listened to
    pub fn event_type(&self) -> EventKey {
        self.event_type
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }
}

impl Event for DeadEvent {}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
