// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thread-safe mailbox for phase-ordering changes
//!
//! The registry may notify from any thread while the bus that owns the inbox
//! is in use elsewhere, so changes are queued here and applied by the bus at
//! its next post. Repeated changes to one type collapse into a single entry.

use phasebus_core::{EventKey, OrderingSubscriber};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct InvalidationInbox {
    pending: Mutex<HashSet<EventKey>>,
    flagged: AtomicBool,
}

impl InvalidationInbox {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Takes all queued changes; cheap when there are none
    pub(crate) fn drain(&self) -> Vec<EventKey> {
        if !self.flagged.swap(false, Ordering::AcqRel) {
            return Vec::new();
        }
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain()
            .collect()
    }
}

impl OrderingSubscriber for InvalidationInbox {
    fn ordering_changed(&self, event_type: EventKey) {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(event_type);
        self.flagged.store(true, Ordering::Release);
    }
}

#[cfg(test)]
#[path = "inbox_tests.rs"]
mod tests;
