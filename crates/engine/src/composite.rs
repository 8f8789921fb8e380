// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composite listeners
//!
//! A fixed group of singular listeners belonging to one owner, registered and
//! unregistered as a unit. Members added with [`CompositeBuilder::on`] share
//! the composite's phase/priority override block; members added with
//! [`CompositeBuilder::listener`] keep their own placement.

use crate::error::ListenerResult;
use crate::listener::{ErasedListener, ListenerBuilder, ListenerInfo, SingularListener};
use phasebus_core::Event;
use std::fmt;

pub struct CompositeListener {
    owner: String,
    members: Vec<Box<dyn ErasedListener>>,
}

impl CompositeListener {
    pub fn builder(owner: impl Into<String>) -> CompositeBuilder {
        CompositeBuilder {
            owner: owner.into(),
            overrides: Overrides::default(),
            pending: Vec::new(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in the order they were added
    pub fn members(&self) -> impl Iterator<Item = &dyn ListenerInfo> + '_ {
        self.members.iter().map(|member| member.info())
    }

    pub(crate) fn erased_members(&self) -> &[Box<dyn ErasedListener>] {
        &self.members
    }
}

impl fmt::Debug for CompositeListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<_> = self
            .members()
            .map(|m| format!("{}@{}/{}", m.event_type(), m.phase(), m.priority()))
            .collect();
        f.debug_struct("CompositeListener")
            .field("owner", &self.owner)
            .field("members", &members)
            .finish()
    }
}

/// Phase and priority shared by override-block members
#[derive(Default)]
struct Overrides {
    phase: Option<String>,
    priority: Option<i32>,
}

impl Overrides {
    fn apply<E: Event>(&self, mut builder: ListenerBuilder<E>) -> ListenerBuilder<E> {
        if let Some(phase) = &self.phase {
            builder = builder.phase(phase.clone());
        }
        if let Some(priority) = self.priority {
            builder = builder.priority(priority);
        }
        builder
    }
}

type PendingMember = Box<dyn FnOnce(&Overrides) -> Box<dyn ErasedListener>>;

/// Builder for [`CompositeListener`]
///
/// The override block is applied when [`build`](Self::build) runs, so the
/// order of `phase`/`priority` and `on` calls does not matter.
pub struct CompositeBuilder {
    owner: String,
    overrides: Overrides,
    pending: Vec<PendingMember>,
}

impl CompositeBuilder {
    pub fn phase(mut self, phase: impl Into<String>) -> Self {
        self.overrides.phase = Some(phase.into());
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.overrides.priority = Some(priority);
        self
    }

    /// Adds a member placed by the override block
    pub fn on<E, F>(mut self, callback: F) -> Self
    where
        E: Event,
        F: Fn(&mut E) -> ListenerResult + Send + Sync + 'static,
    {
        self.pending.push(Box::new(move |overrides: &Overrides| {
            let listener = overrides
                .apply(SingularListener::<E>::builder())
                .build(callback);
            Box::new(listener) as Box<dyn ErasedListener>
        }));
        self
    }

    pub fn on_infallible<E, F>(self, callback: F) -> Self
    where
        E: Event,
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        self.on::<E, _>(move |event: &mut E| {
            callback(event);
            Ok(())
        })
    }

    /// Adds an existing listener with its own phase and priority
    pub fn listener<E: Event>(mut self, listener: &SingularListener<E>) -> Self {
        let listener = listener.clone();
        self.pending
            .push(Box::new(move |_: &Overrides| Box::new(listener) as Box<dyn ErasedListener>));
        self
    }

    pub fn build(self) -> CompositeListener {
        let overrides = self.overrides;
        CompositeListener {
            owner: self.owner,
            members: self
                .pending
                .into_iter()
                .map(|member| member(&overrides))
                .collect(),
        }
    }
}

#[cfg(test)]
#[path = "composite_tests.rs"]
mod tests;
