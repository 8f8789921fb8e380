// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compiled dispatch chains
//!
//! A chain is the fixed invocation order of one event type's listeners at
//! compile time: phase rank ascending (unknown phases last), then priority
//! descending, then registration order.

use crate::error::{ListenerError, ListenerPanic, ListenerResult};
use crate::listener::SingularListener;
use phasebus_core::Event;
use std::any::Any;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

pub(crate) enum DispatchChain<E: Event> {
    Single(SingularListener<E>),
    Sequence(Box<[SingularListener<E>]>),
}

/// First listener that failed, by chain position
#[derive(Debug)]
pub(crate) struct ChainFailure {
    pub(crate) position: usize,
    pub(crate) source: ListenerError,
}

impl<E: Event> DispatchChain<E> {
    /// Sorts `listeners` (in registration order) against the phase `order`
    pub(crate) fn compile(listeners: &[SingularListener<E>], order: &[String]) -> Self {
        let ranks: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(rank, phase)| (phase.as_str(), rank))
            .collect();

        let mut sorted = listeners.to_vec();
        sorted.sort_by_key(|listener| {
            let rank = ranks.get(listener.phase()).copied().unwrap_or(usize::MAX);
            (rank, Reverse(listener.priority()))
        });

        match <[_; 1]>::try_from(sorted) {
            Ok([single]) => DispatchChain::Single(single),
            Err(sorted) => DispatchChain::Sequence(sorted.into_boxed_slice()),
        }
    }

    pub(crate) fn listeners(&self) -> &[SingularListener<E>] {
        match self {
            DispatchChain::Single(listener) => std::slice::from_ref(listener),
            DispatchChain::Sequence(listeners) => listeners,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners().len()
    }

    /// Calls every listener in order; the first failure skips the rest
    pub(crate) fn invoke(&self, event: &mut E, catch_panics: bool) -> Result<(), ChainFailure> {
        match self {
            DispatchChain::Single(listener) => {
                call(listener, event, catch_panics).map_err(|source| ChainFailure {
                    position: 0,
                    source,
                })
            }
            DispatchChain::Sequence(listeners) => {
                for (position, listener) in listeners.iter().enumerate() {
                    call(listener, event, catch_panics)
                        .map_err(|source| ChainFailure { position, source })?;
                }
                Ok(())
            }
        }
    }
}

fn call<E: Event>(
    listener: &SingularListener<E>,
    event: &mut E,
    catch_panics: bool,
) -> ListenerResult {
    if !catch_panics {
        return listener.invoke(event);
    }
    match panic::catch_unwind(AssertUnwindSafe(|| listener.invoke(event))) {
        Ok(result) => result,
        Err(payload) => Err(Box::new(ListenerPanic(panic_message(payload.as_ref())))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "chain_tests.rs"]
mod tests;
