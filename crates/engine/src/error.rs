// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for buses and listeners

use phasebus_core::RegistryError;
use thiserror::Error;

/// Error returned by a listener callback
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

pub type ListenerResult = Result<(), ListenerError>;

/// A listener panicked and the panic was contained
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("listener panicked: {0}")]
pub struct ListenerPanic(pub String);

/// Errors that can occur while registering listeners or posting events
#[derive(Debug, Error)]
pub enum BusError {
    #[error("{bus}: listener for {event_type} is not registered")]
    UnknownListener {
        bus: String,
        event_type: &'static str,
    },
    #[error("{bus}: dispatch of {event_type} rejected, dispatch is disabled: {reason}")]
    DispatchDisabled {
        bus: String,
        event_type: &'static str,
        reason: String,
    },
    /// `position` is the zero-based index of the failing listener in the
    /// compiled chain
    #[error("{bus}: listener {position} failed while dispatching {event_type}: {source}")]
    DispatchFailure {
        bus: String,
        event_type: &'static str,
        position: usize,
        #[source]
        source: ListenerError,
    },
    #[error("{bus}: bus is closed, cannot handle {event_type}")]
    Closed {
        bus: String,
        event_type: &'static str,
    },
    #[error("{bus}: cached dispatch chain does not belong to {event_type}")]
    SlotMismatch {
        bus: String,
        event_type: &'static str,
    },
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl BusError {
    /// Event type the failed operation was about, when known
    pub fn event_type(&self) -> Option<&'static str> {
        match self {
            BusError::UnknownListener { event_type, .. }
            | BusError::DispatchDisabled { event_type, .. }
            | BusError::DispatchFailure { event_type, .. }
            | BusError::Closed { event_type, .. }
            | BusError::SlotMismatch { event_type, .. } => Some(*event_type),
            BusError::Registry(RegistryError::IdentityOverflow { event_type })
            | BusError::Registry(RegistryError::OrderingConflict { event_type, .. }) => {
                Some(*event_type)
            }
        }
    }
}
