// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types shared by the registry, phase graphs and events

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while ordering the phases of a single event type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhaseError {
    #[error("phase ordering conflict: phase '{first}' is ordered both before and after phase '{second}'")]
    Conflict { first: String, second: String },
    #[error("phase '{0}' cannot be ordered relative to itself")]
    SelfOrdering(String),
}

/// Errors produced by the process-wide event registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The event id counter is exhausted. There is no recovery from this.
    #[error("event id space exhausted while assigning an id to {event_type}")]
    IdentityOverflow { event_type: &'static str },
    #[error("ordering conflict for {event_type}: {source}")]
    OrderingConflict {
        event_type: &'static str,
        #[source]
        source: PhaseError,
    },
}

/// Errors produced by event instances
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("event {event_type} is not cancelable")]
    NotCancelable { event_type: &'static str },
}

/// Errors produced while loading a bus configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
