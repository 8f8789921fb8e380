// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named execution phases and their deterministic ordering
//!
//! This module provides:
//! - `PhaseGraph` - per-event-type graph of phases and "runs before" edges
//! - A cycle-checked topological sort that yields the same order for the same
//!   edge set, regardless of insertion order

mod graph;
mod sort;

pub use graph::PhaseGraph;
