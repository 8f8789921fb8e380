// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-event-type phase graph

use super::sort::{sort_phases, Cycle, PhaseNode};
use crate::error::PhaseError;
use crate::event::DEFAULT_PHASE;
use std::collections::HashMap;
use std::sync::Arc;

/// Directed graph of named phases for one event type
///
/// An edge `a → b` means every listener in phase `a` runs before every listener
/// in phase `b`. The canonical order is recomputed after every successful
/// mutation; a rejected mutation leaves the graph untouched.
#[derive(Debug, Clone)]
pub struct PhaseGraph {
    nodes: Vec<PhaseNode>,
    index: HashMap<String, usize>,
    order: Arc<[String]>,
}

impl PhaseGraph {
    /// Graph containing only the `"default"` phase
    pub fn new() -> Self {
        let mut graph = Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            order: Arc::from(Vec::new()),
        };
        graph.get_or_create(DEFAULT_PHASE);
        graph.order = Arc::from(vec![DEFAULT_PHASE.to_string()]);
        graph
    }

    /// Graph built from an event type's declared phases
    ///
    /// Declared phases are chained in order. `"default"` is appended after the
    /// last one unless it was declared explicitly.
    pub fn with_defaults(declared: &[&str]) -> Result<Self, PhaseError> {
        let Some((first, rest)) = declared.split_first() else {
            return Ok(Self::new());
        };

        let mut graph = Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            order: Arc::from(Vec::new()),
        };
        graph.get_or_create(first);
        graph.resort()?;

        let mut prev = *first;
        for phase in rest {
            graph.add_ordering(prev, phase)?;
            prev = *phase;
        }
        if !declared.contains(&DEFAULT_PHASE) {
            graph.add_ordering(prev, DEFAULT_PHASE)?;
        }
        Ok(graph)
    }

    /// Requires `before` to run before `after`, creating either phase on first
    /// reference.
    ///
    /// Returns `Ok(false)` when the edge already existed.
    pub fn add_ordering(&mut self, before: &str, after: &str) -> Result<bool, PhaseError> {
        if before == after {
            return Err(PhaseError::SelfOrdering(before.to_string()));
        }

        let mut next = self.clone();
        let from = next.get_or_create(before);
        let to = next.get_or_create(after);
        if next.nodes[from].subsequent.contains(&to) {
            return Ok(false);
        }
        next.nodes[from].subsequent.push(to);
        next.nodes[to].previous.push(from);
        next.resort()?;

        *self = next;
        Ok(true)
    }

    /// Canonical phase order
    pub fn order(&self) -> Arc<[String]> {
        Arc::clone(&self.order)
    }

    /// Position of `phase` in the canonical order
    pub fn rank(&self, phase: &str) -> Option<usize> {
        self.order.iter().position(|p| p == phase)
    }

    pub fn contains(&self, phase: &str) -> bool {
        self.index.contains_key(phase)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn get_or_create(&mut self, id: &str) -> usize {
        if let Some(&index) = self.index.get(id) {
            return index;
        }
        let index = self.nodes.len();
        self.nodes.push(PhaseNode::new(id));
        self.index.insert(id.to_string(), index);
        index
    }

    fn resort(&mut self) -> Result<(), PhaseError> {
        let sorted = sort_phases(&self.nodes)
            .map_err(|Cycle { first, second }| PhaseError::Conflict { first, second })?;
        self.order = sorted
            .into_iter()
            .map(|index| self.nodes[index].id.clone())
            .collect();
        Ok(())
    }
}

impl Default for PhaseGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
