// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic phase sorting
//!
//! 1. Strongly connected components via Kosaraju (forward post-order, then a
//!    collection pass over the reversed graph).
//! 2. Any component with more than one phase, or a phase ordered after itself,
//!    is a contradiction and is rejected.
//! 3. Components are condensed into a DAG and emitted in topological order.
//!    Ties between ready components go to the lexicographically smallest
//!    phase id.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};

/// A phase and its edges, as indices into the owning node list
#[derive(Debug, Clone)]
pub(crate) struct PhaseNode {
    pub(crate) id: String,
    /// Phases that must run after this one
    pub(crate) subsequent: Vec<usize>,
    /// Phases that must run before this one
    pub(crate) previous: Vec<usize>,
}

impl PhaseNode {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            subsequent: Vec::new(),
            previous: Vec::new(),
        }
    }
}

/// Two phases that are required to run both before and after each other
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Cycle {
    pub(crate) first: String,
    pub(crate) second: String,
}

/// Returns node indices in canonical execution order
pub(crate) fn sort_phases(nodes: &[PhaseNode]) -> Result<Vec<usize>, Cycle> {
    let components = strongly_connected(nodes);

    for members in &components.members {
        if let [first, second, ..] = members.as_slice() {
            return Err(Cycle {
                first: nodes[*first].id.clone(),
                second: nodes[*second].id.clone(),
            });
        }
    }
    for (index, node) in nodes.iter().enumerate() {
        if node.subsequent.contains(&index) {
            return Err(Cycle {
                first: node.id.clone(),
                second: node.id.clone(),
            });
        }
    }

    Ok(condensed_order(nodes, &components))
}

struct Components {
    /// Component index of every node
    of_node: Vec<usize>,
    /// Members of every component, sorted by phase id
    members: Vec<Vec<usize>>,
}

fn strongly_connected(nodes: &[PhaseNode]) -> Components {
    let mut visited = vec![false; nodes.len()];
    let mut post_order = Vec::with_capacity(nodes.len());
    for start in 0..nodes.len() {
        forward_visit(nodes, start, &mut visited, &mut post_order);
    }

    let mut of_node = vec![usize::MAX; nodes.len()];
    let mut members = Vec::new();
    for &start in post_order.iter().rev() {
        if of_node[start] != usize::MAX {
            continue;
        }
        let component = members.len();
        let mut collected = Vec::new();
        backward_visit(nodes, start, component, &mut of_node, &mut collected);
        collected.sort_by(|a, b| nodes[*a].id.cmp(&nodes[*b].id));
        members.push(collected);
    }

    Components { of_node, members }
}

fn forward_visit(
    nodes: &[PhaseNode],
    node: usize,
    visited: &mut [bool],
    post_order: &mut Vec<usize>,
) {
    if visited[node] {
        return;
    }
    visited[node] = true;
    for &next in &nodes[node].subsequent {
        forward_visit(nodes, next, visited, post_order);
    }
    post_order.push(node);
}

fn backward_visit(
    nodes: &[PhaseNode],
    node: usize,
    component: usize,
    of_node: &mut [usize],
    collected: &mut Vec<usize>,
) {
    if of_node[node] != usize::MAX {
        return;
    }
    of_node[node] = component;
    collected.push(node);
    for &prev in &nodes[node].previous {
        backward_visit(nodes, prev, component, of_node, collected);
    }
}

fn condensed_order(nodes: &[PhaseNode], components: &Components) -> Vec<usize> {
    let count = components.members.len();
    let mut successors: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); count];
    for (index, node) in nodes.iter().enumerate() {
        let from = components.of_node[index];
        for &next in &node.subsequent {
            let to = components.of_node[next];
            if from != to {
                successors[from].insert(to);
            }
        }
    }

    let mut in_degree = vec![0usize; count];
    for targets in &successors {
        for &to in targets {
            in_degree[to] += 1;
        }
    }

    let mut ready: BinaryHeap<Reverse<(&str, usize)>> = (0..count)
        .filter(|&component| in_degree[component] == 0)
        .map(|component| Reverse((label(nodes, components, component), component)))
        .collect();

    let mut order = Vec::with_capacity(nodes.len());
    while let Some(Reverse((_, component))) = ready.pop() {
        order.extend(components.members[component].iter().copied());
        for &next in &successors[component] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push(Reverse((label(nodes, components, next), next)));
            }
        }
    }
    order
}

/// Smallest phase id of a component
fn label<'a>(nodes: &'a [PhaseNode], components: &Components, component: usize) -> &'a str {
    components.members[component]
        .first()
        .map(|&node| nodes[node].id.as_str())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "sort_tests.rs"]
mod tests;
