/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Admission and validity rules over a graph snapshot.
//!
//! Two pure checks:
//! - `can_connect`: may a proposed edge enter the graph (no self-loops,
//!   no duplicate (source, target) pairs, no cycles)?
//! - `validate_graph`: is the whole graph saveable (non-empty, at most one
//!   entry node)?
//!
//! Both are side-effect free and safe to call repeatedly; the store trusts
//! callers to run `can_connect` before every edge insert.

use std::collections::HashSet;
use uuid::Uuid;

use crate::model::graph::{Graph, NodeKey};

/// Reason a proposed connection was refused.
///
/// The gesture layer only needs the boolean from `can_connect`; the enum is
/// kept for diagnostics and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionRejected {
    /// Source and target are the same node.
    SelfLoop,
    /// An edge with the same (source, target) pair already exists.
    Duplicate,
    /// Adding the edge would close a directed cycle.
    WouldCycle,
    /// One of the endpoints is not in the graph.
    UnknownEndpoint,
}

impl std::fmt::Display for ConnectionRejected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionRejected::SelfLoop => write!(f, "connection would form a self-loop"),
            ConnectionRejected::Duplicate => write!(f, "connection already exists"),
            ConnectionRejected::WouldCycle => write!(f, "connection would create a cycle"),
            ConnectionRejected::UnknownEndpoint => {
                write!(f, "connection endpoint is not in the graph")
            },
        }
    }
}

/// Reason the graph is not saveable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    NoNodes,
    NoEdges,
    MultipleEntryPoints,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::NoNodes => write!(f, "No nodes in the graph"),
            ValidationError::NoEdges => write!(f, "No edges in the graph"),
            ValidationError::MultipleEntryPoints => {
                write!(f, "More than one node with no target handle")
            },
        }
    }
}

/// Decide whether a proposed `source -> target` edge may be added.
pub fn check_connection(graph: &Graph, source: Uuid, target: Uuid) -> Result<(), ConnectionRejected> {
    if source == target {
        return Err(ConnectionRejected::SelfLoop);
    }

    let (Some(source_key), Some(target_key)) = (graph.node_key(source), graph.node_key(target))
    else {
        return Err(ConnectionRejected::UnknownEndpoint);
    };

    // Duplicate (source, target) pairs are refused regardless of edge id.
    if graph.has_edge_between(source_key, target_key) {
        return Err(ConnectionRejected::Duplicate);
    }

    // Walking forward from the target and reaching the source means the new
    // edge would close a cycle.
    let mut visited = HashSet::new();
    if reaches(graph, target_key, source_key, &mut visited) {
        return Err(ConnectionRejected::WouldCycle);
    }

    Ok(())
}

/// Boolean boundary for the connection gesture.
pub fn can_connect(graph: &Graph, source: Uuid, target: Uuid) -> bool {
    check_connection(graph, source, target).is_ok()
}

/// Depth-first search over outgoing edges from `start`, looking for
/// `needle`. The visited set guarantees termination and keeps diamonds
/// from being re-descended.
fn reaches(graph: &Graph, start: NodeKey, needle: NodeKey, visited: &mut HashSet<NodeKey>) -> bool {
    if !visited.insert(start) {
        return false;
    }
    for next in graph.out_neighbors(start) {
        if next == needle {
            return true;
        }
        if reaches(graph, next, needle, visited) {
            return true;
        }
    }
    false
}

/// Decide whether the whole graph is saveable.
///
/// A flow needs at least one node, at least one transition, and at most one
/// entry node (a node with no incoming edge).
pub fn validate_graph(graph: &Graph) -> Result<(), ValidationError> {
    if graph.node_count() == 0 {
        return Err(ValidationError::NoNodes);
    }
    if graph.edge_count() == 0 {
        return Err(ValidationError::NoEdges);
    }

    let entry_candidates = graph
        .nodes()
        .filter(|(key, _)| graph.in_neighbors(*key).next().is_none())
        .count();
    if entry_candidates > 1 {
        return Err(ValidationError::MultipleEntryPoints);
    }

    Ok(())
}
