/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Dirty-tracking write surface over the flow graph.
//!
//! The store is a total-function mutator: every operation succeeds or
//! reports not-found as a value. Admission policy (self-loops, duplicates,
//! cycles) lives in `validate`; callers gate edge inserts there first.

use euclid::default::Point2D;
use log::debug;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::changes::{EdgeChange, NodeChange};
use super::graph::{EdgePayload, Graph, NodeKey, NodeKind};

/// Owns the authoritative graph and the unsaved-changes flag.
pub struct GraphStore {
    graph: Graph,
    dirty: bool,
}

impl GraphStore {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            dirty: false,
        }
    }

    /// Adopt an existing graph (e.g. restored from a snapshot) as the
    /// saved baseline.
    pub fn from_graph(graph: Graph) -> Self {
        Self {
            graph,
            dirty: false,
        }
    }

    /// Read-only view of the graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// True when structural changes exist since the last successful save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag after a successful save.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Create a node of the given kind, seeded with kind defaults.
    pub fn add_node(&mut self, kind: NodeKind, position: Point2D<f32>) -> NodeKey {
        let key = self.graph.add_node(kind, position);
        self.dirty = true;
        key
    }

    /// Remove a node and cascade removal of all edges touching it.
    pub fn remove_node(&mut self, id: Uuid) -> bool {
        let Some(key) = self.graph.node_key(id) else {
            debug!("store: remove_node {id} is a no-op (not found)");
            return false;
        };
        let removed = self.graph.remove_node(key).is_some();
        if removed {
            self.dirty = true;
        }
        removed
    }

    /// Merge `patch` into a node's data payload.
    ///
    /// Content edits change persisted state, so they dirty the session.
    /// Returns false when the node no longer exists (expected transient
    /// race between UI and store).
    pub fn update_node_data(&mut self, id: Uuid, patch: BTreeMap<String, String>) -> bool {
        let Some(key) = self.graph.node_key(id) else {
            debug!("store: update_node_data {id} is a no-op (not found)");
            return false;
        };
        let Some(node) = self.graph.get_node_mut(key) else {
            return false;
        };
        node.data.extend(patch);
        self.dirty = true;
        true
    }

    /// Append an edge. Callers MUST have passed the proposed connection
    /// through `validate::can_connect`; the store does not re-validate.
    /// Returns the edge id, or `None` when an endpoint is missing.
    pub fn add_edge(&mut self, source: Uuid, target: Uuid, payload: EdgePayload) -> Option<Uuid> {
        let from = self.graph.node_key(source)?;
        let to = self.graph.node_key(target)?;
        let edge_id = payload.id;
        let key = self.graph.add_edge(from, to, payload)?;
        debug_assert!(self.graph.get_edge(key).is_some());
        self.dirty = true;
        Some(edge_id)
    }

    /// Remove an edge by id.
    pub fn remove_edge(&mut self, id: Uuid) -> bool {
        let Some(key) = self.graph.edge_key(id) else {
            debug!("store: remove_edge {id} is a no-op (not found)");
            return false;
        };
        let removed = self.graph.remove_edge(key).is_some();
        if removed {
            self.dirty = true;
        }
        removed
    }

    /// Apply a batch of node changes.
    ///
    /// The dirty decision is made from the batch's change kinds; individual
    /// changes naming unknown ids apply as no-ops.
    pub fn apply_node_changes(&mut self, changes: Vec<NodeChange>) {
        if changes.iter().any(NodeChange::is_structural) {
            self.dirty = true;
        }
        for change in changes {
            self.apply_node_change(change);
        }
    }

    fn apply_node_change(&mut self, change: NodeChange) {
        match change {
            NodeChange::Add { node } => {
                let id = node.id;
                if self.graph.insert_node(node).is_none() {
                    debug!("store: add change for existing node {id} ignored");
                }
            },
            NodeChange::Remove { id } => {
                if let Some(key) = self.graph.node_key(id) {
                    let _ = self.graph.remove_node(key);
                }
            },
            NodeChange::Position { id, position } => {
                if let Some(key) = self.graph.node_key(id) {
                    if let Some(node) = self.graph.get_node_mut(key) {
                        node.position = position;
                    }
                }
            },
            NodeChange::Dimensions { id, size, .. } => {
                if let Some(key) = self.graph.node_key(id) {
                    if let Some(node) = self.graph.get_node_mut(key) {
                        node.size = Some(size);
                    }
                }
            },
            NodeChange::Replace { node } => {
                if let Some(key) = self.graph.node_key(node.id) {
                    if let Some(existing) = self.graph.get_node_mut(key) {
                        *existing = node;
                    }
                }
            },
        }
    }

    /// Apply a batch of edge changes.
    pub fn apply_edge_changes(&mut self, changes: Vec<EdgeChange>) {
        if changes.iter().any(EdgeChange::is_structural) {
            self.dirty = true;
        }
        for change in changes {
            self.apply_edge_change(change);
        }
    }

    fn apply_edge_change(&mut self, change: EdgeChange) {
        match change {
            EdgeChange::Add {
                source,
                target,
                payload,
            } => {
                let from = self.graph.node_key(source);
                let to = self.graph.node_key(target);
                if let (Some(from), Some(to)) = (from, to) {
                    let _ = self.graph.add_edge(from, to, payload);
                } else {
                    debug!("store: edge add with missing endpoint ignored");
                }
            },
            EdgeChange::Remove { id } => {
                if let Some(key) = self.graph.edge_key(id) {
                    let _ = self.graph.remove_edge(key);
                }
            },
            EdgeChange::Replace { id, payload } => {
                if let Some(key) = self.graph.edge_key(id) {
                    if let Some(existing) = self.graph.get_edge_mut(key) {
                        // Edge identity is immutable; only the presentation
                        // payload is replaceable.
                        let keep = existing.id;
                        *existing = payload;
                        existing.id = keep;
                    }
                }
            },
        }
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}
