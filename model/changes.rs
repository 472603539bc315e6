/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Incremental change-sets applied to the node and edge collections.
//!
//! The rendering collaborator reports gestures as batches of tagged changes.
//! Structural changes dirty the session; cosmetic ones (in-progress drag
//! positions, wholesale node replacement) do not.

use euclid::default::{Point2D, Size2D};
use uuid::Uuid;

use super::graph::{EdgePayload, Node};

/// A single incremental change to the node collection.
#[derive(Debug, Clone)]
pub enum NodeChange {
    /// Insert a pre-built node.
    Add { node: Node },
    /// Remove a node (cascades incident edges).
    Remove { id: Uuid },
    /// In-progress drag position update.
    Position { id: Uuid, position: Point2D<f32> },
    /// Measured dimensions from the renderer; `settled` marks the final
    /// commit at the end of a layout pass.
    Dimensions {
        id: Uuid,
        size: Size2D<f32>,
        settled: bool,
    },
    /// Replace a node's payload wholesale (same id).
    Replace { node: Node },
}

impl NodeChange {
    /// Whether this change dirties the unsaved-changes state.
    pub fn is_structural(&self) -> bool {
        match self {
            NodeChange::Add { .. } | NodeChange::Remove { .. } => true,
            NodeChange::Dimensions { settled, .. } => *settled,
            NodeChange::Position { .. } | NodeChange::Replace { .. } => false,
        }
    }
}

/// A single incremental change to the edge collection.
///
/// Every edge change is structural: edges only exist as topology.
#[derive(Debug, Clone)]
pub enum EdgeChange {
    /// Insert an edge. The caller must have run the connection check;
    /// this is the same trusted append path as `GraphStore::add_edge`.
    Add {
        source: Uuid,
        target: Uuid,
        payload: EdgePayload,
    },
    /// Remove an edge by id.
    Remove { id: Uuid },
    /// Replace an edge's payload, keeping its endpoints.
    Replace { id: Uuid, payload: EdgePayload },
}

impl EdgeChange {
    pub fn is_structural(&self) -> bool {
        match self {
            EdgeChange::Add { .. } | EdgeChange::Remove { .. } | EdgeChange::Replace { .. } => true,
        }
    }
}
