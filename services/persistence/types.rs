/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Serializable types for flow persistence.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persisted node.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PersistedNode {
    /// Stable node identity.
    pub node_id: String,
    /// Node kind as a stable persisted string (`"MESSAGE"`, `"USER"`).
    pub kind: String,
    pub position_x: f32,
    pub position_y: f32,
    pub width: Option<f32>,
    pub height: Option<f32>,
    /// Kind-specific named fields, label included.
    pub data: BTreeMap<String, String>,
}

/// Persisted edge.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PersistedEdge {
    pub edge_id: String,
    pub source_node_id: String,
    pub target_node_id: String,
    pub label: Option<String>,
    pub animated: bool,
    pub style: Option<String>,
}

/// Full flow snapshot handed to the save transport.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FlowSnapshot {
    pub nodes: Vec<PersistedNode>,
    pub edges: Vec<PersistedEdge>,
    pub timestamp_secs: u64,
}
