/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Graph data structures for the conversational flow editor.
//!
//! Core structures:
//! - `Graph`: Main graph container backed by petgraph::StableGraph
//! - `Node`: Typed flow node with position and a kind-specific data payload
//! - `EdgePayload`: Directed transition between nodes with presentation attributes
//!
//! Boundary: topology mutators are `pub(crate)` — all writes go through the
//! `GraphStore` in `model::store`, which owns the dirty flag.

use euclid::default::{Point2D, Size2D};
use log::warn;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::{Directed, Direction};
use std::collections::{BTreeMap, HashMap};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::services::persistence::types::{FlowSnapshot, PersistedEdge, PersistedNode};

/// Stable node handle (petgraph NodeIndex — survives other deletions)
pub type NodeKey = NodeIndex;

/// Stable edge handle (petgraph EdgeIndex)
pub type EdgeKey = EdgeIndex;

/// Kind of a flow node.
///
/// Each kind selects a display label and the default data payload seeded at
/// creation time. Adding a kind means adding one variant and one arm to each
/// match below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A bot message shown to the end user.
    Message,
    /// A user turn in the conversation.
    User,
}

impl NodeKind {
    /// All kinds available to the template palette.
    pub const ALL: [NodeKind; 2] = [NodeKind::Message, NodeKind::User];

    /// Human-readable display label.
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Message => "Message",
            NodeKind::User => "User",
        }
    }

    /// Default data payload for a freshly created node of this kind.
    ///
    /// Every kind seeds at least a `label` field.
    pub fn default_data(self) -> BTreeMap<String, String> {
        let mut data = BTreeMap::new();
        data.insert("label".to_string(), self.label().to_string());
        match self {
            NodeKind::Message => {
                data.insert(
                    "content".to_string(),
                    "Enter your message here...".to_string(),
                );
            },
            NodeKind::User => {
                data.insert("title".to_string(), "User".to_string());
            },
        }
        data
    }

    pub fn as_persisted_str(self) -> &'static str {
        match self {
            NodeKind::Message => "MESSAGE",
            NodeKind::User => "USER",
        }
    }

    pub fn from_persisted_str(raw: &str) -> Option<Self> {
        match raw.trim() {
            "MESSAGE" => Some(NodeKind::Message),
            "USER" => Some(NodeKind::User),
            _ => None,
        }
    }
}

/// A flow node in the graph
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Stable node identity. Never changes after creation.
    pub id: Uuid,

    /// Node kind. Never changes after creation.
    pub kind: NodeKind,

    /// Position in canvas space. Owned by the rendering collaborator,
    /// never validated here.
    pub position: Point2D<f32>,

    /// Measured dimensions, committed by the renderer once layout settles.
    pub size: Option<Size2D<f32>>,

    /// Kind-specific named fields. Always contains `label`.
    pub data: BTreeMap<String, String>,
}

impl Node {
    /// Create a node of the given kind at a position, seeded with the
    /// kind's default data payload.
    pub fn new(kind: NodeKind, position: Point2D<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            position,
            size: None,
            data: kind.default_data(),
        }
    }
}

/// Edge payload: identity plus presentation attributes.
///
/// Presentation attributes are carried for the renderer and ignored by
/// validation.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgePayload {
    /// Stable edge identity.
    pub id: Uuid,

    /// Optional display label on the edge.
    pub label: Option<String>,

    /// Whether the renderer animates the edge.
    pub animated: bool,

    /// Opaque renderer style hint; carried verbatim.
    pub style: Option<String>,
}

impl EdgePayload {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            label: None,
            animated: false,
            style: None,
        }
    }
}

impl Default for EdgePayload {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of an edge (built from petgraph edge references)
#[derive(Debug, Clone, Copy)]
pub struct EdgeView {
    pub key: EdgeKey,
    pub from: NodeKey,
    pub to: NodeKey,
}

/// Main graph structure backed by petgraph::StableGraph
#[derive(Clone)]
pub struct Graph {
    /// The underlying petgraph stable graph
    inner: StableGraph<Node, EdgePayload, Directed>,

    /// Stable UUID to node mapping.
    id_to_node: HashMap<Uuid, NodeKey>,

    /// Stable UUID to edge mapping.
    id_to_edge: HashMap<Uuid, EdgeKey>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self {
            inner: StableGraph::new(),
            id_to_node: HashMap::new(),
            id_to_edge: HashMap::new(),
        }
    }

    // Topology mutators are crate-internal. Callers outside the store path
    // are invariant violations.

    /// Add a new node of the given kind.
    pub(crate) fn add_node(&mut self, kind: NodeKind, position: Point2D<f32>) -> NodeKey {
        let node = Node::new(kind, position);
        let id = node.id;
        let key = self.inner.add_node(node);
        self.id_to_node.insert(id, key);
        key
    }

    /// Insert a pre-built node, keeping the UUID index consistent.
    /// Returns `None` when the node's id is already present.
    pub(crate) fn insert_node(&mut self, node: Node) -> Option<NodeKey> {
        if self.id_to_node.contains_key(&node.id) {
            return None;
        }
        let id = node.id;
        let key = self.inner.add_node(node);
        self.id_to_node.insert(id, key);
        Some(key)
    }

    /// Remove a node and all its connected edges.
    pub(crate) fn remove_node(&mut self, key: NodeKey) -> Option<Node> {
        if !self.inner.contains_node(key) {
            return None;
        }
        // Collect incident edge ids before petgraph cascades their removal.
        let incident: Vec<Uuid> = self
            .inner
            .edges_directed(key, Direction::Outgoing)
            .chain(self.inner.edges_directed(key, Direction::Incoming))
            .map(|edge| edge.weight().id)
            .collect();
        let node = self.inner.remove_node(key)?;
        for edge_id in incident {
            self.id_to_edge.remove(&edge_id);
        }
        self.id_to_node.remove(&node.id);
        Some(node)
    }

    /// Add an edge between two nodes. Returns `None` when either endpoint
    /// is missing; admission policy lives in `validate`, not here.
    pub(crate) fn add_edge(
        &mut self,
        from: NodeKey,
        to: NodeKey,
        payload: EdgePayload,
    ) -> Option<EdgeKey> {
        if !self.inner.contains_node(from) || !self.inner.contains_node(to) {
            return None;
        }
        let id = payload.id;
        let key = self.inner.add_edge(from, to, payload);
        self.id_to_edge.insert(id, key);
        Some(key)
    }

    /// Remove an edge by key.
    pub(crate) fn remove_edge(&mut self, key: EdgeKey) -> Option<EdgePayload> {
        let payload = self.inner.remove_edge(key)?;
        self.id_to_edge.remove(&payload.id);
        Some(payload)
    }

    /// Get a mutable node by key.
    pub(crate) fn get_node_mut(&mut self, key: NodeKey) -> Option<&mut Node> {
        self.inner.node_weight_mut(key)
    }

    /// Get a mutable edge payload by key.
    pub(crate) fn get_edge_mut(&mut self, key: EdgeKey) -> Option<&mut EdgePayload> {
        self.inner.edge_weight_mut(key)
    }

    /// Get a node by key
    pub fn get_node(&self, key: NodeKey) -> Option<&Node> {
        self.inner.node_weight(key)
    }

    /// Get a node and its key by UUID.
    pub fn get_node_by_id(&self, id: Uuid) -> Option<(NodeKey, &Node)> {
        let key = *self.id_to_node.get(&id)?;
        Some((key, self.inner.node_weight(key)?))
    }

    /// Get node key by UUID.
    pub fn node_key(&self, id: Uuid) -> Option<NodeKey> {
        self.id_to_node.get(&id).copied()
    }

    /// Get an edge payload by key.
    pub fn get_edge(&self, key: EdgeKey) -> Option<&EdgePayload> {
        self.inner.edge_weight(key)
    }

    /// Get edge key by UUID.
    pub fn edge_key(&self, id: Uuid) -> Option<EdgeKey> {
        self.id_to_edge.get(&id).copied()
    }

    /// Find the first directed edge key between two nodes.
    pub fn find_edge_key(&self, from: NodeKey, to: NodeKey) -> Option<EdgeKey> {
        self.inner.find_edge(from, to)
    }

    /// Check if a directed edge exists from `from` to `to`
    pub fn has_edge_between(&self, from: NodeKey, to: NodeKey) -> bool {
        self.inner.find_edge(from, to).is_some()
    }

    /// Iterate over all nodes as (key, node) pairs
    pub fn nodes(&self) -> impl Iterator<Item = (NodeKey, &Node)> {
        self.inner
            .node_indices()
            .map(move |idx| (idx, &self.inner[idx]))
    }

    /// Iterate over all edges as EdgeView
    pub fn edges(&self) -> impl Iterator<Item = EdgeView> + '_ {
        self.inner.edge_references().map(|e| EdgeView {
            key: e.id(),
            from: e.source(),
            to: e.target(),
        })
    }

    /// Iterate outgoing neighbor keys for a node
    pub fn out_neighbors(&self, key: NodeKey) -> impl Iterator<Item = NodeKey> + '_ {
        self.inner.neighbors_directed(key, Direction::Outgoing)
    }

    /// Iterate incoming neighbor keys for a node
    pub fn in_neighbors(&self, key: NodeKey) -> impl Iterator<Item = NodeKey> + '_ {
        self.inner.neighbors_directed(key, Direction::Incoming)
    }

    /// Count of nodes in the graph
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Count of edges in the graph
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Serialize the graph to a persistable snapshot
    pub fn to_snapshot(&self) -> FlowSnapshot {
        let nodes = self
            .nodes()
            .map(|(_, node)| PersistedNode {
                node_id: node.id.to_string(),
                kind: node.kind.as_persisted_str().to_string(),
                position_x: node.position.x,
                position_y: node.position.y,
                width: node.size.map(|s| s.width),
                height: node.size.map(|s| s.height),
                data: node.data.clone(),
            })
            .collect();

        let edges = self
            .edges()
            .map(|view| {
                let source_node_id = self
                    .get_node(view.from)
                    .map(|n| n.id.to_string())
                    .unwrap_or_default();
                let target_node_id = self
                    .get_node(view.to)
                    .map(|n| n.id.to_string())
                    .unwrap_or_default();
                let payload = self.get_edge(view.key);
                PersistedEdge {
                    edge_id: payload.map(|p| p.id.to_string()).unwrap_or_default(),
                    source_node_id,
                    target_node_id,
                    label: payload.and_then(|p| p.label.clone()),
                    animated: payload.map(|p| p.animated).unwrap_or(false),
                    style: payload.and_then(|p| p.style.clone()),
                }
            })
            .collect();

        let timestamp_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        FlowSnapshot {
            nodes,
            edges,
            timestamp_secs,
        }
    }

    /// Rebuild a graph from a persisted snapshot.
    ///
    /// Entries that cannot be resolved (unparseable ids, unknown kinds,
    /// edges naming missing nodes) are skipped rather than failing the
    /// whole restore.
    pub fn from_snapshot(snapshot: &FlowSnapshot) -> Self {
        let mut graph = Graph::new();

        for pnode in &snapshot.nodes {
            let Ok(node_id) = Uuid::parse_str(&pnode.node_id) else {
                warn!(
                    "graph: skipping node with unparseable id {:?}",
                    pnode.node_id
                );
                continue;
            };
            let Some(kind) = NodeKind::from_persisted_str(&pnode.kind) else {
                warn!(
                    "graph: skipping node {node_id} with unknown kind {:?}",
                    pnode.kind
                );
                continue;
            };
            let node = Node {
                id: node_id,
                kind,
                position: Point2D::new(pnode.position_x, pnode.position_y),
                size: pnode
                    .width
                    .zip(pnode.height)
                    .map(|(w, h)| Size2D::new(w, h)),
                data: pnode.data.clone(),
            };
            if graph.insert_node(node).is_none() {
                warn!("graph: skipping duplicate node id {node_id}");
            }
        }

        for pedge in &snapshot.edges {
            let from_key = Uuid::parse_str(&pedge.source_node_id)
                .ok()
                .and_then(|id| graph.node_key(id));
            let to_key = Uuid::parse_str(&pedge.target_node_id)
                .ok()
                .and_then(|id| graph.node_key(id));
            let (Some(from), Some(to)) = (from_key, to_key) else {
                warn!(
                    "graph: dropping edge {:?} with missing endpoint",
                    pedge.edge_id
                );
                continue;
            };
            let payload = EdgePayload {
                id: Uuid::parse_str(&pedge.edge_id).unwrap_or_else(|_| Uuid::new_v4()),
                label: pedge.label.clone(),
                animated: pedge.animated,
                style: pedge.style.clone(),
            };
            let _ = graph.add_edge(from, to, payload);
        }

        graph
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
