/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Editing session: selection and the asynchronous save lifecycle.
//!
//! One `FlowSession` per editing session, constructed at session start and
//! discarded at session end. It owns the graph store, the single-node
//! selection, and the save state; the rendering, drag-drop, and content
//! editing collaborators all talk to the graph through it.

use euclid::default::Point2D;
use log::debug;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use uuid::Uuid;

use crate::model::changes::{EdgeChange, NodeChange};
use crate::model::graph::{EdgePayload, Graph, NodeKind};
use crate::model::store::GraphStore;
use crate::services::persistence::{PersistError, SaveBackend};
use crate::validate::{self, ValidationError};

/// Canonical single-node selection state.
///
/// Wraps the selected id with a monotonic revision so consumers can reason
/// about selection changes deterministically. The id is opaque: selecting a
/// node the store no longer knows is accepted, and the content editor
/// observes "no matching node".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    current: Option<Uuid>,
    revision: u64,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected node id, if any.
    pub fn current(&self) -> Option<Uuid> {
        self.current
    }

    /// Monotonic revision incremented whenever the selection changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn select(&mut self, id: Uuid) {
        if self.current == Some(id) {
            return;
        }
        self.current = Some(id);
        self.revision = self.revision.saturating_add(1);
    }

    pub fn clear(&mut self) {
        if self.current.is_none() {
            return;
        }
        self.current = None;
        self.revision = self.revision.saturating_add(1);
    }
}

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Artificial latency of the save round-trip. The production default
    /// models the transport delay; tests set it to zero.
    pub save_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            save_delay: Duration::from_millis(FlowSession::DEFAULT_SAVE_DELAY_MS),
        }
    }
}

/// Result of a save attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The graph was valid and the backend accepted it; dirty cleared.
    Saved,
    /// Structural validation failed; dirty unchanged. The payload renders
    /// as the user-facing reason string.
    Invalid(ValidationError),
    /// The backend refused the write; dirty unchanged.
    Failed(PersistError),
    /// A save was already in flight; this call did nothing.
    InProgress,
}

/// Clears the saving flag on every exit path, including a dropped
/// in-flight future.
struct SaveGuard(Arc<AtomicBool>);

impl Drop for SaveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Session-scoped controller over the flow graph.
pub struct FlowSession {
    store: GraphStore,
    selection: SelectionState,
    saving: Arc<AtomicBool>,
    config: SessionConfig,
    backend: SaveBackend,
}

impl FlowSession {
    /// Default save round-trip latency in milliseconds.
    pub const DEFAULT_SAVE_DELAY_MS: u64 = 2000;

    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self::with_parts(config, SaveBackend::new())
    }

    pub fn with_parts(config: SessionConfig, backend: SaveBackend) -> Self {
        Self {
            store: GraphStore::new(),
            selection: SelectionState::new(),
            saving: Arc::new(AtomicBool::new(false)),
            config,
            backend,
        }
    }

    /// Read-only view of the graph for the rendering collaborator.
    pub fn graph(&self) -> &Graph {
        self.store.graph()
    }

    /// Currently selected node id, if any.
    pub fn selected_node(&self) -> Option<Uuid> {
        self.selection.current()
    }

    /// Selection revision counter.
    pub fn selection_revision(&self) -> u64 {
        self.selection.revision()
    }

    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    /// Whether the save affordance is enabled. Derived, never stored.
    pub fn can_save(&self) -> bool {
        self.is_dirty() && !self.is_saving()
    }

    /// Drop a node template of the given kind onto the canvas.
    pub fn create_node(&mut self, kind: NodeKind, position: Point2D<f32>) -> Uuid {
        let key = self.store.add_node(kind, position);
        // The key was just allocated by the store; the node is present.
        self.store
            .graph()
            .get_node(key)
            .map(|node| node.id)
            .unwrap_or_default()
    }

    /// Remove a node and its incident edges. Clears the selection when it
    /// pointed at the removed node.
    pub fn remove_node(&mut self, id: Uuid) -> bool {
        let removed = self.store.remove_node(id);
        if removed && self.selection.current() == Some(id) {
            self.selection.clear();
        }
        removed
    }

    /// Attempt a connection gesture. The validation engine gates the edge
    /// before it enters the store; refusals are silent at this boundary.
    pub fn connect(&mut self, source: Uuid, target: Uuid) -> bool {
        if let Err(reason) = validate::check_connection(self.store.graph(), source, target) {
            debug!("session: connection {source} -> {target} refused: {reason}");
            return false;
        }
        self.store
            .add_edge(source, target, EdgePayload::new())
            .is_some()
    }

    /// Merge a content patch into a node's data payload.
    pub fn update_node_data(&mut self, id: Uuid, patch: BTreeMap<String, String>) -> bool {
        self.store.update_node_data(id, patch)
    }

    /// Commit a content edit from the edit panel: apply the patch and
    /// clear the selection on success.
    pub fn commit_node_edit(&mut self, id: Uuid, patch: BTreeMap<String, String>) -> bool {
        let applied = self.store.update_node_data(id, patch);
        if applied {
            self.selection.clear();
        }
        applied
    }

    /// Apply a batch of node changes from the rendering collaborator.
    pub fn apply_node_changes(&mut self, changes: Vec<NodeChange>) {
        self.store.apply_node_changes(changes);
    }

    /// Apply a batch of edge changes from the rendering collaborator.
    pub fn apply_edge_changes(&mut self, changes: Vec<EdgeChange>) {
        self.store.apply_edge_changes(changes);
    }

    /// Select a node. The id is opaque; no existence check happens here.
    pub fn select(&mut self, id: Uuid) {
        self.selection.select(id);
    }

    pub fn deselect(&mut self) {
        self.selection.clear();
    }

    /// Run the save workflow.
    ///
    /// Captures a snapshot of the graph as it stands now, waits out the
    /// configured transport latency, validates the captured snapshot, and
    /// only then hands it to the backend. Mutations applied while the save
    /// is suspended land in the live store and are not part of this save.
    /// A second call while one is in flight is rejected.
    pub async fn save(&mut self) -> SaveOutcome {
        if self.saving.swap(true, Ordering::AcqRel) {
            debug!("session: save rejected, another save is in flight");
            return SaveOutcome::InProgress;
        }
        let _guard = SaveGuard(Arc::clone(&self.saving));

        let captured = self.store.graph().clone();

        if !self.config.save_delay.is_zero() {
            tokio::time::sleep(self.config.save_delay).await;
        }

        if let Err(reason) = validate::validate_graph(&captured) {
            debug!("session: save rejected: {reason}");
            return SaveOutcome::Invalid(reason);
        }

        match self.backend.persist(&captured.to_snapshot()).await {
            Ok(()) => {
                self.store.mark_saved();
                debug!("session: save completed");
                SaveOutcome::Saved
            },
            Err(e) => {
                debug!("session: backend refused save: {e}");
                SaveOutcome::Failed(e)
            },
        }
    }
}

impl Default for FlowSession {
    fn default() -> Self {
        Self::new()
    }
}
