/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Save transport boundary.
//!
//! The durable write lives outside this crate. `SaveBackend` is the
//! stand-in the session awaits: it accepts a snapshot and answers
//! pass/fail-with-reason. Tests and demos program the outcome.

pub mod types;

use log::debug;
use types::FlowSnapshot;

/// Error reported by the save transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistError {
    /// The backend refused or could not complete the write.
    Unavailable(String),
}

impl std::fmt::Display for PersistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistError::Unavailable(reason) => {
                write!(f, "save backend unavailable: {reason}")
            },
        }
    }
}

#[derive(Debug, Clone)]
enum BackendMode {
    Succeed,
    Fail(String),
}

/// Stub transport with a programmable outcome.
#[derive(Debug, Clone)]
pub struct SaveBackend {
    mode: BackendMode,
}

impl SaveBackend {
    /// Backend that accepts every snapshot.
    pub fn new() -> Self {
        Self {
            mode: BackendMode::Succeed,
        }
    }

    /// Backend that refuses every snapshot with the given reason.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            mode: BackendMode::Fail(reason.into()),
        }
    }

    /// Hand a snapshot to the transport and await its verdict.
    pub async fn persist(&self, snapshot: &FlowSnapshot) -> Result<(), PersistError> {
        match &self.mode {
            BackendMode::Succeed => {
                debug!(
                    "persistence: accepted snapshot ({} nodes, {} edges)",
                    snapshot.nodes.len(),
                    snapshot.edges.len()
                );
                Ok(())
            },
            BackendMode::Fail(reason) => Err(PersistError::Unavailable(reason.clone())),
        }
    }
}

impl Default for SaveBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_snapshot() -> FlowSnapshot {
        FlowSnapshot {
            nodes: vec![],
            edges: vec![],
            timestamp_secs: 0,
        }
    }

    #[tokio::test]
    async fn default_backend_accepts() {
        let backend = SaveBackend::new();
        assert!(backend.persist(&empty_snapshot()).await.is_ok());
    }

    #[tokio::test]
    async fn failing_backend_reports_reason() {
        let backend = SaveBackend::failing("storage offline");
        let err = backend.persist(&empty_snapshot()).await.unwrap_err();
        assert_eq!(
            err,
            PersistError::Unavailable("storage offline".to_string())
        );
        assert_eq!(err.to_string(), "save backend unavailable: storage offline");
    }
}
