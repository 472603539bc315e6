/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Flow-graph state and validation engine for a conversational flow editor.
//!
//! Core pieces:
//! - `model`: authoritative node/edge state, change-sets, dirty tracking
//! - `validate`: connection admission and whole-graph validity rules
//! - `session`: single-node selection and the asynchronous save lifecycle
//! - `services::persistence`: snapshot types and the save transport boundary
//!
//! Rendering, drag-and-drop, content-edit forms, and the durable write are
//! external collaborators; they consume read-only graph views and drive the
//! session through its mutation and save entry points.

pub mod model;
pub mod services;
pub mod session;
pub mod validate;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
