// src/sync/mod.rs

//! Incremental directory mirroring.
//!
//! - [`engine`] walks a source tree and mirrors it into a destination,
//!   skipping files whose destination copy is already up to date.
//! - [`gate`] holds the approve/deny hooks consulted before each operation.

pub mod engine;
pub mod gate;

pub use engine::{sync_dir, SyncDecision, SyncKind, SyncReport};
pub use gate::{ApproveAll, GateDecision, LoggingGate, SyncGate};
