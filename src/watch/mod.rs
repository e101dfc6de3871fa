// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Compiling the include globs and excluded subtrees (`patterns`).
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Debouncing bursts of changes into single re-runs (`debounce`).
//!
//! It does **not** know about the pipeline; it only calls a trigger.

pub mod debounce;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use debounce::{debounce_loop, on_trigger, OnTrigger, TriggerFuture, WatchSignal};
pub use patterns::WatchFilter;
pub use watcher::{watch, WatchSession};
