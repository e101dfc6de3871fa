// src/exec/mod.rs

//! External toolchain layer.
//!
//! This module is responsible for actually running the compiler and the
//! compiled testbenches, using `tokio::process::Command`, and reporting
//! their combined output and exit code back to the pipeline.
//!
//! - [`backend`] provides the `Toolchain` trait and a concrete
//!   `RealToolchain` that the pipeline uses in production, and which
//!   tests can replace with a fake implementation.
//! - [`command`] spawns one process and captures its output.

pub mod backend;
pub mod command;

pub use backend::{CompileRequest, RealToolchain, ToolFuture, ToolOutput, Toolchain};
pub use command::run_captured;
