// src/config/mod.rs

//! Configuration loading and validation for tbwatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and merge CLI overrides (`loader.rs`).
//! - Apply defaults and validate into a `ConfigFile` (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{apply_cli_overrides, load_and_validate, load_for_cli, load_from_path};
pub use model::{ConfigFile, RawConfigFile};
