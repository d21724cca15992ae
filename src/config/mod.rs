// src/config/mod.rs

//! Model file loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a model file from disk (`loader.rs`).
//! - Validate group references and global settings (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ConfigFile, ConfigSection, GroupConfig, RawConfigFile, ResourceConfig};
