// src/errors.rs

//! Crate-wide error type.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReswatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Group not found: {0}")]
    GroupNotFound(String),

    #[error("Cycle detected in group references: {0}")]
    GroupCycle(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Unsupported resource uri: {0}")]
    UnsupportedUri(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ReswatchError>;
