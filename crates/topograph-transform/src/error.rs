//! Error types for the topograph-transform crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Dynamic object of kind {kind:?} has no metadata.uid")]
    MissingUid { kind: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransformError>;
