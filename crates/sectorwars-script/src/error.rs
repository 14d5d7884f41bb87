//! Error types for sectorwars-script

use thiserror::Error;

/// Configuration loading error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Duplicate definition: {0}")]
    DuplicateDefinition(String),

    #[error("Unknown faction {referenced} referenced by {by}")]
    UnknownFaction { referenced: String, by: String },

    /// The merged configuration failed validation
    #[error(transparent)]
    Config(#[from] sectorwars_core::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
