//! Error types for the todolist application.
//!
//! Invalid user input is never an error here: empty text and unknown ids are
//! reported as no-op outcomes by the store. These variants cover the ambient
//! failures around it (storage I/O, configuration, directories).

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the todolist application.
#[derive(Error, Debug)]
pub enum TodoError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    /// Storage slot key that cannot be mapped onto a file name.
    #[error("Invalid storage key: {key:?}")]
    InvalidKey { key: String },

    /// Generic application error with a custom message.
    #[error("{message}")]
    ApplicationError { message: String },
}
