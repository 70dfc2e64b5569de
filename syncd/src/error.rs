//! Error types for the fieldsync daemon.
//!
//! [`SyncError`] is the crate-level taxonomy. The containment rules are:
//! `MalformedInput`, `UnrecognizedOption`, and `MissingSentinel` are fatal to
//! the single task that triggered them; `MissingSection` is fatal to the
//! project pass; `Remote` failures during an update are contained per task.
//! None of them may kill the surrounding per-project or per-event loop.

use thiserror::Error;

use crate::client::ClientError;
use crate::config::ConfigError;

/// Errors that can occur while syncing notes into custom fields.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A ticket identifier could not be split on a hyphen.
    #[error("the ticket id value is malformed: {0}")]
    MalformedInput(String),

    /// A notes value is not among an enum field's declared options.
    #[error("value '{value}' is not a declared option of enum field '{field}'")]
    UnrecognizedOption { field: String, value: String },

    /// No section in the project matches the configured target name.
    #[error("no section named '{section}' in project '{project}'")]
    MissingSection { section: String, project: String },

    /// The project schema has no usable sentinel field (or it lacks a
    /// "yes" option), so processed tasks could not be marked.
    #[error("project schema has no usable '{0}' sentinel enum field")]
    MissingSentinel(String),

    /// Configuration-related error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Failure from the tracking-service API.
    #[error("remote API error: {0}")]
    Remote(#[from] ClientError),

    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
