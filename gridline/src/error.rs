//! Error types.

use std::any::Any;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a cell accessor could not produce a value.
///
/// Cell errors never escape rendering: the engine shows a placeholder and
/// logs the error instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellError {
    /// The named field does not exist on the record.
    #[error("field '{0}' is not present on the record")]
    MissingField(String),

    /// A computed accessor reported a failure.
    #[error("accessor failed: {0}")]
    Compute(String),

    /// A computed accessor panicked.
    #[error("accessor panicked: {0}")]
    Panicked(String),
}

impl CellError {
    pub fn compute(message: impl Into<String>) -> Self {
        CellError::Compute(message.into())
    }
}

/// Errors raised while loading or validating a [`crate::TableConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Errors raised while writing an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing has been published to the registry yet.
    #[error("no table has registered export data")]
    Empty,

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Extract a human-readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
