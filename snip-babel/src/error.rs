//! Error types for export operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while selecting, rewriting or emitting snippets
#[derive(Debug, Error)]
pub enum ExportError {
    /// The snippet store could not be queried
    #[error("Record fetch error: {0}")]
    RecordFetch(String),

    /// Two records share the same trigger within one scope
    #[error("Duplicate trigger '{trigger}' in scope '{scope}'")]
    DuplicateTrigger { scope: String, trigger: String },

    /// A body's placeholder syntax could not be parsed
    #[error("Malformed placeholder in '{trigger}': {reason}")]
    MalformedPlaceholder { trigger: String, reason: String },

    /// A body already contains one of the quote-swap sentinels
    #[error("Body of '{trigger}' contains a reserved quote sentinel")]
    EscapeCollision { trigger: String },

    /// The record does not say whether its body is native code
    #[error("Record '{trigger}' has no native-language flag (expected Y or N)")]
    MissingNativeFlag { trigger: String },

    /// The trigger cannot be used as a file name
    #[error("Trigger '{trigger}' is not usable as a file name")]
    InvalidTrigger { trigger: String },

    /// A target directory could not be created
    #[error("Cannot create directory '{}': {source}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output file could not be written
    #[error("Cannot write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),

    /// The invocation template cannot wrap lines
    #[error("Invalid invocation template: {0}")]
    InvalidInvocation(String),

    /// The configured table name is not a plain SQL identifier
    #[error("Invalid table name '{0}'")]
    InvalidTableName(String),
}

impl ExportError {
    /// Whether the error only concerns a single record.
    ///
    /// Record-level errors are skipped with a warning; everything else stops the emitter.
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            ExportError::MalformedPlaceholder { .. }
                | ExportError::EscapeCollision { .. }
                | ExportError::MissingNativeFlag { .. }
                | ExportError::InvalidTrigger { .. }
        )
    }

    /// Whether the error concerns the store and therefore every emitter of a run.
    pub fn is_store_level(&self) -> bool {
        matches!(
            self,
            ExportError::RecordFetch(_)
                | ExportError::DuplicateTrigger { .. }
                | ExportError::InvalidTableName(_)
        )
    }
}

impl From<rusqlite::Error> for ExportError {
    fn from(err: rusqlite::Error) -> Self {
        ExportError::RecordFetch(err.to_string())
    }
}
