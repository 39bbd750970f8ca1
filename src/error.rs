//! Error types for talentprep
//!
//! The accumulating validators report problems through their result structs.
//! The types here cover the fail-fast transformers and the ambient plumbing
//! (configuration and file loading). Remote clients report through `anyhow`.

use thiserror::Error;

/// Main error type for talentprep operations
#[derive(Error, Debug)]
pub enum TalentPrepError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A tabular precondition was violated
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for TalentPrepError {
    fn from(err: anyhow::Error) -> Self {
        TalentPrepError::Other(err.to_string())
    }
}

/// Result type alias for talentprep operations
pub type Result<T> = std::result::Result<T, TalentPrepError>;

/// Fatal precondition failures raised by the table transformers.
///
/// The first violation aborts the operation; no partial table is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("InputFrame must be a tabular dataset.")]
    NotTabular,

    #[error("InputFrame must contain at least one row.")]
    NoRows,

    #[error("InputFrame is missing required columns: StaffId and TalentStatement.")]
    MissingRequiredColumns,

    #[error("InputFrame missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("{column} column must be string-like")]
    ColumnType { column: String },

    #[error("InputFrame must contain at least one non-empty TalentStatement.")]
    NoNonEmptyStatements,

    #[error("Row {row} has {found} cells but the table has {expected} columns")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}
