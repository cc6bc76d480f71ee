use rusqlite::Error as RusqliteError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PostlineError {
    #[error("Malformed filter key: '{0}'")]
    MalformedFilterKey(String), // Filter key did not split into 2 or 3 segments

    #[error("Unknown filter operator: '{0}'")]
    UnknownOperator(String), // Operator segment not in the fixed operator table

    #[error("Invalid sort direction: '{0}'")]
    InvalidSortDirection(String), // Order value other than ASC/DESC

    #[error("Unknown field: '{0}'")]
    UnknownField(String), // Field segment not present in the entity's column map

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] RusqliteError), // Converts rusqlite::Error automatically

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Error: {0}")]
    Error(String), // Allows custom application errors
}

impl PostlineError {
    /// True for errors caused by a bad request rather than by the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PostlineError::MalformedFilterKey(_)
                | PostlineError::UnknownOperator(_)
                | PostlineError::InvalidSortDirection(_)
                | PostlineError::UnknownField(_)
        )
    }
}
