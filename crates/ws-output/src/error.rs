//! Error types for ws-output.

use thiserror::Error;

/// Errors that can occur when writing simulation output or reading a
/// position snapshot.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A snapshot file that does not follow the expected layout.
    #[error("malformed snapshot at line {line}: {message}")]
    Snapshot { line: usize, message: String },
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
