//! Error types for solver metadata handling.

use thiserror::Error;

/// Errors that can occur while interpreting solver metadata.
#[derive(Debug, Error)]
pub enum SolverError {
    /// Unknown solver ID.
    #[error("Unknown solver: {0}")]
    UnknownSolver(String),

    /// A gap value matched the solver's pattern but was not a number.
    #[error("Unreadable gap value '{value}' in {solver} log")]
    InvalidGap {
        solver: crate::SolverId,
        value: String,
    },

    /// Generic IO error while reading a log stream.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for solver operations.
pub type SolverResult<T> = Result<T, SolverError>;
