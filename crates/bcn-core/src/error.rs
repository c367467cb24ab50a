//! Errors raised while loading models and decoding or checking reports.
//!
//! A failed check on a decoded solution is a finding in an
//! [`crate::ErrorTree`], not a [`BcnError`]. Errors here mean the run cannot
//! go on: an unreadable file, a report that does not decode, a model that
//! breaks its own invariants.

use bcn_solver_common::SolverError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BcnError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Solver report, MathProg data or model JSON that does not decode
    #[error("Parse error: {0}")]
    Parse(String),

    /// Model or report values outside what the model allows
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown solver name or unreadable gap in a solver log
    #[error("Solver error: {0}")]
    Solver(String),

    /// Bad tolerances file or breakpoint generation parameters
    #[error("Configuration error: {0}")]
    Config(String),

    /// Duplicate or dangling nodes and arcs, unreachable OD pairs
    #[error("Network error: {0}")]
    Network(String),
}

pub type BcnResult<T> = Result<T, BcnError>;

impl From<serde_json::Error> for BcnError {
    fn from(err: serde_json::Error) -> Self {
        BcnError::Parse(err.to_string())
    }
}

impl From<SolverError> for BcnError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::Io(io) => BcnError::Io(io),
            other => BcnError::Solver(other.to_string()),
        }
    }
}
