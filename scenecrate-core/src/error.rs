//! Error types for scenecrate

use thiserror::Error;

/// Arithmetic failures raised by the math kernel and the cameras
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum MathError {
    #[error("cannot normalize a zero-length vector")]
    ZeroLengthVector,

    #[error("division by zero in perspective divide (w = {w})")]
    DivisionByZero { w: f64 },

    #[error("invalid camera configuration: {0}")]
    DegenerateCamera(&'static str),
}

/// Main error type for application code that mixes scenecrate layers
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arithmetic error: {0}")]
    Math(#[from] MathError),

    #[error("Scene graph error: {0}")]
    Graph(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for scenecrate operations
pub type Result<T> = std::result::Result<T, Error>;
