//! Top-level error type, extending [`dmatrix_core::CoreError`] with a
//! carried [`std::io::Error`] source for the `Io` case.

use dmatrix_core::CoreError;
use std::fmt;

/// Error type returned by the on-disk matrix and simplex solver.
#[derive(Debug)]
pub enum Error {
    /// Type descriptor requested for a type without a defined `(element_size, tag)` pair.
    UnsupportedElementType,
    /// On-disk matrix header does not match the expected descriptor.
    HeaderMismatch,
    /// Underlying file operation failed (open, seek, read, write, flush).
    Io(std::io::Error),
    /// Out-of-range index or dimension mismatch in a matrix operation.
    Precondition,
    /// Dimension checks at solver init failed, or n < m.
    InvalidProblem,
    /// Solver reached optimality with an artificial variable still basic.
    NoSolution,
    /// Entering column had no positive entry; the LP is unbounded.
    InfiniteSolutions,
    /// Solver exceeded its iteration cap before reaching a terminal state.
    IterationLimit,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedElementType => {
                write!(f, "type descriptor requested for an unsupported element type")
            }
            Error::HeaderMismatch => {
                write!(f, "on-disk matrix header does not match expected type")
            }
            Error::Io(source) => write!(f, "underlying file operation failed: {source}"),
            Error::Precondition => write!(f, "out-of-range index or dimension mismatch"),
            Error::InvalidProblem => {
                write!(f, "invalid problem dimensions (n < m, or shape mismatch)")
            }
            Error::NoSolution => write!(f, "artificial variable remained basic at optimality"),
            Error::InfiniteSolutions => {
                write!(f, "entering column has no positive entry (unbounded)")
            }
            Error::IterationLimit => {
                write!(f, "iteration cap exceeded before reaching a terminal state")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(source) => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io(source)
    }
}

impl From<CoreError> for Error {
    fn from(source: CoreError) -> Self {
        match source {
            CoreError::UnsupportedElementType => Error::UnsupportedElementType,
            CoreError::HeaderMismatch => Error::HeaderMismatch,
            CoreError::Io => Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "underlying file operation failed",
            )),
            CoreError::Precondition => Error::Precondition,
            CoreError::InvalidProblem => Error::InvalidProblem,
            CoreError::NoSolution => Error::NoSolution,
            CoreError::InfiniteSolutions => Error::InfiniteSolutions,
            CoreError::IterationLimit => Error::IterationLimit,
        }
    }
}

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
