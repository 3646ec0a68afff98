//! Error taxonomy for the on-disk matrix and simplex solver
//!
//! Mirrors the reference implementation's error cases with a single flat
//! enum and a hand-written `Display` impl rather than a derive macro.

/// Errors that can occur while building a type descriptor, opening or
/// operating on an on-disk matrix, or running the simplex solver.
///
/// I/O failures are represented by [`CoreError::Io`] without capturing the
/// underlying [`std::io::Error`] here, since this crate is `no_std`; the
/// `std`-using `simplex` crate wraps this type with its own error enum that
/// does carry the source `io::Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CoreError {
    /// Type descriptor requested for a type without a defined `(element_size, tag)` pair.
    UnsupportedElementType = 1,
    /// On-disk matrix header does not match the expected descriptor.
    HeaderMismatch = 2,
    /// Underlying file operation failed (open, seek, read, write, flush).
    Io = 3,
    /// Out-of-range index or dimension mismatch in a matrix operation.
    Precondition = 4,
    /// Dimension checks at solver init failed, or n < m.
    InvalidProblem = 5,
    /// Solver reached optimality with an artificial variable still basic.
    NoSolution = 6,
    /// Entering column had no positive entry; the LP is unbounded.
    InfiniteSolutions = 7,
    /// Solver exceeded its iteration cap before reaching a terminal state.
    IterationLimit = 8,
}

impl CoreError {
    /// Numeric error code, stable across releases.
    pub const fn code(&self) -> u8 {
        *self as u8
    }
}

impl core::fmt::Display for CoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            CoreError::UnsupportedElementType => {
                "type descriptor requested for an unsupported element type"
            }
            CoreError::HeaderMismatch => "on-disk matrix header does not match expected type",
            CoreError::Io => "underlying file operation failed",
            CoreError::Precondition => "out-of-range index or dimension mismatch",
            CoreError::InvalidProblem => "invalid problem dimensions (n < m, or shape mismatch)",
            CoreError::NoSolution => "artificial variable remained basic at optimality",
            CoreError::InfiniteSolutions => "entering column has no positive entry (unbounded)",
            CoreError::IterationLimit => "iteration cap exceeded before reaching a terminal state",
        };
        write!(f, "{msg}")
    }
}

/// Result type used throughout the on-disk matrix and solver crates.
pub type Result<T> = core::result::Result<T, CoreError>;
