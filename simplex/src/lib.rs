//! Disk-backed revised simplex solver with a Big-M phase-1/2 merge.
//!
//! Built on two pieces: [`matrix::DiskMatrix`], a row-major dense matrix
//! file with a fixed typed header (format defined in `dmatrix_core`), and
//! [`simplex::Solver`], which drives that matrix (and its on-disk
//! transpose) through revised-simplex pivots using only an in-memory
//! sparse basis inverse.

pub mod error;
pub mod matrix;
pub mod simplex;

pub use dmatrix_core::{ElementDescriptor, ElementKind, MatrixHeader};
pub use error::{Error, Result};
pub use matrix::DiskMatrix;
pub use simplex::{solve_problem, Solver};
