#![no_std]

//! Core format definitions for the on-disk dense matrix store: the fixed
//! 15-byte header, the `(element_size, tag)` type descriptor, and the error
//! taxonomy shared by the matrix and solver crates.

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod descriptor;
pub mod error;
pub mod header;

pub use descriptor::{ElementDescriptor, ElementKind};
pub use error::{CoreError, Result};
pub use header::MatrixHeader;
