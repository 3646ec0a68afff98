//! Type descriptor: maps an element type to its on-disk `(element_size, tag)` pair.
//!
//! Only `f32` and `f64` have a defined descriptor. Any other type simply has
//! no [`ElementDescriptor`] impl, so a generic on-disk matrix over it fails
//! to compile rather than failing at runtime; [`ElementKind::from_tag`]
//! retains a runtime check for the one place a tag is read from a file
//! before the caller's type is known to match it.

use crate::error::{CoreError, Result};

/// Length in bytes of an on-disk type tag.
pub const TAG_LEN: usize = 3;

/// A type whose on-disk representation is a fixed-size little-endian byte
/// sequence tagged with a 3-byte ASCII descriptor.
///
/// Implemented only for `f32` and `f64`, matching the two cases the
/// reference format defines.
pub trait ElementDescriptor: Copy + PartialEq + Sized + bytemuck::Pod {
    /// Size in bytes of one element on disk.
    const ELEMENT_SIZE: i32;
    /// Literal 3-byte ASCII tag, no terminator.
    const TAG: [u8; TAG_LEN];

    /// The additive identity, used to zero-initialize a freshly created matrix.
    fn zero() -> Self;

    /// Little-endian byte encoding of this element.
    fn to_le_bytes_vec(self) -> [u8; 8];

    /// Decode a little-endian byte encoding produced by [`Self::to_le_bytes_vec`].
    ///
    /// Only the first `Self::ELEMENT_SIZE` bytes of `bytes` are meaningful.
    fn from_le_bytes_buf(bytes: [u8; 8]) -> Self;
}

impl ElementDescriptor for f32 {
    const ELEMENT_SIZE: i32 = 4;
    const TAG: [u8; TAG_LEN] = *b"f32";

    fn zero() -> Self {
        0.0
    }

    fn to_le_bytes_vec(self) -> [u8; 8] {
        let mut buf = [0u8; 8];
        buf[..4].copy_from_slice(&self.to_le_bytes());
        buf
    }

    fn from_le_bytes_buf(bytes: [u8; 8]) -> Self {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&bytes[..4]);
        f32::from_le_bytes(raw)
    }
}

impl ElementDescriptor for f64 {
    const ELEMENT_SIZE: i32 = 8;
    const TAG: [u8; TAG_LEN] = *b"f64";

    fn zero() -> Self {
        0.0
    }

    fn to_le_bytes_vec(self) -> [u8; 8] {
        self.to_le_bytes()
    }

    fn from_le_bytes_buf(bytes: [u8; 8]) -> Self {
        f64::from_le_bytes(bytes)
    }
}

/// Runtime classification of a `(element_size, tag)` pair read from an
/// on-disk header, before it is checked against a specific caller type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    F32,
    F64,
}

impl ElementKind {
    /// Classify a header-reported size/tag pair, rejecting anything that
    /// isn't one of the two defined element types.
    pub fn from_tag(element_size: i32, tag: [u8; TAG_LEN]) -> Result<Self> {
        if element_size == f32::ELEMENT_SIZE && tag == f32::TAG {
            Ok(ElementKind::F32)
        } else if element_size == f64::ELEMENT_SIZE && tag == f64::TAG {
            Ok(ElementKind::F64)
        } else {
            Err(CoreError::UnsupportedElementType)
        }
    }

    pub const fn element_size(&self) -> i32 {
        match self {
            ElementKind::F32 => f32::ELEMENT_SIZE,
            ElementKind::F64 => f64::ELEMENT_SIZE,
        }
    }

    pub const fn tag(&self) -> [u8; TAG_LEN] {
        match self {
            ElementKind::F32 => f32::TAG,
            ElementKind::F64 => f64::TAG,
        }
    }
}
