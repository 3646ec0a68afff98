//! The fixed 15-byte on-disk matrix header.
//!
//! Layout (all integers little-endian, no padding):
//!
//! ```text
//! offset  size  field
//! 0       4     rows         (i32)
//! 4       4     cols         (i32)
//! 8       4     element_size (i32)
//! 12      3     tag          (3 ASCII bytes)
//! ```

use crate::descriptor::{ElementKind, TAG_LEN};
use crate::error::{CoreError, Result};

/// Total size in bytes of [`MatrixHeader`] on disk.
pub const HEADER_SIZE: usize = 15;

/// Parsed form of the 15-byte header written at offset 0 of every on-disk
/// matrix file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatrixHeader {
    pub rows: i32,
    pub cols: i32,
    pub element_size: i32,
    pub tag: [u8; TAG_LEN],
}

impl MatrixHeader {
    /// Build a header for a newly created matrix of the given shape and
    /// element kind. `rows` and `cols` must be strictly positive.
    pub fn new(rows: i32, cols: i32, kind: ElementKind) -> Result<Self> {
        if rows <= 0 || cols <= 0 {
            return Err(CoreError::Precondition);
        }
        Ok(MatrixHeader {
            rows,
            cols,
            element_size: kind.element_size(),
            tag: kind.tag(),
        })
    }

    /// Serialize to the exact 15-byte on-disk layout, little-endian.
    pub fn to_bytes_array(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.rows.to_le_bytes());
        buf[4..8].copy_from_slice(&self.cols.to_le_bytes());
        buf[8..12].copy_from_slice(&self.element_size.to_le_bytes());
        buf[12..15].copy_from_slice(&self.tag);
        buf
    }

    /// Parse a header from exactly [`HEADER_SIZE`] bytes.
    ///
    /// Does not validate `element_size`/`tag` against any expected element
    /// type; callers check that separately (see [`ElementKind::from_tag`]
    /// and the matrix-level `HeaderMismatch` check).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(CoreError::Io);
        }
        let rows = i32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let cols = i32::from_le_bytes(bytes[4..8].try_into().unwrap());
        let element_size = i32::from_le_bytes(bytes[8..12].try_into().unwrap());
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&bytes[12..15]);
        Ok(MatrixHeader {
            rows,
            cols,
            element_size,
            tag,
        })
    }

    /// Classify this header's `(element_size, tag)` pair, failing with
    /// [`CoreError::UnsupportedElementType`] if it names neither `f32` nor
    /// `f64`.
    pub fn kind(&self) -> Result<ElementKind> {
        ElementKind::from_tag(self.element_size, self.tag)
    }

    /// Check this header against an expected element kind, failing with
    /// [`CoreError::HeaderMismatch`] if they disagree.
    pub fn expect_kind(&self, expected: ElementKind) -> Result<()> {
        if self.element_size != expected.element_size() || self.tag != expected.tag() {
            return Err(CoreError::HeaderMismatch);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips_through_bytes() {
        let header = MatrixHeader::new(10, 20, ElementKind::F64).unwrap();
        let bytes = header.to_bytes_array();
        assert_eq!(bytes.len(), HEADER_SIZE);
        let parsed = MatrixHeader::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        assert_eq!(
            MatrixHeader::new(0, 5, ElementKind::F32),
            Err(CoreError::Precondition)
        );
        assert_eq!(
            MatrixHeader::new(5, -1, ElementKind::F32),
            Err(CoreError::Precondition)
        );
    }

    #[test]
    fn expect_kind_rejects_mismatch() {
        let header = MatrixHeader::new(3, 3, ElementKind::F64).unwrap();
        assert_eq!(
            header.expect_kind(ElementKind::F32),
            Err(CoreError::HeaderMismatch)
        );
        assert_eq!(header.expect_kind(ElementKind::F64), Ok(()));
    }
}
