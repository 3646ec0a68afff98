//! Synchronous, seek-based on-disk dense matrix.
//!
//! Every row write is flushed immediately so that a read immediately
//! following observes the new bytes (see the flush discipline described
//! alongside [`DiskMatrix::write_row`]). This crate does not use a
//! memory-mapped transport: the write-then-flush-then-maybe-read-back
//! contract here is most directly expressed with `std::fs::File` and
//! `Seek`, not a read-only `Mmap`.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::Path;

use dmatrix_core::header::HEADER_SIZE;
use dmatrix_core::{ElementDescriptor, ElementKind, MatrixHeader};

use crate::error::{Error, Result};

/// A dense `rows x cols` matrix of `T` backed by a single flat file,
/// accessed by seek + read/write.
pub struct DiskMatrix<T: ElementDescriptor> {
    file: File,
    rows: i32,
    cols: i32,
    _element: PhantomData<T>,
}

impl<T: ElementDescriptor> DiskMatrix<T> {
    /// Open an existing matrix file, verifying its header against `T`'s
    /// descriptor.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = OpenOptions::new().read(true).write(true).open(path)?;
        let mut header_bytes = [0u8; HEADER_SIZE];
        file.seek(SeekFrom::Start(0))?;
        file.read_exact(&mut header_bytes)?;
        let header = MatrixHeader::from_bytes(&header_bytes)?;

        // Distinguish "not a recognized element type at all" from "a
        // recognized type, but not the one the caller asked for".
        header.kind()?;
        header.expect_kind(expected_kind::<T>())?;

        Ok(DiskMatrix {
            file,
            rows: header.rows,
            cols: header.cols,
            _element: PhantomData,
        })
    }

    /// Create a new matrix file of the given shape, zero-initialized.
    pub fn create<P: AsRef<Path>>(path: P, rows: i32, cols: i32) -> Result<Self> {
        let header = MatrixHeader::new(rows, cols, expected_kind::<T>())?;
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.write_all(&header.to_bytes_array())?;
        file.flush()?;

        let mut matrix = DiskMatrix {
            file,
            rows,
            cols,
            _element: PhantomData,
        };
        matrix.fill(T::zero())?;
        Ok(matrix)
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    fn element_location(&self, row: i32, col: i32) -> Result<u64> {
        if row < 0 || row >= self.rows || col < 0 || col >= self.cols {
            return Err(Error::Precondition);
        }
        let index = row as u64 * self.cols as u64 + col as u64;
        Ok(HEADER_SIZE as u64 + index * T::ELEMENT_SIZE as u64)
    }

    /// Read row `i` as a freshly allocated dense vector of length `cols()`.
    pub fn read_row(&mut self, row: i32) -> Result<Vec<T>> {
        let offset = self.element_location(row, 0)?;
        self.file.seek(SeekFrom::Start(offset))?;

        let mut out = vec![T::zero(); self.cols as usize];
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut out);
        self.file.read_exact(bytes)?;
        Ok(out)
    }

    /// Write `row` into row `i`, then flush so a subsequent read observes it.
    pub fn write_row(&mut self, row: &[T], row_index: i32) -> Result<()> {
        if row.len() as i32 != self.cols {
            return Err(Error::Precondition);
        }
        let offset = self.element_location(row_index, 0)?;
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(bytemuck::cast_slice(row))?;
        self.file.flush()?;
        Ok(())
    }

    /// Diagnostic single-element read. Not intended for hot-path use.
    pub fn get_element(&mut self, row: i32, col: i32) -> Result<T> {
        let offset = self.element_location(row, col)?;
        self.file.seek(SeekFrom::Start(offset))?;
        let mut out = [T::zero()];
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut out);
        self.file.read_exact(bytes)?;
        Ok(out[0])
    }

    /// Diagnostic single-element write. Not intended for hot-path use.
    ///
    /// Does not flush — callers that need the write visible to another
    /// reader immediately should flush themselves. `generate_transpose`
    /// relies on this: it calls `set_element` once per destination element
    /// and flushes only once, at the end.
    pub fn set_element(&mut self, value: T, row: i32, col: i32) -> Result<()> {
        let offset = self.element_location(row, col)?;
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(bytemuck::cast_slice(&[value]))?;
        Ok(())
    }

    /// Set every element to `value`, one row write at a time.
    pub fn fill(&mut self, value: T) -> Result<()> {
        let row = vec![value; self.cols as usize];
        for i in 0..self.rows {
            self.write_row(&row, i)?;
        }
        Ok(())
    }

    /// Create a new matrix at `dest_path` holding the transpose of this
    /// matrix: element `(j, i)` of the destination equals element `(i, j)`
    /// of this matrix.
    ///
    /// Mirrors the reference's row-by-row, one-element-at-a-time write
    /// into destination columns; a future implementation could batch this
    /// into fewer seeks provided the resulting file stays bit-identical.
    pub fn generate_transpose<P: AsRef<Path>>(&mut self, dest_path: P) -> Result<DiskMatrix<T>> {
        println!(
            "generating transpose ({} x {} -> {} x {})...",
            self.rows, self.cols, self.cols, self.rows
        );
        let mut dest = DiskMatrix::<T>::create(dest_path, self.cols, self.rows)?;
        for i in 0..self.rows {
            let row = self.read_row(i)?;
            for (j, value) in row.into_iter().enumerate() {
                dest.set_element(value, j as i32, i)?;
            }
        }
        dest.file.flush()?;
        Ok(dest)
    }
}

fn expected_kind<T: ElementDescriptor>() -> ElementKind {
    if T::ELEMENT_SIZE == f64::ELEMENT_SIZE && T::TAG == f64::TAG {
        ElementKind::F64
    } else {
        ElementKind::F32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    fn scratch_path(name: &str) -> std::path::PathBuf {
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("simplex-test-{name}-{}-{}.mat", std::process::id(), id))
    }

    #[test]
    fn round_trip_write_read_row() {
        let path = scratch_path("roundtrip");
        let mut m = DiskMatrix::<f64>::create(&path, 4, 3).unwrap();
        m.write_row(&[1.0, 2.0, 3.0], 1).unwrap();
        assert_eq!(m.read_row(1).unwrap(), vec![1.0, 2.0, 3.0]);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn header_round_trips_through_open() {
        let path = scratch_path("header");
        {
            DiskMatrix::<f32>::create(&path, 10, 20).unwrap();
        }
        let reopened = DiskMatrix::<f32>::open(&path).unwrap();
        assert_eq!(reopened.rows(), 10);
        assert_eq!(reopened.cols(), 20);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn type_guard_rejects_mismatched_descriptor() {
        let path = scratch_path("type-guard");
        {
            DiskMatrix::<f64>::create(&path, 2, 2).unwrap();
        }
        let err = DiskMatrix::<f32>::open(&path).unwrap_err();
        assert!(matches!(err, Error::HeaderMismatch));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn zero_initialized_on_create() {
        let path = scratch_path("zero-init");
        let mut m = DiskMatrix::<f64>::create(&path, 3, 3).unwrap();
        for i in 0..3 {
            assert_eq!(m.read_row(i).unwrap(), vec![0.0, 0.0, 0.0]);
        }
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn transpose_matches_formula() {
        let path = scratch_path("transpose-src");
        let dest_path = scratch_path("transpose-dst");
        let mut m = DiskMatrix::<f64>::create(&path, 17, 13).unwrap();
        for i in 0..17 {
            let row: Vec<f64> = (0..13).map(|j| (i * 13 + j) as f64).collect();
            m.write_row(&row, i).unwrap();
        }
        let mut t = m.generate_transpose(&dest_path).unwrap();
        assert_eq!(t.rows(), 13);
        assert_eq!(t.cols(), 17);
        for i in 0..17 {
            for j in 0..13 {
                assert_eq!(
                    t.get_element(j, i).unwrap(),
                    (i * 13 + j) as f64,
                    "mismatch at source ({i}, {j})"
                );
            }
        }
        std::fs::remove_file(&path).ok();
        std::fs::remove_file(&dest_path).ok();
    }

    #[test]
    fn transpose_involution_round_trips() {
        let path = scratch_path("involution-src");
        let t_path = scratch_path("involution-t");
        let tt_path = scratch_path("involution-tt");
        let mut m = DiskMatrix::<f64>::create(&path, 5, 4).unwrap();
        for i in 0..5 {
            let row: Vec<f64> = (0..4).map(|j| (i * 4 + j) as f64 * 0.5).collect();
            m.write_row(&row, i).unwrap();
        }
        let mut t = m.generate_transpose(&t_path).unwrap();
        let mut tt = t.generate_transpose(&tt_path).unwrap();
        for i in 0..5 {
            assert_eq!(m.read_row(i).unwrap(), tt.read_row(i).unwrap());
        }
        std::fs::remove_file(&path).ok();
        std::fs::remove_file(&t_path).ok();
        std::fs::remove_file(&tt_path).ok();
    }
}
