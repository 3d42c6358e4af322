//! Append-only staging buffer for the sparse matrix loader.

use crate::error::Error;

/// A growable buffer of `usize` indices with fallible growth.
///
/// The loader stages CSR arrays here while streaming input of unknown
/// length. Growth is roughly 1.5x at a time so repeated appends stay
/// amortised O(1), and a failed growth surfaces as
/// [`Error::MemoryExhausted`] instead of aborting the process.
#[cfg_attr(test, derive(Debug))]
pub struct IndexBuf {
    data: Vec<usize>,
}

impl IndexBuf {
    /// Creates a buffer with room for `capacity` indices.
    pub fn with_capacity(capacity: usize) -> Result<IndexBuf, Error> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| Error::MemoryExhausted)?;
        Ok(IndexBuf { data })
    }

    /// Appends `value`, growing the buffer if it is full.
    pub fn push(&mut self, value: usize) -> Result<(), Error> {
        if self.data.len() == self.data.capacity() {
            let extra = (self.data.capacity() / 2).max(1);
            self.data
                .try_reserve_exact(extra)
                .map_err(|_| Error::MemoryExhausted)?;
        }
        self.data.push(value);
        Ok(())
    }

    /// Number of indices appended so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Detaches the staged indices as an exactly-sized owned buffer.
    pub fn into_boxed_slice(self) -> Box<[usize]> {
        self.data.into_boxed_slice()
    }
}
