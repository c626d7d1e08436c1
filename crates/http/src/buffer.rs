//! Staging buffer between a byte source and a parser.
//!
//! [`GrowableBuffer`] keeps the bytes that have been read but not yet consumed by a
//! parser, and hands out writable regions for the next read. Growth is bounded by a
//! maximum capacity so that a peer cannot make the buffer grow without limit.
//!
//! ```
//! use micro_http_parser::GrowableBuffer;
//!
//! let mut buffer = GrowableBuffer::new(16);
//! let region = buffer.reserve(8).unwrap();
//! region[..5].copy_from_slice(b"hello");
//! buffer.commit(5).unwrap();
//! assert_eq!(buffer.readable(), b"hello");
//!
//! buffer.consume(2).unwrap();
//! assert_eq!(buffer.readable(), b"llo");
//!
//! // 3 readable + 14 reserved would exceed the ceiling
//! assert!(buffer.reserve(14).is_err());
//! ```

use bytes::{Buf, BytesMut};
use tracing::trace;

use crate::ParseConfig;
use crate::ensure;
use crate::protocol::{BufferOverflow, HttpError};

/// An append/consume byte buffer with a capacity ceiling.
///
/// The backing store holds the readable bytes followed by the region handed out by
/// the last [`reserve`](Self::reserve). A region returned by `reserve` borrows the
/// buffer mutably, so it can not outlive the next call that may relocate the store.
#[derive(Debug)]
pub struct GrowableBuffer {
    inner: BytesMut,
    readable: usize,
    reserved: usize,
    max_capacity: usize,
}

impl GrowableBuffer {
    pub fn new(max_capacity: usize) -> Self {
        Self { inner: BytesMut::new(), readable: 0, reserved: 0, max_capacity }
    }

    /// Preallocates `capacity` bytes, clamped to `max_capacity`.
    pub fn with_capacity(capacity: usize, max_capacity: usize) -> Self {
        Self { inner: BytesMut::with_capacity(capacity.min(max_capacity)), readable: 0, reserved: 0, max_capacity }
    }

    pub fn from_config(config: &ParseConfig) -> Self {
        Self::new(config.max_buffer_capacity())
    }

    /// The bytes written and committed but not consumed yet.
    #[inline]
    pub fn readable(&self) -> &[u8] {
        &self.inner[..self.readable]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.readable
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.readable == 0
    }

    #[inline]
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// How many more bytes may be committed before the ceiling is reached.
    #[inline]
    pub fn remaining_capacity(&self) -> usize {
        self.max_capacity.saturating_sub(self.readable)
    }

    /// Size of the next read: the ceiling, capped by the remaining capacity.
    ///
    /// Never returns zero, so a full buffer turns into a [`BufferOverflow`] from
    /// [`reserve`](Self::reserve) rather than an empty read.
    pub fn read_size(&self, ceiling: usize) -> usize {
        ceiling.min(self.remaining_capacity()).max(1)
    }

    /// Advances past `n` readable bytes. Drops any pending reservation.
    ///
    /// # Errors
    ///
    /// Returns a logic error if `n` is larger than the readable length.
    pub fn consume(&mut self, n: usize) -> Result<(), HttpError> {
        ensure!(n <= self.readable, HttpError::logic(format!("consume {n} bytes but only {} readable", self.readable)));

        self.drop_reservation();
        self.inner.advance(n);
        self.readable -= n;
        Ok(())
    }

    /// Returns a writable region of exactly `size` bytes that follows the readable
    /// bytes. A previous, uncommitted reservation is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`BufferOverflow`] if the readable bytes plus `size` would exceed the
    /// maximum capacity. The buffer is left unchanged in that case.
    pub fn reserve(&mut self, size: usize) -> Result<&mut [u8], BufferOverflow> {
        let required = self.readable.checked_add(size).ok_or(BufferOverflow::new(usize::MAX, self.max_capacity))?;
        ensure!(required <= self.max_capacity, BufferOverflow::new(required, self.max_capacity));

        self.drop_reservation();
        self.inner.resize(required, 0);
        self.reserved = size;
        trace!(size, readable = self.readable, "reserved buffer region");
        Ok(&mut self.inner[self.readable..])
    }

    /// Makes the first `n` bytes of the last reserved region readable.
    ///
    /// # Errors
    ///
    /// Returns a logic error if `n` is larger than the last reservation.
    pub fn commit(&mut self, n: usize) -> Result<(), HttpError> {
        ensure!(n <= self.reserved, HttpError::logic(format!("commit {n} bytes but only {} reserved", self.reserved)));

        self.readable += n;
        self.inner.truncate(self.readable);
        self.reserved = 0;
        Ok(())
    }

    /// Appends a copy of `bytes`, as a `reserve` + `commit` pair would.
    ///
    /// # Errors
    ///
    /// Returns [`BufferOverflow`] if the bytes do not fit.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) -> Result<(), BufferOverflow> {
        let region = self.reserve(bytes.len())?;
        region.copy_from_slice(bytes);
        self.readable += bytes.len();
        self.reserved = 0;
        Ok(())
    }

    /// Discards every readable byte and any reservation.
    pub fn clear(&mut self) {
        self.inner.clear();
        self.readable = 0;
        self.reserved = 0;
    }

    fn drop_reservation(&mut self) {
        if self.reserved > 0 {
            self.inner.truncate(self.readable);
            self.reserved = 0;
        }
    }
}
