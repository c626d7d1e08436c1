//! Blocking byte sources the driver reads from.
//!
//! Every [`std::io::Read`] is a [`ByteSource`]: a socket, a pipe, a file or an
//! in-memory cursor. Timeouts belong to the source (for example
//! `TcpStream::set_read_timeout`) and reach the driver as ordinary read errors.

use std::collections::VecDeque;
use std::io;

/// Result of one successful read.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// This many bytes were written to the front of the region. More may follow.
    Data(usize),
    /// The source is exhausted; this many bytes were written before it ended.
    Eof(usize),
}

impl ReadOutcome {
    /// Number of bytes transferred by the read.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            ReadOutcome::Data(n) | ReadOutcome::Eof(n) => *n,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, ReadOutcome::Eof(_))
    }
}

/// A blocking input that may return fewer bytes than requested.
pub trait ByteSource {
    /// Reads once into `buf`, blocking until at least one byte is available, the
    /// source ends, or an error occurs.
    ///
    /// # Errors
    ///
    /// Transport errors are returned as-is; end-of-stream is not an error.
    fn read_some(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome>;
}

impl<R: io::Read + ?Sized> ByteSource for R {
    fn read_some(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome> {
        if buf.is_empty() {
            return Ok(ReadOutcome::Data(0));
        }

        loop {
            match self.read(buf) {
                Ok(0) => return Ok(ReadOutcome::Eof(0)),
                Ok(n) => return Ok(ReadOutcome::Data(n)),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }
}

/// One scripted step of a [`ScriptedSource`].
#[derive(Debug)]
enum Step {
    Bytes(Vec<u8>),
    Error(io::ErrorKind),
}

/// A source that replays a fixed fragmentation, one piece per read.
///
/// A piece larger than the read region is delivered across several reads. Once the
/// script runs out the source reports end-of-stream, either as a separate read or,
/// with [`eof_with_last_piece`](Self::eof_with_last_piece), together with the last
/// bytes.
///
/// ```
/// use micro_http_parser::{ByteSource, ReadOutcome, ScriptedSource};
///
/// let mut source = ScriptedSource::new(["ab", "cde"]);
/// let mut buf = [0u8; 8];
/// assert_eq!(source.read_some(&mut buf).unwrap(), ReadOutcome::Data(2));
/// assert_eq!(source.read_some(&mut buf).unwrap(), ReadOutcome::Data(3));
/// assert_eq!(source.read_some(&mut buf).unwrap(), ReadOutcome::Eof(0));
/// ```
#[derive(Debug, Default)]
pub struct ScriptedSource {
    steps: VecDeque<Step>,
    eof_with_last_piece: bool,
    reads: usize,
}

impl ScriptedSource {
    pub fn new<I, B>(pieces: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let steps = pieces.into_iter().map(|piece| Step::Bytes(piece.as_ref().to_vec())).collect();
        Self { steps, eof_with_last_piece: false, reads: 0 }
    }

    /// Splits `bytes` into pieces of `size` bytes.
    pub fn chunked(bytes: &[u8], size: usize) -> Self {
        Self::new(bytes.chunks(size.max(1)))
    }

    /// Splits `bytes` at the given offsets.
    pub fn split_at(bytes: &[u8], offsets: &[usize]) -> Self {
        let mut pieces = Vec::with_capacity(offsets.len() + 1);
        let mut start = 0;
        for &offset in offsets {
            let offset = offset.clamp(start, bytes.len());
            pieces.push(&bytes[start..offset]);
            start = offset;
        }
        pieces.push(&bytes[start..]);
        Self::new(pieces.into_iter().filter(|piece| !piece.is_empty()))
    }

    /// Appends a read that fails with `kind`.
    #[must_use]
    pub fn then_error(mut self, kind: io::ErrorKind) -> Self {
        self.steps.push_back(Step::Error(kind));
        self
    }

    /// Appends another piece.
    #[must_use]
    pub fn then_bytes(mut self, bytes: impl AsRef<[u8]>) -> Self {
        self.steps.push_back(Step::Bytes(bytes.as_ref().to_vec()));
        self
    }

    /// Reports end-of-stream in the same read that delivers the final bytes.
    #[must_use]
    pub fn eof_with_last_piece(mut self) -> Self {
        self.eof_with_last_piece = true;
        self
    }

    /// Number of `read_some` calls served so far.
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// True once every scripted byte has been delivered.
    pub fn is_drained(&self) -> bool {
        self.steps.is_empty()
    }
}

impl ByteSource for ScriptedSource {
    fn read_some(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome> {
        self.reads += 1;

        let Some(step) = self.steps.front_mut() else {
            return Ok(ReadOutcome::Eof(0));
        };

        let piece = match step {
            Step::Error(kind) => {
                let kind = *kind;
                self.steps.pop_front();
                return Err(io::Error::from(kind));
            }
            Step::Bytes(piece) => piece,
        };

        let n = piece.len().min(buf.len());
        buf[..n].copy_from_slice(&piece[..n]);
        piece.drain(..n);

        if piece.is_empty() {
            self.steps.pop_front();
        }

        if self.eof_with_last_piece && self.steps.is_empty() {
            Ok(ReadOutcome::Eof(n))
        } else {
            Ok(ReadOutcome::Data(n))
        }
    }
}
