//! One bounded step of parsing against a blocking byte source.
//!
//! [`ParseDriver::parse_some`] feeds what is buffered to the parser and, if the parser
//! still needs more, performs exactly one read. Bytes land in the staging
//! [`GrowableBuffer`], or straight in parser storage when the parser is reading plain
//! body bytes and the buffer holds nothing it has not seen.
//!
//! ```
//! use micro_http_parser::parser::{Parser, RequestParser};
//! use micro_http_parser::{GrowableBuffer, ParseDriver, ScriptedSource};
//!
//! let mut source = ScriptedSource::new(["POST / HTTP/1.1\r\nContent-", "Length: 4\r\n\r\nte", "st"]);
//! let mut buffer = GrowableBuffer::new(1024);
//! let mut parser = RequestParser::new();
//!
//! let driver = ParseDriver::default();
//! while !parser.is_done() {
//!     driver.parse_some(&mut source, &mut buffer, &mut parser).unwrap();
//! }
//! assert_eq!(parser.body(), b"test");
//! ```

use tracing::{debug, trace};

use crate::ParseConfig;
use crate::buffer::GrowableBuffer;
use crate::config::DEFAULT_READ_SIZE;
use crate::ensure;
use crate::parser::{HeaderParser, MessageParser, Parser};
use crate::protocol::{HttpError, MessageHead};
use crate::source::{ByteSource, ReadOutcome};

/// The read policy of the driver. Holds no per-message state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ParseDriver {
    read_size: usize,
    direct_body_reads: bool,
}

impl ParseDriver {
    pub fn new(config: &ParseConfig) -> Self {
        Self { read_size: config.read_size(), direct_body_reads: config.direct_body_reads() }
    }

    pub fn read_size(&self) -> usize {
        self.read_size
    }

    pub fn direct_body_reads(&self) -> bool {
        self.direct_body_reads
    }

    /// Makes progress on `parser` with at most one read from `source`.
    ///
    /// End-of-stream is handed to the parser with `write_eof`, after any bytes that
    /// came with it.
    ///
    /// # Errors
    ///
    /// - A logic error if the parser does not need more input
    /// - `ParseError` or `BufferOverflow` from the parser
    /// - `BufferOverflow` if the staging buffer is full
    /// - Read errors from `source`, unchanged
    pub fn parse_some<S, P>(&self, source: &mut S, buffer: &mut GrowableBuffer, parser: &mut P) -> Result<(), HttpError>
    where
        S: ByteSource + ?Sized,
        P: Parser + ?Sized,
    {
        ensure!(parser.needs_more() && !parser.is_done(), HttpError::logic("parse_some called on a parser that needs no more input"));

        // give the parser what we have already
        parser.consume(buffer)?;
        if !parser.needs_more() {
            return Ok(());
        }

        if self.direct_body_reads
            && buffer.is_empty()
            && let Some(hint) = parser.direct_read_hint()
        {
            return self.read_direct(source, parser, hint.min(self.read_size));
        }

        self.read_buffered(source, buffer, parser)
    }

    fn read_buffered<S, P>(&self, source: &mut S, buffer: &mut GrowableBuffer, parser: &mut P) -> Result<(), HttpError>
    where
        S: ByteSource + ?Sized,
        P: Parser + ?Sized,
    {
        let size = buffer.read_size(self.read_size);
        let region = buffer.reserve(size)?;
        let outcome = source.read_some(region)?;
        buffer.commit(outcome.len())?;
        trace!(requested = size, received = outcome.len(), eof = outcome.is_eof(), "buffered read");

        if let ReadOutcome::Eof(n) = outcome {
            if n > 0 {
                parser.consume(buffer)?;
            }
            debug!(buffered = buffer.len(), "end of stream");
            if parser.needs_more() {
                parser.write_eof()?;
            }
        }
        Ok(())
    }

    fn read_direct<S, P>(&self, source: &mut S, parser: &mut P, size: usize) -> Result<(), HttpError>
    where
        S: ByteSource + ?Sized,
        P: Parser + ?Sized,
    {
        let region = parser.prepare(size)?;
        let outcome = source.read_some(region)?;
        parser.commit(outcome.len())?;
        trace!(requested = size, received = outcome.len(), eof = outcome.is_eof(), "direct body read");

        if outcome.is_eof() {
            debug!("end of stream");
            if parser.needs_more() {
                parser.write_eof()?;
            }
        }
        Ok(())
    }

    /// Calls [`parse_some`](Self::parse_some) until the parser is done.
    ///
    /// For a header parser this reads until the header block is complete; bytes after
    /// it stay in `buffer`.
    ///
    /// # Errors
    ///
    /// The first error of any step.
    pub fn read<S, P>(&self, source: &mut S, buffer: &mut GrowableBuffer, parser: &mut P) -> Result<(), HttpError>
    where
        S: ByteSource + ?Sized,
        P: Parser + ?Sized,
    {
        while !parser.is_done() {
            self.parse_some(source, buffer, parser)?;
        }
        Ok(())
    }
}

impl Default for ParseDriver {
    fn default() -> Self {
        Self { read_size: DEFAULT_READ_SIZE, direct_body_reads: true }
    }
}

/// [`ParseDriver::parse_some`] with the default read policy.
///
/// # Errors
///
/// See [`ParseDriver::parse_some`].
pub fn parse_some<S, P>(source: &mut S, buffer: &mut GrowableBuffer, parser: &mut P) -> Result<(), HttpError>
where
    S: ByteSource + ?Sized,
    P: Parser + ?Sized,
{
    ParseDriver::default().parse_some(source, buffer, parser)
}

/// Reads until the header block of `parser` is complete.
///
/// # Errors
///
/// See [`ParseDriver::parse_some`].
pub fn read_header<S, H>(source: &mut S, buffer: &mut GrowableBuffer, parser: &mut HeaderParser<H>) -> Result<(), HttpError>
where
    S: ByteSource + ?Sized,
    H: MessageHead,
{
    ParseDriver::default().read(source, buffer, parser)
}

/// Reads until the whole message of `parser` is complete.
///
/// # Errors
///
/// See [`ParseDriver::parse_some`].
pub fn read_message<S, H>(source: &mut S, buffer: &mut GrowableBuffer, parser: &mut MessageParser<H>) -> Result<(), HttpError>
where
    S: ByteSource + ?Sized,
    H: MessageHead,
{
    ParseDriver::default().read(source, buffer, parser)
}
