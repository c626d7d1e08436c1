//! Incremental message parsers.
//!
//! A parser is fed with whatever bytes are available and reports how many it used.
//! It never blocks and never reads on its own; [`crate::driver`] pairs it with a
//! byte source and a [`GrowableBuffer`].
//!
//! - [`HeaderParser`]: stops once the start line and header block are recognized
//! - [`MessageParser`]: continues through the end of the body
//!
//! Both are generic over [`MessageHead`](crate::protocol::MessageHead), so the same
//! state machine parses requests and responses.
//!
//! # States
//!
//! ```text
//! NeedHeader ──► HeadersComplete                      (HeaderParser)
//!
//! NeedHeader ─┬─► AtBody ───────────────► Done        (MessageParser)
//!             ├─► NeedChunkHeader ◄─► AtChunk
//!             │        └──────────────► Done
//!             ├─► AtBodyEof ──(eof)───► Done
//!             └─────────────────────► Done
//! ```

mod header_parser;
mod message_parser;

pub use header_parser::HeaderParser;
pub use message_parser::MessageParser;

use crate::buffer::GrowableBuffer;
use crate::protocol::{HttpError, RequestHeader, ResponseHeader};

pub type RequestHeaderParser = HeaderParser<RequestHeader>;
pub type ResponseHeaderParser = HeaderParser<ResponseHeader>;
pub type RequestParser = MessageParser<RequestHeader>;
pub type ResponseParser = MessageParser<ResponseHeader>;

/// Where a parser is in its message.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParseState {
    /// Waiting for the rest of the start line and header block
    NeedHeader,
    /// Reading a body with a known remaining length
    AtBody,
    /// Reading a body that ends when the stream ends
    AtBodyEof,
    /// Reading a chunk-size line, or the trailer section after the last chunk
    NeedChunkHeader,
    /// Reading chunk data and the CRLF that closes it
    AtChunk,
    /// The header block is complete; terminal for a header-only parse
    HeadersComplete,
    /// The whole message is complete
    Done,
}

impl ParseState {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, ParseState::HeadersComplete | ParseState::Done)
    }

    /// Whether the parser is past the header block and reading body bytes.
    #[inline]
    pub fn is_body(&self) -> bool {
        matches!(self, ParseState::AtBody | ParseState::AtBodyEof | ParseState::NeedChunkHeader | ParseState::AtChunk)
    }
}

/// What the driver needs from a parser.
///
/// `write` is the generic path: the caller offers its readable bytes and advances
/// its buffer by the returned count. `prepare` + `commit` is the optional fast path
/// for body bytes, which lets the caller read straight into parser storage.
pub trait Parser {
    /// Whether forward progress requires more input.
    fn needs_more(&self) -> bool;

    /// Whether the parser reached its terminal state. Implies `!needs_more()`.
    fn is_done(&self) -> bool;

    /// Parses from the front of `src` and returns how many bytes were used.
    ///
    /// A parser may use fewer bytes than offered, even zero, while an incomplete
    /// header block is pending; the caller offers them again with more appended.
    ///
    /// # Errors
    ///
    /// `ParseError` for malformed input and `BufferOverflow` when a limit is hit.
    /// Either way the message is lost.
    fn write(&mut self, src: &[u8]) -> Result<usize, HttpError>;

    /// Tells the parser that the source is exhausted.
    ///
    /// # Errors
    ///
    /// `ParseError::IncompleteHeaders` or `ParseError::IncompleteBody` if the message
    /// can not end here.
    fn write_eof(&mut self) -> Result<(), HttpError>;

    /// Upper bound of a direct read into parser storage, if one is possible now.
    fn direct_read_hint(&self) -> Option<usize> {
        None
    }

    /// Returns a writable region of parser storage, at most `size` bytes long.
    ///
    /// # Errors
    ///
    /// A logic error unless [`direct_read_hint`](Self::direct_read_hint) is `Some`.
    fn prepare(&mut self, size: usize) -> Result<&mut [u8], HttpError> {
        Err(HttpError::logic(format!("direct read of {size} bytes is not supported by this parser")))
    }

    /// Accepts the first `n` bytes of the last prepared region as input.
    ///
    /// # Errors
    ///
    /// A logic error if `n` exceeds the prepared size, or any error `write` could
    /// return for the same bytes.
    fn commit(&mut self, n: usize) -> Result<(), HttpError> {
        Err(HttpError::logic(format!("commit of {n} bytes without a prepared region")))
    }

    /// Feeds the readable bytes of `buffer` and consumes what was used.
    ///
    /// # Errors
    ///
    /// Whatever [`write`](Self::write) returns.
    fn consume(&mut self, buffer: &mut GrowableBuffer) -> Result<(), HttpError> {
        let used = self.write(buffer.readable())?;
        buffer.consume(used)
    }
}

impl<P: Parser + ?Sized> Parser for &mut P {
    fn needs_more(&self) -> bool {
        (**self).needs_more()
    }

    fn is_done(&self) -> bool {
        (**self).is_done()
    }

    fn write(&mut self, src: &[u8]) -> Result<usize, HttpError> {
        (**self).write(src)
    }

    fn write_eof(&mut self) -> Result<(), HttpError> {
        (**self).write_eof()
    }

    fn direct_read_hint(&self) -> Option<usize> {
        (**self).direct_read_hint()
    }

    fn prepare(&mut self, size: usize) -> Result<&mut [u8], HttpError> {
        (**self).prepare(size)
    }

    fn commit(&mut self, n: usize) -> Result<(), HttpError> {
        (**self).commit(n)
    }

    fn consume(&mut self, buffer: &mut GrowableBuffer) -> Result<(), HttpError> {
        (**self).consume(buffer)
    }
}
