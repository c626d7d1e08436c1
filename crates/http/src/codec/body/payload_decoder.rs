//! Decoder implementation for HTTP message payloads.
//!
//! This module provides a unified decoder for handling different types of HTTP message bodies:
//! - Content-Length based payloads
//! - Chunked transfer encoding
//! - Payloads running until the connection closes
//! - Messages with no body
//!
//! The decoding strategy is picked from the [`BodyFraming`] decided when the header
//! block completed.

use bytes::BytesMut;
use tracing::trace;

use crate::codec::body::chunked_decoder::ChunkedDecoder;
use crate::codec::body::eof_decoder::EofDecoder;
use crate::codec::body::length_decoder::LengthDecoder;
use crate::protocol::{BodyFraming, HttpError, ParseError};

/// A unified decoder for handling HTTP message payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadDecoder {
    /// The specific decoding strategy to use
    kind: Kind,
}

/// Enum representing different payload decoding strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// Decode payload with a fixed content length
    Length(LengthDecoder),

    /// Decode payload using chunked transfer encoding
    Chunked(ChunkedDecoder),

    /// Decode payload until end-of-stream
    Eof(EofDecoder),

    /// Handle messages with no body
    NoBody,
}

impl PayloadDecoder {
    /// Creates a decoder for `framing`.
    ///
    /// `max_line` bounds chunk-size lines and the trailer section, `eof_permitted`
    /// tells whether a close-delimited body may finish at end-of-stream.
    pub fn new(framing: BodyFraming, max_line: usize, eof_permitted: bool) -> Self {
        trace!(?framing, "selected payload decoder");
        match framing {
            BodyFraming::Length(size) => Self::fix_length(size),
            BodyFraming::Chunked => Self::chunked(max_line),
            BodyFraming::UntilClose => Self::until_close(eof_permitted),
            BodyFraming::Empty => Self::empty(),
        }
    }

    /// Creates a PayloadDecoder for messages with no body.
    pub fn empty() -> Self {
        Self { kind: Kind::NoBody }
    }

    /// Creates a PayloadDecoder for chunked transfer encoding.
    pub fn chunked(max_line: usize) -> Self {
        Self { kind: Kind::Chunked(ChunkedDecoder::new(max_line)) }
    }

    /// Creates a PayloadDecoder for a fixed-length payload.
    pub fn fix_length(size: u64) -> Self {
        if size == 0 {
            return Self::empty();
        }
        Self { kind: Kind::Length(LengthDecoder::new(size)) }
    }

    /// Creates a PayloadDecoder for a payload delimited by end-of-stream.
    pub fn until_close(permitted: bool) -> Self {
        Self { kind: Kind::Eof(EofDecoder::new(permitted)) }
    }

    pub fn is_chunked(&self) -> bool {
        matches!(self.kind, Kind::Chunked(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, Kind::NoBody)
    }

    pub fn is_fix_length(&self) -> bool {
        matches!(self.kind, Kind::Length(_))
    }

    pub fn is_until_close(&self) -> bool {
        matches!(self.kind, Kind::Eof(_))
    }

    /// Whether the whole payload has been decoded.
    pub fn is_finished(&self) -> bool {
        match &self.kind {
            Kind::Length(length_decoder) => length_decoder.is_finished(),
            Kind::Chunked(chunked_decoder) => chunked_decoder.is_finished(),
            Kind::Eof(eof_decoder) => eof_decoder.is_finished(),
            Kind::NoBody => true,
        }
    }

    /// Whether a chunk-size line or the trailer section is expected next.
    ///
    /// The CRLF closing a chunk's data still belongs to that chunk.
    pub fn is_at_framing(&self) -> bool {
        match &self.kind {
            Kind::Chunked(chunked_decoder) => !chunked_decoder.is_finished() && !chunked_decoder.is_in_chunk(),
            _ => false,
        }
    }

    /// How many body bytes may be read straight into body storage, if the payload is
    /// currently at plain body data.
    ///
    /// A close-delimited body has no bound, which is reported as `u64::MAX`.
    pub fn direct_read_hint(&self) -> Option<u64> {
        match &self.kind {
            Kind::Length(length_decoder) if !length_decoder.is_finished() => Some(length_decoder.remaining()),
            Kind::Chunked(chunked_decoder) if chunked_decoder.is_at_data() => Some(chunked_decoder.remaining_in_chunk()),
            Kind::Eof(eof_decoder) if !eof_decoder.is_finished() => Some(u64::MAX),
            _ => None,
        }
    }

    /// Decodes bytes from `src` using the appropriate strategy, appending body data to
    /// `body`. Returns the number of bytes taken from `src`.
    ///
    /// # Errors
    ///
    /// Only chunked payloads can fail, see [`ChunkedDecoder::decode`].
    pub fn decode(&mut self, src: &[u8], body: &mut BytesMut) -> Result<usize, HttpError> {
        match &mut self.kind {
            Kind::Length(length_decoder) => Ok(length_decoder.decode(src, body)),
            Kind::Chunked(chunked_decoder) => chunked_decoder.decode(src, body),
            Kind::Eof(eof_decoder) => Ok(eof_decoder.decode(src, body)),
            Kind::NoBody => Ok(0),
        }
    }

    /// Accounts for `n` body bytes that were written directly into body storage.
    pub fn advance(&mut self, n: u64) {
        match &mut self.kind {
            Kind::Length(length_decoder) => length_decoder.advance(n),
            Kind::Chunked(chunked_decoder) => chunked_decoder.advance(n),
            Kind::Eof(eof_decoder) => eof_decoder.advance(n),
            Kind::NoBody => {}
        }
    }

    /// Handles the end of the stream.
    ///
    /// # Errors
    ///
    /// Returns `IncompleteBody` unless the payload is complete or is a permitted
    /// close-delimited body.
    pub fn finish_eof(&mut self) -> Result<(), ParseError> {
        match &mut self.kind {
            Kind::Length(length_decoder) if !length_decoder.is_finished() => {
                Err(ParseError::incomplete_body(Some(length_decoder.remaining())))
            }
            Kind::Chunked(chunked_decoder) if !chunked_decoder.is_finished() => Err(ParseError::incomplete_body(None)),
            Kind::Eof(eof_decoder) => {
                if eof_decoder.finish() {
                    trace!(received = eof_decoder.received(), "close-delimited body finished");
                    Ok(())
                } else {
                    Err(ParseError::incomplete_body(None))
                }
            }
            _ => Ok(()),
        }
    }
}
