//! Decoder implementation for HTTP chunked transfer encoding.
//!
//! This module decodes message bodies that use chunked transfer coding as specified in
//! [RFC 9112 Section 7.1](https://www.rfc-editor.org/rfc/rfc9112#section-7.1).
//!
//! The sender transmits the body as a series of chunks, each preceded by its size in
//! hexadecimal, and ends it with a zero-size chunk followed by an optional trailer
//! section.

use std::task::Poll;

use bytes::{Buf, BytesMut};
use tracing::trace;

use crate::protocol::{HttpError, ParseError};
use ChunkedState::{Body, BodyCr, BodyLf, End, EndCr, EndLf, Extension, Size, SizeLf, SizeLws, Trailer, TrailerLf};

/// A decoder for handling HTTP chunked transfer encoding.
///
/// The decoder processes incoming bytes according to the chunked format:
/// - Each chunk starts with its size in hexadecimal
/// - Followed by optional extensions and CRLF
/// - Then the chunk data and CRLF
/// - A zero-sized chunk indicates the end of the message
///
/// Chunk-size lines and the trailer section are bounded by `max_line` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: ChunkedState,
    remaining_size: u64,
    size_digits: usize,
    line_len: usize,
    max_line: usize,
}

impl ChunkedDecoder {
    /// Creates a decoder ready to read the size of the first chunk.
    pub fn new(max_line: usize) -> Self {
        Self { state: Size, remaining_size: 0, size_digits: 0, line_len: 0, max_line }
    }

    pub fn is_finished(&self) -> bool {
        self.state == End
    }

    /// True while chunk data, rather than framing, is expected next.
    pub fn is_at_data(&self) -> bool {
        self.state == Body && self.remaining_size > 0
    }

    /// True from the first data byte of a chunk until its closing CRLF is read.
    pub fn is_in_chunk(&self) -> bool {
        matches!(self.state, Body | BodyCr | BodyLf)
    }

    /// Bytes left in the current chunk, zero outside chunk data.
    pub fn remaining_in_chunk(&self) -> u64 {
        if self.state == Body { self.remaining_size } else { 0 }
    }

    /// Accounts for `n` chunk data bytes that were written directly into body storage.
    pub fn advance(&mut self, n: u64) {
        if self.state != Body {
            return;
        }
        self.remaining_size = self.remaining_size.saturating_sub(n);
        if self.remaining_size == 0 {
            self.state = BodyCr;
        }
    }

    /// Decodes as much of `src` as possible, appending chunk data to `body`.
    ///
    /// Returns the number of bytes taken from `src`. Stops early once the final chunk
    /// and trailer section are complete, leaving the rest of `src` untouched.
    ///
    /// # Errors
    ///
    /// - `MalformedChunk` if the framing is invalid
    /// - `BufferOverflow` if a chunk-size line or the trailer section is too long
    pub fn decode(&mut self, src: &[u8], body: &mut BytesMut) -> Result<usize, HttpError> {
        let mut cursor = src;

        loop {
            if self.state == End {
                break;
            }

            if cursor.is_empty() {
                // need more data
                break;
            }

            let framing = self.state != Body;

            self.state = match self.step(&mut cursor, body) {
                Poll::Pending => break,
                Poll::Ready(Ok(new_state)) => new_state,
                Poll::Ready(Err(e)) => return Err(e.into()),
            };

            if framing {
                self.line_len += 1;
                if self.line_len > self.max_line {
                    return Err(HttpError::overflow(self.line_len, self.max_line));
                }
            }

            match self.state {
                Body => {
                    // a new chunk starts, the size line is done
                    self.line_len = 0;
                }
                End => trace!("finished reading chunked data"),
                _ => {}
            }
        }

        Ok(src.len() - cursor.len())
    }

    fn step(&mut self, src: &mut &[u8], body: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        match self.state {
            Size => ChunkedState::read_size(src, &mut self.remaining_size, &mut self.size_digits),
            SizeLws => ChunkedState::read_size_lws(src),
            Extension => ChunkedState::read_extension(src),
            SizeLf => {
                let next = ChunkedState::read_size_lf(src, self.remaining_size);
                if let Poll::Ready(Ok(state)) = next {
                    trace!(size = self.remaining_size, "read chunk size");
                    self.size_digits = 0;
                    if state == EndCr {
                        // the trailer section is bounded as a whole
                        self.line_len = 0;
                    }
                }
                next
            }
            Body => ChunkedState::read_body(src, &mut self.remaining_size, body),
            BodyCr => ChunkedState::read_body_cr(src),
            BodyLf => ChunkedState::read_body_lf(src),
            Trailer => ChunkedState::read_trailer(src),
            TrailerLf => ChunkedState::read_trailer_lf(src),
            EndCr => ChunkedState::read_end_cr(src),
            EndLf => ChunkedState::read_end_lf(src),
            End => Poll::Ready(Ok(End)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    /// Read the chunk size in hex
    Size,
    /// Handle whitespace after size
    SizeLws,
    /// Skip chunk extensions
    Extension,
    /// Read LF after chunk size
    SizeLf,
    /// Read chunk data
    Body,
    /// Read CR after chunk data
    BodyCr,
    /// Read LF after chunk data
    BodyLf,
    /// Read optional trailer fields
    Trailer,
    /// Read LF after trailer
    TrailerLf,
    /// Read final CR
    EndCr,
    /// Read final LF
    EndLf,
    /// Final state after reading last chunk
    End,
}

macro_rules! try_next_byte {
    ($src:ident) => {{
        if $src.is_empty() {
            return Poll::Pending;
        }
        $src.get_u8()
    }};
}

macro_rules! invalid {
    ($reason:expr) => {
        Poll::Ready(Err(ParseError::malformed_chunk($reason)))
    };
}

impl ChunkedState {
    /// Reads and parses the chunk size in hexadecimal format.
    ///
    /// # State Transitions
    /// - On hex digit (0-9, a-f, A-F): Stay in Size state to read more digits
    /// - On whitespace (tab/space): Transition to SizeLws state
    /// - On semicolon: Transition to Extension state to handle chunk extensions
    /// - On CR: Transition to SizeLf state to finish size line
    /// - On invalid character, or a delimiter before any digit: Return error
    fn read_size(src: &mut &[u8], size_per_chunk: &mut u64, digits: &mut usize) -> Poll<Result<ChunkedState, ParseError>> {
        macro_rules! or_overflow {
            ($e:expr) => {
                match $e {
                    Some(val) => val,
                    None => return invalid!("invalid overflow chunked length"),
                }
            };
        }

        let radix = 16;
        let value = match try_next_byte!(src) {
            b @ b'0'..=b'9' => b - b'0',
            b @ b'a'..=b'f' => b + 10 - b'a',
            b @ b'A'..=b'F' => b + 10 - b'A',
            b'\t' | b' ' if *digits > 0 => return Poll::Ready(Ok(SizeLws)),
            b';' if *digits > 0 => return Poll::Ready(Ok(Extension)),
            b'\r' if *digits > 0 => return Poll::Ready(Ok(SizeLf)),
            b'\t' | b' ' | b';' | b'\r' => return invalid!("invalid chunk size line: missing size"),
            _ => return invalid!("invalid chunk size line: Invalid Size"),
        };

        *size_per_chunk = or_overflow!(size_per_chunk.checked_mul(radix));
        *size_per_chunk = or_overflow!(size_per_chunk.checked_add(u64::from(value)));
        *digits += 1;

        Poll::Ready(Ok(Size))
    }

    /// Processes linear whitespace (LWS) after the chunk size.
    ///
    /// State transitions:
    /// - On tab/space: Stay in SizeLws state to handle more whitespace
    /// - On semicolon: Move to Extension state to process chunk extensions
    /// - On CR: Move to SizeLf state to finish size line
    /// - On invalid char: Return error
    fn read_size_lws(src: &mut &[u8]) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            // LWS can follow the chunk size, but no more digits can come
            b'\t' | b' ' => Poll::Ready(Ok(SizeLws)),
            b';' => Poll::Ready(Ok(Extension)),
            b'\r' => Poll::Ready(Ok(SizeLf)),
            _ => invalid!("invalid chunk size linear white space"),
        }
    }

    /// Skips chunk extensions, which end at CRLF.
    ///
    /// # State Transitions
    /// - On CR: Move to SizeLf state to finish extension line
    /// - On LF: Return error as extensions must end with CRLF
    /// - On any other byte: Stay in Extension state
    fn read_extension(src: &mut &[u8]) -> Poll<Result<ChunkedState, ParseError>> {
        // Extensions are ignored. A plain LF is rejected so that a peer which does
        // not check for the CR can not smuggle a line past us.
        match try_next_byte!(src) {
            b'\r' => Poll::Ready(Ok(SizeLf)),
            b'\n' => invalid!("invalid chunk extension contains newline"),
            _ => Poll::Ready(Ok(Extension)), // no supported extensions
        }
    }

    /// Validates the LF byte after the chunk size line.
    ///
    /// # State Transitions
    /// - On LF with size 0: Move to EndCr state for final CRLF
    /// - On LF with size > 0: Move to Body state to read chunk data
    /// - On any other byte: Return error
    fn read_size_lf(src: &mut &[u8], size_per_chunk: u64) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\n' if size_per_chunk == 0 => Poll::Ready(Ok(EndCr)),
            b'\n' => Poll::Ready(Ok(Body)),
            _ => invalid!("invalid chunk size LF"),
        }
    }

    /// Copies up to `size_per_chunk` bytes of chunk data into `body`.
    ///
    /// # State Transitions
    /// - After reading data with remaining size > 0: Stay in Body state
    /// - After reading data with remaining size = 0: Move to BodyCr state
    fn read_body(src: &mut &[u8], size_per_chunk: &mut u64, body: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        if src.is_empty() {
            return Poll::Pending;
        }

        if *size_per_chunk == 0 {
            return Poll::Ready(Ok(BodyCr));
        }

        // cap remaining bytes at the max capacity of usize
        let remaining = usize::try_from(*size_per_chunk).unwrap_or(usize::MAX);
        let read_size = std::cmp::min(remaining, src.len());

        body.extend_from_slice(&src[..read_size]);
        src.advance(read_size);
        *size_per_chunk -= read_size as u64;

        if *size_per_chunk > 0 { Poll::Ready(Ok(Body)) } else { Poll::Ready(Ok(BodyCr)) }
    }

    /// Validates the CR byte after chunk data.
    fn read_body_cr(src: &mut &[u8]) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\r' => Poll::Ready(Ok(BodyLf)),
            _ => invalid!("invalid chunk body CR"),
        }
    }

    /// Validates the LF byte after chunk data, then expects the next chunk size.
    fn read_body_lf(src: &mut &[u8]) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\n' => Poll::Ready(Ok(Size)),
            _ => invalid!("invalid chunk body LF"),
        }
    }

    /// Skips a trailer field line. Trailer fields are read but not kept.
    fn read_trailer(src: &mut &[u8]) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\r' => Poll::Ready(Ok(TrailerLf)),
            _ => Poll::Ready(Ok(Trailer)),
        }
    }

    fn read_trailer_lf(src: &mut &[u8]) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\n' => Poll::Ready(Ok(EndCr)),
            _ => invalid!("invalid trailer end LF"),
        }
    }

    /// Either the final CRLF or the start of another trailer field.
    fn read_end_cr(src: &mut &[u8]) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\r' => Poll::Ready(Ok(EndLf)),
            _ => Poll::Ready(Ok(Trailer)),
        }
    }

    fn read_end_lf(src: &mut &[u8]) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\n' => Poll::Ready(Ok(End)),
            _ => invalid!("invalid chunk end LF"),
        }
    }
}
