use std::fmt;

use tracing::debug;

use crate::ParseConfig;
use crate::codec::HeadDecoder;
use crate::parser::{ParseState, Parser};
use crate::protocol::{HttpError, MessageHead, ParseError};

/// Parses a start line and header block, then stops.
///
/// Bytes after the header block are left to the caller, who may hand them to a
/// [`MessageParser`](crate::parser::MessageParser) created with `From`.
///
/// ```
/// use micro_http_parser::parser::{Parser, RequestHeaderParser};
///
/// let mut parser = RequestHeaderParser::new();
/// assert_eq!(parser.write(b"GET / HTTP/1.1\r\nHost: a").unwrap(), 0);
/// assert!(parser.needs_more());
///
/// let used = parser.write(b"GET / HTTP/1.1\r\nHost: a\r\n\r\nbody").unwrap();
/// assert_eq!(used, 27);
/// assert!(parser.is_done());
/// assert_eq!(parser.head().unwrap().uri(), "/");
/// ```
pub struct HeaderParser<H> {
    decoder: HeadDecoder,
    head: Option<H>,
    header_len: usize,
    received: usize,
}

impl<H: MessageHead> HeaderParser<H> {
    pub fn new() -> Self {
        Self::with_config(&ParseConfig::default())
    }

    pub fn with_config(config: &ParseConfig) -> Self {
        Self::with_decoder(HeadDecoder::from_config(config))
    }

    pub(crate) fn with_decoder(decoder: HeadDecoder) -> Self {
        Self { decoder, head: None, header_len: 0, received: 0 }
    }

    pub fn state(&self) -> ParseState {
        if self.head.is_some() { ParseState::HeadersComplete } else { ParseState::NeedHeader }
    }

    /// The parsed head, once the header block is complete.
    pub fn head(&self) -> Option<&H> {
        self.head.as_ref()
    }

    pub fn head_mut(&mut self) -> Option<&mut H> {
        self.head.as_mut()
    }

    pub fn into_head(self) -> Option<H> {
        self.head
    }

    /// Size of the header block in bytes, zero until it is complete.
    pub fn header_len(&self) -> usize {
        self.header_len
    }

    pub(crate) fn decoder(&self) -> &HeadDecoder {
        &self.decoder
    }
}

impl<H: MessageHead> Default for HeaderParser<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: MessageHead> Parser for HeaderParser<H> {
    fn needs_more(&self) -> bool {
        self.head.is_none()
    }

    fn is_done(&self) -> bool {
        self.head.is_some()
    }

    fn write(&mut self, src: &[u8]) -> Result<usize, HttpError> {
        if self.head.is_some() {
            return Ok(0);
        }

        self.received = self.received.max(src.len());

        match self.decoder.decode::<H>(src)? {
            Some((head, header_len)) => {
                debug!(kind = H::KIND, header_len, "header block complete");
                self.head = Some(head);
                self.header_len = header_len;
                self.received = header_len;
                Ok(header_len)
            }
            None => Ok(0),
        }
    }

    fn write_eof(&mut self) -> Result<(), HttpError> {
        if self.head.is_some() {
            return Ok(());
        }
        Err(ParseError::incomplete_headers(self.received).into())
    }
}

impl<H: fmt::Debug> fmt::Debug for HeaderParser<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderParser")
            .field("head", &self.head)
            .field("header_len", &self.header_len)
            .field("received", &self.received)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};
    use indoc::indoc;

    use super::*;
    use crate::parser::{RequestHeaderParser, ResponseHeaderParser};

    #[test]
    fn request_in_one_write() {
        let str = indoc! {r##"
        GET /index.html HTTP/1.1
        Host: 127.0.0.1:8080
        Accept: */*

        "##};

        let mut parser = RequestHeaderParser::new();
        assert_eq!(parser.state(), ParseState::NeedHeader);

        let used = parser.write(str.as_bytes()).unwrap();
        assert_eq!(used, str.len());
        assert_eq!(parser.state(), ParseState::HeadersComplete);
        assert!(!parser.needs_more());

        let head = parser.head().unwrap();
        assert_eq!(head.method(), &Method::GET);
        assert_eq!(head.headers().len(), 2);
        assert_eq!(parser.header_len(), str.len());

        // done parsers ignore further input
        assert_eq!(parser.write(b"GET / HTTP/1.1\r\n\r\n").unwrap(), 0);
        assert!(parser.write_eof().is_ok());
    }

    #[test]
    fn response_split_everywhere() {
        let str = "HTTP/1.1 200 OK\r\nContent-Length: 5\r\nServer: x\r\n\r\nhello";
        let header_len = str.len() - 5;

        for split in 1..header_len {
            let mut parser = ResponseHeaderParser::new();
            assert_eq!(parser.write(&str.as_bytes()[..split]).unwrap(), 0, "split at {split}");
            assert!(parser.needs_more());

            assert_eq!(parser.write(str.as_bytes()).unwrap(), header_len);
            assert_eq!(parser.head().unwrap().status(), StatusCode::OK);
        }
    }

    #[test]
    fn eof_inside_header() {
        let mut parser = RequestHeaderParser::new();
        let e = parser.write_eof().unwrap_err();
        let parse_error = e.as_parse_error().unwrap();
        assert_eq!(parse_error, &ParseError::incomplete_headers(0));
        assert!(parse_error.is_clean_close());

        let mut parser = RequestHeaderParser::new();
        parser.write(b"GET / HT").unwrap();
        let e = parser.write_eof().unwrap_err();
        assert_eq!(e.as_parse_error().unwrap(), &ParseError::incomplete_headers(8));
        assert!(!e.as_parse_error().unwrap().is_clean_close());
    }

    #[test]
    fn oversized_header_block() {
        let config = ParseConfig::default().with_max_header_bytes(64);
        let mut parser = RequestHeaderParser::with_config(&config);

        let long = format!("GET / HTTP/1.1\r\nX-Long: {}\r\n", "v".repeat(64));
        assert!(parser.write(long.as_bytes()).unwrap_err().is_overflow());
    }
}
