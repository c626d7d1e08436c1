//! Decoder for the start line and header block of a message.
//!
//! This module turns the front of a byte slice into a structured [`MessageHead`] once
//! the whole block, up to and including the empty line, is available.
//!
//! # Limits
//!
//! - Maximum number of header fields (default 64)
//! - Maximum header block size in bytes (default 8KB)
//!
//! Both limits apply to partial blocks too, so a peer can not make the caller buffer
//! an endless header section.
//!
//! # Implementation Details
//!
//! `httparse` is not incremental: every call rescans the block from its start. The
//! caller keeps partial blocks buffered and calls again when more bytes arrived.

use tracing::trace;

use crate::ParseConfig;
use crate::ensure;
use crate::protocol::{HttpError, MessageHead};

/// Parses message heads with size and field-count limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadDecoder {
    max_headers: usize,
    max_header_bytes: usize,
}

impl HeadDecoder {
    pub fn new(max_headers: usize, max_header_bytes: usize) -> Self {
        Self { max_headers, max_header_bytes }
    }

    pub fn from_config(config: &ParseConfig) -> Self {
        Self::new(config.max_headers(), config.max_header_bytes())
    }

    pub fn max_header_bytes(&self) -> usize {
        self.max_header_bytes
    }

    /// Attempts to decode a head from the front of `src`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some((head, header_len)))` if a complete block was parsed; `header_len`
    ///   bytes of `src` belong to it
    /// - `Ok(None)` if more data is needed
    ///
    /// # Errors
    ///
    /// - `MalformedHeaders` for grammar violations and unsupported versions
    /// - `BufferOverflow` if the block, complete or not, exceeds `max_header_bytes`,
    ///   or if it has more than `max_headers` fields
    pub fn decode<H: MessageHead>(&self, src: &[u8]) -> Result<Option<(H, usize)>, HttpError> {
        if src.is_empty() {
            return Ok(None);
        }

        let mut headers = vec![httparse::EMPTY_HEADER; self.max_headers];

        match H::parse(src, &mut headers)? {
            Some((head, header_len)) => {
                ensure!(header_len <= self.max_header_bytes, HttpError::overflow(header_len, self.max_header_bytes));

                trace!(kind = H::KIND, header_len, fields = head.headers().len(), "parsed message head");
                Ok(Some((head, header_len)))
            }
            None => {
                // If parsing incomplete, ensure current buffer size does not exceed limit
                ensure!(src.len() <= self.max_header_bytes, HttpError::overflow(src.len(), self.max_header_bytes));
                Ok(None)
            }
        }
    }
}

impl Default for HeadDecoder {
    fn default() -> Self {
        Self::from_config(&ParseConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};
    use indoc::indoc;

    use super::*;
    use crate::protocol::{RequestHeader, ResponseHeader};

    #[test]
    fn decode_request() {
        let str = indoc! {r##"
        POST /submit HTTP/1.1
        Host: example.com
        Content-Length: 4

        body"##};

        let (header, header_len) = HeadDecoder::default().decode::<RequestHeader>(str.as_bytes()).unwrap().unwrap();
        assert_eq!(header.method(), &Method::POST);
        assert_eq!(&str[header_len..], "body");
    }

    #[test]
    fn decode_response() {
        let str = indoc! {r##"
        HTTP/1.1 404 Not Found
        Content-Length: 0

        "##};

        let (header, _) = HeadDecoder::default().decode::<ResponseHeader>(str.as_bytes()).unwrap().unwrap();
        assert_eq!(header.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn partial_needs_more() {
        let decoder = HeadDecoder::default();
        assert!(decoder.decode::<RequestHeader>(b"").unwrap().is_none());
        assert!(decoder.decode::<RequestHeader>(b"GET / HTTP/1.1\r\nHost: a").unwrap().is_none());
    }

    #[test]
    fn too_large_header() {
        let decoder = HeadDecoder::new(64, 32);

        let partial = format!("GET /{} HTTP/1.1\r\n", "a".repeat(64));
        assert!(decoder.decode::<RequestHeader>(partial.as_bytes()).unwrap_err().is_overflow());

        let complete = format!("GET /{} HTTP/1.1\r\n\r\n", "a".repeat(64));
        assert!(decoder.decode::<RequestHeader>(complete.as_bytes()).unwrap_err().is_overflow());
    }

    #[test]
    fn too_many_headers() {
        let decoder = HeadDecoder::new(2, 1024);
        let str = "GET / HTTP/1.1\r\nA: 1\r\nB: 2\r\nC: 3\r\n\r\n";
        assert!(decoder.decode::<RequestHeader>(str.as_bytes()).unwrap_err().is_overflow());

        let decoder = HeadDecoder::new(3, 1024);
        assert!(decoder.decode::<RequestHeader>(str.as_bytes()).unwrap().is_some());
    }

    #[test]
    fn malformed() {
        let e = HeadDecoder::default().decode::<RequestHeader>(b"GET / HTTP/1.1\r\nBad Header\r\n\r\n").unwrap_err();
        assert!(e.is_parse());
    }
}
