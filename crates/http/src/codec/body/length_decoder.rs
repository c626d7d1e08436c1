//! Decoder implementation for HTTP messages with Content-Length header.
//!
//! This module decodes payloads whose size is specified by the Content-Length header,
//! as defined in [RFC 9112 Section 6.2](https://www.rfc-editor.org/rfc/rfc9112#section-6.2).

use std::cmp;

use bytes::BytesMut;

/// A decoder for handling HTTP messages with a known content length.
///
/// The decoder tracks the remaining bytes to be read and never takes more than that,
/// so bytes of a following message are left in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    /// The number of bytes remaining to be read from the payload
    length: u64,
}

impl LengthDecoder {
    pub fn new(length: u64) -> Self {
        Self { length }
    }

    pub fn remaining(&self) -> u64 {
        self.length
    }

    pub fn is_finished(&self) -> bool {
        self.length == 0
    }

    /// Moves the minimum of the remaining length and the available bytes into `body`.
    ///
    /// Returns the number of bytes taken from `src`.
    pub fn decode(&mut self, src: &[u8], body: &mut BytesMut) -> usize {
        if self.length == 0 || src.is_empty() {
            return 0;
        }

        // cap remaining bytes at the max capacity of usize
        let len = usize::try_from(cmp::min(self.length, src.len() as u64)).unwrap_or(src.len());
        body.extend_from_slice(&src[..len]);

        self.length -= len as u64;
        len
    }

    /// Accounts for `n` body bytes that were written directly into body storage.
    pub fn advance(&mut self, n: u64) {
        self.length = self.length.saturating_sub(n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        let src = b"101234567890abcdef\r\n\r\n";
        let mut body = BytesMut::new();

        let mut length_decoder = LengthDecoder::new(10);
        let used = length_decoder.decode(src, &mut body);

        assert_eq!(used, 10);
        assert_eq!(&body[..], b"1012345678");
        assert!(length_decoder.is_finished());
        assert_eq!(length_decoder.decode(&src[used..], &mut body), 0);
    }

    #[test]
    fn test_partial() {
        let mut body = BytesMut::new();
        let mut length_decoder = LengthDecoder::new(6);

        assert_eq!(length_decoder.decode(b"abc", &mut body), 3);
        assert_eq!(length_decoder.remaining(), 3);
        assert_eq!(length_decoder.decode(b"", &mut body), 0);

        length_decoder.advance(2);
        assert_eq!(length_decoder.remaining(), 1);
        assert_eq!(length_decoder.decode(b"defg", &mut body), 1);
        assert_eq!(&body[..], b"abcd");
        assert!(length_decoder.is_finished());
    }
}
