//! Decoder for bodies delimited by the end of the connection.
//!
//! See [RFC 9112 Section 6.3](https://www.rfc-editor.org/rfc/rfc9112#section-6.3), rule 8:
//! a response without length framing runs until the server closes the connection.

use bytes::BytesMut;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EofDecoder {
    received: u64,
    permitted: bool,
    finished: bool,
}

impl EofDecoder {
    /// `permitted` tells whether end-of-stream may complete the body. When it is not,
    /// the bytes are still collected but the message can never finish cleanly.
    pub fn new(permitted: bool) -> Self {
        Self { received: 0, permitted, finished: false }
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    pub fn is_permitted(&self) -> bool {
        self.permitted
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Takes every available byte as body.
    pub fn decode(&mut self, src: &[u8], body: &mut BytesMut) -> usize {
        if self.finished {
            return 0;
        }
        body.extend_from_slice(src);
        self.received += src.len() as u64;
        src.len()
    }

    pub fn advance(&mut self, n: u64) {
        self.received += n;
    }

    /// Marks the end of the stream. Returns whether that completed the body.
    pub fn finish(&mut self) -> bool {
        self.finished = self.permitted;
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_everything_until_finish() {
        let mut decoder = EofDecoder::new(true);
        let mut body = BytesMut::new();

        assert_eq!(decoder.decode(b"hello ", &mut body), 6);
        assert_eq!(decoder.decode(b"world", &mut body), 5);
        decoder.advance(3);
        assert_eq!(decoder.received(), 14);
        assert!(!decoder.is_finished());

        assert!(decoder.finish());
        assert_eq!(decoder.decode(b"late", &mut body), 0);
        assert_eq!(&body[..], b"hello world");
    }

    #[test]
    fn forbidden_eof_never_finishes() {
        let mut decoder = EofDecoder::new(false);
        let mut body = BytesMut::new();

        decoder.decode(b"abc", &mut body);
        assert!(!decoder.finish());
        assert!(!decoder.is_finished());
    }
}
