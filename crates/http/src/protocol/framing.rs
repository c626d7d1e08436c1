use http::{HeaderMap, HeaderValue};

use crate::ensure;
use crate::protocol::ParseError;

/// How the end of a message body is determined.
///
/// This is decided once, when the header block completes:
/// - Known length: read exactly that many bytes
/// - Chunked: read chunk framing until the zero-size chunk
/// - Until close: everything up to end-of-stream is body
/// - Empty: no body follows the header block
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BodyFraming {
    /// Body with known length in bytes
    Length(u64),
    /// Body using chunked transfer coding
    Chunked,
    /// Body delimited by the connection closing
    UntilClose,
    /// No body
    Empty,
}

impl BodyFraming {
    #[inline]
    pub fn is_chunked(&self) -> bool {
        matches!(self, BodyFraming::Chunked)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, BodyFraming::Empty)
    }

    #[inline]
    pub fn is_until_close(&self) -> bool {
        matches!(self, BodyFraming::UntilClose)
    }

    /// A zero `Content-Length` is the same as no body at all.
    pub(crate) fn length(length: u64) -> Self {
        if length == 0 { BodyFraming::Empty } else { BodyFraming::Length(length) }
    }
}

/// What the framing headers of a message say, before the message type applies its
/// own defaults.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum FramingHeaders {
    /// Neither `Transfer-Encoding` nor `Content-Length`
    Absent,
    /// `Transfer-Encoding` whose final coding is chunked
    Chunked,
    /// `Transfer-Encoding` whose final coding is something else
    OtherCoding,
    /// `Content-Length` with this value
    Length(u64),
}

/// Reads `Transfer-Encoding` and `Content-Length`.
///
/// refer: <https://www.rfc-editor.org/rfc/rfc9112.html#name-message-body-length>
///
/// # Errors
///
/// Returns `MalformedHeaders` if:
/// - Both Content-Length and Transfer-Encoding headers are present
/// - Content-Length values are not all the same non-negative decimal number
pub(crate) fn framing_headers(headers: &HeaderMap) -> Result<FramingHeaders, ParseError> {
    let mut te_values = headers.get_all(http::header::TRANSFER_ENCODING).iter().peekable();
    let mut cl_values = headers.get_all(http::header::CONTENT_LENGTH).iter().peekable();

    match (te_values.peek().is_some(), cl_values.peek().is_some()) {
        (false, false) => Ok(FramingHeaders::Absent),

        (true, false) => {
            if is_chunked(te_values.last()) {
                Ok(FramingHeaders::Chunked)
            } else {
                Ok(FramingHeaders::OtherCoding)
            }
        }

        (false, true) => {
            let mut length = None;
            for value in cl_values {
                let current = parse_content_length(value)?;
                ensure!(
                    length.is_none_or(|previous| previous == current),
                    ParseError::malformed_headers("content-length values disagree")
                );
                length = Some(current);
            }
            length.map(FramingHeaders::Length).ok_or_else(|| ParseError::malformed_headers("empty content-length"))
        }

        (true, true) => Err(ParseError::malformed_headers("transfer_encoding and content_length both present in headers")),
    }
}

/// A `Content-Length` field value may itself be a list of identical numbers.
fn parse_content_length(value: &HeaderValue) -> Result<u64, ParseError> {
    let mut length = None;
    for part in value.as_bytes().split(|b| *b == b',') {
        let part = part.trim_ascii();
        ensure!(
            !part.is_empty() && part.iter().all(u8::is_ascii_digit),
            ParseError::malformed_headers(format!("content-length value {:?} is not a number", String::from_utf8_lossy(part)))
        );

        let mut current: u64 = 0;
        for digit in part {
            current = current
                .checked_mul(10)
                .and_then(|n| n.checked_add(u64::from(digit - b'0')))
                .ok_or_else(|| ParseError::malformed_headers("content-length overflow"))?;
        }

        ensure!(
            length.is_none_or(|previous| previous == current),
            ParseError::malformed_headers("content-length values disagree")
        );
        length = Some(current);
    }
    length.ok_or_else(|| ParseError::malformed_headers("empty content-length"))
}

/// Checks if the Transfer-Encoding header indicates chunked encoding.
///
/// According to RFC 9112, chunked must be the last encoding if present.
fn is_chunked(header_value: Option<&HeaderValue>) -> bool {
    const CHUNKED: &[u8] = b"chunked";
    if let Some(value) = header_value
        && let Some(bytes) = value.as_bytes().rsplit(|b| *b == b',').next()
    {
        return bytes.trim_ascii().eq_ignore_ascii_case(CHUNKED);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.append(*name, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn check_is_chunked() {
        assert!(!is_chunked(None));
        assert!(is_chunked(Some(&HeaderValue::from_static("gzip, chunked"))));
        assert!(is_chunked(Some(&HeaderValue::from_static("Chunked"))));
        assert!(!is_chunked(Some(&HeaderValue::from_static("chunked, gzip"))));
        assert!(!is_chunked(Some(&HeaderValue::from_static("gzip"))));
        assert!(is_chunked(Some(&HeaderValue::from_static("gzip ,  chunked "))));
    }

    #[test]
    fn last_transfer_encoding_line_decides() {
        let h = headers(&[("transfer-encoding", "chunked"), ("transfer-encoding", "gzip")]);
        assert_eq!(framing_headers(&h).unwrap(), FramingHeaders::OtherCoding);

        let h = headers(&[("transfer-encoding", "gzip"), ("transfer-encoding", "chunked")]);
        assert_eq!(framing_headers(&h).unwrap(), FramingHeaders::Chunked);
    }

    #[test]
    fn content_length_forms() {
        assert_eq!(framing_headers(&headers(&[])).unwrap(), FramingHeaders::Absent);
        assert_eq!(framing_headers(&headers(&[("content-length", "42")])).unwrap(), FramingHeaders::Length(42));
        assert_eq!(framing_headers(&headers(&[("content-length", "7, 7")])).unwrap(), FramingHeaders::Length(7));
        assert_eq!(
            framing_headers(&headers(&[("content-length", "7"), ("content-length", "7")])).unwrap(),
            FramingHeaders::Length(7)
        );
    }

    #[test]
    fn content_length_rejects() {
        for bad in ["-1", "+5", "abc", "", "1 2", "99999999999999999999999"] {
            let h = headers(&[("content-length", bad)]);
            assert!(matches!(framing_headers(&h), Err(ParseError::MalformedHeaders { .. })), "{bad:?}");
        }

        let h = headers(&[("content-length", "7, 8")]);
        assert!(framing_headers(&h).is_err());

        let h = headers(&[("content-length", "7"), ("content-length", "8")]);
        assert!(framing_headers(&h).is_err());

        let h = headers(&[("content-length", "7"), ("transfer-encoding", "chunked")]);
        assert!(framing_headers(&h).is_err());
    }

    #[test]
    fn zero_length_is_empty() {
        assert_eq!(BodyFraming::length(0), BodyFraming::Empty);
        assert_eq!(BodyFraming::length(3), BodyFraming::Length(3));
    }
}
