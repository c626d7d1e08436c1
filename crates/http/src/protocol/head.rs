//! The start line and header block shared by requests and responses.

use std::fmt::Debug;

use http::{HeaderMap, HeaderName, HeaderValue, Version};

use crate::protocol::{BodyFraming, HttpError, ParseError};

/// A message head that the parsers know how to recognize and frame.
///
/// Implemented by [`RequestHeader`](crate::protocol::RequestHeader) and
/// [`ResponseHeader`](crate::protocol::ResponseHeader); the parsers are generic over it.
pub trait MessageHead: Sized + Debug {
    /// Short label used in logs
    const KIND: &'static str;

    /// Whether a body without length framing may run until the connection closes,
    /// unless the configuration says otherwise.
    const EOF_BODY_BY_DEFAULT: bool;

    /// Parses a start line and header block from the front of `src`.
    ///
    /// Returns `Ok(Some((head, header_len)))` once the block is complete and
    /// `Ok(None)` if more bytes are needed.
    fn parse<'b>(src: &'b [u8], headers: &mut [httparse::Header<'b>]) -> Result<Option<(Self, usize)>, HttpError>;

    /// Decides how the body that follows this head ends.
    ///
    /// `eof_body` is the configured close-delimited policy, `None` when the caller
    /// left it to the message kind. An unframed body that is forbidden to run until
    /// close is still framed as [`BodyFraming::UntilClose`]; it fails when the close
    /// arrives.
    fn framing(&self, eof_body: Option<bool>) -> Result<BodyFraming, ParseError>;

    fn headers(&self) -> &HeaderMap;

    fn version(&self) -> Version;
}

/// Builds the header field list from what httparse recognized.
pub(crate) fn header_map(headers: &[httparse::Header<'_>]) -> Result<HeaderMap, ParseError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for header in headers {
        let name = HeaderName::from_bytes(header.name.as_bytes())
            .map_err(|e| ParseError::malformed_headers(format!("invalid header name {:?}: {e}", header.name)))?;
        let value = HeaderValue::from_bytes(header.value)
            .map_err(|e| ParseError::malformed_headers(format!("invalid value for header {name}: {e}")))?;
        map.append(name, value);
    }
    Ok(map)
}

/// Only HTTP/1.0 and HTTP/1.1 can be carried by this parser.
pub(crate) fn version(version: Option<u8>) -> Result<Version, ParseError> {
    match version {
        Some(0) => Ok(Version::HTTP_10),
        Some(1) => Ok(Version::HTTP_11),
        // http2 and http3 currently not support
        v => Err(ParseError::malformed_headers(format!("invalid http version: {v:?}"))),
    }
}

pub(crate) fn map_httparse_error(e: httparse::Error, max_headers: usize) -> HttpError {
    match e {
        httparse::Error::TooManyHeaders => HttpError::overflow(max_headers.saturating_add(1), max_headers),
        e => ParseError::malformed_headers(e).into(),
    }
}
