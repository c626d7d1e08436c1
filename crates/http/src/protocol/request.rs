//! HTTP request header handling implementation.
//!
//! This module wraps the standard `http::Request` type so that a parsed request line
//! and header block can be inspected, framed, and later joined with a body.

use http::request::Parts;
use http::{HeaderMap, Method, Request, Uri, Version};

use crate::protocol::framing::{FramingHeaders, framing_headers};
use crate::protocol::head::{header_map, map_httparse_error, version};
use crate::protocol::{BodyFraming, HttpError, MessageHead, ParseError};

/// Represents an HTTP request header.
///
/// This struct wraps a `http::Request<()>` to provide:
/// - Access to standard HTTP header fields
/// - Conversion from different request formats
/// - Body attachment capabilities
#[derive(Debug)]
pub struct RequestHeader {
    inner: Request<()>,
}

impl AsRef<Request<()>> for RequestHeader {
    fn as_ref(&self) -> &Request<()> {
        &self.inner
    }
}

impl AsMut<Request<()>> for RequestHeader {
    fn as_mut(&mut self) -> &mut Request<()> {
        &mut self.inner
    }
}

impl RequestHeader {
    /// Consumes the header and returns the inner `Request<()>`.
    pub fn into_inner(self) -> Request<()> {
        self.inner
    }

    /// Attaches a body to this header, converting it into a full `Request<T>`.
    pub fn body<T>(self, body: T) -> Request<T> {
        self.inner.map(|()| body)
    }

    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    pub fn version(&self) -> Version {
        self.inner.version()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }
}

impl From<Parts> for RequestHeader {
    #[inline]
    fn from(parts: Parts) -> Self {
        Self { inner: Request::from_parts(parts, ()) }
    }
}

impl From<Request<()>> for RequestHeader {
    #[inline]
    fn from(inner: Request<()>) -> Self {
        Self { inner }
    }
}

impl MessageHead for RequestHeader {
    const KIND: &'static str = "request";
    const EOF_BODY_BY_DEFAULT: bool = false;

    fn parse<'b>(src: &'b [u8], headers: &mut [httparse::Header<'b>]) -> Result<Option<(Self, usize)>, HttpError> {
        let max_headers = headers.len();
        let mut req = httparse::Request::new(headers);

        let header_len = match req.parse(src).map_err(|e| map_httparse_error(e, max_headers))? {
            httparse::Status::Complete(header_len) => header_len,
            httparse::Status::Partial => return Ok(None),
        };

        let method = req.method.ok_or_else(|| ParseError::malformed_headers("missing method"))?;
        let path = req.path.ok_or_else(|| ParseError::malformed_headers("missing request target"))?;

        let mut inner = Request::builder()
            .method(method)
            .uri(path)
            .version(version(req.version)?)
            .body(())
            .map_err(|e| ParseError::malformed_headers(format!("invalid request line: {e}")))?;
        *inner.headers_mut() = header_map(req.headers)?;

        Ok(Some((Self { inner }, header_len)))
    }

    /// Without framing headers a request body is empty, unless the caller set an
    /// explicit close-delimited policy.
    fn framing(&self, eof_body: Option<bool>) -> Result<BodyFraming, ParseError> {
        match framing_headers(self.headers())? {
            FramingHeaders::Chunked => Ok(BodyFraming::Chunked),
            FramingHeaders::Length(length) => Ok(BodyFraming::length(length)),
            FramingHeaders::OtherCoding => {
                Err(ParseError::malformed_headers("request transfer-encoding must end with chunked"))
            }
            FramingHeaders::Absent if eof_body.is_some() => Ok(BodyFraming::UntilClose),
            FramingHeaders::Absent => Ok(BodyFraming::Empty),
        }
    }

    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn version(&self) -> Version {
        self.inner.version()
    }
}
