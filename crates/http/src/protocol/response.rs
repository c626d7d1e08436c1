use http::response::Parts;
use http::{HeaderMap, Response, StatusCode, Version};

use crate::protocol::framing::{FramingHeaders, framing_headers};
use crate::protocol::head::{header_map, map_httparse_error, version};
use crate::protocol::{BodyFraming, HttpError, MessageHead, ParseError};

/// Represents a parsed HTTP response status line and header block.
#[derive(Debug)]
pub struct ResponseHeader {
    inner: Response<()>,
    reason: String,
}

impl AsRef<Response<()>> for ResponseHeader {
    fn as_ref(&self) -> &Response<()> {
        &self.inner
    }
}

impl ResponseHeader {
    pub fn into_inner(self) -> Response<()> {
        self.inner
    }

    /// Attaches a body to this header, converting it into a full `Response<T>`.
    pub fn body<T>(self, body: T) -> Response<T> {
        self.inner.map(|()| body)
    }

    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// The reason phrase exactly as sent, which may differ from the canonical one.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn version(&self) -> Version {
        self.inner.version()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// 1xx, 204 and 304 responses never carry a body.
    pub fn status_has_body(&self) -> bool {
        let status = self.status();
        !(status.is_informational() || status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED)
    }
}

impl From<Parts> for ResponseHeader {
    fn from(parts: Parts) -> Self {
        let reason = parts.status.canonical_reason().unwrap_or_default().to_owned();
        Self { inner: Response::from_parts(parts, ()), reason }
    }
}

impl MessageHead for ResponseHeader {
    const KIND: &'static str = "response";
    const EOF_BODY_BY_DEFAULT: bool = true;

    fn parse<'b>(src: &'b [u8], headers: &mut [httparse::Header<'b>]) -> Result<Option<(Self, usize)>, HttpError> {
        let max_headers = headers.len();
        let mut resp = httparse::Response::new(headers);

        let header_len = match resp.parse(src).map_err(|e| map_httparse_error(e, max_headers))? {
            httparse::Status::Complete(header_len) => header_len,
            httparse::Status::Partial => return Ok(None),
        };

        let code = resp.code.ok_or_else(|| ParseError::malformed_headers("missing status code"))?;

        let mut inner = Response::builder()
            .status(code)
            .version(version(resp.version)?)
            .body(())
            .map_err(|e| ParseError::malformed_headers(format!("invalid status line: {e}")))?;
        *inner.headers_mut() = header_map(resp.headers)?;

        let reason = resp.reason.unwrap_or_default().to_owned();
        Ok(Some((Self { inner, reason }, header_len)))
    }

    /// An unframed response body always runs until close; whether that close is
    /// acceptable is decided when it happens.
    fn framing(&self, _eof_body: Option<bool>) -> Result<BodyFraming, ParseError> {
        if !self.status_has_body() {
            return Ok(BodyFraming::Empty);
        }

        match framing_headers(self.headers())? {
            FramingHeaders::Chunked => Ok(BodyFraming::Chunked),
            FramingHeaders::Length(length) => Ok(BodyFraming::length(length)),
            FramingHeaders::OtherCoding | FramingHeaders::Absent => Ok(BodyFraming::UntilClose),
        }
    }

    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn version(&self) -> Version {
        self.inner.version()
    }
}
