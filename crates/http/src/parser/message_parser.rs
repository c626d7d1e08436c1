use std::fmt;

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use crate::ParseConfig;
use crate::codec::PayloadDecoder;
use crate::ensure;
use crate::parser::{HeaderParser, ParseState, Parser};
use crate::protocol::{BodyFraming, HttpError, MessageHead};

/// Parses a whole message: the header block, then the body until its framing says
/// it is complete.
///
/// Body bytes are collected in parser-owned storage. Callers streaming large bodies
/// drain it with [`take_body`](Self::take_body) between driver calls.
///
/// The parser works in two phases, the same way for requests and responses:
/// 1. Header parsing through an inner [`HeaderParser`]
/// 2. Payload parsing through a [`PayloadDecoder`] picked from the body framing
///
/// ```
/// use micro_http_parser::parser::{ParseState, Parser, ResponseParser};
///
/// let mut parser = ResponseParser::new();
/// let src = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\ntest\r\n0\r\n\r\n";
///
/// assert_eq!(parser.write(src).unwrap(), src.len());
/// assert_eq!(parser.state(), ParseState::Done);
/// assert_eq!(parser.body(), b"test");
/// ```
pub struct MessageParser<H> {
    header: HeaderParser<H>,
    payload: Option<PayloadDecoder>,
    framing: Option<BodyFraming>,
    state: ParseState,

    body: BytesMut,
    /// Length of the region handed out by `prepare` at the end of `body`
    prepared: usize,
    body_received: u64,

    skip_body: bool,
    allow_eof_body: Option<bool>,
    body_limit: Option<u64>,

    /// An error found while continuing a finished `HeaderParser`, reported by the
    /// next call
    deferred: Option<HttpError>,
}

impl<H: MessageHead> MessageParser<H> {
    pub fn new() -> Self {
        Self::with_config(&ParseConfig::default())
    }

    pub fn with_config(config: &ParseConfig) -> Self {
        Self::from_header_parser(HeaderParser::with_config(config), config)
    }

    /// Continues a header parse into the body.
    ///
    /// If the header block is already complete the body framing is decided right
    /// away. Bytes following the header block still sit in the caller's buffer and
    /// are picked up by the next `write`.
    pub fn from_header_parser(header: HeaderParser<H>, config: &ParseConfig) -> Self {
        let mut parser = Self {
            header,
            payload: None,
            framing: None,
            state: ParseState::NeedHeader,
            body: BytesMut::new(),
            prepared: 0,
            body_received: 0,
            skip_body: false,
            allow_eof_body: config.allow_eof_body(),
            body_limit: config.body_limit(),
            deferred: None,
        };

        if parser.header.is_done()
            && let Err(e) = parser.start_body()
        {
            parser.deferred = Some(e);
        }

        parser
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Treats the message as having no body whatever its headers say.
    ///
    /// Needed for responses to `HEAD` and for `2xx` responses to `CONNECT`. Only
    /// allowed before the header block is complete.
    ///
    /// # Errors
    ///
    /// A logic error once the body framing has been decided.
    pub fn set_skip_body(&mut self, skip: bool) -> Result<(), HttpError> {
        ensure!(self.payload.is_none(), HttpError::logic("skip_body set after the header block was parsed"));
        self.skip_body = skip;
        Ok(())
    }

    /// The parsed head, once the header block is complete.
    pub fn head(&self) -> Option<&H> {
        self.header.head()
    }

    /// How the body ends, once the header block is complete.
    pub fn framing(&self) -> Option<BodyFraming> {
        self.framing
    }

    /// Body bytes collected and not taken yet.
    pub fn body(&self) -> &[u8] {
        &self.body[..self.body.len() - self.prepared]
    }

    /// Takes the collected body bytes, leaving the storage empty.
    pub fn take_body(&mut self) -> Bytes {
        self.drop_prepared();
        self.body.split().freeze()
    }

    /// Total body bytes received so far, including the ones already taken.
    pub fn body_received(&self) -> u64 {
        self.body_received
    }

    pub fn into_parts(mut self) -> (Option<H>, Bytes) {
        let body = self.take_body();
        (self.header.into_head(), body)
    }

    fn start_body(&mut self) -> Result<(), HttpError> {
        let Some(head) = self.header.head() else {
            return Err(HttpError::logic("body framing requested before the header block was parsed"));
        };

        let allow_eof_body = self.allow_eof_body.unwrap_or(H::EOF_BODY_BY_DEFAULT);
        let framing = if self.skip_body { BodyFraming::Empty } else { head.framing(self.allow_eof_body)? };

        if let (BodyFraming::Length(length), Some(limit)) = (framing, self.body_limit) {
            ensure!(length <= limit, HttpError::overflow(saturate(length), saturate(limit)));
        }

        debug!(kind = H::KIND, ?framing, "body framing decided");

        let max_line = self.header.decoder().max_header_bytes();
        self.payload = Some(PayloadDecoder::new(framing, max_line, allow_eof_body));
        self.framing = Some(framing);
        self.refresh_state();
        Ok(())
    }

    fn refresh_state(&mut self) {
        self.state = match &self.payload {
            None => ParseState::NeedHeader,
            Some(payload) if payload.is_finished() => ParseState::Done,
            Some(payload) if payload.is_fix_length() => ParseState::AtBody,
            Some(payload) if payload.is_until_close() => ParseState::AtBodyEof,
            Some(payload) if payload.is_at_framing() => ParseState::NeedChunkHeader,
            Some(_) => ParseState::AtChunk,
        };
    }

    fn account_body(&mut self, n: usize) -> Result<(), HttpError> {
        self.body_received += n as u64;
        if let Some(limit) = self.body_limit {
            ensure!(self.body_received <= limit, HttpError::overflow(saturate(self.body_received), saturate(limit)));
        }
        Ok(())
    }

    fn drop_prepared(&mut self) {
        if self.prepared > 0 {
            self.body.truncate(self.body.len() - self.prepared);
            self.prepared = 0;
        }
    }

    fn take_deferred(&mut self) -> Result<(), HttpError> {
        match self.deferred.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn saturate(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

impl<H: MessageHead> Default for MessageParser<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Continues with the default [`ParseConfig`]. A header parser built with its own
/// configuration should go through [`MessageParser::from_header_parser`] instead.
impl<H: MessageHead> From<HeaderParser<H>> for MessageParser<H> {
    fn from(header: HeaderParser<H>) -> Self {
        Self::from_header_parser(header, &ParseConfig::default())
    }
}

impl<H: MessageHead> Parser for MessageParser<H> {
    fn needs_more(&self) -> bool {
        self.state != ParseState::Done
    }

    fn is_done(&self) -> bool {
        self.state == ParseState::Done
    }

    fn write(&mut self, src: &[u8]) -> Result<usize, HttpError> {
        self.take_deferred()?;
        self.drop_prepared();

        let mut used = 0;

        if self.payload.is_none() {
            used = self.header.write(src)?;
            if !self.header.is_done() {
                return Ok(used);
            }
            self.start_body()?;
        }

        if let Some(payload) = &mut self.payload
            && !payload.is_finished()
        {
            let before = self.body.len();
            used += payload.decode(&src[used..], &mut self.body)?;
            self.account_body(self.body.len() - before)?;
        }

        self.refresh_state();
        trace!(used, state = ?self.state, "parsed bytes");
        Ok(used)
    }

    fn write_eof(&mut self) -> Result<(), HttpError> {
        self.take_deferred()?;
        self.drop_prepared();

        match &mut self.payload {
            None => self.header.write_eof(),
            Some(payload) => {
                payload.finish_eof()?;
                self.refresh_state();
                Ok(())
            }
        }
    }

    fn direct_read_hint(&self) -> Option<usize> {
        if !matches!(self.state, ParseState::AtBody | ParseState::AtBodyEof | ParseState::AtChunk) {
            return None;
        }

        let hint = self.payload.as_ref()?.direct_read_hint()?;
        let hint = match self.body_limit {
            // one byte past the limit is enough to report the overflow
            Some(limit) => hint.min(limit.saturating_sub(self.body_received).max(1)),
            None => hint,
        };
        Some(saturate(hint))
    }

    fn prepare(&mut self, size: usize) -> Result<&mut [u8], HttpError> {
        self.take_deferred()?;
        self.drop_prepared();

        let Some(hint) = self.direct_read_hint() else {
            return Err(HttpError::logic(format!("direct read prepared in state {:?}", self.state)));
        };
        let size = size.min(hint);
        ensure!(size > 0, HttpError::logic("direct read of zero bytes"));

        let start = self.body.len();
        self.body.resize(start + size, 0);
        self.prepared = size;
        Ok(&mut self.body[start..])
    }

    fn commit(&mut self, n: usize) -> Result<(), HttpError> {
        ensure!(n <= self.prepared, HttpError::logic(format!("commit {n} bytes but only {} prepared", self.prepared)));

        let keep = self.body.len() - self.prepared + n;
        self.body.truncate(keep);
        self.prepared = 0;

        if let Some(payload) = &mut self.payload {
            payload.advance(n as u64);
        }
        self.account_body(n)?;
        self.refresh_state();
        Ok(())
    }
}

impl<H: fmt::Debug> fmt::Debug for MessageParser<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageParser")
            .field("header", &self.header)
            .field("framing", &self.framing)
            .field("state", &self.state)
            .field("body_len", &(self.body.len() - self.prepared))
            .field("body_received", &self.body_received)
            .finish_non_exhaustive()
    }
}
