use std::io;
use thiserror::Error;

/// Top-level error returned by the parsers, the buffer and the driver.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("parse error: {source}")]
    Parse {
        #[from]
        source: ParseError,
    },

    #[error("{source}")]
    BufferOverflow {
        #[from]
        source: BufferOverflow,
    },

    #[error("logic error: {reason}")]
    Logic { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl HttpError {
    pub fn logic<S: ToString>(str: S) -> Self {
        Self::Logic { reason: str.to_string() }
    }

    pub fn overflow(requested: usize, limit: usize) -> Self {
        BufferOverflow::new(requested, limit).into()
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, HttpError::Parse { .. })
    }

    pub fn is_overflow(&self) -> bool {
        matches!(self, HttpError::BufferOverflow { .. })
    }

    pub fn is_logic(&self) -> bool {
        matches!(self, HttpError::Logic { .. })
    }

    pub fn is_io(&self) -> bool {
        matches!(self, HttpError::Io { .. })
    }

    /// Returns the parse error if this is one.
    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match self {
            HttpError::Parse { source } => Some(source),
            _ => None,
        }
    }
}

/// Grammar, framing, or premature end-of-stream failures. All of them are terminal
/// for the message being parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed headers: {reason}")]
    MalformedHeaders { reason: String },

    #[error("malformed chunk: {reason}")]
    MalformedChunk { reason: String },

    #[error("stream ended inside the header block after {received} bytes")]
    IncompleteHeaders { received: usize },

    #[error("stream ended before the body was complete{}", fmt_remaining(*.remaining))]
    IncompleteBody { remaining: Option<u64> },
}

fn fmt_remaining(remaining: Option<u64>) -> String {
    match remaining {
        Some(n) => format!(", {n} bytes missing"),
        None => String::new(),
    }
}

impl ParseError {
    pub fn malformed_headers<S: ToString>(str: S) -> Self {
        Self::MalformedHeaders { reason: str.to_string() }
    }

    pub fn malformed_chunk<S: ToString>(str: S) -> Self {
        Self::MalformedChunk { reason: str.to_string() }
    }

    pub fn incomplete_headers(received: usize) -> Self {
        Self::IncompleteHeaders { received }
    }

    pub fn incomplete_body(remaining: Option<u64>) -> Self {
        Self::IncompleteBody { remaining }
    }

    /// True when the peer closed before sending a single byte of the message.
    ///
    /// Servers usually treat this as an idle keep-alive connection going away rather
    /// than as a broken request.
    pub fn is_clean_close(&self) -> bool {
        matches!(self, ParseError::IncompleteHeaders { received: 0 })
    }
}

/// A reservation or an accumulated block would exceed a configured limit.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("buffer overflow, requested {requested} bytes exceed the limit {limit}")]
pub struct BufferOverflow {
    pub requested: usize,
    pub limit: usize,
}

impl BufferOverflow {
    pub fn new(requested: usize, limit: usize) -> Self {
        Self { requested, limit }
    }
}
