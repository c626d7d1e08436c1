//! An incremental HTTP/1.x message parser with a blocking stream driver
//!
//! This crate turns a sequence of partial, arbitrarily split reads from a blocking
//! byte source into structured HTTP heads and body bytes, without needing the whole
//! message in memory at once.
//!
//! # Features
//!
//! - Requests and responses behind one state machine
//! - Content-Length, chunked and close-delimited bodies
//! - Bounded buffering: header block size, field count, buffer capacity and body size
//!   are all limited
//! - Direct body reads into parser storage, bypassing the staging buffer
//! - Any [`std::io::Read`] works as a byte source
//!
//! # Example
//!
//! ```
//! use micro_http_parser::parser::{Parser, RequestParser};
//! use micro_http_parser::{GrowableBuffer, ParseConfig, ParseDriver};
//! use std::io::Cursor;
//!
//! let mut stream = Cursor::new(b"POST /echo HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello".to_vec());
//!
//! let config = ParseConfig::default();
//! let driver = ParseDriver::new(&config);
//! let mut buffer = GrowableBuffer::from_config(&config);
//! let mut parser = RequestParser::with_config(&config);
//!
//! while !parser.is_done() {
//!     driver.parse_some(&mut stream, &mut buffer, &mut parser).unwrap();
//! }
//!
//! let head = parser.head().unwrap();
//! assert_eq!(head.uri(), "/echo");
//! assert_eq!(parser.body(), b"hello");
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several key modules:
//!
//! - [`buffer`]: the staging buffer between a source and a parser
//! - [`source`]: blocking byte sources
//! - [`protocol`]: message heads, body framing and error types
//! - [`codec`]: byte-level decoders for heads and payloads
//! - [`parser`]: the incremental parsers built on the decoders
//! - [`driver`]: one bounded parse step against a source
//!
//! # Error Handling
//!
//! - [`protocol::HttpError`]: Top-level error type
//! - [`protocol::ParseError`]: malformed input and premature end-of-stream
//! - [`protocol::BufferOverflow`]: a configured limit would be exceeded
//!
//! # Limitations
//!
//! - HTTP/1.0 and HTTP/1.1 only
//! - Blocking sources only; there is no async driver
//! - Chunk extensions and trailer fields are skipped, not exposed

pub mod buffer;
pub mod codec;
pub mod config;
pub mod driver;
pub mod parser;
pub mod protocol;
pub mod source;

mod utils;
pub(crate) use utils::ensure;

pub use buffer::GrowableBuffer;
pub use config::ParseConfig;
pub use driver::{ParseDriver, parse_some, read_header, read_message};
pub use source::{ByteSource, ReadOutcome, ScriptedSource};
