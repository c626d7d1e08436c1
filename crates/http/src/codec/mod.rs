//! Byte-level decoders used by the parsers.
//!
//! The codec layer knows nothing about buffers or byte sources. Each decoder looks at
//! a slice of input, takes what it can, and returns how much it took:
//!
//! - Header parsing via [`header`] module
//! - Payload decoding via [`body`] module
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use micro_http_parser::codec::{HeadDecoder, PayloadDecoder};
//! use micro_http_parser::protocol::{MessageHead, RequestHeader};
//!
//! let src = b"POST / HTTP/1.1\r\nContent-Length: 2\r\n\r\nhi";
//!
//! let (head, header_len) = HeadDecoder::default().decode::<RequestHeader>(src).unwrap().unwrap();
//! let framing = head.framing(None).unwrap();
//!
//! let mut body = BytesMut::new();
//! let mut payload = PayloadDecoder::new(framing, 8192, false);
//! payload.decode(&src[header_len..], &mut body).unwrap();
//! assert!(payload.is_finished());
//! assert_eq!(&body[..], b"hi");
//! ```

pub mod body;
pub mod header;

pub use body::{ChunkedDecoder, EofDecoder, LengthDecoder, PayloadDecoder};
pub use header::HeadDecoder;
