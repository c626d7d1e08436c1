//! HTTP body handling module for decoding message payloads
//!
//! This module decodes message bodies using the framing decided when the header block
//! completed.
//!
//! # Components
//!
//! - [`ChunkedDecoder`]: Handles chunked transfer encoded payloads
//! - [`LengthDecoder`]: Processes fixed-length payloads
//! - [`EofDecoder`]: Collects payloads delimited by end-of-stream
//! - [`PayloadDecoder`]: Main decoder that coordinates different decoding strategies
//!
//! Every decoder reads from a borrowed byte slice and reports how many bytes it took,
//! so the caller decides when its buffer is advanced.

mod chunked_decoder;
mod eof_decoder;
mod length_decoder;
mod payload_decoder;

pub use chunked_decoder::ChunkedDecoder;
pub use eof_decoder::EofDecoder;
pub use length_decoder::LengthDecoder;
pub use payload_decoder::PayloadDecoder;
