//! HTTP header processing module
//!
//! - [`HeadDecoder`]: Decodes a start line and header block from raw bytes
//!   - Works for requests and responses through [`MessageHead`](crate::protocol::MessageHead)
//!   - Manages header size and field count limits

mod head_decoder;

pub use head_decoder::HeadDecoder;
