//! Core HTTP protocol types shared by the decoders, the parsers and the driver.
//!
//! - **Message heads** (`head`, `request`, `response`)
//!   - [`MessageHead`]: what a parser needs from a start line + header block
//!   - [`RequestHeader`] / [`ResponseHeader`]: parsed heads wrapping `http` types
//!
//! - **Body framing** (`framing`)
//!   - [`BodyFraming`]: how the body following a head ends
//!
//! - **Error handling** (`error`)
//!   - [`HttpError`]: top-level error type
//!   - [`ParseError`]: grammar, framing and premature end-of-stream errors
//!   - [`BufferOverflow`]: a configured limit would be exceeded

mod framing;
pub use framing::BodyFraming;

mod head;
pub use head::MessageHead;

mod request;
pub use request::RequestHeader;

mod response;
pub use response::ResponseHeader;

mod error;
pub use error::BufferOverflow;
pub use error::HttpError;
pub use error::ParseError;
