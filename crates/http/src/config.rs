//! Limits and read policy shared by the buffer, the parsers and the driver.

/// Default ceiling for a single read from the source
pub const DEFAULT_READ_SIZE: usize = 64 * 1024;

/// Maximum size in bytes allowed for the entire header section
pub const DEFAULT_MAX_HEADER_BYTES: usize = 8 * 1024;

/// Maximum number of headers allowed in a message
pub const DEFAULT_MAX_HEADERS: usize = 64;

/// Default ceiling for the staging buffer, two full reads
pub const DEFAULT_MAX_BUFFER_CAPACITY: usize = 2 * DEFAULT_READ_SIZE;

/// Default ceiling for an accumulated body
pub const DEFAULT_BODY_LIMIT: u64 = 8 * 1024 * 1024;

/// Configuration for one parse: limits enforced by the parser, the capacity of the
/// staging buffer and the read policy of the driver.
///
/// ```
/// use micro_http_parser::ParseConfig;
///
/// let config = ParseConfig::default().with_read_size(4096).with_max_header_bytes(16 * 1024);
/// assert_eq!(config.read_size(), 4096);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseConfig {
    read_size: usize,
    max_header_bytes: usize,
    max_headers: usize,
    max_buffer_capacity: usize,
    allow_eof_body: Option<bool>,
    body_limit: Option<u64>,
    direct_body_reads: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            read_size: DEFAULT_READ_SIZE,
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            max_headers: DEFAULT_MAX_HEADERS,
            max_buffer_capacity: DEFAULT_MAX_BUFFER_CAPACITY,
            allow_eof_body: None,
            body_limit: Some(DEFAULT_BODY_LIMIT),
            direct_body_reads: true,
        }
    }
}

impl ParseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ceiling for a single read. Zero is bumped to one.
    #[must_use]
    pub fn with_read_size(mut self, read_size: usize) -> Self {
        self.read_size = read_size.max(1);
        self
    }

    #[must_use]
    pub fn with_max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        self.max_header_bytes = max_header_bytes;
        self
    }

    #[must_use]
    pub fn with_max_headers(mut self, max_headers: usize) -> Self {
        self.max_headers = max_headers;
        self
    }

    #[must_use]
    pub fn with_max_buffer_capacity(mut self, max_buffer_capacity: usize) -> Self {
        self.max_buffer_capacity = max_buffer_capacity;
        self
    }

    /// Whether a body without length framing may run until the connection closes.
    ///
    /// Left unset, the message type decides: responses allow it, and an unframed
    /// request has no body. Set to `false`, an unframed body of either kind is read
    /// until close and then rejected as incomplete.
    #[must_use]
    pub fn with_allow_eof_body(mut self, allow: bool) -> Self {
        self.allow_eof_body = Some(allow);
        self
    }

    /// `None` removes the limit.
    #[must_use]
    pub fn with_body_limit(mut self, body_limit: Option<u64>) -> Self {
        self.body_limit = body_limit;
        self
    }

    /// Enables reading known-size bodies straight into parser storage.
    #[must_use]
    pub fn with_direct_body_reads(mut self, enabled: bool) -> Self {
        self.direct_body_reads = enabled;
        self
    }

    pub fn read_size(&self) -> usize {
        self.read_size
    }

    pub fn max_header_bytes(&self) -> usize {
        self.max_header_bytes
    }

    pub fn max_headers(&self) -> usize {
        self.max_headers
    }

    pub fn max_buffer_capacity(&self) -> usize {
        self.max_buffer_capacity
    }

    pub fn allow_eof_body(&self) -> Option<bool> {
        self.allow_eof_body
    }

    pub fn body_limit(&self) -> Option<u64> {
        self.body_limit
    }

    pub fn direct_body_reads(&self) -> bool {
        self.direct_body_reads
    }
}
