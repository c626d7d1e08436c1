//! Reads one HTTP/1.x message from stdin and prints its head and body size.
//!
//! ```text
//! printf 'HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello' | cargo run --example dump_message -- response
//! ```

use std::error::Error;
use std::io;

use micro_http_parser::parser::{MessageParser, Parser};
use micro_http_parser::protocol::{MessageHead, RequestHeader, ResponseHeader};
use micro_http_parser::{GrowableBuffer, ParseConfig, ParseDriver};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::TRACE).with_writer(io::stderr).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let kind = std::env::args().nth(1).unwrap_or_else(|| "request".to_string());
    let result = match kind.as_str() {
        "request" => dump::<RequestHeader>(),
        "response" => dump::<ResponseHeader>(),
        other => {
            error!(kind = other, "expected `request` or `response`");
            return;
        }
    };

    if let Err(e) = result {
        error!(cause = %e, "failed to parse message");
    }
}

fn dump<H: MessageHead>() -> Result<(), Box<dyn Error>> {
    let config = ParseConfig::default();
    let driver = ParseDriver::new(&config);
    let mut buffer = GrowableBuffer::from_config(&config);
    let mut parser = MessageParser::<H>::with_config(&config);

    let mut stdin = io::stdin().lock();
    let mut body_len = 0;
    while !parser.is_done() {
        driver.parse_some(&mut stdin, &mut buffer, &mut parser)?;
        body_len += parser.take_body().len();
    }

    if let Some(head) = parser.head() {
        info!(kind = H::KIND, version = ?head.version(), "parsed head");
        for (name, value) in head.headers() {
            info!(%name, ?value, "header");
        }
    }
    info!(framing = ?parser.framing(), body_len, "parsed body");
    Ok(())
}
