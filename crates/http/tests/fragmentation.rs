use std::io;

use http::{HeaderMap, Method, StatusCode};
use indoc::indoc;
use micro_http_parser::parser::{MessageParser, ParseState, Parser, RequestHeaderParser, RequestParser, ResponseParser};
use micro_http_parser::protocol::{BodyFraming, HttpError, MessageHead, ParseError, RequestHeader, ResponseHeader};
use micro_http_parser::{GrowableBuffer, ParseConfig, ParseDriver, ScriptedSource, read_header, read_message};

const REQUEST_HEAD: &str = indoc! {r##"
    GET /search?q=rust HTTP/1.1
    Host: example.com
    User-Agent: curl/8.4.0
    Accept: */*
    Accept-Encoding: gzip, deflate, br
    Cookie: a=1; b=2

    "##};

fn buffer() -> GrowableBuffer {
    GrowableBuffer::new(64 * 1024)
}

fn drive<P: Parser>(driver: &ParseDriver, source: &mut ScriptedSource, parser: &mut P) -> Result<GrowableBuffer, HttpError> {
    let mut buffer = buffer();
    driver.read(source, &mut buffer, parser)?;
    Ok(buffer)
}

fn parse_error(e: &HttpError) -> &ParseError {
    e.as_parse_error().unwrap_or_else(|| panic!("expected a parse error, got {e:?}"))
}

fn reference_headers() -> (HeaderMap, usize) {
    let mut parser = RequestHeaderParser::new();
    let used = parser.write(REQUEST_HEAD.as_bytes()).unwrap();
    (parser.head().unwrap().headers().clone(), used)
}

#[test]
fn every_split_point_gives_the_same_header() {
    let (expected, expected_len) = reference_headers();
    let input = format!("{REQUEST_HEAD}trailing");

    for split in 0..=REQUEST_HEAD.len() {
        let mut source = ScriptedSource::split_at(input.as_bytes(), &[split]);
        let mut buffer = buffer();
        let mut parser = RequestHeaderParser::new();

        read_header(&mut source, &mut buffer, &mut parser).unwrap();

        let head = parser.head().unwrap();
        assert_eq!(head.method(), &Method::GET, "split at {split}");
        assert_eq!(head.headers(), &expected, "split at {split}");
        assert_eq!(parser.header_len(), expected_len, "split at {split}");
        // bytes after the header block stay buffered, if they were read at all
        assert!(b"trailing".starts_with(buffer.readable()), "split at {split}");
    }
}

#[test]
fn one_byte_reads_give_the_same_header() {
    let (expected, expected_len) = reference_headers();

    let mut source = ScriptedSource::chunked(REQUEST_HEAD.as_bytes(), 1);
    let mut parser = RequestHeaderParser::new();
    let buffer = drive(&ParseDriver::default(), &mut source, &mut parser).unwrap();

    assert_eq!(parser.head().unwrap().headers(), &expected);
    assert_eq!(parser.header_len(), expected_len);
    assert!(buffer.is_empty());
    assert_eq!(source.reads(), REQUEST_HEAD.len());
}

#[test]
fn content_length_complete_and_cut_short() {
    let message = "POST /form HTTP/1.1\r\nContent-Length: 12\r\n\r\nhello, world";

    for size in [1, 3, 7, message.len()] {
        let mut source = ScriptedSource::chunked(message.as_bytes(), size);
        let mut parser = RequestParser::new();
        drive(&ParseDriver::default(), &mut source, &mut parser).unwrap();

        assert_eq!(parser.state(), ParseState::Done);
        assert_eq!(parser.body(), b"hello, world");
    }

    let short = &message[..message.len() - 5];
    let mut source = ScriptedSource::chunked(short.as_bytes(), 4);
    let mut parser = RequestParser::new();
    let e = drive(&ParseDriver::default(), &mut source, &mut parser).unwrap_err();

    assert_eq!(parse_error(&e), &ParseError::incomplete_body(Some(5)));
}

#[test]
fn chunked_body() {
    let message = "POST /upload HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n4\r\ntest\r\n0\r\n\r\n";

    for size in 1..=message.len() {
        let mut source = ScriptedSource::chunked(message.as_bytes(), size);
        let mut parser = RequestParser::new();
        let buffer = drive(&ParseDriver::default(), &mut source, &mut parser).unwrap();

        assert!(parser.is_done(), "pieces of {size}");
        assert_eq!(parser.body(), b"test", "pieces of {size}");
        assert_eq!(parser.framing(), Some(BodyFraming::Chunked));
        assert!(buffer.is_empty());
    }
}

#[test]
fn chunked_body_with_bad_size() {
    let message = "POST /upload HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\nxyz\r\ntest\r\n0\r\n\r\n";

    let mut source = ScriptedSource::new([message]);
    let mut parser = RequestParser::new();
    let e = drive(&ParseDriver::default(), &mut source, &mut parser).unwrap_err();

    assert!(matches!(parse_error(&e), ParseError::MalformedChunk { .. }));
}

#[test]
fn chunked_body_cut_short() {
    let message = "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\ntest\r\n";

    let mut source = ScriptedSource::new([message]);
    let mut parser = ResponseParser::new();
    let e = drive(&ParseDriver::default(), &mut source, &mut parser).unwrap_err();

    assert_eq!(parse_error(&e), &ParseError::incomplete_body(None));
}

#[test]
fn response_until_close() {
    let message = "HTTP/1.1 200 OK\r\nServer: test\r\n\r\nfirst part, second part";

    let mut source = ScriptedSource::chunked(message.as_bytes(), 10);
    let mut parser = ResponseParser::new();
    drive(&ParseDriver::default(), &mut source, &mut parser).unwrap();

    assert!(parser.is_done());
    assert_eq!(parser.head().unwrap().status(), StatusCode::OK);
    assert_eq!(parser.framing(), Some(BodyFraming::UntilClose));
    assert_eq!(parser.body(), b"first part, second part");
}

#[test]
fn response_until_close_forbidden() {
    let message = "HTTP/1.1 200 OK\r\nServer: test\r\n\r\nfirst part, second part";
    let config = ParseConfig::default().with_allow_eof_body(false);

    let mut source = ScriptedSource::chunked(message.as_bytes(), 10);
    let mut parser = ResponseParser::with_config(&config);
    let e = drive(&ParseDriver::new(&config), &mut source, &mut parser).unwrap_err();

    assert_eq!(parse_error(&e), &ParseError::incomplete_body(None));
    assert_eq!(parser.state(), ParseState::AtBodyEof);
}

#[test]
fn request_until_close_forbidden() {
    let message = "POST / HTTP/1.1\r\nHost: a\r\n\r\nsome arbitrary bytes";
    let config = ParseConfig::default().with_allow_eof_body(false);

    let mut source = ScriptedSource::chunked(message.as_bytes(), 7);
    let mut buffer = GrowableBuffer::from_config(&config);
    let mut parser = RequestParser::with_config(&config);
    let e = ParseDriver::new(&config).read(&mut source, &mut buffer, &mut parser).unwrap_err();

    assert_eq!(parse_error(&e), &ParseError::incomplete_body(None));
    assert_eq!(parser.state(), ParseState::AtBodyEof);
    assert_eq!(parser.framing(), Some(BodyFraming::UntilClose));
    assert!(buffer.is_empty());

    // left to the request kind, the same bytes are the next message
    let mut source = ScriptedSource::new([message]);
    let mut parser = RequestParser::new();
    let buffer = drive(&ParseDriver::default(), &mut source, &mut parser).unwrap();

    assert!(parser.is_done());
    assert!(parser.body().is_empty());
    assert_eq!(buffer.readable(), b"some arbitrary bytes");
}

#[test]
fn buffered_and_direct_reads_agree() {
    let mut body = Vec::new();
    for i in 0..2000 {
        body.extend(format!("line {i}\n").into_bytes());
    }

    let mut length = format!("POST /x HTTP/1.1\r\nContent-Length: {}\r\n\r\n", body.len()).into_bytes();
    length.extend(&body);

    let mut chunked = b"POST /x HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n".to_vec();
    for piece in body.chunks(1000) {
        chunked.extend(format!("{:x}\r\n", piece.len()).into_bytes());
        chunked.extend(piece);
        chunked.extend(b"\r\n");
    }
    chunked.extend(b"0\r\n\r\n");

    let mut until_close = b"HTTP/1.1 200 OK\r\nServer: test\r\n\r\n".to_vec();
    until_close.extend(&body);

    let results = [
        buffered_and_direct::<RequestHeader>(&length),
        buffered_and_direct::<RequestHeader>(&chunked),
        buffered_and_direct::<ResponseHeader>(&until_close),
    ];

    for [buffered, direct] in results {
        assert_eq!(buffered, direct);
        assert_eq!(buffered.0, ParseState::Done);
        assert_eq!(buffered.2, body);
    }
}

fn buffered_and_direct<H: MessageHead>(message: &[u8]) -> [(ParseState, u64, Vec<u8>); 2] {
    [false, true].map(|direct| {
        let config = ParseConfig::default().with_direct_body_reads(direct).with_read_size(4096);
        let driver = ParseDriver::new(&config);

        let mut source = ScriptedSource::chunked(message, 777);
        let mut parser = MessageParser::<H>::with_config(&config);
        let buffer = drive(&driver, &mut source, &mut parser).unwrap();

        assert!(buffer.is_empty());
        (parser.state(), parser.body_received(), parser.take_body().to_vec())
    })
}

#[test]
fn read_errors_are_propagated() {
    let mut source = ScriptedSource::new(["GET / HTTP/1.1\r\n"]).then_error(io::ErrorKind::ConnectionReset);
    let mut parser = RequestParser::new();
    let e = drive(&ParseDriver::default(), &mut source, &mut parser).unwrap_err();

    match e {
        HttpError::Io { source } => assert_eq!(source.kind(), io::ErrorKind::ConnectionReset),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn read_errors_are_propagated_on_direct_reads() {
    let mut source = ScriptedSource::new(["POST / HTTP/1.1\r\nContent-Length: 4\r\n\r\n"]).then_error(io::ErrorKind::TimedOut);
    let mut parser = RequestParser::new();
    let e = drive(&ParseDriver::default(), &mut source, &mut parser).unwrap_err();

    assert!(e.is_io());
    assert_eq!(parser.state(), ParseState::AtBody);
    assert!(parser.body().is_empty());
}

#[test]
fn clean_close_and_truncated_header() {
    let mut source = ScriptedSource::new(Vec::<String>::new());
    let mut parser = RequestParser::new();
    let e = drive(&ParseDriver::default(), &mut source, &mut parser).unwrap_err();
    assert!(parse_error(&e).is_clean_close());

    let mut source = ScriptedSource::new(["GET / HTTP/1.1\r\nHost:"]);
    let mut parser = RequestParser::new();
    let e = drive(&ParseDriver::default(), &mut source, &mut parser).unwrap_err();
    assert_eq!(parse_error(&e), &ParseError::incomplete_headers(21));
}

#[test]
fn header_larger_than_buffer() {
    let config = ParseConfig::default().with_max_buffer_capacity(256).with_max_header_bytes(8 * 1024);
    let message = format!("GET / HTTP/1.1\r\nX-Big: {}\r\n\r\n", "b".repeat(512));

    let mut source = ScriptedSource::chunked(message.as_bytes(), 64);
    let mut buffer = GrowableBuffer::from_config(&config);
    let mut parser = RequestHeaderParser::with_config(&config);
    let e = ParseDriver::new(&config).read(&mut source, &mut buffer, &mut parser).unwrap_err();

    assert!(e.is_overflow());
    assert!(buffer.len() <= 256);
}

#[test]
fn header_larger_than_limit() {
    let config = ParseConfig::default().with_max_header_bytes(128);
    let message = format!("GET / HTTP/1.1\r\nX-Big: {}\r\n\r\n", "b".repeat(512));

    let mut source = ScriptedSource::chunked(message.as_bytes(), 64);
    let mut parser = RequestHeaderParser::with_config(&config);
    let e = drive(&ParseDriver::new(&config), &mut source, &mut parser).unwrap_err();

    assert!(e.is_overflow());
}

#[test]
fn body_taken_between_steps() {
    let message = "HTTP/1.1 200 OK\r\nContent-Length: 26\r\n\r\nabcdefghijklmnopqrstuvwxyz";
    let config = ParseConfig::default().with_read_size(5);
    let driver = ParseDriver::new(&config);

    let mut source = ScriptedSource::new([message]);
    let mut buffer = GrowableBuffer::from_config(&config);
    let mut parser = ResponseParser::with_config(&config);

    let mut collected = Vec::new();
    while !parser.is_done() {
        driver.parse_some(&mut source, &mut buffer, &mut parser).unwrap();
        collected.extend_from_slice(&parser.take_body());
    }

    assert_eq!(collected, b"abcdefghijklmnopqrstuvwxyz");
    assert_eq!(parser.body_received(), 26);
}

#[test]
fn message_after_header_parse() {
    let message = "POST /a HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc";

    let config = ParseConfig::default().with_body_limit(Some(3));

    let mut source = ScriptedSource::chunked(message.as_bytes(), 8);
    let mut buffer = GrowableBuffer::from_config(&config);
    let mut header = RequestHeaderParser::with_config(&config);
    read_header(&mut source, &mut buffer, &mut header).unwrap();
    assert_eq!(header.head().unwrap().method(), &Method::POST);

    let mut parser = RequestParser::from_header_parser(header, &config);
    read_message(&mut source, &mut buffer, &mut parser).unwrap();
    assert_eq!(parser.body(), b"abc");
}
