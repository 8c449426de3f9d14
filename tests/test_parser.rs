use burrow::http::parser::{parse_http_request, ParseError, ParseState, RequestParser};
use burrow::http::request::Method;

#[test]
fn test_parse_get_with_headers() {
    let req = b"GET /index.html HTTP/1.1\r\nHost: x\r\nUser-Agent: curl/8.0\r\nAccept: */*\r\n\r\n";
    let (parsed, consumed) = parse_http_request(req).unwrap();

    assert_eq!(parsed.method, Method::GET);
    assert_eq!(parsed.path, "/index.html");
    assert_eq!(parsed.version, "HTTP/1.1");
    assert_eq!(parsed.header("host"), Some("x"));
    assert_eq!(parsed.header("User-Agent"), Some("curl/8.0"));
    assert_eq!(parsed.headers.len(), 3);
    assert!(parsed.body.is_empty());
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_keeps_header_spelling() {
    let (parsed, _) = parse_http_request(b"GET / HTTP/1.1\r\nX-Request-ID: 42\r\n\r\n").unwrap();

    let names: Vec<&str> = parsed.headers.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["X-Request-ID"]);
}

#[test]
fn test_parse_body_by_content_length() {
    let req = b"POST /upload HTTP/1.1\r\ncontent-length: 4\r\n\r\n\x00\x01\x02\x03GET";
    let (parsed, consumed) = parse_http_request(req).unwrap();

    assert_eq!(parsed.method, Method::POST);
    assert_eq!(parsed.body, vec![0, 1, 2, 3]);
    assert_eq!(consumed, req.len() - 3);
}

#[test]
fn test_parse_zero_length_body() {
    let (parsed, _) = parse_http_request(b"PUT /api HTTP/1.1\r\nContent-Length: 0\r\n\r\n").unwrap();
    assert!(parsed.body.is_empty());
}

#[test]
fn test_parse_keeps_query_in_target() {
    let (parsed, _) = parse_http_request(b"GET /search?q=rust HTTP/1.0\r\n\r\n").unwrap();

    assert_eq!(parsed.path, "/search?q=rust");
    assert_eq!(parsed.path_only(), "/search");
    assert_eq!(parsed.version, "HTTP/1.0");
}

#[test]
fn test_parse_every_known_method() {
    for method in Method::ALL {
        let req = format!("{method} / HTTP/1.1\r\n\r\n");
        let (parsed, _) = parse_http_request(req.as_bytes()).unwrap();
        assert_eq!(parsed.method, method);
    }
}

#[test]
fn test_parse_errors() {
    let cases: &[(&[u8], ParseError)] = &[
        (b"BREW /pot HTTP/1.1\r\n\r\n", ParseError::InvalidMethod),
        (b"get / HTTP/1.1\r\n\r\n", ParseError::InvalidMethod),
        (b"GET /\r\n\r\n", ParseError::InvalidRequest),
        (b"GET / HTTP/1.1 extra\r\n\r\n", ParseError::InvalidRequest),
        (b"GET / SPDY/3\r\n\r\n", ParseError::InvalidRequest),
        (b"GET / HTTP/1.1\r\nBrokenHeader\r\n\r\n", ParseError::InvalidHeader),
        (b"GET / HTTP/1.1\r\nBad Name: v\r\n\r\n", ParseError::InvalidHeader),
        (b"GET / HTTP/1.1\r\n: empty\r\n\r\n", ParseError::InvalidHeader),
        (b"POST / HTTP/1.1\r\nContent-Length: ten\r\n\r\n", ParseError::InvalidContentLength),
        (b"POST / HTTP/1.1\r\nContent-Length: -1\r\n\r\n", ParseError::InvalidContentLength),
        (
            b"POST / HTTP/1.1\r\nContent-Length: 3\r\nContent-Length: 4\r\n\r\nabcd",
            ParseError::InvalidContentLength,
        ),
        (
            b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n",
            ParseError::UnsupportedTransferEncoding,
        ),
    ];

    for (req, expected) in cases {
        let result = parse_http_request(req);
        assert_eq!(
            result.as_ref().err(),
            Some(expected),
            "{}",
            String::from_utf8_lossy(req)
        );
    }
}

#[test]
fn test_repeated_equal_content_lengths_are_accepted() {
    let req = b"POST / HTTP/1.1\r\nContent-Length: 2\r\nContent-Length: 2\r\n\r\nok";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.body, b"ok".to_vec());
}

#[test]
fn test_incomplete_inputs() {
    let cases: &[&[u8]] = &[
        b"",
        b"GET / HTTP/1.1",
        b"GET / HTTP/1.1\r\nHost: example.com\r\n",
        b"POST /api HTTP/1.1\r\nContent-Length: 10\r\n\r\nhello",
    ];

    for req in cases {
        assert_eq!(parse_http_request(req).err(), Some(ParseError::Incomplete));
    }
}

#[test]
fn test_incremental_parser_reports_completion_once() {
    let req = b"GET /index.html HTTP/1.1\r\nHost: x\r\n\r\n";
    let mut parser = RequestParser::new();

    assert!(parser.advance(&req[..10]).unwrap().is_none());
    assert_eq!(parser.state(), ParseState::AwaitingRequestLine);
    assert!(parser.advance(&req[..30]).unwrap().is_none());
    assert_eq!(parser.state(), ParseState::AwaitingHeaders);

    let (parsed, consumed) = parser.advance(req).unwrap().unwrap();
    assert_eq!(parsed.path, "/index.html");
    assert_eq!(consumed, req.len());
    assert_eq!(parser.state(), ParseState::AwaitingRequestLine);
    assert_eq!(parser.cursor(), 0);
}

#[test]
fn test_parser_reset_discards_partial_request() {
    let mut parser = RequestParser::new();
    assert!(parser.advance(b"POST /a HTTP/1.1\r\nContent-Length: 5\r\n\r\nab").unwrap().is_none());
    assert_eq!(parser.state(), ParseState::AwaitingBody(5));

    parser.reset();
    let (parsed, _) = parser.advance(b"GET /b HTTP/1.1\r\n\r\n").unwrap().unwrap();
    assert_eq!(parsed.path, "/b");
}
