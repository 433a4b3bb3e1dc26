use tern::http::parser::{
    parse_body, parse_headers, parse_request, parse_request_line, ParseError, ParseLimits,
};
use tern::http::request::{Headers, Method};

async fn parse(mut input: &[u8]) -> Result<tern::http::request::Request, ParseError> {
    parse_request(&mut input, &ParseLimits::default()).await
}

#[tokio::test]
async fn test_parse_simple_get_request() {
    let parsed = parse(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n").await.unwrap();

    assert_eq!(parsed.method(), &Method::GET);
    assert_eq!(parsed.target(), "/");
    assert_eq!(parsed.version(), "HTTP/1.1");
    assert_eq!(parsed.header("Host"), Some("example.com"));
    assert!(parsed.body().is_empty());
}

#[tokio::test]
async fn test_parse_post_request_with_body() {
    let raw = b"POST /files/a.txt HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello";
    let parsed = parse(raw).await.unwrap();

    assert_eq!(parsed.method(), &Method::POST);
    assert_eq!(parsed.target(), "/files/a.txt");
    assert_eq!(&parsed.body()[..], b"hello");
}

#[tokio::test]
async fn test_parse_body_length_matches_content_length() {
    for n in [1usize, 7, 1024, 70_000] {
        let body = vec![b'x'; n];
        let mut raw =
            format!("POST /files/x HTTP/1.1\r\nContent-Length: {}\r\n\r\n", n).into_bytes();
        raw.extend_from_slice(&body);

        let parsed = parse(&raw).await.unwrap();
        assert_eq!(parsed.body().len(), n);
    }
}

#[tokio::test]
async fn test_parse_leaves_bytes_after_body_unread() {
    let mut input: &[u8] = b"POST / HTTP/1.1\r\nContent-Length: 3\r\n\r\nabcGET";

    let parsed = parse_request(&mut input, &ParseLimits::default()).await.unwrap();

    assert_eq!(&parsed.body()[..], b"abc");
    assert_eq!(input, b"GET");
}

#[tokio::test]
async fn test_parse_header_names_are_lower_cased() {
    let parsed = parse(b"GET / HTTP/1.1\r\nUser-Agent: test-client\r\nACCEPT: */*\r\n\r\n")
        .await
        .unwrap();

    assert!(parsed.headers().iter().all(|(k, _)| k == k.to_ascii_lowercase()));
    assert_eq!(parsed.header("user-agent"), Some("test-client"));
    assert_eq!(parsed.header("USER-AGENT"), Some("test-client"));
    assert_eq!(parsed.header("accept"), Some("*/*"));
}

#[tokio::test]
async fn test_parse_duplicate_header_last_wins() {
    let parsed = parse(b"GET / HTTP/1.1\r\nX-Tag: one\r\nx-tag: two\r\n\r\n").await.unwrap();

    assert_eq!(parsed.header("x-tag"), Some("two"));
    assert_eq!(parsed.headers().len(), 1);
}

#[tokio::test]
async fn test_parse_header_value_keeps_colon_space() {
    let parsed = parse(b"GET / HTTP/1.1\r\nX-Note: a: b\r\n\r\n").await.unwrap();

    assert_eq!(parsed.header("x-note"), Some("a: b"));
}

#[tokio::test]
async fn test_parse_request_with_path_and_query_string() {
    let parsed = parse(b"GET /echo/a%20b?q=rust HTTP/1.1\r\n\r\n").await.unwrap();

    assert_eq!(parsed.target(), "/echo/a%20b?q=rust");
}

#[tokio::test]
async fn test_parse_method_is_case_insensitive() {
    let parsed = parse(b"get / HTTP/1.1\r\n\r\n").await.unwrap();

    assert_eq!(parsed.method(), &Method::GET);
}

#[tokio::test]
async fn test_parse_unknown_method_is_kept() {
    let parsed = parse(b"BREW /pot HTTP/1.1\r\n\r\n").await.unwrap();

    assert_eq!(parsed.method(), &Method::Extension("brew".to_string()));
}

#[tokio::test]
async fn test_parse_request_line_needs_three_parts() {
    for line in [
        &b"GET /\r\n\r\n"[..],
        b"GET / HTTP/1.1 extra\r\n\r\n",
        b"GET /a b HTTP/1.1\r\n\r\n",
        b"GET  / HTTP/1.1\r\n\r\n",
    ] {
        let result = parse(line).await;
        assert!(
            matches!(result, Err(ParseError::MalformedRequestLine(_))),
            "expected malformed request line for {:?}",
            String::from_utf8_lossy(line)
        );
    }
}

#[tokio::test]
async fn test_parse_request_line_directly() {
    let mut input: &[u8] = b"DELETE /echo/x HTTP/1.0\r\n";

    let line = parse_request_line(&mut input, 64).await.unwrap();

    assert_eq!(line.method, Method::DELETE);
    assert_eq!(line.target, "/echo/x");
    assert_eq!(line.version, "HTTP/1.0");
}

#[tokio::test]
async fn test_parse_malformed_header() {
    let result = parse(b"GET / HTTP/1.1\r\nBrokenHeader\r\n\r\n").await;

    assert!(matches!(result, Err(ParseError::MalformedHeader(_))));
}

#[tokio::test]
async fn test_parse_header_without_space_after_colon_is_malformed() {
    let result = parse(b"GET / HTTP/1.1\r\nHost:example.com\r\n\r\n").await;

    assert!(matches!(result, Err(ParseError::MalformedHeader(_))));
}

#[tokio::test]
async fn test_parse_headers_stop_at_blank_line() {
    let mut input: &[u8] = b"A: 1\r\nB: 2\r\n\r\ntrailing";

    let headers = parse_headers(&mut input, 64).await.unwrap();

    assert_eq!(headers.get("a"), Some("1"));
    assert_eq!(headers.get("b"), Some("2"));
    assert_eq!(input, b"trailing");
}

#[tokio::test]
async fn test_parse_missing_blank_line_is_eof() {
    let result = parse(b"GET / HTTP/1.1\r\nHost: example.com\r\n").await;

    assert!(matches!(result, Err(ParseError::UnexpectedEof)));
}

#[tokio::test]
async fn test_parse_empty_stream_is_clean_close() {
    let result = parse(b"").await;

    assert!(matches!(result, Err(ParseError::ConnectionClosed)));
}

#[tokio::test]
async fn test_parse_truncated_body() {
    let result = parse(b"POST /api HTTP/1.1\r\nContent-Length: 10\r\n\r\nhello").await;

    match result {
        Err(ParseError::TruncatedBody { expected, received }) => {
            assert_eq!(expected, 10);
            assert_eq!(received, 5);
        }
        other => panic!("expected truncated body, got {:?}", other),
    }
}

#[tokio::test]
async fn test_parse_request_with_zero_content_length() {
    let parsed = parse(b"POST /api HTTP/1.1\r\nContent-Length: 0\r\n\r\n").await.unwrap();

    assert!(parsed.body().is_empty());
}

#[tokio::test]
async fn test_parse_zero_or_invalid_content_length_reads_no_body() {
    for value in ["0", "abc", "-5", "", "1.5"] {
        let raw = format!("POST /api HTTP/1.1\r\nContent-Length: {}\r\n\r\nleftover", value);
        let mut input = raw.as_bytes();

        let parsed = parse_request(&mut input, &ParseLimits::default()).await.unwrap();

        assert!(parsed.body().is_empty(), "value {:?} should give no body", value);
        assert_eq!(input, b"leftover");
    }
}

#[tokio::test]
async fn test_parse_body_without_header_reads_nothing() {
    let headers = Headers::new();
    // An empty reader would fail any attempted read with EOF
    let mut input: &[u8] = b"";

    let body = parse_body(&mut input, &headers, 1024).await.unwrap();

    assert!(body.is_empty());
}

#[tokio::test]
async fn test_parse_body_over_limit_is_rejected() {
    let mut headers = Headers::new();
    headers.insert("Content-Length", "2048");
    let mut input: &[u8] = b"";

    let result = parse_body(&mut input, &headers, 1024).await;

    assert!(matches!(
        result,
        Err(ParseError::BodyTooLarge { limit: 1024, declared: 2048 })
    ));
}

#[tokio::test]
async fn test_parse_request_with_binary_body() {
    let parsed = parse(b"POST /upload HTTP/1.1\r\nContent-Length: 4\r\n\r\n\x00\x01\r\n")
        .await
        .unwrap();

    assert_eq!(&parsed.body()[..], &[0, 1, b'\r', b'\n']);
}

#[tokio::test]
async fn test_parse_overlong_request_line() {
    let limits = ParseLimits {
        max_line_bytes: 16,
        ..ParseLimits::default()
    };
    let mut input: &[u8] = b"GET /a-very-long-target-indeed HTTP/1.1\r\n\r\n";

    let result = parse_request(&mut input, &limits).await;

    assert!(matches!(result, Err(ParseError::LineTooLong { limit: 16 })));
}

#[test]
fn test_protocol_error_classification() {
    assert!(ParseError::MalformedHeader("x".into()).is_protocol_error());
    assert!(ParseError::TruncatedBody { expected: 2, received: 1 }.is_protocol_error());
    assert!(!ParseError::ConnectionClosed.is_protocol_error());
    assert!(!ParseError::UnexpectedEof.is_protocol_error());
}
