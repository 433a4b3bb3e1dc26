use bytes::Bytes;
use std::fmt;
use std::io;
use tokio::io::{AsyncBufRead, AsyncReadExt};

use crate::http::line::{read_line, DEFAULT_MAX_LINE_BYTES};
use crate::http::request::{content_length, Headers, Method, Request, RequestBuilder};

/// Default cap for a declared request body.
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug)]
pub enum ParseError {
    /// The peer closed the stream before sending any byte of a request.
    ConnectionClosed,
    /// The stream ended in the middle of a line.
    UnexpectedEof,
    LineTooLong { limit: usize },
    MalformedRequestLine(String),
    MalformedHeader(String),
    TruncatedBody { expected: usize, received: usize },
    BodyTooLarge { limit: usize, declared: usize },
    Io(io::Error),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::ConnectionClosed => write!(f, "connection closed before request"),
            ParseError::UnexpectedEof => write!(f, "stream ended before CRLF"),
            ParseError::LineTooLong { limit } => write!(f, "line exceeds {} bytes", limit),
            ParseError::MalformedRequestLine(line) => {
                write!(f, "malformed request line: {:?}", line)
            }
            ParseError::MalformedHeader(line) => write!(f, "malformed header line: {:?}", line),
            ParseError::TruncatedBody { expected, received } => write!(
                f,
                "body truncated: expected {} bytes, received {}",
                expected, received
            ),
            ParseError::BodyTooLarge { limit, declared } => write!(
                f,
                "declared body of {} bytes exceeds limit of {}",
                declared, limit
            ),
            ParseError::Io(e) => write!(f, "read failed: {}", e),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ParseError {
    fn from(e: io::Error) -> Self {
        ParseError::Io(e)
    }
}

impl ParseError {
    /// Whether the peer deserves a `400 Bad Request` before we hang up.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            ParseError::LineTooLong { .. }
                | ParseError::MalformedRequestLine(_)
                | ParseError::MalformedHeader(_)
                | ParseError::TruncatedBody { .. }
                | ParseError::BodyTooLarge { .. }
        )
    }
}

/// Size limits applied while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    pub max_line_bytes: usize,
    pub max_body_bytes: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// The three tokens of `METHOD SP TARGET SP VERSION`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    pub target: String,
    pub version: String,
}

/// Reads one complete request from the stream.
pub async fn parse_request<R>(
    reader: &mut R,
    limits: &ParseLimits,
) -> Result<Request, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let request_line = parse_request_line(reader, limits.max_line_bytes).await?;
    let headers = parse_headers(reader, limits.max_line_bytes).await?;
    let body = parse_body(reader, &headers, limits.max_body_bytes).await?;

    let request = RequestBuilder::new()
        .method(request_line.method)
        .target(request_line.target)
        .version(request_line.version)
        .headers(headers)
        .body(body)
        .build()
        .map_err(|e| ParseError::MalformedRequestLine(e.to_string()))?;

    Ok(request)
}

pub async fn parse_request_line<R>(
    reader: &mut R,
    max_line: usize,
) -> Result<RequestLine, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let raw = read_line(reader, max_line).await?;
    let line = String::from_utf8(raw).map_err(|e| {
        ParseError::MalformedRequestLine(String::from_utf8_lossy(e.as_bytes()).into_owned())
    })?;

    let parts: Vec<&str> = line.split(' ').collect();
    let [method, target, version] = parts.as_slice() else {
        return Err(ParseError::MalformedRequestLine(line.clone()));
    };

    Ok(RequestLine {
        method: Method::parse(method),
        target: target.to_string(),
        version: version.to_string(),
    })
}

pub async fn parse_headers<R>(reader: &mut R, max_line: usize) -> Result<Headers, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let mut headers = Headers::new();

    loop {
        let raw = match read_line(reader, max_line).await {
            Ok(raw) => raw,
            // the request line was already read, so a close here is not clean
            Err(ParseError::ConnectionClosed) => return Err(ParseError::UnexpectedEof),
            Err(e) => return Err(e),
        };

        if raw.is_empty() {
            break;
        }

        let line = String::from_utf8(raw).map_err(|e| {
            ParseError::MalformedHeader(String::from_utf8_lossy(e.as_bytes()).into_owned())
        })?;

        let Some((name, value)) = line.split_once(": ") else {
            return Err(ParseError::MalformedHeader(line));
        };

        headers.insert(name, value);
    }

    Ok(headers)
}

/// Reads exactly `Content-Length` bytes.
///
/// A missing, non-numeric or zero length means no body and no read at all.
pub async fn parse_body<R>(
    reader: &mut R,
    headers: &Headers,
    max_body: usize,
) -> Result<Bytes, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let expected = content_length(headers);
    if expected == 0 {
        return Ok(Bytes::new());
    }

    if expected > max_body {
        return Err(ParseError::BodyTooLarge {
            limit: max_body,
            declared: expected,
        });
    }

    let mut body = Vec::with_capacity(expected);
    (&mut *reader).take(expected as u64).read_to_end(&mut body).await?;

    if body.len() < expected {
        return Err(ParseError::TruncatedBody {
            expected,
            received: body.len(),
        });
    }

    Ok(Bytes::from(body))
}
