use bytes::Bytes;

use crate::http::encoding::Encoding;

/// HTTP status codes supported by the server.
///
/// - `Ok` (200): Request successful
/// - `Created` (201): Resource created successfully
/// - `BadRequest` (400): Malformed request
/// - `NotFound` (404): Resource not found
/// - `InternalServerError` (500): Server error
/// - `NotImplemented` (501): Endpoint exists but not for this method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 201 Created
    Created,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
    /// 501 Not Implemented
    NotImplemented,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use tern::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotImplemented.as_u16(), 501);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
            StatusCode::NotImplemented => 501,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
        }
    }
}

/// The two media types the server produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    TextPlain,
    OctetStream,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::TextPlain => "text/plain",
            ContentType::OctetStream => "application/octet-stream",
        }
    }
}

/// Represents a complete HTTP response ready to be sent to a client.
///
/// `headers` is already in emission order.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// The status is required up front. Content type, body and encoding are
/// optional; later calls overwrite earlier ones.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .content_type(ContentType::TextPlain)
///     .body("hello")
///     .encoding(Some(Encoding::Gzip))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    status: StatusCode,
    content_type: Option<ContentType>,
    body: Bytes,
    encoding: Option<Encoding>,
    extra_headers: Vec<(String, String)>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            content_type: None,
            body: Bytes::new(),
            encoding: None,
            extra_headers: Vec::new(),
        }
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Requests a content coding for the body. `None` leaves it uncompressed.
    pub fn encoding(mut self, encoding: Option<Encoding>) -> Self {
        self.encoding = encoding;
        self
    }

    /// Adds or replaces a header emitted after the standard ones.
    ///
    /// Content-Type, Content-Encoding and Content-Length are owned by the
    /// builder and are ignored here.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        if is_managed_header(&name) {
            return self;
        }

        match self
            .extra_headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value.into(),
            None => self.extra_headers.push((name, value.into())),
        }
        self
    }

    /// Builds the final Response.
    ///
    /// Compresses the body when an encoding was requested, then derives
    /// Content-Length from the bytes that will actually be sent. If
    /// compression fails the body goes out uncompressed and no
    /// Content-Encoding is advertised.
    pub fn build(self) -> Response {
        let mut headers = Vec::with_capacity(3 + self.extra_headers.len());

        if let Some(content_type) = self.content_type {
            headers.push(("Content-Type".to_string(), content_type.as_str().to_string()));
        }

        let body = match self.encoding {
            Some(encoding) => match encoding.encode(&self.body) {
                Ok(encoded) => {
                    headers.push(("Content-Encoding".to_string(), encoding.as_str().to_string()));
                    Bytes::from(encoded)
                }
                Err(e) => {
                    tracing::warn!(
                        encoding = %encoding,
                        error = %e,
                        "Compression failed, sending body uncompressed"
                    );
                    self.body
                }
            },
            None => self.body,
        };

        headers.push(("Content-Length".to_string(), body.len().to_string()));
        headers.extend(self.extra_headers);

        Response {
            status: self.status,
            headers,
            body,
        }
    }
}

impl Response {
    /// Looks up a header by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Creates a 200 OK `text/plain` response with the given body.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .content_type(ContentType::TextPlain)
            .body(body)
            .build()
    }

    /// Creates a 400 Bad Request response that closes the connection.
    pub fn bad_request() -> Self {
        ResponseBuilder::new(StatusCode::BadRequest)
            .header("Connection", "close")
            .build()
    }
}

fn is_managed_header(name: &str) -> bool {
    ["content-type", "content-encoding", "content-length"]
        .iter()
        .any(|managed| name.eq_ignore_ascii_case(managed))
}
