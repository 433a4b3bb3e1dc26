//! Content-encoding negotiation and body compression.
//!
//! Negotiation is a plain preference-order match: the first token in the
//! client's `Accept-Encoding` list that the server supports wins. Quality
//! values are not interpreted.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::fmt;
use std::io::{self, Write};

/// Content codings the server knows how to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Gzip,
}

impl Encoding {
    /// Matches a single coding token, ignoring ASCII case.
    pub fn from_token(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("gzip") {
            Some(Encoding::Gzip)
        } else {
            None
        }
    }

    /// Value used for the `Content-Encoding` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Gzip => "gzip",
        }
    }

    /// Compresses `body` with this coding.
    pub fn encode(&self, body: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            Encoding::Gzip => gzip(body),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splits an `Accept-Encoding` value into its tokens, in client order.
pub fn accepted_encodings(header: &str) -> impl Iterator<Item = &str> {
    header
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Picks the first client-preferred coding that is also in `supported`.
///
/// # Example
///
/// ```
/// # use tern::http::encoding::{negotiate, Encoding};
/// let supported = [Encoding::Gzip];
/// assert_eq!(negotiate(Some("br, gzip"), &supported), Some(Encoding::Gzip));
/// assert_eq!(negotiate(Some("br"), &supported), None);
/// assert_eq!(negotiate(None, &supported), None);
/// ```
pub fn negotiate(accept_encoding: Option<&str>, supported: &[Encoding]) -> Option<Encoding> {
    let header = accept_encoding?;

    accepted_encodings(header)
        .filter_map(Encoding::from_token)
        .find(|encoding| supported.contains(encoding))
}

fn gzip(body: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(
        Vec::with_capacity(body.len() / 2 + 32),
        Compression::default(),
    );
    encoder.write_all(body)?;
    encoder.finish()
}
