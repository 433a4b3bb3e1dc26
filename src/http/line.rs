//! CRLF-delimited line reading.
//!
//! Both the request line and every header line go through [`read_line`].

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::http::parser::ParseError;

/// Default cap for a single line, including the request line.
pub const DEFAULT_MAX_LINE_BYTES: usize = 8192;

/// Reads bytes up to the next CRLF and returns them without the terminator.
///
/// A bare `\n` is treated as line content. An empty line (pure CRLF) returns
/// an empty vector. If the stream ends before any byte was read the result is
/// [`ParseError::ConnectionClosed`]; ending mid-line is
/// [`ParseError::UnexpectedEof`].
pub async fn read_line<R>(reader: &mut R, max_len: usize) -> Result<Vec<u8>, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();

    loop {
        let available = reader.fill_buf().await?;

        if available.is_empty() {
            return Err(if line.is_empty() {
                ParseError::ConnectionClosed
            } else {
                ParseError::UnexpectedEof
            });
        }

        let (chunk, done) = match available.iter().position(|&b| b == b'\n') {
            Some(i) => (&available[..=i], true),
            None => (available, false),
        };

        // +2 leaves room for the terminator itself
        if line.len() + chunk.len() > max_len + 2 {
            return Err(ParseError::LineTooLong { limit: max_len });
        }

        line.extend_from_slice(chunk);
        let consumed = chunk.len();
        reader.consume(consumed);

        if done && line.ends_with(b"\r\n") {
            line.truncate(line.len() - 2);
            return Ok(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_line_and_advances() {
        let mut input: &[u8] = b"first\r\nsecond\r\n";

        assert_eq!(read_line(&mut input, 64).await.unwrap(), b"first");
        assert_eq!(read_line(&mut input, 64).await.unwrap(), b"second");
        assert!(input.is_empty());
    }

    #[tokio::test]
    async fn empty_line_is_returned_as_empty() {
        let mut input: &[u8] = b"\r\nrest";

        assert_eq!(read_line(&mut input, 64).await.unwrap(), b"");
        assert_eq!(input, b"rest");
    }

    #[tokio::test]
    async fn bare_lf_is_kept_as_content() {
        let mut input: &[u8] = b"a\nb\r\n";

        assert_eq!(read_line(&mut input, 64).await.unwrap(), b"a\nb");
    }

    #[tokio::test]
    async fn eof_before_any_byte_is_a_clean_close() {
        let mut input: &[u8] = b"";

        assert!(matches!(
            read_line(&mut input, 64).await,
            Err(ParseError::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn eof_mid_line_is_an_error() {
        let mut input: &[u8] = b"GET / HTTP/1.1";

        assert!(matches!(
            read_line(&mut input, 64).await,
            Err(ParseError::UnexpectedEof)
        ));
    }

    #[tokio::test]
    async fn overlong_line_is_rejected() {
        let mut input: &[u8] = b"0123456789abcdef\r\n";

        assert!(matches!(
            read_line(&mut input, 8).await,
            Err(ParseError::LineTooLong { limit: 8 })
        ));
    }

    #[tokio::test]
    async fn line_at_exact_limit_is_accepted() {
        let mut input: &[u8] = b"01234567\r\n";

        assert_eq!(read_line(&mut input, 8).await.unwrap(), b"01234567");
    }
}
