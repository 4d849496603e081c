//! Line Framing and Tokenizing
//!
//! Incoming data is a stream of text lines, each terminated by `\n`.
//! The parser works on the connection's read buffer and returns either:
//! - `Ok(Some((line, consumed)))` - a complete line, `consumed` bytes were used
//! - `Ok(None)` - no terminator yet, read more data
//! - `Err(ParseError)` - too much data buffered without a terminator
//!
//! Lines are trimmed of surrounding ASCII whitespace (which also removes the
//! `\r` sent by telnet-style clients). This is `<[u8]>::trim_ascii`, so a
//! vertical tab (`\x0B`) is not treated as whitespace. Tokens are split on
//! the space byte only; there is no quoting or escaping.

use bytes::Bytes;
use thiserror::Error;

/// Default upper bound on a single line (64 KB)
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// Errors that can occur while framing lines.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The buffer holds more than the allowed line length and no terminator.
    #[error("line too long: {size} bytes (max: {max})")]
    LineTooLong { size: usize, max: usize },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Extracts complete lines from a read buffer.
///
/// # Example
///
/// ```
/// use linekv::protocol::LineParser;
/// use bytes::Bytes;
///
/// let parser = LineParser::new();
/// let buffer = Bytes::from_static(b"GET name\r\nSET");
///
/// let (line, consumed) = parser.parse(&buffer).unwrap().unwrap();
/// assert_eq!(line, Bytes::from("GET name"));
/// assert_eq!(consumed, 10);
/// ```
#[derive(Debug, Clone)]
pub struct LineParser {
    max_line_length: usize,
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineParser {
    /// Creates a parser with the default line limit.
    pub fn new() -> Self {
        Self::with_max_line_length(DEFAULT_MAX_LINE_LENGTH)
    }

    /// Creates a parser with a custom line limit.
    pub fn with_max_line_length(max_line_length: usize) -> Self {
        Self { max_line_length }
    }

    /// Returns the configured line limit.
    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    /// Attempts to take one line off the front of `buf`.
    pub fn parse(&self, buf: &[u8]) -> ParseResult<Option<(Bytes, usize)>> {
        match buf.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                if pos > self.max_line_length {
                    return Err(ParseError::LineTooLong {
                        size: pos,
                        max: self.max_line_length,
                    });
                }
                let line = Bytes::copy_from_slice(buf[..pos].trim_ascii());
                Ok(Some((line, pos + 1)))
            }
            None if buf.len() > self.max_line_length => Err(ParseError::LineTooLong {
                size: buf.len(),
                max: self.max_line_length,
            }),
            None => Ok(None),
        }
    }
}

/// Splits a line into arguments on the ASCII space byte.
///
/// Consecutive spaces produce empty tokens, so `SET a  b` yields four
/// arguments. An empty line yields a single empty token.
pub fn split_args(line: &Bytes) -> Vec<Bytes> {
    let mut args = Vec::new();
    let mut start = 0;

    for (i, &b) in line.iter().enumerate() {
        if b == b' ' {
            args.push(line.slice(start..i));
            start = i + 1;
        }
    }
    args.push(line.slice(start..));

    args
}
