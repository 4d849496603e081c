//! Reply Types for the Line Protocol
//!
//! Every command produces exactly one reply line. The shape of that line
//! depends on the command:
//!
//! - `OK` acknowledgements
//! - `(nil)` when a key, field or element does not exist
//! - a raw value (`GET`, `LPOP`, `INCR`, ...)
//! - a decimal count (`LLEN`, `SADD`, `HDEL`, ...)
//! - space-joined tokens (`HMGET`, `SMEMBERS`, `ZRANGE`, ...)
//! - a bracketed sequence, used only by `LRANGE`: `[a b c]` or `[]`
//! - `ERROR: <message>`
//!
//! All replies are terminated with a single line feed.

use bytes::Bytes;
use std::fmt;

/// The line terminator used for every reply.
pub const LF: u8 = b'\n';

/// Token used for a missing key, field or element.
pub const NIL: &[u8] = b"(nil)";

/// Prefix of every error reply.
pub const ERROR_PREFIX: &[u8] = b"ERROR: ";

/// A single reply to a single command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Success acknowledgement: `OK`
    Ok,

    /// Null sentinel: `(nil)`
    Nil,

    /// A stored value written back verbatim.
    Text(Bytes),

    /// A decimal integer (lengths, counts, counters, booleans as 1/0).
    Integer(i64),

    /// Tokens joined with a single space. Missing entries are `None`
    /// and render as `(nil)`. An empty list renders as an empty line.
    Joined(Vec<Option<Bytes>>),

    /// A literal sequence rendering: `[a b c]`, or `[]` when empty.
    Sequence(Vec<Bytes>),

    /// Error reply: `ERROR: <message>`
    Error(String),
}

impl Reply {
    /// Creates a text reply.
    pub fn text(data: impl Into<Bytes>) -> Self {
        Reply::Text(data.into())
    }

    /// Creates an integer reply.
    pub fn integer(n: i64) -> Self {
        Reply::Integer(n)
    }

    /// Creates an error reply. The `ERROR: ` prefix is added on serialization.
    pub fn error(message: impl Into<String>) -> Self {
        Reply::Error(message.into())
    }

    /// Creates a value-or-nil reply.
    pub fn optional(value: Option<Bytes>) -> Self {
        match value {
            Some(v) => Reply::Text(v),
            None => Reply::Nil,
        }
    }

    /// Creates a space-joined reply where every token is present.
    pub fn joined(values: Vec<Bytes>) -> Self {
        Reply::Joined(values.into_iter().map(Some).collect())
    }

    /// Serializes the reply, including the trailing line feed.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize_into(&mut buf);
        buf
    }

    /// Serializes the reply into an existing buffer.
    pub fn serialize_into(&self, buf: &mut Vec<u8>) {
        match self {
            Reply::Ok => buf.extend_from_slice(b"OK"),
            Reply::Nil => buf.extend_from_slice(NIL),
            Reply::Text(data) => buf.extend_from_slice(data),
            Reply::Integer(n) => buf.extend_from_slice(n.to_string().as_bytes()),
            Reply::Joined(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        buf.push(b' ');
                    }
                    match value {
                        Some(v) => buf.extend_from_slice(v),
                        None => buf.extend_from_slice(NIL),
                    }
                }
            }
            Reply::Sequence(values) => {
                buf.push(b'[');
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        buf.push(b' ');
                    }
                    buf.extend_from_slice(value);
                }
                buf.push(b']');
            }
            Reply::Error(message) => {
                buf.extend_from_slice(ERROR_PREFIX);
                buf.extend_from_slice(message.as_bytes());
            }
        }
        buf.push(LF);
    }

    /// Returns true if this reply is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }
}

impl fmt::Display for Reply {
    /// Renders the reply as it appears on the wire, without the line feed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = self.serialize();
        buf.pop();
        f.write_str(&String::from_utf8_lossy(&buf))
    }
}
