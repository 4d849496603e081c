//! Line Protocol Implementation
//!
//! The wire format is plain text: one command per `\n`-terminated line,
//! arguments separated by single spaces, one reply line per command.
//!
//! ## Modules
//!
//! - `parser`: Line framing and argument splitting
//! - `types`: The `Reply` enum and its serialization
//!
//! ## Example
//!
//! ```
//! use linekv::protocol::{split_args, LineParser, Reply};
//! use bytes::Bytes;
//!
//! let parser = LineParser::new();
//! let (line, _consumed) = parser.parse(b"HGET user name\n").unwrap().unwrap();
//! assert_eq!(split_args(&line).len(), 3);
//!
//! let reply = Reply::text(Bytes::from("Ariz"));
//! assert_eq!(reply.serialize(), b"Ariz\n");
//! ```

pub mod parser;
pub mod types;

pub use parser::{split_args, LineParser, ParseError, ParseResult, DEFAULT_MAX_LINE_LENGTH};
pub use types::Reply;
