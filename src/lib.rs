//! # LineKV - An In-Memory, Multi-Type Key-Value Store
//!
//! LineKV keeps strings, lists, hashes, sets and sorted sets in memory and
//! serves them over a plain text protocol: one command per line, one reply
//! per line. Any line-based client (`nc`, `telnet`) can talk to it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              LineKV                                     │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │ TCP Server  │───>│ Connection  │───>│  Command    │                  │
//! │  │ (Listener)  │    │  Handler    │    │  Handler    │                  │
//! │  └─────────────┘    └──────┬──────┘    └──────┬──────┘                  │
//! │                            │                  │                         │
//! │                            ▼                  ▼                         │
//! │  ┌─────────────┐    ┌──────────────────────────────────────────────┐   │
//! │  │   Line      │    │              StorageEngine                   │   │
//! │  │   Parser    │    │  ┌────────┐ ┌────────┐ ┌────────┐ ┌────────┐ │   │
//! │  │             │    │  │Shard 0 │ │Shard 1 │ │Shard 2 │ │...N    │ │   │
//! │  └─────────────┘    │  │5 maps  │ │5 maps  │ │5 maps  │ │shards  │ │   │
//! │                     │  └────────┘ └────────┘ └────────┘ └────────┘ │   │
//! │                     └──────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use linekv::commands::CommandHandler;
//! use linekv::connection::{handle_connection, ConnectionStats};
//! use linekv::protocol::LineParser;
//! use linekv::storage::StorageEngine;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() {
//!     let storage = Arc::new(StorageEngine::new());
//!     let stats = Arc::new(ConnectionStats::new());
//!
//!     let listener = TcpListener::bind("127.0.0.1:6379").await.unwrap();
//!
//!     loop {
//!         let (stream, addr) = listener.accept().await.unwrap();
//!         let handler = CommandHandler::new(Arc::clone(&storage));
//!         let stats = Arc::clone(&stats);
//!
//!         tokio::spawn(handle_connection(stream, addr, handler, LineParser::new(), stats));
//!     }
//! }
//! ```
//!
//! ## Supported Commands
//!
//! ### Strings
//! - `SET key value`, `GET key`, `DEL key`
//! - `INCR key`, `DECR key`
//!
//! ### Lists
//! - `LPUSH key value [value ...]`, `RPUSH key value [value ...]`
//! - `LPOP key`, `RPOP key`, `LLEN key`
//! - `LRANGE key start stop`
//!
//! ### Hashes
//! - `HSET key field value`, `HGET key field`
//! - `HMSET key field value [field value ...]`, `HMGET key field [field ...]`
//! - `HGETALL key`, `HDEL key field [field ...]`
//!
//! ### Sets
//! - `SADD key member [member ...]`, `SREM key member [member ...]`
//! - `SMEMBERS key`, `SISMEMBER key member`
//!
//! ### Sorted Sets
//! - `ZADD key score member [score member ...]`
//! - `ZRANGE key start stop`, `ZREM key member [member ...]`
//!
//! ## Module Overview
//!
//! - [`protocol`]: line framing, argument splitting and reply rendering
//! - [`storage`]: sharded, thread-safe storage for all five value types
//! - [`commands`]: command dispatch and argument validation
//! - [`connection`]: per-client read/execute/reply loop
//! - [`config`]: command-line configuration for the server binary
//!
//! ## Namespaces
//!
//! Every value type lives in its own namespace. `SET k v` and `LPUSH k v`
//! create two unrelated values, and `DEL` only ever touches the string one.

pub mod commands;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::CommandHandler;
pub use config::Config;
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{LineParser, ParseError, Reply};
pub use storage::{StorageEngine, StorageError};

/// The default port LineKV listens on
pub const DEFAULT_PORT: u16 = 6379;

/// The default host LineKV binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of LineKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
