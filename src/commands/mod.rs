//! Command Handler Module
//!
//! This module implements the command processing layer for LineKV.
//! It receives one decoded line, executes it against the storage engine,
//! and returns the reply.
//!
//! ## Architecture
//!
//! ```text
//! Client Line
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  LineParser     │  (protocol module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! │                 │
//! │  - Split        │
//! │  - Validate     │
//! │  - Execute      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ StorageEngine   │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - Strings: `SET`, `GET`, `DEL`, `INCR`, `DECR`
//! - Lists: `LPUSH`, `RPUSH`, `LPOP`, `RPOP`, `LRANGE`, `LLEN`
//! - Hashes: `HSET`, `HGET`, `HMSET`, `HMGET`, `HGETALL`, `HDEL`
//! - Sets: `SADD`, `SMEMBERS`, `SISMEMBER`, `SREM`
//! - Sorted sets: `ZADD`, `ZRANGE`, `ZREM`

pub mod handler;

pub use handler::{CommandError, CommandHandler};
