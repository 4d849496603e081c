//! Storage Engine Module
//!
//! This module provides the core storage functionality for LineKV:
//! a thread-safe, sharded store with five independent namespaces.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     StorageEngine                           │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐           │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │...64    │           │
//! │  │ 5 x     │ │ 5 x     │ │ 5 x     │ │ shards  │           │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │ │         │           │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Sharded Storage**: 64 independent shards reduce lock contention
//! - **RwLock per namespace**: Concurrent readers, exclusive writers
//! - **Cleanup on empty**: Collections whose last element is removed disappear
//!
//! ## Example
//!
//! ```
//! use linekv::storage::StorageEngine;
//! use bytes::Bytes;
//! use std::sync::Arc;
//!
//! let engine = Arc::new(StorageEngine::new());
//!
//! engine.rpush(Bytes::from("queue"), vec![Bytes::from("job1"), Bytes::from("job2")]);
//! assert_eq!(engine.lpop(&Bytes::from("queue")), Some(Bytes::from("job1")));
//!
//! assert_eq!(engine.sadd(Bytes::from("tags"), vec![Bytes::from("rust")]), 1);
//! assert!(engine.sismember(&Bytes::from("tags"), &Bytes::from("rust")));
//! ```

pub mod engine;
pub mod error;
mod hashes;
mod lists;
mod sets;
pub mod sorted_sets;

// Re-export commonly used types
pub use engine::{StorageEngine, StorageStats};
pub use error::{StorageError, StorageResult};
pub use sorted_sets::SortedSet;
