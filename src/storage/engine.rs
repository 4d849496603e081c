//! Thread-Safe Storage Engine
//!
//! This module implements the core storage engine for LineKV.
//! It owns five independent namespaces, one per data type:
//!
//! | Namespace  | Representation                          |
//! |------------|-----------------------------------------|
//! | strings    | `HashMap<Bytes, Bytes>`                 |
//! | lists      | `HashMap<Bytes, VecDeque<Bytes>>`       |
//! | hashes     | `HashMap<Bytes, HashMap<Bytes, Bytes>>` |
//! | sets       | `HashMap<Bytes, HashSet<Bytes>>`        |
//! | sorted sets| `HashMap<Bytes, SortedSet>`             |
//!
//! A key living in one namespace says nothing about the others:
//! `SET k v` and `LPUSH k a` create two unrelated entries.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     StorageEngine                           │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐           │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │ Shard N │           │
//! │  │ strings │ │ strings │ │ strings │ │ strings │  RwLock   │
//! │  │ lists   │ │ lists   │ │ lists   │ │ lists   │  RwLock   │
//! │  │ hashes  │ │ hashes  │ │ hashes  │ │ hashes  │  RwLock   │
//! │  │ sets    │ │ sets    │ │ sets    │ │ sets    │  RwLock   │
//! │  │ zsets   │ │ zsets   │ │ zsets   │ │ zsets   │  RwLock   │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Keys are distributed across shards using a hash function. Every
//! namespace in a shard has its own `RwLock`, so each operation takes
//! exactly one lock: shared for reads, exclusive for writes. Two commands
//! only contend when they touch the same namespace in the same shard.
//!
//! The per-type operations live in sibling modules (`lists`, `hashes`,
//! `sets`, `sorted_sets`) as further `impl StorageEngine` blocks.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::sorted_sets::SortedSet;
use bytes::Bytes;
use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Number of shards for the storage engine.
/// More shards = less lock contention, but more memory overhead.
const NUM_SHARDS: usize = 64;

/// A single shard containing a portion of every namespace.
#[derive(Debug)]
pub(super) struct Shard {
    pub(super) strings: RwLock<HashMap<Bytes, Bytes>>,
    pub(super) lists: RwLock<HashMap<Bytes, VecDeque<Bytes>>>,
    pub(super) hashes: RwLock<HashMap<Bytes, HashMap<Bytes, Bytes>>>,
    pub(super) sets: RwLock<HashMap<Bytes, HashSet<Bytes>>>,
    pub(super) zsets: RwLock<HashMap<Bytes, SortedSet>>,
}

impl Shard {
    fn new() -> Self {
        Self {
            strings: RwLock::new(HashMap::new()),
            lists: RwLock::new(HashMap::new()),
            hashes: RwLock::new(HashMap::new()),
            sets: RwLock::new(HashMap::new()),
            zsets: RwLock::new(HashMap::new()),
        }
    }
}

/// Per-namespace operation counters.
#[derive(Debug, Default)]
pub(super) struct OpCounters {
    pub(super) strings: AtomicU64,
    pub(super) lists: AtomicU64,
    pub(super) hashes: AtomicU64,
    pub(super) sets: AtomicU64,
    pub(super) zsets: AtomicU64,
}

/// The main storage engine for LineKV.
///
/// This struct is designed to be wrapped in an `Arc` and shared across
/// all client handler tasks. All operations are thread-safe, and separate
/// engines are fully isolated from each other.
///
/// # Example
///
/// ```
/// use linekv::storage::StorageEngine;
/// use bytes::Bytes;
///
/// let engine = StorageEngine::new();
///
/// engine.set(Bytes::from("name"), Bytes::from("Ariz"));
/// assert_eq!(engine.get(&Bytes::from("name")), Some(Bytes::from("Ariz")));
///
/// assert_eq!(engine.incr(&Bytes::from("visits")), Ok(1));
/// ```
pub struct StorageEngine {
    /// Sharded storage for reduced lock contention
    shards: Vec<Shard>,

    /// Statistics: operations executed per namespace
    pub(super) ops: OpCounters,
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine")
            .field("shards", &self.shards.len())
            .field("string_ops", &self.ops.strings.load(Ordering::Relaxed))
            .field("list_ops", &self.ops.lists.load(Ordering::Relaxed))
            .field("hash_ops", &self.ops.hashes.load(Ordering::Relaxed))
            .field("set_ops", &self.ops.sets.load(Ordering::Relaxed))
            .field("sorted_set_ops", &self.ops.zsets.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for StorageEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageEngine {
    /// Creates a new, empty storage engine.
    pub fn new() -> Self {
        let shards = (0..NUM_SHARDS).map(|_| Shard::new()).collect();

        Self {
            shards,
            ops: OpCounters::default(),
        }
    }

    /// Determines which shard a key belongs to.
    #[inline]
    fn shard_index(&self, key: &[u8]) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % NUM_SHARDS
    }

    /// Gets the shard for a given key.
    #[inline]
    pub(super) fn get_shard(&self, key: &[u8]) -> &Shard {
        &self.shards[self.shard_index(key)]
    }

    // ========================================================================
    // STRING OPERATIONS
    // ========================================================================

    /// Sets a key to a value, overwriting any previous value.
    ///
    /// # Returns
    ///
    /// Returns `true` if a new key was created, `false` if an existing key was updated.
    pub fn set(&self, key: Bytes, value: Bytes) -> bool {
        self.ops.strings.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(&key);
        let mut strings = shard.strings.write().unwrap();

        strings.insert(key, value).is_none()
    }

    /// Gets the value for a key, or `None` if it has no string value.
    pub fn get(&self, key: &Bytes) -> Option<Bytes> {
        self.ops.strings.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(key);
        let strings = shard.strings.read().unwrap();

        strings.get(key).cloned()
    }

    /// Removes a key from the string namespace.
    ///
    /// Deleting an absent key is not an error.
    ///
    /// # Returns
    ///
    /// Returns `true` if the key existed.
    pub fn delete(&self, key: &Bytes) -> bool {
        self.ops.strings.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(key);
        let mut strings = shard.strings.write().unwrap();

        strings.remove(key).is_some()
    }

    /// Increments an integer value by 1.
    ///
    /// An absent key is initialized to `1`.
    /// Returns an error if the stored value is not a valid integer.
    pub fn incr(&self, key: &Bytes) -> StorageResult<i64> {
        self.step(key, 1)
    }

    /// Decrements an integer value by 1.
    ///
    /// An absent key is initialized to `1`, the same as [`incr`](Self::incr).
    pub fn decr(&self, key: &Bytes) -> StorageResult<i64> {
        self.step(key, -1)
    }

    fn step(&self, key: &Bytes, delta: i64) -> StorageResult<i64> {
        self.ops.strings.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(key);
        let mut strings = shard.strings.write().unwrap();

        let new_value = match strings.get(key) {
            Some(value) => {
                let current = std::str::from_utf8(value)
                    .ok()
                    .and_then(|s| s.parse::<i64>().ok())
                    .ok_or(StorageError::NotAnInteger)?;
                current.checked_add(delta).ok_or(StorageError::Overflow)?
            }
            None => 1,
        };

        strings.insert(key.clone(), Bytes::from(new_value.to_string()));
        Ok(new_value)
    }

    // ========================================================================
    // STATISTICS
    // ========================================================================

    /// Returns the number of keys across all namespaces.
    ///
    /// A key present in two namespaces is counted twice.
    pub fn len(&self) -> u64 {
        self.stats().total_keys()
    }

    /// Returns true if every namespace is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns key counts per namespace and operation counters.
    ///
    /// Key counts are gathered shard by shard, so under concurrent writes
    /// the result is a close approximation rather than a snapshot.
    pub fn stats(&self) -> StorageStats {
        let mut stats = StorageStats {
            string_ops: self.ops.strings.load(Ordering::Relaxed),
            list_ops: self.ops.lists.load(Ordering::Relaxed),
            hash_ops: self.ops.hashes.load(Ordering::Relaxed),
            set_ops: self.ops.sets.load(Ordering::Relaxed),
            sorted_set_ops: self.ops.zsets.load(Ordering::Relaxed),
            ..StorageStats::default()
        };

        for shard in &self.shards {
            stats.strings += shard.strings.read().unwrap().len() as u64;
            stats.lists += shard.lists.read().unwrap().len() as u64;
            stats.hashes += shard.hashes.read().unwrap().len() as u64;
            stats.sets += shard.sets.read().unwrap().len() as u64;
            stats.sorted_sets += shard.zsets.read().unwrap().len() as u64;
        }

        stats
    }
}

/// Database statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageStats {
    /// Keys in the string namespace
    pub strings: u64,
    /// Keys in the list namespace
    pub lists: u64,
    /// Keys in the hash namespace
    pub hashes: u64,
    /// Keys in the set namespace
    pub sets: u64,
    /// Keys in the sorted-set namespace
    pub sorted_sets: u64,
    /// Total string operations
    pub string_ops: u64,
    /// Total list operations
    pub list_ops: u64,
    /// Total hash operations
    pub hash_ops: u64,
    /// Total set operations
    pub set_ops: u64,
    /// Total sorted-set operations
    pub sorted_set_ops: u64,
}

impl StorageStats {
    /// Sum of keys over all namespaces.
    pub fn total_keys(&self) -> u64 {
        self.strings + self.lists + self.hashes + self.sets + self.sorted_sets
    }

    /// Sum of operations over all namespaces.
    pub fn total_ops(&self) -> u64 {
        self.string_ops + self.list_ops + self.hash_ops + self.set_ops + self.sorted_set_ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let engine = StorageEngine::new();

        assert!(engine.set(Bytes::from("key"), Bytes::from("value")));
        assert_eq!(engine.get(&Bytes::from("key")), Some(Bytes::from("value")));

        // Overwrite
        assert!(!engine.set(Bytes::from("key"), Bytes::from("other")));
        assert_eq!(engine.get(&Bytes::from("key")), Some(Bytes::from("other")));
    }

    #[test]
    fn test_get_nonexistent() {
        let engine = StorageEngine::new();
        assert_eq!(engine.get(&Bytes::from("nonexistent")), None);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let engine = StorageEngine::new();

        engine.set(Bytes::from("key"), Bytes::from("value"));
        assert!(engine.delete(&Bytes::from("key")));
        assert_eq!(engine.get(&Bytes::from("key")), None);
        assert!(!engine.delete(&Bytes::from("key"))); // Already deleted
    }

    #[test]
    fn test_incr() {
        let engine = StorageEngine::new();

        assert_eq!(engine.incr(&Bytes::from("counter")), Ok(1));
        assert_eq!(engine.incr(&Bytes::from("counter")), Ok(2));

        engine.set(Bytes::from("num"), Bytes::from("10"));
        assert_eq!(engine.incr(&Bytes::from("num")), Ok(11));
        assert_eq!(engine.get(&Bytes::from("num")), Some(Bytes::from("11")));
    }

    #[test]
    fn test_decr_initializes_absent_key_to_one() {
        let engine = StorageEngine::new();

        assert_eq!(engine.decr(&Bytes::from("fresh")), Ok(1));
        assert_eq!(engine.decr(&Bytes::from("fresh")), Ok(0));
        assert_eq!(engine.decr(&Bytes::from("fresh")), Ok(-1));
    }

    #[test]
    fn test_incr_non_integer_leaves_value() {
        let engine = StorageEngine::new();

        engine.set(Bytes::from("text"), Bytes::from("abc"));
        assert_eq!(
            engine.incr(&Bytes::from("text")),
            Err(StorageError::NotAnInteger)
        );
        assert_eq!(engine.get(&Bytes::from("text")), Some(Bytes::from("abc")));
    }

    #[test]
    fn test_incr_overflow() {
        let engine = StorageEngine::new();

        engine.set(Bytes::from("max"), Bytes::from(i64::MAX.to_string()));
        assert_eq!(engine.incr(&Bytes::from("max")), Err(StorageError::Overflow));
        assert_eq!(
            engine.get(&Bytes::from("max")),
            Some(Bytes::from(i64::MAX.to_string()))
        );
    }

    #[test]
    fn test_namespaces_are_independent() {
        let engine = StorageEngine::new();
        let key = Bytes::from("shared");

        engine.set(key.clone(), Bytes::from("scalar"));
        engine.rpush(key.clone(), vec![Bytes::from("item")]);

        assert_eq!(engine.get(&key), Some(Bytes::from("scalar")));
        assert_eq!(engine.llen(&key), 1);

        engine.delete(&key);
        assert_eq!(engine.llen(&key), 1);
    }

    #[test]
    fn test_stats() {
        let engine = StorageEngine::new();
        assert!(engine.is_empty());

        engine.set(Bytes::from("a"), Bytes::from("1"));
        engine.set(Bytes::from("b"), Bytes::from("2"));
        engine.rpush(Bytes::from("list"), vec![Bytes::from("x")]);
        engine.sadd(Bytes::from("set"), vec![Bytes::from("m")]);

        let stats = engine.stats();
        assert_eq!(stats.strings, 2);
        assert_eq!(stats.lists, 1);
        assert_eq!(stats.sets, 1);
        assert_eq!(stats.hashes, 0);
        assert_eq!(stats.total_keys(), 4);
        assert_eq!(stats.string_ops, 2);
        assert_eq!(engine.len(), 4);
    }

    #[test]
    fn test_debug_shows_every_namespace() {
        let engine = StorageEngine::new();
        engine.hset(Bytes::from("h"), Bytes::from("f"), Bytes::from("v"));
        engine.sadd(Bytes::from("s"), vec![Bytes::from("m")]);
        engine
            .zadd(Bytes::from("z"), &[(Bytes::from("1"), Bytes::from("m"))])
            .unwrap();

        let debug = format!("{:?}", engine);
        assert!(debug.contains("shards: 64"));
        assert!(debug.contains("hash_ops: 1"));
        assert!(debug.contains("set_ops: 1"));
        assert!(debug.contains("sorted_set_ops: 1"));
    }

    #[test]
    fn test_concurrent_access() {
        use std::sync::Arc;
        use std::thread;

        let engine = Arc::new(StorageEngine::new());
        let mut handles = vec![];

        for i in 0..10 {
            let engine = Arc::clone(&engine);
            handles.push(thread::spawn(move || {
                for j in 0..100 {
                    let key = format!("key-{}-{}", i, j);
                    engine.set(Bytes::from(key.clone()), Bytes::from("value"));
                    engine.get(&Bytes::from(key));
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(engine.stats().strings, 1000);
    }

    #[test]
    fn test_concurrent_incr() {
        use std::sync::Arc;
        use std::thread;

        let engine = Arc::new(StorageEngine::new());
        let key = Bytes::from("counter");
        engine.set(key.clone(), Bytes::from("0"));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = Arc::clone(&engine);
                let key = key.clone();
                thread::spawn(move || {
                    for _ in 0..500 {
                        engine.incr(&key).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(engine.get(&key), Some(Bytes::from("4000")));
    }
}
