//! Set operations.
//!
//! Sets hold unique members with no ordering. Removing the last member
//! removes the set itself.

use crate::storage::StorageEngine;
use bytes::Bytes;
use std::sync::atomic::Ordering;

impl StorageEngine {
    /// Adds members to a set, creating it if needed.
    ///
    /// # Returns
    /// The number of members that were not already present. A member
    /// repeated within the same call is counted once.
    pub fn sadd(&self, key: Bytes, members: Vec<Bytes>) -> usize {
        self.ops.sets.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(&key);
        let mut sets = shard.sets.write().unwrap();

        let set = sets.entry(key).or_default();
        members.into_iter().filter(|m| set.insert(m.clone())).count()
    }

    /// Returns all members in unspecified order. Empty if the set doesn't exist.
    pub fn smembers(&self, key: &Bytes) -> Vec<Bytes> {
        self.ops.sets.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(key);
        let sets = shard.sets.read().unwrap();

        sets.get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Checks whether `member` belongs to the set.
    pub fn sismember(&self, key: &Bytes, member: &Bytes) -> bool {
        self.ops.sets.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(key);
        let sets = shard.sets.read().unwrap();

        sets.get(key).is_some_and(|set| set.contains(member))
    }

    /// Removes members from a set.
    ///
    /// # Returns
    /// The number of members actually removed.
    pub fn srem(&self, key: &Bytes, members: &[Bytes]) -> usize {
        self.ops.sets.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(key);
        let mut sets = shard.sets.write().unwrap();

        let Some(set) = sets.get_mut(key) else {
            return 0;
        };

        let removed = members.iter().filter(|m| set.remove(*m)).count();

        if set.is_empty() {
            sets.remove(key);
        }

        removed
    }

    /// Checks if a key exists in the set namespace.
    pub fn set_exists(&self, key: &Bytes) -> bool {
        let shard = self.get_shard(key);
        let sets = shard.sets.read().unwrap();

        sets.contains_key(key)
    }
}
