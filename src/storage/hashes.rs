//! Hash operations.
//!
//! Each hash is a `HashMap` of field to value. Field order is not defined.
//! Removing the last field removes the hash itself.

use crate::storage::StorageEngine;
use bytes::Bytes;
use std::sync::atomic::Ordering;

impl StorageEngine {
    /// Sets a single field, creating the hash if needed.
    ///
    /// # Returns
    /// `true` if the field is new, `false` if an existing field was updated.
    pub fn hset(&self, key: Bytes, field: Bytes, value: Bytes) -> bool {
        self.ops.hashes.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(&key);
        let mut hashes = shard.hashes.write().unwrap();

        hashes
            .entry(key)
            .or_default()
            .insert(field, value)
            .is_none()
    }

    /// Gets a single field's value.
    pub fn hget(&self, key: &Bytes, field: &Bytes) -> Option<Bytes> {
        self.ops.hashes.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(key);
        let hashes = shard.hashes.read().unwrap();

        hashes.get(key).and_then(|hash| hash.get(field)).cloned()
    }

    /// Sets several fields under a single write lock.
    ///
    /// Later pairs win when a field is repeated.
    pub fn hmset(&self, key: Bytes, pairs: Vec<(Bytes, Bytes)>) {
        self.ops.hashes.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(&key);
        let mut hashes = shard.hashes.write().unwrap();

        hashes.entry(key).or_default().extend(pairs);
    }

    /// Gets several fields, one result per requested field in request order.
    pub fn hmget(&self, key: &Bytes, fields: &[Bytes]) -> Vec<Option<Bytes>> {
        self.ops.hashes.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(key);
        let hashes = shard.hashes.read().unwrap();

        match hashes.get(key) {
            Some(hash) => fields.iter().map(|f| hash.get(f).cloned()).collect(),
            None => vec![None; fields.len()],
        }
    }

    /// Returns every field/value pair. Empty if the hash doesn't exist.
    pub fn hgetall(&self, key: &Bytes) -> Vec<(Bytes, Bytes)> {
        self.ops.hashes.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(key);
        let hashes = shard.hashes.read().unwrap();

        hashes
            .get(key)
            .map(|hash| {
                hash.iter()
                    .map(|(f, v)| (f.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Removes the listed fields.
    ///
    /// # Returns
    /// The number of fields actually removed.
    pub fn hdel(&self, key: &Bytes, fields: &[Bytes]) -> usize {
        self.ops.hashes.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(key);
        let mut hashes = shard.hashes.write().unwrap();

        let Some(hash) = hashes.get_mut(key) else {
            return 0;
        };

        let removed = fields.iter().filter(|f| hash.remove(*f).is_some()).count();

        if hash.is_empty() {
            hashes.remove(key);
        }

        removed
    }

    /// Checks if a key exists in the hash namespace.
    pub fn hash_exists(&self, key: &Bytes) -> bool {
        let shard = self.get_shard(key);
        let hashes = shard.hashes.read().unwrap();

        hashes.contains_key(key)
    }
}
