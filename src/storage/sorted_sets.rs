//! Sorted-set operations.
//!
//! A sorted set keeps a score per member plus an ordering sequence of
//! members in ascending score order. Range queries read the ordering
//! sequence directly instead of sorting on demand.
//!
//! Placement is a linear scan: a member is inserted before the first
//! member whose current score is strictly greater, so members with equal
//! scores stay in the order they were placed. Re-adding a member first
//! takes it out of the sequence, then places it again with its new score.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::lists::clamp_range;
use crate::storage::StorageEngine;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::Ordering;

/// Scores plus the derived ordering of one sorted set.
#[derive(Debug, Clone, Default)]
pub struct SortedSet {
    scores: HashMap<Bytes, f64>,
    order: Vec<Bytes>,
}

impl SortedSet {
    /// Upserts `member` with `score`.
    ///
    /// # Returns
    /// `true` if the member is new.
    pub fn insert(&mut self, member: Bytes, score: f64) -> bool {
        let is_new = self.scores.insert(member.clone(), score).is_none();

        if !is_new {
            if let Some(pos) = self.order.iter().position(|m| *m == member) {
                self.order.remove(pos);
            }
        }

        let pos = self
            .order
            .iter()
            .position(|m| self.scores.get(m).is_some_and(|&s| s > score))
            .unwrap_or(self.order.len());
        self.order.insert(pos, member);

        is_new
    }

    /// Removes `member`.
    ///
    /// # Returns
    /// `true` if the member had a score.
    pub fn remove(&mut self, member: &Bytes) -> bool {
        if self.scores.remove(member).is_none() {
            return false;
        }
        if let Some(pos) = self.order.iter().position(|m| m == member) {
            self.order.remove(pos);
        }
        true
    }

    /// Returns the score of `member`.
    pub fn score(&self, member: &Bytes) -> Option<f64> {
        self.scores.get(member).copied()
    }

    /// Members in ascending score order.
    pub fn members(&self) -> &[Bytes] {
        &self.order
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Parses a score argument.
///
/// NaN is rejected since it cannot be ordered. Infinity is only accepted
/// when spelled out (`inf`, `-Infinity`, ...); a finite literal too large
/// for an `f64` is rejected instead of rounding to infinity.
pub fn parse_score(raw: &[u8]) -> StorageResult<f64> {
    let text = std::str::from_utf8(raw).map_err(|_| StorageError::InvalidScore)?;
    let score = text
        .parse::<f64>()
        .map_err(|_| StorageError::InvalidScore)?;

    if score.is_nan() || (score.is_infinite() && !spells_infinity(text)) {
        return Err(StorageError::InvalidScore);
    }

    Ok(score)
}

fn spells_infinity(text: &str) -> bool {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

impl StorageEngine {
    /// Adds `(score, member)` pairs to a sorted set.
    ///
    /// Scores are parsed one pair at a time. If a score is invalid the
    /// command fails, but pairs before it stay applied.
    ///
    /// # Returns
    /// The number of members that were new.
    pub fn zadd(&self, key: Bytes, pairs: &[(Bytes, Bytes)]) -> StorageResult<usize> {
        self.ops.zsets.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(&key);
        let mut zsets = shard.zsets.write().unwrap();

        let zset = zsets.entry(key.clone()).or_default();
        let mut added = 0;
        let mut result = Ok(());

        for (raw_score, member) in pairs {
            match parse_score(raw_score) {
                Ok(score) => {
                    if zset.insert(member.clone(), score) {
                        added += 1;
                    }
                }
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }

        // Don't leave an empty set behind when the first score was invalid
        if zset.is_empty() {
            zsets.remove(&key);
        }

        result.map(|()| added)
    }

    /// Returns the inclusive range `[start, stop]` of the ordering sequence,
    /// clamped the same way as `lrange`.
    pub fn zrange(&self, key: &Bytes, start: i64, stop: i64) -> Vec<Bytes> {
        self.ops.zsets.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(key);
        let zsets = shard.zsets.read().unwrap();

        match zsets.get(key) {
            Some(zset) => match clamp_range(zset.len(), start, stop) {
                Some((from, to)) => zset.members()[from..=to].to_vec(),
                None => Vec::new(),
            },
            None => Vec::new(),
        }
    }

    /// Removes members from a sorted set.
    ///
    /// # Returns
    /// The number of members that had a score.
    pub fn zrem(&self, key: &Bytes, members: &[Bytes]) -> usize {
        self.ops.zsets.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(key);
        let mut zsets = shard.zsets.write().unwrap();

        let Some(zset) = zsets.get_mut(key) else {
            return 0;
        };

        let removed = members.iter().filter(|m| zset.remove(m)).count();

        if zset.is_empty() {
            zsets.remove(key);
        }

        removed
    }

    /// Returns the score of a member.
    #[cfg(test)]
    fn zscore(&self, key: &Bytes, member: &Bytes) -> Option<f64> {
        let shard = self.get_shard(key);
        let zsets = shard.zsets.read().unwrap();

        zsets.get(key).and_then(|zset| zset.score(member))
    }

    /// Checks if a key exists in the sorted-set namespace.
    pub fn sorted_set_exists(&self, key: &Bytes) -> bool {
        let shard = self.get_shard(key);
        let zsets = shard.zsets.read().unwrap();

        zsets.contains_key(key)
    }
}
