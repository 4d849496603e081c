//! List operations.
//!
//! Lists are stored as a `VecDeque` for O(1) push/pop on both ends.
//! A list whose last element is popped is removed from the namespace.

use crate::storage::StorageEngine;
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::atomic::Ordering;

impl StorageEngine {
    /// Pushes values to the head of a list as one block.
    /// Creates the list if it doesn't exist.
    ///
    /// The block keeps argument order: `LPUSH key a b` on `[x]` gives `[a, b, x]`.
    ///
    /// # Returns
    /// The length of the list after the push operation.
    pub fn lpush(&self, key: Bytes, values: Vec<Bytes>) -> usize {
        self.ops.lists.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(&key);
        let mut lists = shard.lists.write().unwrap();

        let list = lists.entry(key).or_insert_with(VecDeque::new);
        for value in values.into_iter().rev() {
            list.push_front(value);
        }

        list.len()
    }

    /// Pushes values to the tail of a list in argument order.
    /// Creates the list if it doesn't exist.
    ///
    /// # Returns
    /// The length of the list after the push operation.
    pub fn rpush(&self, key: Bytes, values: Vec<Bytes>) -> usize {
        self.ops.lists.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(&key);
        let mut lists = shard.lists.write().unwrap();

        let list = lists.entry(key).or_insert_with(VecDeque::new);
        list.extend(values);

        list.len()
    }

    /// Removes and returns the first element of a list.
    pub fn lpop(&self, key: &Bytes) -> Option<Bytes> {
        self.pop(key, VecDeque::pop_front)
    }

    /// Removes and returns the last element of a list.
    pub fn rpop(&self, key: &Bytes) -> Option<Bytes> {
        self.pop(key, VecDeque::pop_back)
    }

    fn pop(&self, key: &Bytes, take: fn(&mut VecDeque<Bytes>) -> Option<Bytes>) -> Option<Bytes> {
        self.ops.lists.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(key);
        let mut lists = shard.lists.write().unwrap();

        let list = lists.get_mut(key)?;
        let value = take(list);

        // Remove the key if the list is now empty
        if list.is_empty() {
            lists.remove(key);
        }

        value
    }

    /// Returns the length of a list, or 0 if it doesn't exist.
    pub fn llen(&self, key: &Bytes) -> usize {
        self.ops.lists.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(key);
        let lists = shard.lists.read().unwrap();

        lists.get(key).map(VecDeque::len).unwrap_or(0)
    }

    /// Returns the inclusive range `[start, stop]` of a list.
    ///
    /// `start` is clamped below to 0 and `stop` above to the last index.
    /// Negative indices are not counted from the end: a negative `stop`
    /// always yields an empty range.
    pub fn lrange(&self, key: &Bytes, start: i64, stop: i64) -> Vec<Bytes> {
        self.ops.lists.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(key);
        let lists = shard.lists.read().unwrap();

        match lists.get(key) {
            Some(list) => match clamp_range(list.len(), start, stop) {
                Some((from, to)) => list.range(from..=to).cloned().collect(),
                None => Vec::new(),
            },
            None => Vec::new(),
        }
    }

    /// Checks if a key exists in the list namespace.
    pub fn list_exists(&self, key: &Bytes) -> bool {
        let shard = self.get_shard(key);
        let lists = shard.lists.read().unwrap();

        lists.contains_key(key)
    }
}

/// Clamps an inclusive `[start, stop]` range against a sequence of `len`
/// elements. Returns `None` when the clamped range is empty.
pub(super) fn clamp_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = start.max(0);
    let stop = stop.min(len - 1);

    if start > stop {
        return None;
    }

    Some((start as usize, stop as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Vec<Bytes> {
        items.iter().map(|s| Bytes::from(s.to_string())).collect()
    }

    #[test]
    fn test_lpush_prepends_block_in_order() {
        let engine = StorageEngine::new();
        let key = Bytes::from("mylist");

        assert_eq!(engine.lpush(key.clone(), list(&["a", "b"])), 2);
        assert_eq!(engine.lpush(key.clone(), list(&["c", "d"])), 4);

        assert_eq!(engine.lrange(&key, 0, 10), list(&["c", "d", "a", "b"]));
    }

    #[test]
    fn test_rpush_appends() {
        let engine = StorageEngine::new();
        let key = Bytes::from("mylist");

        assert_eq!(engine.rpush(key.clone(), list(&["a"])), 1);
        assert_eq!(engine.rpush(key.clone(), list(&["b"])), 2);

        // Stop clamped to the last index
        assert_eq!(engine.lrange(&key, 0, 10), list(&["a", "b"]));
    }

    #[test]
    fn test_lpop_rpop() {
        let engine = StorageEngine::new();
        let key = Bytes::from("mylist");

        // Pop from empty list
        assert_eq!(engine.lpop(&key), None);
        assert_eq!(engine.rpop(&key), None);

        engine.rpush(key.clone(), list(&["a", "b", "c"]));

        assert_eq!(engine.lpop(&key), Some(Bytes::from("a")));
        assert_eq!(engine.llen(&key), 2);

        assert_eq!(engine.rpop(&key), Some(Bytes::from("c")));
        assert_eq!(engine.llen(&key), 1);

        // Pop last element
        assert_eq!(engine.lpop(&key), Some(Bytes::from("b")));
        assert_eq!(engine.llen(&key), 0);

        // List should be removed when empty
        assert!(!engine.list_exists(&key));
        assert_eq!(engine.rpop(&key), None);
    }

    #[test]
    fn test_llen_absent() {
        let engine = StorageEngine::new();
        assert_eq!(engine.llen(&Bytes::from("missing")), 0);
    }

    #[test]
    fn test_lrange_clamping() {
        let engine = StorageEngine::new();
        let key = Bytes::from("mylist");

        engine.rpush(key.clone(), list(&["a", "b", "c", "d", "e"]));

        assert_eq!(engine.lrange(&key, 1, 3), list(&["b", "c", "d"]));
        assert_eq!(engine.lrange(&key, -5, 1), list(&["a", "b"]));
        assert_eq!(engine.lrange(&key, 4, 4), list(&["e"]));

        // start > stop
        assert!(engine.lrange(&key, 3, 1).is_empty());
        // start past the end
        assert!(engine.lrange(&key, 7, 9).is_empty());
        // negative stop is not translated
        assert!(engine.lrange(&key, 0, -1).is_empty());
        // absent key
        assert!(engine.lrange(&Bytes::from("missing"), 0, 10).is_empty());
    }

    #[test]
    fn test_clamp_range() {
        assert_eq!(clamp_range(3, 0, 10), Some((0, 2)));
        assert_eq!(clamp_range(3, -4, 0), Some((0, 0)));
        assert_eq!(clamp_range(3, 2, 1), None);
        assert_eq!(clamp_range(0, 0, 0), None);
    }

    #[test]
    fn test_concurrent_lpush_distinct_keys() {
        use std::sync::Arc;
        use std::thread;

        let engine = Arc::new(StorageEngine::new());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    let key = Bytes::from(format!("list:{}", t % 2));
                    for i in 0..250 {
                        engine.lpush(key.clone(), vec![Bytes::from(format!("{}:{}", t, i))]);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let total = engine.llen(&Bytes::from("list:0")) + engine.llen(&Bytes::from("list:1"));
        assert_eq!(total, 8 * 250);
        assert_eq!(engine.llen(&Bytes::from("list:0")), 4 * 250);
    }
}
