//! Computed table for BDD operations.
//!
//! A plain `HashMap` wrapper: no collisions, grows as needed. Results of
//! `ite` and quantification are memoized here for the lifetime of the manager.

use std::collections::HashMap;
use std::hash::Hash;

pub struct ComputedCache<K, V> {
    map: HashMap<K, V>,
}

impl<K, V> ComputedCache<K, V> {
    /// Creates a new cache with room for `2^bits` entries.
    pub fn new(bits: usize) -> Self {
        Self {
            map: HashMap::with_capacity(1 << bits),
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K, V> ComputedCache<K, V>
where
    K: Hash + Eq,
    V: Copy,
{
    #[inline]
    pub fn get(&mut self, key: &K) -> Option<V> {
        self.map.get(key).copied()
    }

    #[inline]
    pub fn insert(&mut self, key: K, value: V) {
        self.map.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_computed_cache_basic() {
        let mut cache = ComputedCache::<(u64, u64), i32>::new(4);

        cache.insert((1, 2), 42);
        cache.insert((3, 4), 99);

        assert_eq!(cache.get(&(1, 2)), Some(42));
        assert_eq!(cache.get(&(3, 4)), Some(99));
        assert_eq!(cache.get(&(5, 6)), None);
        assert_eq!(cache.len(), 2);
        assert!(!cache.is_empty());
    }
}
