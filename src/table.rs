//! Hash-consed storage for BDD nodes.
//!
//! Every node lives in a single `Vec`; buckets chain through the `next` field
//! of each entry. Index 0 is a sentry and is never handed out, so a `next` of 0
//! terminates a chain. The table grows (and rehashes) instead of failing when
//! full, since abstraction queries have no a priori bound on their size.

use crate::utils::MyHash;

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    next: usize,
}

pub struct Table<T> {
    data: Vec<Entry<T>>,
    buckets: Vec<usize>,
    bitmask: u64,
}

impl<T> Table<T>
where
    T: Default + Eq + MyHash,
{
    /// Create a new table with `2^bits` buckets.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Table bits should be in the range 0..=31");

        let buckets_size = 1usize << bits;
        Self {
            data: vec![Entry {
                value: T::default(),
                next: 0,
            }],
            buckets: vec![0; buckets_size],
            bitmask: (buckets_size - 1) as u64,
        }
    }

    /// Number of stored values (the sentry excluded).
    pub fn size(&self) -> usize {
        self.data.len() - 1
    }

    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Get the reference to the value at the given index.
    pub fn value(&self, index: usize) -> &T {
        assert_ne!(index, 0, "Index is 0");
        &self.data[index].value
    }

    fn bucket(&self, value: &T) -> usize {
        (value.hash() & self.bitmask) as usize
    }

    /// Find the index of an existing value.
    pub fn find(&self, value: &T) -> Option<usize> {
        let mut index = self.buckets[self.bucket(value)];
        while index != 0 {
            let entry = &self.data[index];
            if entry.value == *value {
                return Some(index);
            }
            index = entry.next;
        }
        None
    }

    /// Append a value without checking for duplicates.
    pub(crate) fn alloc(&mut self, value: T) -> usize {
        if self.size() >= self.capacity() {
            self.grow();
        }
        let bucket = self.bucket(&value);
        let index = self.data.len();
        self.data.push(Entry {
            value,
            next: self.buckets[bucket],
        });
        self.buckets[bucket] = index;
        index
    }

    /// Return the index of `value`, inserting it if absent.
    pub fn put(&mut self, value: T) -> usize {
        match self.find(&value) {
            Some(index) => index,
            None => self.alloc(value),
        }
    }

    fn grow(&mut self) {
        let new_size = self.buckets.len() * 2;
        log::debug!("growing table: {} -> {} buckets", self.buckets.len(), new_size);
        self.buckets = vec![0; new_size];
        self.bitmask = (new_size - 1) as u64;
        for index in 1..self.data.len() {
            let bucket = self.bucket(&self.data[index].value);
            self.data[index].next = self.buckets[bucket];
            self.buckets[bucket] = index;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
    struct Pair(u64, u64);

    impl MyHash for Pair {
        fn hash(&self) -> u64 {
            (self.0, self.1).hash()
        }
    }

    #[test]
    fn test_put_deduplicates() {
        let mut table = Table::<Pair>::new(2);
        let a = table.put(Pair(1, 2));
        let b = table.put(Pair(3, 4));
        let c = table.put(Pair(1, 2));
        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(table.size(), 2);
        assert_eq!(*table.value(b), Pair(3, 4));
    }

    #[test]
    fn test_growth_keeps_values() {
        let mut table = Table::<Pair>::new(1);
        let indices: Vec<_> = (0..100).map(|i| table.put(Pair(i, i + 1))).collect();
        assert!(table.capacity() >= 100);
        for (i, &index) in indices.iter().enumerate() {
            let i = i as u64;
            assert_eq!(table.find(&Pair(i, i + 1)), Some(index));
        }
        assert_eq!(table.find(&Pair(1000, 0)), None);
    }
}
