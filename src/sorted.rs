use std::fmt;

use crate::Collection;

/// Pairs kept sorted by key, placed and found by binary search.
///
/// A new pair goes in front of the pairs with an equal key, so the lower
/// bound of a key is always its most recent entry.
#[derive(Clone)]
pub struct SortedArrayCollection<K, V> {
    items: Vec<(K, V)>,
}

impl<K, V> Default for SortedArrayCollection<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> SortedArrayCollection<K, V> {
    pub const fn new() -> Self {
        SortedArrayCollection { items: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<K: Ord, V> SortedArrayCollection<K, V> {
    fn lower_bound(&self, key: &K) -> usize {
        self.items.partition_point(|(k, _)| k < key)
    }

    /// Index of the most recent entry for `key`.
    fn position(&self, key: &K) -> Option<usize> {
        let index = self.lower_bound(key);
        self.items
            .get(index)
            .is_some_and(|(k, _)| k == key)
            .then_some(index)
    }
}

impl<K: Ord, V> Collection for SortedArrayCollection<K, V> {
    type Key = K;
    type Value = V;

    fn add(&mut self, key: K, value: V) {
        let index = self.lower_bound(&key);
        self.items.insert(index, (key, value));
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        let index = self.position(key)?;
        Some(self.items.remove(index).1)
    }

    fn find(&self, key: &K) -> Option<&V> {
        self.position(key).map(|index| &self.items[index].1)
    }

    fn find_range(&self, k1: &K, k2: &K) -> Vec<&K> {
        self.items[self.lower_bound(k1)..]
            .iter()
            .map(|(k, _)| k)
            .take_while(|k| *k <= k2)
            .collect()
    }

    fn keys(&self) -> Vec<&K> {
        self.items.iter().map(|(k, _)| k).collect()
    }

    fn sort(&self) -> Vec<&K> {
        self.keys()
    }

    fn size(&self) -> usize {
        self.items.len()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for SortedArrayCollection<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.items.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}
