use std::fmt;

use crate::{Collection, SortAlgorithm};

/// Pairs stored in insertion order. Lookups scan linearly from the newest end.
#[derive(Clone)]
pub struct ArrayCollection<K, V> {
    items: Vec<(K, V)>,
    algorithm: SortAlgorithm,
}

impl<K, V> Default for ArrayCollection<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ArrayCollection<K, V> {
    pub const fn new() -> Self {
        Self::with_algorithm(SortAlgorithm::Quick)
    }

    /// Uses `algorithm` for [`Collection::sort`] and [`Collection::find_range`].
    pub const fn with_algorithm(algorithm: SortAlgorithm) -> Self {
        ArrayCollection {
            items: Vec::new(),
            algorithm,
        }
    }

    pub fn algorithm(&self) -> SortAlgorithm {
        self.algorithm
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

impl<K: Ord, V> ArrayCollection<K, V> {
    /// Keys sorted ascending with `algorithm`, whatever the configured one is.
    pub fn sort_with(&self, algorithm: SortAlgorithm) -> Vec<&K> {
        let mut keys = self.keys();
        algorithm.sort(&mut keys);
        keys
    }
}

impl<K: Ord, V> Collection for ArrayCollection<K, V> {
    type Key = K;
    type Value = V;

    fn add(&mut self, key: K, value: V) {
        self.items.push((key, value));
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        let index = self.items.iter().rposition(|(k, _)| k == key)?;
        Some(self.items.remove(index).1)
    }

    fn find(&self, key: &K) -> Option<&V> {
        self.items
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    fn find_range(&self, k1: &K, k2: &K) -> Vec<&K> {
        let mut keys: Vec<&K> = self
            .items
            .iter()
            .map(|(k, _)| k)
            .filter(|k| k1 <= *k && *k <= k2)
            .collect();
        self.algorithm.sort(&mut keys);
        keys
    }

    /// Keys in insertion order.
    fn keys(&self) -> Vec<&K> {
        self.items.iter().map(|(k, _)| k).collect()
    }

    fn sort(&self) -> Vec<&K> {
        self.sort_with(self.algorithm)
    }

    fn size(&self) -> usize {
        self.items.len()
    }
}

impl<K: Ord + fmt::Debug, V: fmt::Debug> fmt::Debug for ArrayCollection<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Newest first among equal keys, like the trees list them.
        let mut entries: Vec<_> = self.items.iter().rev().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        f.debug_map()
            .entries(entries.into_iter().map(|(k, v)| (k, v)))
            .finish()
    }
}
