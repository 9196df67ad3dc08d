use std::{
    collections::hash_map::RandomState,
    fmt,
    hash::{BuildHasher, Hash},
    iter, mem,
};

use crate::{Collection, SortAlgorithm};

const DEFAULT_CAPACITY: usize = 16;
const DEFAULT_LOAD_FACTOR: f64 = 0.75;

type Link<K, V> = Option<Box<Entry<K, V>>>;

struct Entry<K, V> {
    key: K,
    value: V,
    next: Link<K, V>,
}

/// A separately chained hash table.
///
/// Every chain keeps its entries newest first, so the first match in a chain
/// is the most recent entry for that key. The table doubles its bucket count
/// once `len / capacity` reaches the load factor.
pub struct HashCollection<K, V, S = RandomState> {
    buckets: Vec<Link<K, V>>,
    len: usize,
    load_factor: f64,
    hasher: S,
}

impl<K, V> HashCollection<K, V, RandomState> {
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    /// A zero capacity is raised to one bucket, a load factor that is not a
    /// positive number falls back to the default.
    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f64) -> Self {
        Self::with_capacity_load_factor_and_hasher(capacity, load_factor, RandomState::new())
    }
}

impl<K, V> Default for HashCollection<K, V, RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> HashCollection<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_load_factor_and_hasher(DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR, hasher)
    }

    pub fn with_capacity_load_factor_and_hasher(
        capacity: usize,
        load_factor: f64,
        hasher: S,
    ) -> Self {
        let load_factor = if load_factor > 0.0 && load_factor.is_finite() {
            load_factor
        } else {
            DEFAULT_LOAD_FACTOR
        };
        HashCollection {
            buckets: empty_buckets(capacity.max(1)),
            len: 0,
            load_factor,
            hasher,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    pub fn min_chain_length(&self) -> usize {
        if self.len == 0 {
            return 0;
        }
        self.chain_lengths().min().unwrap_or(0)
    }

    pub fn max_chain_length(&self) -> usize {
        self.chain_lengths().max().unwrap_or(0)
    }

    /// Entries per bucket, empty buckets included.
    pub fn avg_chain_length(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }

    /// Drops every entry, keeping the current bucket count.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            let mut link = bucket.take();
            while let Some(mut entry) = link {
                link = entry.next.take();
            }
        }
        self.len = 0;
    }

    fn chain_lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.buckets.iter().map(|bucket| chain(bucket).count())
    }

    fn entries(&self) -> impl Iterator<Item = &Entry<K, V>> {
        self.buckets.iter().flat_map(chain)
    }
}

impl<K: Hash, V, S: BuildHasher> HashCollection<K, V, S> {
    fn bucket(&self, key: &K) -> usize {
        (self.hasher.hash_one(key) % self.buckets.len() as u64) as usize
    }

    fn grow(&mut self) {
        let capacity = self.capacity() * 2;
        let old = mem::replace(&mut self.buckets, empty_buckets(capacity));
        for mut link in old {
            let mut entries = Vec::new();
            while let Some(mut entry) = link {
                link = entry.next.take();
                entries.push(entry);
            }
            // Oldest first, so pushing to the front leaves the newest in front.
            for mut entry in entries.into_iter().rev() {
                let index = self.bucket(&entry.key);
                entry.next = self.buckets[index].take();
                self.buckets[index] = Some(entry);
            }
        }
    }
}

impl<K, V, S> Drop for HashCollection<K, V, S> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K: Hash + Ord, V, S: BuildHasher> Collection for HashCollection<K, V, S> {
    type Key = K;
    type Value = V;

    fn add(&mut self, key: K, value: V) {
        let index = self.bucket(&key);
        let next = self.buckets[index].take();
        self.buckets[index] = Some(Box::new(Entry { key, value, next }));
        self.len += 1;

        if self.len as f64 / self.capacity() as f64 >= self.load_factor {
            self.grow();
        }
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        let index = self.bucket(key);
        let mut link = &mut self.buckets[index];
        while link.as_ref().is_some_and(|entry| entry.key != *key) {
            link = &mut link.as_mut()?.next;
        }
        let mut entry = link.take()?;
        *link = entry.next.take();
        self.len -= 1;
        Some(entry.value)
    }

    fn find(&self, key: &K) -> Option<&V> {
        chain(&self.buckets[self.bucket(key)])
            .find(|entry| entry.key == *key)
            .map(|entry| &entry.value)
    }

    fn find_range(&self, k1: &K, k2: &K) -> Vec<&K> {
        let mut keys: Vec<&K> = self
            .entries()
            .map(|entry| &entry.key)
            .filter(|key| k1 <= *key && *key <= k2)
            .collect();
        SortAlgorithm::default().sort(&mut keys);
        keys
    }

    /// Keys in bucket order.
    fn keys(&self) -> Vec<&K> {
        self.entries().map(|entry| &entry.key).collect()
    }

    fn sort(&self) -> Vec<&K> {
        let mut keys = self.keys();
        SortAlgorithm::default().sort(&mut keys);
        keys
    }

    fn size(&self) -> usize {
        self.len
    }
}

impl<K: Clone, V: Clone, S: Clone> Clone for HashCollection<K, V, S> {
    fn clone(&self) -> Self {
        let buckets = self
            .buckets
            .iter()
            .map(|bucket| {
                let entries: Vec<_> = chain(bucket).collect();
                entries.into_iter().rev().fold(None, |next, entry| {
                    Some(Box::new(Entry {
                        key: entry.key.clone(),
                        value: entry.value.clone(),
                        next,
                    }))
                })
            })
            .collect();
        HashCollection {
            buckets,
            len: self.len,
            load_factor: self.load_factor,
            hasher: self.hasher.clone(),
        }
    }
}

impl<K: Ord + fmt::Debug, V: fmt::Debug, S> fmt::Debug for HashCollection<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<_> = self.entries().collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        f.debug_map()
            .entries(entries.into_iter().map(|entry| (&entry.key, &entry.value)))
            .finish()
    }
}

fn empty_buckets<K, V>(capacity: usize) -> Vec<Link<K, V>> {
    iter::repeat_with(|| None).take(capacity).collect()
}

fn chain<K, V>(link: &Link<K, V>) -> impl Iterator<Item = &Entry<K, V>> {
    iter::successors(link.as_deref(), |entry| entry.next.as_deref())
}
