use std::{
    hash::{BuildHasher, Hash},
    ops::Index,
};

use crate::{
    ArrayCollection, AvlCollection, BstCollection, Collection, HashCollection, RbtCollection,
    SortedArrayCollection,
};

macro_rules! std_traits {
    ($($collection:ident),* $(,)?) => {$(
        impl<K: Ord, V> FromIterator<(K, V)> for $collection<K, V> {
            fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
                let mut collection = $collection::new();
                collection.extend(iter);
                collection
            }
        }

        impl<K: Ord, V> Extend<(K, V)> for $collection<K, V> {
            fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
                for (key, value) in iter {
                    self.add(key, value);
                }
            }
        }

        impl<K: Ord, V> Index<&K> for $collection<K, V> {
            type Output = V;

            /// # Panics
            ///
            /// Panics if the key is not present.
            fn index(&self, key: &K) -> &V {
                self.find(key).expect("no entry found for key")
            }
        }
    )*};
}

std_traits!(
    AvlCollection,
    RbtCollection,
    BstCollection,
    ArrayCollection,
    SortedArrayCollection,
);

impl<K: Hash + Ord, V, S: BuildHasher + Default> FromIterator<(K, V)> for HashCollection<K, V, S> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = HashCollection::with_hasher(S::default());
        table.extend(iter);
        table
    }
}

impl<K: Hash + Ord, V, S: BuildHasher> Extend<(K, V)> for HashCollection<K, V, S> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.add(key, value);
        }
    }
}

impl<K: Hash + Ord, V, S: BuildHasher> Index<&K> for HashCollection<K, V, S> {
    type Output = V;

    fn index(&self, key: &K) -> &V {
        self.find(key).expect("no entry found for key")
    }
}
