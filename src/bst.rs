use std::{cmp::Ordering, fmt, mem};

use crate::{
    Collection, InvariantViolation,
    traverse::{self, Binary},
};

type Link<K, V> = Option<Box<Node<K, V>>>;

struct Node<K, V> {
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> traverse::Binary for Node<K, V> {
    type Key = K;
    type Value = V;

    fn key(&self) -> &K {
        &self.key
    }

    fn value(&self) -> &V {
        &self.value
    }

    fn left(&self) -> Option<&Self> {
        self.left.as_deref()
    }

    fn right(&self) -> Option<&Self> {
        self.right.as_deref()
    }
}

/// An ordered collection backed by a plain binary search tree.
///
/// No rebalancing: sorted input degrades it into a list.
pub struct BstCollection<K, V> {
    root: Link<K, V>,
    len: usize,
}

impl<K, V> Default for BstCollection<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Drop for BstCollection<K, V> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K, V> BstCollection<K, V> {
    pub const fn new() -> Self {
        BstCollection { root: None, len: 0 }
    }

    pub fn height(&self) -> usize {
        traverse::height(self.root.as_deref())
    }

    /// Drops every node without recursing, degenerate trees can be deep.
    pub fn clear(&mut self) {
        let mut stack: Vec<Box<Node<K, V>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
        self.len = 0;
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<K: Ord, V> BstCollection<K, V> {
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        if !traverse::is_sorted(self.root.as_deref()) {
            return Err(InvariantViolation::Unordered);
        }
        let counted = traverse::count(self.root.as_deref());
        if counted != self.len {
            return Err(InvariantViolation::CountMismatch {
                counted,
                recorded: self.len,
            });
        }
        Ok(())
    }
}

impl<K: Ord, V> Collection for BstCollection<K, V> {
    type Key = K;
    type Value = V;

    fn add(&mut self, key: K, value: V) {
        let mut link = &mut self.root;
        while let Some(node) = link {
            link = if key <= node.key {
                &mut node.left
            } else {
                &mut node.right
            };
        }
        *link = Some(Box::new(Node {
            key,
            value,
            left: None,
            right: None,
        }));
        self.len += 1;
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        let removed = remove(&mut self.root, key)?;
        self.len -= 1;
        Some(removed)
    }

    fn find(&self, key: &K) -> Option<&V> {
        traverse::lower_bound(self.root.as_deref(), key).map(|n| &n.value)
    }

    fn find_range(&self, k1: &K, k2: &K) -> Vec<&K> {
        let mut keys = Vec::new();
        traverse::in_range(self.root.as_deref(), k1, k2, &mut keys);
        keys
    }

    fn keys(&self) -> Vec<&K> {
        traverse::keys(self.root.as_deref())
    }

    fn sort(&self) -> Vec<&K> {
        self.keys()
    }

    fn size(&self) -> usize {
        self.len
    }
}

enum CloneStep<'a, K, V> {
    Enter(Option<&'a Node<K, V>>),
    Build(&'a Node<K, V>),
}

impl<K: Clone, V: Clone> Clone for BstCollection<K, V> {
    /// Copies post-order with an explicit stack; each node is built once both
    /// of its subtrees are.
    fn clone(&self) -> Self {
        let mut steps = vec![CloneStep::Enter(self.root.as_deref())];
        let mut built: Vec<Link<K, V>> = Vec::new();
        while let Some(step) = steps.pop() {
            match step {
                CloneStep::Enter(None) => built.push(None),
                CloneStep::Enter(Some(n)) => {
                    steps.push(CloneStep::Build(n));
                    steps.push(CloneStep::Enter(n.right.as_deref()));
                    steps.push(CloneStep::Enter(n.left.as_deref()));
                }
                CloneStep::Build(n) => {
                    let right = built.pop().flatten();
                    let left = built.pop().flatten();
                    built.push(Some(Box::new(Node {
                        key: n.key.clone(),
                        value: n.value.clone(),
                        left,
                        right,
                    })));
                }
            }
        }
        BstCollection {
            root: built.pop().flatten(),
            len: self.len,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for BstCollection<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        traverse::in_order(self.root.as_deref(), &mut |n| {
            map.entry(n.key(), n.value());
        });
        map.finish()
    }
}

/// Removes the first entry in order equal to `key` below `root`.
///
/// Ties were routed left on insertion, so a node equal to `key` only has more
/// recent duplicates in its left subtree: the last equal node on the search
/// path is the one to remove.
fn remove<K: Ord, V>(root: &mut Link<K, V>, key: &K) -> Option<V> {
    let mut remaining = 0;
    let mut node = root.as_deref();
    while let Some(n) = node {
        node = match key.cmp(&n.key) {
            Ordering::Greater => n.right.as_deref(),
            Ordering::Equal => {
                remaining += 1;
                n.left.as_deref()
            }
            Ordering::Less => n.left.as_deref(),
        };
    }
    if remaining == 0 {
        return None;
    }

    let mut link = root;
    loop {
        let ordering = key.cmp(&link.as_ref()?.key);
        if ordering == Ordering::Equal {
            remaining -= 1;
            if remaining == 0 {
                break;
            }
        }
        let node = link.as_mut()?;
        link = if ordering == Ordering::Greater {
            &mut node.right
        } else {
            &mut node.left
        };
    }
    splice(link)
}

fn splice<K, V>(link: &mut Link<K, V>) -> Option<V> {
    let node = link.as_mut()?;
    if node.left.is_some() && node.right.is_some() {
        let successor = take_min(&mut node.right)?;
        node.key = successor.key;
        return Some(mem::replace(&mut node.value, successor.value));
    }
    let mut node = link.take()?;
    *link = node.left.take().or_else(|| node.right.take());
    Some(node.value)
}

/// Unlinks the leftmost node below `link`.
fn take_min<K, V>(mut link: &mut Link<K, V>) -> Option<Box<Node<K, V>>> {
    while link.as_ref()?.left.is_some() {
        link = &mut link.as_mut()?.left;
    }
    let mut min = link.take()?;
    *link = min.right.take();
    Some(min)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn with_keys(keys: &[i32]) -> BstCollection<i32, i32> {
        let mut tree = BstCollection::new();
        for k in keys {
            tree.add(*k, k * 10);
        }
        tree
    }

    #[test]
    fn ascending_inserts_degenerate() {
        let tree = with_keys(&(1..=15).collect::<Vec<_>>());
        assert_eq!(15, tree.height());
        assert_eq!(Ok(()), tree.validate());
    }

    #[test]
    fn find_and_range() {
        let tree = with_keys(&[5, 3, 8, 1, 4, 7, 9]);
        assert_eq!(3, tree.height());
        assert_eq!(Some(&40), tree.find(&4));
        assert_eq!(None, tree.find(&6));
        assert_eq!(vec![&3, &4, &5, &7], tree.find_range(&2, &7));
    }

    #[test]
    fn remove_all_shapes() {
        let mut tree = with_keys(&[50, 30, 70, 20, 40, 60, 80, 65]);
        assert_eq!(Some(200), tree.remove(&20));
        assert_eq!(Some(600), tree.remove(&60));
        assert_eq!(Some(500), tree.remove(&50));
        assert_eq!(None, tree.remove(&50));
        assert_eq!(Ok(()), tree.validate());
        assert_eq!(vec![&30, &40, &65, &70, &80], tree.keys());
        assert_eq!(5, tree.size());
    }

    #[test]
    fn duplicates() {
        let mut tree = BstCollection::new();
        tree.add(1, "a");
        tree.add(1, "b");
        tree.add(0, "z");
        tree.add(1, "c");
        assert_eq!(Some(&"c"), tree.find(&1));
        assert_eq!(Some("c"), tree.remove(&1));
        assert_eq!(Some("b"), tree.remove(&1));
        assert_eq!(Some(&"a"), tree.find(&1));
        assert_eq!(vec![&0, &1], tree.keys());
    }

    /// The shape `0..n` ascending inserts produce, linked without the
    /// quadratic cost of inserting.
    fn right_spine(n: u32) -> BstCollection<u32, u32> {
        let mut root = None;
        for k in (0..n).rev() {
            root = Some(Box::new(Node {
                key: k,
                value: k,
                left: None,
                right: root,
            }));
        }
        BstCollection { root, len: n as usize }
    }

    #[test]
    fn degenerate_tree_walks_without_recursing() {
        let mut tree = right_spine(200_000);
        assert_eq!(200_000, tree.height());

        assert_eq!(Some(199_999), tree.remove(&199_999));
        assert_eq!(Some(0), tree.remove(&0));
        assert_eq!(None, tree.remove(&200_000));
        assert_eq!(199_998, tree.keys().len());
        assert_eq!(199_998, tree.height());
        assert_eq!(Some(&150_000), tree.find(&150_000));
        assert_eq!(vec![&199_997, &199_998], tree.find_range(&199_997, &300_000));
        assert_eq!(Ok(()), tree.validate());

        let copy = tree.clone();
        assert_eq!(tree.keys(), copy.keys());
        assert_eq!(199_998, copy.height());
    }

    #[test]
    fn descending_duplicates_remove_newest() {
        // Each key is a left child of the previous one.
        let mut tree = with_keys(&[9, 9, 7, 7, 5, 9]);
        tree.add(7, 1);
        assert_eq!(Some(&1), tree.find(&7));
        assert_eq!(Some(1), tree.remove(&7));
        assert_eq!(Some(70), tree.remove(&7));
        assert_eq!(Some(70), tree.remove(&7));
        assert_eq!(None, tree.remove(&7));
        assert_eq!(vec![&5, &9, &9, &9], tree.keys());
        assert_eq!(Ok(()), tree.validate());
    }

    #[test]
    fn debug_format() {
        let tree = with_keys(&[2, 1, 2]);
        assert_eq!("{1: 10, 2: 20, 2: 20}", format!("{tree:?}"));
    }

    #[test]
    fn deep_tree_drops() {
        let mut tree = BstCollection::new();
        for k in 0..10_000 {
            tree.add(k, ());
        }
        tree.clear();
        assert!(tree.is_empty());
    }
}
