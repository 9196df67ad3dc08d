use std::{cmp::Ordering, fmt, mem};

use crate::{
    Collection, InvariantViolation,
    traverse::{self, Binary},
};

type Link<K, V> = Option<Box<Node<K, V>>>;

struct Node<K, V> {
    key: K,
    value: V,
    // Height of the subtree rooted here; a leaf is 1.
    height: usize,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V) -> Self {
        Node {
            key,
            value,
            height: 1,
            left: None,
            right: None,
        }
    }
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

/// An ordered collection backed by an AVL tree.
///
/// Sibling subtree heights never differ by more than one, so the height stays
/// within about 1.44 log2(n).
pub struct AvlCollection<K, V> {
    root: Link<K, V>,
    len: usize,
}

impl<K, V> Default for AvlCollection<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> AvlCollection<K, V> {
    pub const fn new() -> Self {
        AvlCollection { root: None, len: 0 }
    }

    /// Height of the tree, 0 when empty.
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<K: Ord, V> AvlCollection<K, V> {
    /// Checks ordering, the stored heights, the balance bound and the count.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        if !traverse::is_sorted(self.root.as_deref()) {
            return Err(InvariantViolation::Unordered);
        }
        check_heights(&self.root)?;
        let counted = traverse::count(self.root.as_deref());
        if counted != self.len {
            return Err(InvariantViolation::CountMismatch {
                counted,
                recorded: self.len,
            });
        }
        Ok(())
    }

    pub fn is_balanced(&self) -> bool {
        self.validate().is_ok()
    }
}

impl<K: Ord, V> Collection for AvlCollection<K, V> {
    type Key = K;
    type Value = V;

    fn add(&mut self, key: K, value: V) {
        self.root = Some(insert(self.root.take(), key, value));
        self.len += 1;
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        let mut removed = None;
        self.root = remove(self.root.take(), key, &mut removed);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
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

impl<K: Clone, V: Clone> Clone for AvlCollection<K, V> {
    fn clone(&self) -> Self {
        AvlCollection {
            root: copy(&self.root),
            len: self.len,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlCollection<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        traverse::in_order(self.root.as_deref(), &mut |n| {
            map.entry(n.key(), n.value());
        });
        map.finish()
    }
}

fn height<K, V>(link: &Link<K, V>) -> usize {
    link.as_ref().map_or(0, |n| n.height)
}

fn update_height<K, V>(node: &mut Node<K, V>) {
    node.height = 1 + height(&node.left).max(height(&node.right));
}

fn balance_factor<K, V>(node: &Node<K, V>) -> isize {
    height(&node.left) as isize - height(&node.right) as isize
}

/// Promotes the left child. Returns the new subtree root with both touched
/// heights refreshed, lower node first.
fn rotate_right<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    node.left = pivot.right.take();
    update_height(&mut node);
    pivot.right = Some(node);
    update_height(&mut pivot);
    pivot
}

/// Mirror of [`rotate_right`].
fn rotate_left<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    node.right = pivot.left.take();
    update_height(&mut node);
    pivot.left = Some(node);
    update_height(&mut pivot);
    pivot
}

/// Refreshes the height of `node` and fixes a violation at it, if any.
///
/// The children must already be balanced with correct heights.
fn rebalance<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    update_height(&mut node);
    let balance = balance_factor(&node);

    if balance > 1 {
        // Left-right: straighten the zig-zag first.
        if node.left.as_deref().is_some_and(|l| balance_factor(l) < 0) {
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }

    if balance < -1 {
        // Right-left.
        if node.right.as_deref().is_some_and(|r| balance_factor(r) > 0) {
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }

    node
}

fn insert<K: Ord, V>(link: Link<K, V>, key: K, value: V) -> Box<Node<K, V>> {
    let Some(mut node) = link else {
        return Box::new(Node::new(key, value));
    };
    // Ties go left: the new entry lands before every equal one.
    if key <= node.key {
        node.left = Some(insert(node.left.take(), key, value));
    } else {
        node.right = Some(insert(node.right.take(), key, value));
    }
    rebalance(node)
}

fn remove<K: Ord, V>(link: Link<K, V>, key: &K, removed: &mut Option<V>) -> Link<K, V> {
    let mut node = link?;
    match key.cmp(&node.key) {
        Ordering::Less => node.left = remove(node.left.take(), key, removed),
        Ordering::Greater => node.right = remove(node.right.take(), key, removed),
        Ordering::Equal => {
            // A more recent equal entry can only sit further left.
            node.left = remove(node.left.take(), key, removed);
            if removed.is_none() {
                return splice(node, removed);
            }
        }
    }
    Some(rebalance(node))
}

/// Unlinks `node`, handing its value to `removed`, and returns what takes its
/// place.
fn splice<K: Ord, V>(mut node: Box<Node<K, V>>, removed: &mut Option<V>) -> Link<K, V> {
    match (node.left.take(), node.right.take()) {
        (None, None) => {
            *removed = Some(node.value);
            None
        }
        (Some(child), None) | (None, Some(child)) => {
            *removed = Some(node.value);
            Some(child)
        }
        (Some(left), Some(right)) => {
            // The in-order successor's pair moves into this node.
            let (right, successor) = take_min(right);
            let Node { key, value, .. } = *successor;
            node.key = key;
            *removed = Some(mem::replace(&mut node.value, value));
            node.left = Some(left);
            node.right = right;
            Some(rebalance(node))
        }
    }
}

/// Detaches the leftmost node, rebalancing on the way back up.
fn take_min<K, V>(mut node: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
    match node.left.take() {
        None => {
            let right = node.right.take();
            (right, node)
        }
        Some(left) => {
            let (left, min) = take_min(left);
            node.left = left;
            (Some(rebalance(node)), min)
        }
    }
}

fn copy<K: Clone, V: Clone>(link: &Link<K, V>) -> Link<K, V> {
    link.as_ref().map(|n| {
        Box::new(Node {
            key: n.key.clone(),
            value: n.value.clone(),
            height: n.height,
            left: copy(&n.left),
            right: copy(&n.right),
        })
    })
}

/// Returns the verified height of `link`.
fn check_heights<K, V>(link: &Link<K, V>) -> Result<usize, InvariantViolation> {
    let Some(node) = link else {
        return Ok(0);
    };
    let left = check_heights(&node.left)?;
    let right = check_heights(&node.right)?;
    let computed = 1 + left.max(right);
    if node.height != computed {
        return Err(InvariantViolation::StaleHeight {
            recorded: node.height,
            computed,
        });
    }
    if left.abs_diff(right) > 1 {
        return Err(InvariantViolation::Unbalanced { left, right });
    }
    Ok(computed)
}
