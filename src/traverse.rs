//! Read-only walks shared by the tree backings.
//!
//! All of them rely on one property only: an in-order walk yields keys in
//! non-decreasing order. Rotations keep that true even when equal keys end up
//! on both sides of a node, so nothing here assumes ties sit on the left.

use std::cmp::Ordering;

/// A borrowed view of a binary tree node.
pub(crate) trait Binary {
    type Key;
    type Value;

    fn key(&self) -> &Self::Key;
    fn value(&self) -> &Self::Value;
    fn left(&self) -> Option<&Self>;
    fn right(&self) -> Option<&Self>;
}

/// Visits every node left, self, right.
///
/// Iterative: an unbalanced tree can be as deep as it is long.
pub(crate) fn in_order<'a, N: Binary>(mut node: Option<&'a N>, visit: &mut impl FnMut(&'a N)) {
    let mut stack = Vec::new();
    loop {
        while let Some(n) = node {
            stack.push(n);
            node = n.left();
        }
        let Some(n) = stack.pop() else {
            return;
        };
        visit(n);
        node = n.right();
    }
}

pub(crate) fn keys<N: Binary>(node: Option<&N>) -> Vec<&N::Key> {
    let mut keys = Vec::new();
    in_order(node, &mut |n| keys.push(n.key()));
    keys
}

/// Keys in `[k1, k2]`, ascending, skipping subtrees that cannot hold any.
pub(crate) fn in_range<'a, N>(
    mut node: Option<&'a N>,
    k1: &N::Key,
    k2: &N::Key,
    out: &mut Vec<&'a N::Key>,
) where
    N: Binary,
    N::Key: Ord,
{
    // Everything on the left is <= key, everything on the right >= key.
    let mut stack = Vec::new();
    loop {
        while let Some(n) = node {
            stack.push(n);
            node = if n.key() >= k1 { n.left() } else { None };
        }
        let Some(n) = stack.pop() else {
            return;
        };
        let key = n.key();
        if k1 <= key && key <= k2 {
            out.push(key);
        }
        node = if key <= k2 { n.right() } else { None };
    }
}

/// The first node in order whose key equals `key`: the most recent entry.
pub(crate) fn lower_bound<'a, N>(mut node: Option<&'a N>, key: &N::Key) -> Option<&'a N>
where
    N: Binary,
    N::Key: Ord,
{
    let mut found = None;
    while let Some(candidate) = node {
        match candidate.key().cmp(key) {
            Ordering::Less => node = candidate.right(),
            Ordering::Equal => {
                found = Some(candidate);
                node = candidate.left();
            }
            Ordering::Greater => node = candidate.left(),
        }
    }
    found
}

/// Number of nodes on the longest root-to-leaf path, counted level by level.
pub(crate) fn height<N: Binary>(node: Option<&N>) -> usize {
    let mut level: Vec<&N> = node.into_iter().collect();
    let mut height = 0;
    while !level.is_empty() {
        height += 1;
        level = level
            .iter()
            .flat_map(|n| [n.left(), n.right()])
            .flatten()
            .collect();
    }
    height
}

pub(crate) fn count<N: Binary>(node: Option<&N>) -> usize {
    let mut count = 0;
    in_order(node, &mut |_| count += 1);
    count
}

pub(crate) fn is_sorted<N>(node: Option<&N>) -> bool
where
    N: Binary,
    N::Key: Ord,
{
    keys(node).windows(2).all(|w| w[0] <= w[1])
}
