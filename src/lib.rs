//! Ordered key-value collections.
//!
//! Every backing implements [`Collection`]: insertion, removal, point and
//! range lookup, key enumeration and size. The two interesting ones are the
//! self-balancing trees:
//!
//! - [`AvlCollection`], height balanced, rebalanced bottom-up on the way out
//!   of a recursive insert or delete.
//! - [`RbtCollection`], color balanced, rebalanced top-down while descending
//!   for both insertion and deletion.
//!
//! The peers ([`ArrayCollection`], [`SortedArrayCollection`],
//! [`BstCollection`], [`HashCollection`]) share the same surface so they can
//! be swapped for one another.
//!
//! Equal keys are not merged. A new entry is ordered before every equal
//! entry, [`Collection::find`] returns the most recent one and
//! [`Collection::remove`] takes it out, exposing the previous value.
//!
//! ```
//! use equilibre::{Collection, RbtCollection};
//!
//! let mut tree = RbtCollection::new();
//! for k in [5, 3, 8, 1, 4, 7, 9] {
//!     tree.add(k, k * 10);
//! }
//! assert_eq!(tree.find(&4), Some(&40));
//! assert_eq!(tree.find_range(&3, &7), [&3, &4, &5, &7]);
//! assert!(tree.valid_rbt());
//! ```
mod alloc;
mod array;
mod avl;
mod bst;
mod error;
mod hash;
mod iter;
mod node;
#[cfg(test)]
mod properties;
mod rbt;
mod root;
pub mod sort;
mod sorted;
mod traverse;

use std::fmt;

pub use array::ArrayCollection;
pub use avl::AvlCollection;
pub use bst::BstCollection;
pub use error::InvariantViolation;
pub use hash::HashCollection;
pub use sort::SortAlgorithm;
pub use sorted::SortedArrayCollection;

use node::NodePtr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => f.write_str("RED"),
            Color::Black => f.write_str("BLACK"),
        }
    }
}

/// Which child link a descent follows next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Left,
    Right,
}

/// The operations every backing provides.
///
/// Lookups never mutate. A miss is reported through `None`, never a panic.
pub trait Collection {
    type Key;
    type Value;

    /// Adds a pair. An existing equal key is kept; the new entry shadows it.
    fn add(&mut self, key: Self::Key, value: Self::Value);

    /// Removes the most recent entry for `key` and returns its value.
    ///
    /// Returns `None` and leaves the collection untouched when `key` is absent.
    fn remove(&mut self, key: &Self::Key) -> Option<Self::Value>;

    /// Returns the value of the most recent entry for `key`.
    fn find(&self, key: &Self::Key) -> Option<&Self::Value>;

    /// Returns every key `k` with `k1 <= k <= k2`, in ascending order.
    fn find_range(&self, k1: &Self::Key, k2: &Self::Key) -> Vec<&Self::Key>;

    /// Returns every key. Ordered backings list them ascending, the others in
    /// their storage order.
    fn keys(&self) -> Vec<&Self::Key>;

    /// Returns every key in ascending order.
    fn sort(&self) -> Vec<&Self::Key>;

    /// Number of stored pairs.
    fn size(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

/// The root link of a red-black tree and the machinery that rebalances it.
///
/// It does not own a count; [`RbtCollection`] does the bookkeeping.
pub(crate) struct Root<K, V> {
    root: NodePtr<K, V>,
}

/// An ordered collection backed by a red-black tree.
///
/// Nodes keep a non-owning link to their parent for rotations and the
/// deletion walk. Ownership flows strictly from the root down.
pub struct RbtCollection<K, V> {
    root: Root<K, V>,
    len: usize,
}
