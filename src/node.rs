use std::ptr::NonNull;

use crate::{Color, Direction, traverse::Binary};

pub(crate) type NodePtr<K, V> = Option<NonNull<Node<K, V>>>;

/// A red-black tree node.
///
/// `left` and `right` own their subtrees; `parent` only observes.
pub(crate) struct Node<K, V> {
    pub(crate) parent: NodePtr<K, V>,
    pub(crate) left: NodePtr<K, V>,
    pub(crate) right: NodePtr<K, V>,
    pub(crate) color: Color,
    pub(crate) key: K,
    pub(crate) value: V,
}

impl<K, V> Node<K, V> {
    /// A detached red node.
    pub(crate) fn new(key: K, value: V) -> Self {
        Node {
            parent: None,
            left: None,
            right: None,
            color: Color::Red,
            key,
            value,
        }
    }
}

/// Pointer-level accessors so the rebalancing code reads like the textbook.
///
/// An absent node is black and has no relatives; setters on it do nothing.
/// Every method dereferences a live node of the tree being worked on.
pub(crate) trait NodePtrExt: Sized {
    type Key;
    type Value;

    fn is_black(self) -> bool;
    fn is_red(self) -> bool;
    fn left(self) -> NodePtr<Self::Key, Self::Value>;
    fn right(self) -> NodePtr<Self::Key, Self::Value>;
    fn child(self, direction: Direction) -> NodePtr<Self::Key, Self::Value>;
    fn parent(self) -> NodePtr<Self::Key, Self::Value>;
    fn set_left(self, left: NodePtr<Self::Key, Self::Value>);
    fn set_right(self, right: NodePtr<Self::Key, Self::Value>);
    fn set_parent(self, parent: NodePtr<Self::Key, Self::Value>);
    fn set_color(self, color: Color);
}

impl<K, V> NodePtrExt for NodePtr<K, V> {
    type Key = K;
    type Value = V;

    #[inline(always)]
    fn is_black(self) -> bool {
        self.is_none_or(|v| unsafe { v.as_ref() }.color == Color::Black)
    }

    #[inline(always)]
    fn is_red(self) -> bool {
        !self.is_black()
    }

    #[inline(always)]
    fn left(self) -> NodePtr<K, V> {
        self.and_then(|v| unsafe { v.as_ref() }.left)
    }

    #[inline(always)]
    fn right(self) -> NodePtr<K, V> {
        self.and_then(|v| unsafe { v.as_ref() }.right)
    }

    #[inline(always)]
    fn child(self, direction: Direction) -> NodePtr<K, V> {
        match direction {
            Direction::Left => self.left(),
            Direction::Right => self.right(),
        }
    }

    #[inline(always)]
    fn parent(self) -> NodePtr<K, V> {
        self.and_then(|v| unsafe { v.as_ref() }.parent)
    }

    #[inline(always)]
    fn set_left(self, left: NodePtr<K, V>) {
        if let Some(mut node) = self {
            unsafe { node.as_mut() }.left = left;
        }
    }

    #[inline(always)]
    fn set_right(self, right: NodePtr<K, V>) {
        if let Some(mut node) = self {
            unsafe { node.as_mut() }.right = right;
        }
    }

    #[inline(always)]
    fn set_parent(self, parent: NodePtr<K, V>) {
        if let Some(mut node) = self {
            unsafe { node.as_mut() }.parent = parent;
        }
    }

    #[inline(always)]
    fn set_color(self, color: Color) {
        if let Some(mut node) = self {
            unsafe { node.as_mut() }.color = color;
        }
    }
}

impl<K, V> Binary for Node<K, V> {
    type Key = K;
    type Value = V;

    fn key(&self) -> &K {
        &self.key
    }

    fn value(&self) -> &V {
        &self.value
    }

    fn left(&self) -> Option<&Self> {
        // SAFETY: children of a live node are live for as long as it is.
        self.left.map(|n| unsafe { n.as_ref() })
    }

    fn right(&self) -> Option<&Self> {
        // SAFETY: see left.
        self.right.map(|n| unsafe { n.as_ref() })
    }
}
