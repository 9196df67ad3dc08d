use std::{mem, ptr::NonNull};

use crate::{
    Color, Direction, Root,
    alloc::own_back,
    node::{Node, NodePtr, NodePtrExt},
};

impl<K, V> Default for Root<K, V> {
    fn default() -> Self {
        Root::new()
    }
}

// Public
impl<K, V> Root<K, V> {
    pub(crate) const fn new() -> Self {
        Root { root: None }
    }

    pub(crate) fn root(&self) -> NodePtr<K, V> {
        self.root
    }

    pub(crate) fn take(&mut self) -> NodePtr<K, V> {
        self.root.take()
    }

    pub(crate) fn set_root(&mut self, root: NodePtr<K, V>) {
        self.root = root;
    }

    /// Links the detached red `node` in as a leaf, fixing the tree up on the
    /// way down.
    ///
    /// Every node on the search path goes through [`Self::add_rebalance`]
    /// before the walk moves past it, so by the time the leaf is attached its
    /// uncle is black and a single fixup at the leaf suffices.
    pub(crate) fn insert(&mut self, node: NonNull<Node<K, V>>)
    where
        K: Ord,
    {
        let mut current = self.root;
        let mut parent = None;
        let mut direction = Direction::Left;

        while let Some(candidate) = current {
            self.add_rebalance(current);
            parent = current;
            // SAFETY: both live; `node` is not linked yet so nobody else
            // borrows it.
            direction = if unsafe { node.as_ref().key <= candidate.as_ref().key } {
                Direction::Left
            } else {
                Direction::Right
            };
            // The fixup may have moved `candidate` but never below a node
            // that is not its ancestor: keep descending from it.
            current = current.child(direction);
        }

        let node: NodePtr<K, V> = Some(node);
        node.set_parent(parent);
        match (parent, direction) {
            (None, _) => self.root = node,
            (Some(_), Direction::Left) => parent.set_left(node),
            (Some(_), Direction::Right) => parent.set_right(node),
        }
        if parent.is_some() {
            self.add_rebalance(node);
        }
        self.root.set_color(Color::Black);
    }

    /// Unlinks `target` from the tree and hands it back.
    ///
    /// The walk from the root to `target` (and on to its successor) keeps the
    /// current node red, or its parent red so it can be made red, by applying
    /// [`Self::remove_rebalance`] at every step. The node finally unlinked is
    /// then a red leaf and no black height changes.
    ///
    /// `target` must be in the tree. Returns `None` when the walk does not
    /// reach it, leaving the colors adjusted but the tree valid.
    pub(crate) fn erase(&mut self, target: NonNull<Node<K, V>>) -> Option<Box<Node<K, V>>>
    where
        K: Ord,
    {
        let mut current = self.root;
        while let Some(candidate) = current {
            if candidate == target {
                break;
            }
            // Equal keys that are not the target: the target is the first of
            // them in order, hence further left.
            // SAFETY: both live and only read.
            let direction = if unsafe { target.as_ref().key <= candidate.as_ref().key } {
                Direction::Left
            } else {
                Direction::Right
            };
            self.remove_rebalance(current, direction);
            current = current.child(direction);
        }
        // Reached through the tree's own links from here on.
        let Some(target) = current else {
            self.root.set_color(Color::Black);
            return None;
        };

        let found = current;
        let victim = if found.left().is_some() && found.right().is_some() {
            self.remove_rebalance(found, Direction::Right);
            let mut successor = found.right();
            self.remove_rebalance(successor, Direction::Left);
            while successor.left().is_some() {
                successor = successor.left();
                self.remove_rebalance(successor, Direction::Left);
            }
            let successor = successor?;
            // SAFETY: distinct live nodes, no other borrows outstanding.
            unsafe {
                let (found, successor) = (&mut *target.as_ptr(), &mut *successor.as_ptr());
                mem::swap(&mut found.key, &mut successor.key);
                mem::swap(&mut found.value, &mut successor.value);
            }
            successor
        } else {
            // Walk toward the missing side so a lone red child is rotated up.
            let direction = if found.left().is_some() {
                Direction::Right
            } else {
                Direction::Left
            };
            self.remove_rebalance(found, direction);
            target
        };

        self.unlink(victim);
        self.root.set_color(Color::Black);
        // SAFETY: unlinked above, allocated by the collection.
        Some(unsafe { own_back(victim) })
    }
}

// Private
impl<K, V> Root<K, V> {
    /// Replaces `old` by `new` under `parent`, or at the root.
    #[inline]
    fn change_child(&mut self, old: NodePtr<K, V>, new: NodePtr<K, V>, parent: NodePtr<K, V>) {
        if parent.is_none() {
            self.root = new;
        } else if parent.left() == old {
            parent.set_left(new);
        } else {
            parent.set_right(new);
        }
    }

    /// Promotes `node.right` into the position of `node`.
    ///
    /// The pivot's left subtree becomes `node`'s right subtree. All three
    /// parent links are rewritten here.
    fn rotate_left(&mut self, node: NodePtr<K, V>) {
        let pivot = node.right();
        if pivot.is_none() {
            return;
        }
        let parent = node.parent();
        let inner = pivot.left();

        node.set_right(inner);
        inner.set_parent(node);
        pivot.set_left(node);
        pivot.set_parent(parent);
        node.set_parent(pivot);
        self.change_child(node, pivot, parent);
    }

    /// Mirror of [`Self::rotate_left`].
    fn rotate_right(&mut self, node: NodePtr<K, V>) {
        let pivot = node.left();
        if pivot.is_none() {
            return;
        }
        let parent = node.parent();
        let inner = pivot.right();

        node.set_left(inner);
        inner.set_parent(node);
        pivot.set_right(node);
        pivot.set_parent(parent);
        node.set_parent(pivot);
        self.change_child(node, pivot, parent);
    }

    /// Insertion fixup applied at `node` while descending.
    fn add_rebalance(&mut self, node: NodePtr<K, V>) {
        if node.is_none() {
            return;
        }
        let (left, right) = (node.left(), node.right());

        // Color flip: push the red pair down one level.
        if node.is_black() && left.is_red() && right.is_red() {
            node.set_color(Color::Red);
            left.set_color(Color::Black);
            right.set_color(Color::Black);
        }

        let parent = node.parent();
        if parent.is_none() {
            // Flipped the root.
            node.set_color(Color::Black);
            return;
        }
        if node.is_black() || parent.is_black() {
            return;
        }

        // Red node under a red parent. The uncle is black: the walk already
        // went through the grandparent.
        let grandparent = parent.parent();
        if grandparent.is_none() {
            return;
        }
        let parent_is_left = grandparent.left() == parent;
        let node_is_left = parent.left() == node;
        match (parent_is_left, node_is_left) {
            // Outside grandchildren: one rotation at the grandparent.
            (true, true) => {
                self.rotate_right(grandparent);
                parent.set_color(Color::Black);
            }
            (false, false) => {
                self.rotate_left(grandparent);
                parent.set_color(Color::Black);
            }
            // Inside grandchildren: straighten, then rotate.
            (true, false) => {
                self.rotate_left(parent);
                self.rotate_right(grandparent);
                node.set_color(Color::Black);
            }
            (false, true) => {
                self.rotate_right(parent);
                self.rotate_left(grandparent);
                node.set_color(Color::Black);
            }
        }
        grandparent.set_color(Color::Red);
    }

    /// Deletion fixup applied at `node` before the walk moves to its
    /// `direction` child.
    ///
    /// On entry `node` is red, the root, or has a red parent. On exit `node`
    /// is red or the child about to be entered is.
    fn remove_rebalance(&mut self, node: NodePtr<K, V>, direction: Direction) {
        if node.is_none() || node.is_red() {
            return;
        }

        let (near, far) = match direction {
            Direction::Left => (node.left(), node.right()),
            Direction::Right => (node.right(), node.left()),
        };

        // The next node is already red.
        if near.is_red() {
            return;
        }

        // Red child on the other side: rotate it above `node`.
        if far.is_red() {
            match direction {
                Direction::Left => self.rotate_left(node),
                Direction::Right => self.rotate_right(node),
            }
            node.set_color(Color::Red);
            far.set_color(Color::Black);
            return;
        }

        let parent = node.parent();
        let node_is_left = parent.left() == node;
        let sibling = if node_is_left {
            parent.right()
        } else {
            parent.left()
        };

        // Only the root has no sibling: lowering its color is free.
        if sibling.is_none() {
            node.set_color(Color::Red);
            return;
        }

        let (sibling_near, sibling_far) = if node_is_left {
            (sibling.left(), sibling.right())
        } else {
            (sibling.right(), sibling.left())
        };

        // Color flip: parent, node and sibling trade a black level.
        if sibling_near.is_black() && sibling_far.is_black() {
            parent.set_color(Color::Black);
            node.set_color(Color::Red);
            sibling.set_color(Color::Red);
            return;
        }

        if sibling_far.is_red() {
            // Outside red nephew: single rotation at the parent.
            if node_is_left {
                self.rotate_left(parent);
            } else {
                self.rotate_right(parent);
            }
            sibling.set_color(Color::Red);
            sibling_far.set_color(Color::Black);
        } else {
            // Inside red nephew: it becomes the subtree root.
            if node_is_left {
                self.rotate_right(sibling);
                self.rotate_left(parent);
            } else {
                self.rotate_left(sibling);
                self.rotate_right(parent);
            }
            sibling_near.set_color(Color::Red);
        }
        parent.set_color(Color::Black);
        node.set_color(Color::Red);
    }

    /// Splices out `node`, which has at most one child.
    fn unlink(&mut self, node: NonNull<Node<K, V>>) {
        let node: NodePtr<K, V> = Some(node);
        let parent = node.parent();
        let child = node.left().or(node.right());
        self.change_child(node, child, parent);
        child.set_parent(parent);
        if node.is_black() {
            child.set_color(Color::Black);
        }
        node.set_parent(None);
        node.set_left(None);
        node.set_right(None);
    }
}
