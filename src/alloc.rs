use std::ptr::NonNull;

use crate::node::Node;

/// Allocates a detached red node.
///
/// It leaks; hand it back with [`own_back`].
pub(crate) fn leak_alloc_node<K, V>(key: K, value: V) -> NonNull<Node<K, V>> {
    NonNull::from(Box::leak(Box::new(Node::new(key, value))))
}

/// # Safety
///
/// `node` must come from [`leak_alloc_node`], be unlinked from any tree and
/// not be owned back twice.
pub(crate) unsafe fn own_back<K, V>(node: NonNull<Node<K, V>>) -> Box<Node<K, V>> {
    unsafe { Box::from_raw(node.as_ptr()) }
}
