use std::{fmt, ptr::NonNull};

use crate::{
    Collection, InvariantViolation, RbtCollection, Root,
    alloc::{leak_alloc_node, own_back},
    node::{Node, NodePtr, NodePtrExt},
    traverse::{self, Binary},
};

impl<K, V> Drop for RbtCollection<K, V> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K, V> Default for RbtCollection<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> RbtCollection<K, V> {
    pub const fn new() -> Self {
        RbtCollection {
            root: Root::new(),
            len: 0,
        }
    }

    /// Frees every node, children before parents. Parent links are never
    /// followed.
    pub fn clear(&mut self) {
        let mut stack: Vec<NonNull<Node<K, V>>> = self.root.take().into_iter().collect();
        while let Some(&current) = stack.last() {
            // SAFETY: every pointer on the stack is live and owned by us.
            let current_ref = unsafe { &mut *current.as_ptr() };
            if let Some(left) = current_ref.left.take() {
                stack.push(left);
                continue;
            }
            if let Some(right) = current_ref.right.take() {
                stack.push(right);
                continue;
            }
            stack.pop();
            // SAFETY: both child links were cleared, nothing points down to
            // it any more.
            drop(unsafe { own_back(current) });
        }
        self.len = 0;
    }

    /// Height of the tree, 0 when empty.
    pub fn height(&self) -> usize {
        traverse::height(self.root_ref())
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn root_ref(&self) -> Option<&Node<K, V>> {
        // SAFETY: the root lives as long as self.
        self.root.root().map(|n| unsafe { n.as_ref() })
    }
}

impl<K: Ord, V> RbtCollection<K, V> {
    /// Checks ordering, the three color rules, parent links and the count.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let root = self.root.root();
        if root.is_red() {
            return Err(InvariantViolation::RedRoot);
        }
        if root.parent().is_some() {
            return Err(InvariantViolation::ParentLink);
        }
        if !traverse::is_sorted(self.root_ref()) {
            return Err(InvariantViolation::Unordered);
        }
        black_height(root)?;
        let counted = traverse::count(self.root_ref());
        if counted != self.len {
            return Err(InvariantViolation::CountMismatch {
                counted,
                recorded: self.len,
            });
        }
        Ok(())
    }

    /// `true` when the tree satisfies every red-black constraint.
    pub fn valid_rbt(&self) -> bool {
        self.validate().is_ok()
    }

    /// Alias of [`Self::valid_rbt`].
    pub fn valid(&self) -> bool {
        self.valid_rbt()
    }
}

impl<K: Ord, V> Collection for RbtCollection<K, V> {
    type Key = K;
    type Value = V;

    fn add(&mut self, key: K, value: V) {
        self.root.insert(leak_alloc_node(key, value));
        self.len += 1;
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        // Look the node up before touching any color, so a miss is a no-op.
        let target = NonNull::from(traverse::lower_bound(self.root_ref(), key)?);
        let node = self.root.erase(target)?;
        self.len -= 1;
        Some(node.value)
    }

    fn find(&self, key: &K) -> Option<&V> {
        traverse::lower_bound(self.root_ref(), key).map(|n| &n.value)
    }

    fn find_range(&self, k1: &K, k2: &K) -> Vec<&K> {
        let mut keys = Vec::new();
        traverse::in_range(self.root_ref(), k1, k2, &mut keys);
        keys
    }

    fn keys(&self) -> Vec<&K> {
        traverse::keys(self.root_ref())
    }

    fn sort(&self) -> Vec<&K> {
        self.keys()
    }

    fn size(&self) -> usize {
        self.len
    }
}

impl<K: Clone, V: Clone> Clone for RbtCollection<K, V> {
    fn clone(&self) -> Self {
        let mut tree = RbtCollection::new();
        tree.root.set_root(copy(self.root.root(), None));
        tree.len = self.len;
        tree
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for RbtCollection<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        traverse::in_order(self.root_ref(), &mut |n| {
            map.entry(n.key(), n.value());
        });
        map.finish()
    }
}

/// One line per node, pre-order, indented by depth:
/// `key [COLOR] (h=subtree height)`.
impl<K: fmt::Display, V> fmt::Display for RbtCollection<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::with_capacity(self.len);
        render(self.root_ref(), 0, &mut lines);
        for line in lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Appends the lines for `node`'s subtree and returns its height.
///
/// A node's line is reserved before its children are rendered and filled in
/// once their heights are known.
fn render<K: fmt::Display, V>(
    node: Option<&Node<K, V>>,
    depth: usize,
    lines: &mut Vec<String>,
) -> usize {
    let Some(node) = node else {
        return 0;
    };
    let slot = lines.len();
    lines.push(String::new());
    let left = render(Binary::left(node), depth + 1, lines);
    let right = render(Binary::right(node), depth + 1, lines);
    let height = 1 + left.max(right);
    lines[slot] = format!(
        "{:indent$}{} [{}] (h={height})",
        "",
        node.key,
        node.color,
        indent = depth * 2
    );
    height
}

fn copy<K: Clone, V: Clone>(source: NodePtr<K, V>, parent: NodePtr<K, V>) -> NodePtr<K, V> {
    // SAFETY: source belongs to a live tree we only read.
    let source = unsafe { source?.as_ref() };
    let node = Some(leak_alloc_node(source.key.clone(), source.value.clone()));
    node.set_color(source.color);
    node.set_parent(parent);
    node.set_left(copy(source.left, node));
    node.set_right(copy(source.right, node));
    node
}

/// Returns the black height of `node`, counting the empty leaf boundary as 1.
fn black_height<K, V>(node: NodePtr<K, V>) -> Result<usize, InvariantViolation> {
    if node.is_none() {
        return Ok(1);
    }
    let (left, right) = (node.left(), node.right());
    if node.is_red() && (left.is_red() || right.is_red()) {
        return Err(InvariantViolation::RedRed);
    }
    if (left.is_some() && left.parent() != node) || (right.is_some() && right.parent() != node) {
        return Err(InvariantViolation::ParentLink);
    }
    let lbh = black_height(left)?;
    let rbh = black_height(right)?;
    if lbh != rbh {
        return Err(InvariantViolation::BlackHeight {
            left: lbh,
            right: rbh,
        });
    }
    Ok(lbh + usize::from(node.is_black()))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Color;
    use pretty_assertions::assert_eq;
    use rand::{Rng, SeedableRng, seq::SliceRandom};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn ctor_works() {
        let tree = RbtCollection::<usize, String>::new();
        assert_eq!(None, tree.find(&42));
        assert_eq!(0, tree.size());
        assert_eq!(0, tree.height());
        assert!(tree.valid_rbt());
        assert_eq!(None, tree.root_ref().map(|n| n.color));
    }

    #[test]
    fn valid_after_every_insert() {
        let mut tree = RbtCollection::new();
        for k in [5, 3, 8, 1, 4, 7, 9] {
            tree.add(k, k.to_string());
            assert_eq!(Ok(()), tree.validate());
        }
        assert_eq!(vec![&1, &3, &4, &5, &7, &8, &9], tree.keys());
        assert_eq!(Some(Color::Black), tree.root_ref().map(|n| n.color));
    }

    #[test]
    fn ascending_inserts_keep_height_bound() {
        let mut tree = RbtCollection::new();
        for k in 1..=15 {
            tree.add(k, ());
            assert!(tree.valid_rbt());
        }
        // 2 * log2(16)
        assert!(tree.height() <= 8);
        assert_eq!((1..=15).collect::<Vec<_>>(), tree.keys().into_iter().copied().collect::<Vec<_>>());
    }

    #[test]
    fn contains_many() {
        let mut tree = RbtCollection::<usize, String>::new();
        tree.add(42, "forty two".to_string());
        tree.add(0, "zero".to_string());
        tree.add(100, "hundo".to_string());
        assert_eq!(3, tree.size());

        assert_eq!(Some(&"forty two".to_string()), tree.find(&42));
        assert_eq!(Some(&"zero".to_string()), tree.find(&0));
        assert_eq!(Some(&"hundo".to_string()), tree.find(&100));
        assert_eq!(None, tree.find(&1));
        assert_eq!(None, tree.find(&1000));
    }

    #[test]
    fn find_range() {
        let mut tree = RbtCollection::new();
        for k in (0..100).step_by(5) {
            tree.add(k, ());
        }
        assert_eq!(vec![&10, &15, &20], tree.find_range(&7, &22));
        assert_eq!(vec![&0], tree.find_range(&0, &0));
        assert_eq!(vec![&95], tree.find_range(&95, &1000));
        assert!(tree.find_range(&96, &99).is_empty());
        assert!(tree.find_range(&50, &10).is_empty());
    }

    #[test]
    fn remove_root_until_empty() {
        let mut tree = RbtCollection::new();
        for k in 1..=31 {
            tree.add(k, k);
        }
        let mut expected = 31;
        while let Some(root) = tree.root_ref().map(|n| n.key) {
            assert_eq!(Some(root), tree.remove(&root));
            expected -= 1;
            assert_eq!(expected, tree.size());
            assert_eq!(Ok(()), tree.validate());
        }
        assert_eq!(0, tree.size());
        assert_eq!(0, tree.height());
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut tree = RbtCollection::new();
        assert_eq!(None, tree.remove(&1));

        for k in [10, 20, 30, 40, 50] {
            tree.add(k, ());
        }
        let before = format!("{tree}");
        assert_eq!(None, tree.remove(&25));
        assert_eq!(None, tree.remove(&0));
        assert_eq!(None, tree.remove(&99));
        assert_eq!(5, tree.size());
        // Not even a color moved.
        assert_eq!(before, format!("{tree}"));
        assert!(tree.valid_rbt());
    }

    #[test]
    fn remove_every_key_in_random_order() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut keys: Vec<u32> = (0..500).collect();
        keys.shuffle(&mut rng);
        let mut tree = RbtCollection::new();
        for k in &keys {
            tree.add(*k, *k * 2);
        }
        keys.shuffle(&mut rng);
        for (i, k) in keys.iter().enumerate() {
            assert_eq!(Some(*k * 2), tree.remove(k));
            assert_eq!(None, tree.find(k));
            assert_eq!(keys.len() - i - 1, tree.size());
            assert_eq!(Ok(()), tree.validate());
        }
    }

    #[test]
    fn duplicates_shadow_then_reappear() {
        let mut tree = RbtCollection::new();
        for (i, k) in [4, 4, 2, 4, 6, 4].into_iter().enumerate() {
            tree.add(k, i);
            assert!(tree.valid_rbt());
        }
        assert_eq!(vec![&2, &4, &4, &4, &4, &6], tree.keys());
        assert_eq!(Some(&5), tree.find(&4));
        for expected in [5, 3, 1, 0] {
            assert_eq!(Some(expected), tree.remove(&4));
            assert!(tree.valid_rbt());
        }
        assert_eq!(None, tree.remove(&4));
        assert_eq!(vec![&2, &6], tree.keys());
    }

    #[test]
    fn random_workload() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
        let mut tree = RbtCollection::new();
        let mut model: Vec<(u16, u32)> = Vec::new();
        for step in 0..3000u32 {
            let key = rng.random_range(0..256u16);
            if rng.random_bool(0.55) {
                tree.add(key, step);
                model.push((key, step));
            } else {
                // The most recent entry for the key goes.
                let expected = model
                    .iter()
                    .rposition(|(k, _)| *k == key)
                    .map(|i| model.remove(i).1);
                assert_eq!(expected, tree.remove(&key));
            }
            let latest = model.iter().rev().find(|(k, _)| *k == key).map(|(_, v)| v);
            assert_eq!(latest, tree.find(&key));
            assert_eq!(model.len(), tree.size());
        }
        assert_eq!(Ok(()), tree.validate());
    }

    #[test]
    fn clone_keeps_colors_and_parents() {
        let mut tree = RbtCollection::new();
        for k in 0..50 {
            tree.add(k, k.to_string());
        }
        let mut copy = tree.clone();
        assert_eq!(Ok(()), copy.validate());
        assert_eq!(format!("{tree}"), format!("{copy}"));

        copy.remove(&10);
        copy.add(100, "hundred".to_string());
        assert!(copy.valid_rbt());
        assert_eq!(Some(&"10".to_string()), tree.find(&10));
        assert_eq!(None, tree.find(&100));
    }

    #[test]
    fn dump_format() {
        let mut tree = RbtCollection::new();
        for k in [2, 1, 3, 4] {
            tree.add(k, ());
        }
        let expected = "\
2 [BLACK] (h=3)
  1 [BLACK] (h=1)
  3 [BLACK] (h=2)
    4 [RED] (h=1)
";
        assert_eq!(expected, format!("{tree}"));
    }

    #[test]
    fn dump_large_tree() {
        let tree: RbtCollection<_, _> = (0..10_000).map(|k| (k, ())).collect();
        let dump = tree.to_string();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(10_000, lines.len());
        assert!(lines[0].ends_with(&format!("(h={})", tree.height())));
        // Pre-order ends on a leaf.
        assert!(lines[9_999].ends_with("(h=1)"));
    }

    #[test]
    fn debug_is_map_like() {
        let tree: RbtCollection<_, _> = [(2, 'b'), (1, 'a'), (2, 'c')].into_iter().collect();
        assert_eq!("{1: 'a', 2: 'c', 2: 'b'}", format!("{tree:?}"));
    }

    #[test]
    fn validate_reports_broken_colors() {
        let mut tree = RbtCollection::new();
        for k in [2, 1, 3] {
            tree.add(k, ());
        }
        tree.root.root().set_color(Color::Red);
        assert_eq!(Err(InvariantViolation::RedRoot), tree.validate());

        tree.root.root().set_color(Color::Black);
        tree.root.root().left().set_color(Color::Black);
        assert_eq!(
            Err(InvariantViolation::BlackHeight { left: 2, right: 1 }),
            tree.validate()
        );
        assert!(!tree.valid());
    }

    #[test]
    fn clear_then_reuse() {
        let mut tree = RbtCollection::new();
        for k in 0..20 {
            tree.add(k, vec![k; 3]);
        }
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(None, tree.find(&3));
        tree.add(3, vec![]);
        assert_eq!(1, tree.len());
        assert!(tree.valid_rbt());
    }
}
