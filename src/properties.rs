//! Every backing checked against a plain `Vec` multimap.

use quickcheck::{Arbitrary, Gen, TestResult};
use quickcheck_macros::quickcheck;

use crate::{
    ArrayCollection, AvlCollection, BstCollection, Collection, HashCollection, RbtCollection,
    SortedArrayCollection,
};

#[derive(Clone, Debug)]
enum Op {
    Add(u8, u16),
    Remove(u8),
    Find(u8),
    Range(u8, u8),
}

impl Arbitrary for Op {
    fn arbitrary(g: &mut Gen) -> Self {
        // Few distinct keys, so duplicates and hits are common.
        let key = |g: &mut Gen| u8::arbitrary(g) % 24;
        match u8::arbitrary(g) % 8 {
            0..=3 => Op::Add(key(g), u16::arbitrary(g)),
            4 | 5 => Op::Remove(key(g)),
            6 => Op::Find(key(g)),
            _ => Op::Range(key(g), key(g)),
        }
    }
}

/// Pairs in insertion order; the last match for a key is its newest entry.
#[derive(Default)]
struct Model(Vec<(u8, u16)>);

impl Model {
    fn find(&self, key: u8) -> Option<u16> {
        self.0.iter().rev().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    fn remove(&mut self, key: u8) -> Option<u16> {
        let index = self.0.iter().rposition(|(k, _)| *k == key)?;
        Some(self.0.remove(index).1)
    }

    fn sorted(&self) -> Vec<u8> {
        let mut keys: Vec<u8> = self.0.iter().map(|(k, _)| *k).collect();
        keys.sort();
        keys
    }

    fn range(&self, k1: u8, k2: u8) -> Vec<u8> {
        self.sorted()
            .into_iter()
            .filter(|k| k1 <= *k && *k <= k2)
            .collect()
    }
}

fn owned(keys: Vec<&u8>) -> Vec<u8> {
    keys.into_iter().copied().collect()
}

/// Replays `ops` on `collection` and the model, comparing after every step.
fn agrees<C>(mut collection: C, ops: &[Op], valid: impl Fn(&C) -> bool) -> bool
where
    C: Collection<Key = u8, Value = u16>,
{
    let mut model = Model::default();
    for op in ops {
        let same = match *op {
            Op::Add(k, v) => {
                collection.add(k, v);
                model.0.push((k, v));
                true
            }
            Op::Remove(k) => collection.remove(&k) == model.remove(k),
            Op::Find(k) => collection.find(&k).copied() == model.find(k),
            Op::Range(k1, k2) => owned(collection.find_range(&k1, &k2)) == model.range(k1, k2),
        };
        if !same
            || !valid(&collection)
            || collection.size() != model.0.len()
            || collection.is_empty() != model.0.is_empty()
            || owned(collection.sort()) != model.sorted()
        {
            return false;
        }
    }
    true
}

#[quickcheck]
fn avl_agrees_with_model(ops: Vec<Op>) -> bool {
    agrees(AvlCollection::new(), &ops, |tree| tree.validate().is_ok())
}

#[quickcheck]
fn rbt_agrees_with_model(ops: Vec<Op>) -> bool {
    agrees(RbtCollection::new(), &ops, |tree| tree.validate().is_ok())
}

#[quickcheck]
fn bst_agrees_with_model(ops: Vec<Op>) -> bool {
    agrees(BstCollection::new(), &ops, |tree| tree.validate().is_ok())
}

#[quickcheck]
fn array_agrees_with_model(ops: Vec<Op>) -> bool {
    agrees(ArrayCollection::new(), &ops, |_| true)
}

#[quickcheck]
fn sorted_array_agrees_with_model(ops: Vec<Op>) -> bool {
    agrees(SortedArrayCollection::new(), &ops, |_| true)
}

#[quickcheck]
fn hash_agrees_with_model(ops: Vec<Op>) -> bool {
    agrees(HashCollection::with_capacity_and_load_factor(2, 0.75), &ops, |_| true)
}

#[quickcheck]
fn trees_stay_shallow(keys: Vec<u16>) -> bool {
    let avl: AvlCollection<_, _> = keys.iter().map(|k| (*k, ())).collect();
    let rbt: RbtCollection<_, _> = keys.iter().map(|k| (*k, ())).collect();
    let bound = ((keys.len() + 1) as f64).log2();
    avl.height() as f64 <= 1.45 * (bound + 1.0) && rbt.height() as f64 <= 2.0 * bound + 1.0
}

#[quickcheck]
fn removing_a_missing_key_changes_nothing(keys: Vec<u8>, missing: u8) -> TestResult {
    if keys.contains(&missing) {
        return TestResult::discard();
    }
    let mut rbt: RbtCollection<_, _> = keys.iter().map(|k| (*k, *k)).collect();
    let mut avl: AvlCollection<_, _> = keys.iter().map(|k| (*k, *k)).collect();
    let before = (rbt.to_string(), avl.height());

    let unchanged = rbt.remove(&missing).is_none()
        && avl.remove(&missing).is_none()
        && before == (rbt.to_string(), avl.height())
        && rbt.size() == keys.len()
        && avl.size() == keys.len();
    TestResult::from_bool(unchanged)
}
