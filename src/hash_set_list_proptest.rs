#![cfg(test)]

// Property tests for HashSetList kept inside the crate so they can check
// bucket-level invariants that the public API does not expose.

use crate::hash::{Fnv1a, HashFunc, KeyEq, NativeEq};
use crate::hash_set_list::HashSetList;
use hashbrown::HashSet;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::BTreeSet;
use std::fmt;

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Every key hashes to 1: one bucket holds everything, so each operation
// walks the head cell and the whole collision list.
#[derive(Clone, Copy, Debug, Default)]
struct ConstHash;
impl<Q: ?Sized> HashFunc<Q> for ConstHash {
    fn hash(&self, _key: &Q) -> u64 {
        1
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize),
    FindOrInsert(usize),
    Remove(usize),
    Take(usize),
    Find(usize),
    Contains(String),
    Rehash(usize),
    Retain(usize),
    Clear,
    CloneThenMutate(usize),
    Iterate,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (usize, Vec<String>, Vec<OpI>)> {
    (1usize..=6, proptest::collection::vec("[a-z]{0,4}", 1..=10)).prop_flat_map(
        |(capacity, pool)| {
            let idxs: Vec<usize> = (0..pool.len()).collect();
            let idx = proptest::sample::select(idxs);
            let contains_pool = proptest::sample::select(pool.clone());
            let op = prop_oneof![
                4 => idx.clone().prop_map(OpI::Insert),
                1 => idx.clone().prop_map(OpI::FindOrInsert),
                2 => idx.clone().prop_map(OpI::Remove),
                1 => idx.clone().prop_map(OpI::Take),
                1 => idx.clone().prop_map(OpI::Find),
                1 => prop_oneof![contains_pool, "[a-z]{0,4}"].prop_map(OpI::Contains),
                1 => (0usize..24).prop_map(OpI::Rehash),
                1 => (1usize..4).prop_map(OpI::Retain),
                1 => Just(OpI::Clear),
                1 => idx.clone().prop_map(OpI::CloneThenMutate),
                1 => Just(OpI::Iterate),
            ];
            proptest::collection::vec(op, 1..80)
                .prop_map(move |ops| (capacity, pool.clone(), ops))
        },
    )
}

// Shared driver: runs `ops` against `sut` and a hashbrown model, checking
// parity after every step.
//
// Invariants exercised:
// - Uniqueness: insert reports true iff the key was absent.
// - Insert/remove inverse and size accounting against the model.
// - rehash below len or on an empty set leaves the bucket count alone;
//   otherwise it adopts the new count and keeps membership.
// - Clone independence: mutating a clone never touches the original.
// - Iteration visits each live key exactly once, forward and backward.
fn run_ops<H, E>(
    mut sut: HashSetList<Key, H, E>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    H: HashFunc<Key> + HashFunc<str> + Clone,
    E: KeyEq<Key> + KeyEq<str> + Clone,
{
    let mut model: HashSet<Key> = HashSet::new();

    for op in ops {
        match op {
            OpI::Insert(i) => {
                let k = key_from(pool, i);
                let already = model.contains(&k);
                prop_assert_eq!(sut.insert(k.clone()), !already);
                model.insert(k);
            }
            OpI::FindOrInsert(i) => {
                let k = key_from(pool, i);
                let stored = sut.find_or_insert(k.clone());
                prop_assert_eq!(&*stored, &k);
                model.insert(k);
            }
            OpI::Remove(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.remove(&k), model.remove(&k));
                prop_assert!(!sut.contains(&k));
            }
            OpI::Take(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.take(k.0.as_str()), model.take(&k));
            }
            OpI::Find(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.find(&k), model.get(&k));
            }
            OpI::Contains(s) => {
                let has = sut.contains(s.as_str());
                let has_model = model.iter().any(|k| k.0 == s);
                prop_assert_eq!(has, has_model);
            }
            OpI::Rehash(n) => {
                let before = sut.bucket_count();
                let len = sut.len();
                sut.rehash(n);
                if len == 0 || n < len {
                    prop_assert_eq!(sut.bucket_count(), before);
                } else {
                    prop_assert_eq!(sut.bucket_count(), n);
                }
                for k in &model {
                    prop_assert!(sut.contains(k));
                }
            }
            OpI::Retain(m) => {
                sut.retain(|k| k.0.len() % m == 0);
                model.retain(|k| k.0.len() % m == 0);
            }
            OpI::Clear => {
                sut.clear();
                model.clear();
            }
            OpI::CloneThenMutate(i) => {
                let k = key_from(pool, i);
                let mut copy = sut.clone();
                if !copy.remove(&k) {
                    copy.insert(k.clone());
                }
                prop_assert_eq!(sut.contains(&k), model.contains(&k));
                prop_assert_ne!(copy.contains(&k), sut.contains(&k));
            }
            OpI::Iterate => {
                let forward: Vec<Key> = sut.iter().cloned().collect();
                let mut backward: Vec<Key> = sut.iter().rev().cloned().collect();
                backward.reverse();
                prop_assert_eq!(&forward, &backward);
                let s_keys: BTreeSet<Key> = forward.into_iter().collect();
                let m_keys: BTreeSet<Key> = model.iter().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
            }
        }

        // Post-conditions after each op: size parity and per-bucket sums.
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        let bucket_sum: usize = sut.buckets().iter().map(|b| b.len()).sum();
        prop_assert_eq!(bucket_sum, model.len());
        prop_assert_eq!(sut.iter().count(), model.len());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((capacity, pool, ops) in arb_scenario()) {
        let sut: HashSetList<Key, Fnv1a, NativeEq> = HashSetList::new(capacity);
        run_ops(sut, &pool, ops)?;
    }
}

// Same invariants under worst-case collisions: a single hash value keeps
// every key in one bucket regardless of capacity.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((capacity, pool, ops) in arb_scenario()) {
        let sut: HashSetList<Key, ConstHash, NativeEq> =
            HashSetList::with_hasher(capacity, ConstHash);
        run_ops(sut, &pool, ops)?;
    }
}
