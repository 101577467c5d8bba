//! Bucket: one inline head slot plus an overflow collision list.
//!
//! The first key hashed to a bucket lives in `head` and never touches the
//! collision list. Invariant: `head.is_none()` implies `collisions` is
//! empty, so a bucket of `n > 0` entries holds `n - 1` overflow nodes.

use crate::hash::KeyEq;
use core::borrow::Borrow;
use core::iter::Chain;
use std::collections::vec_deque::{self, VecDeque};

/// A stored key together with its full (unreduced) hash.
#[derive(Clone, Debug)]
pub(crate) struct Node<K> {
    pub(crate) hash: u64,
    pub(crate) key: K,
}

impl<K> Node<K> {
    #[inline]
    fn matches<Q, E>(&self, hash: u64, key: &Q, eq: &E) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        E: KeyEq<Q>,
    {
        // Hash comparison first: it rejects most mismatches without calling eq.
        self.hash == hash && eq.eq(self.key.borrow(), key)
    }
}

/// Location of an entry inside one bucket.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) enum Slot {
    Head,
    Overflow(usize),
}

#[derive(Clone, Debug)]
pub(crate) struct Bucket<K> {
    head: Option<Node<K>>,
    collisions: VecDeque<Node<K>>,
}

impl<K> Default for Bucket<K> {
    fn default() -> Self {
        Self {
            head: None,
            collisions: VecDeque::new(),
        }
    }
}

impl<K> Bucket<K> {
    pub(crate) fn len(&self) -> usize {
        debug_assert!(self.head.is_some() || self.collisions.is_empty());
        match self.head {
            Some(_) => 1 + self.collisions.len(),
            None => 0,
        }
    }

    fn position<Q, E>(&self, hash: u64, key: &Q, eq: &E) -> Option<Slot>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        E: KeyEq<Q>,
    {
        let head = self.head.as_ref()?;
        if head.matches(hash, key, eq) {
            return Some(Slot::Head);
        }
        self.collisions
            .iter()
            .position(|n| n.matches(hash, key, eq))
            .map(Slot::Overflow)
    }

    pub(crate) fn contains<Q, E>(&self, hash: u64, key: &Q, eq: &E) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        E: KeyEq<Q>,
    {
        self.position(hash, key, eq).is_some()
    }

    pub(crate) fn find<Q, E>(&self, hash: u64, key: &Q, eq: &E) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        E: KeyEq<Q>,
    {
        let slot = self.position(hash, key, eq)?;
        self.get(slot)
    }

    pub(crate) fn find_mut<Q, E>(&mut self, hash: u64, key: &Q, eq: &E) -> Option<&mut K>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        E: KeyEq<Q>,
    {
        let slot = self.position(hash, key, eq)?;
        self.get_mut(slot)
    }

    /// Returns the stored entry equal to `key`, inserting `key` first if
    /// absent. The flag reports whether an insertion happened.
    pub(crate) fn find_or_insert<E>(&mut self, hash: u64, key: K, eq: &E) -> (&mut K, bool)
    where
        E: KeyEq<K>,
    {
        match self.position(hash, &key, eq) {
            // Head matched, so the head is occupied and `key` is dropped.
            Some(Slot::Head) => (&mut self.head.get_or_insert(Node { hash, key }).key, false),
            Some(Slot::Overflow(i)) => (&mut self.collisions[i].key, false),
            None => (self.push_unique(Node { hash, key }), true),
        }
    }

    /// Head-first insert. Returns false and drops `key` if an equal entry exists.
    pub(crate) fn insert<E>(&mut self, hash: u64, key: K, eq: &E) -> bool
    where
        E: KeyEq<K>,
    {
        if self.head.is_some() && self.contains(hash, &key, eq) {
            return false;
        }
        self.push_unique(Node { hash, key });
        true
    }

    /// Appends a node the caller knows is not present.
    pub(crate) fn push_unique(&mut self, node: Node<K>) -> &mut K {
        if self.head.is_none() {
            return &mut self.head.insert(node).key;
        }
        let idx = self.collisions.len();
        self.collisions.push_back(node);
        &mut self.collisions[idx].key
    }

    pub(crate) fn remove<Q, E>(&mut self, hash: u64, key: &Q, eq: &E) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        E: KeyEq<Q>,
    {
        self.take(hash, key, eq).is_some()
    }

    /// Removes the entry equal to `key` and returns it.
    ///
    /// Removing the head promotes the front of the collision list into the
    /// head slot; removing an overflow node keeps the order of the rest.
    pub(crate) fn take<Q, E>(&mut self, hash: u64, key: &Q, eq: &E) -> Option<K>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        E: KeyEq<Q>,
    {
        match self.position(hash, key, eq)? {
            Slot::Head => {
                let promoted = self.collisions.pop_front();
                let old = core::mem::replace(&mut self.head, promoted)?;
                Some(old.key)
            }
            Slot::Overflow(i) => self.collisions.remove(i).map(|n| n.key),
        }
    }

    /// Keeps entries for which `f` returns true, preserving their order.
    /// Returns the number of entries dropped.
    ///
    /// Filters in place. If `f` panics, no entry of this bucket has been
    /// dropped yet and the head/list invariant still holds.
    pub(crate) fn retain<F>(&mut self, f: &mut F) -> usize
    where
        F: FnMut(&K) -> bool,
    {
        let keep_head = match &self.head {
            Some(head) => f(&head.key),
            None => return 0,
        };
        let before = self.len();
        self.collisions.retain(|n| f(&n.key));
        if !keep_head {
            self.head = self.collisions.pop_front();
        }
        before - self.len()
    }

    pub(crate) fn clear(&mut self) {
        self.head = None;
        self.collisions.clear();
    }

    pub(crate) fn get(&self, slot: Slot) -> Option<&K> {
        match slot {
            Slot::Head => self.head.as_ref().map(|n| &n.key),
            Slot::Overflow(i) => self.collisions.get(i).map(|n| &n.key),
        }
    }

    pub(crate) fn get_mut(&mut self, slot: Slot) -> Option<&mut K> {
        match slot {
            Slot::Head => self.head.as_mut().map(|n| &mut n.key),
            Slot::Overflow(i) => self.collisions.get_mut(i).map(|n| &mut n.key),
        }
    }

    pub(crate) fn first_slot(&self) -> Option<Slot> {
        self.head.as_ref().map(|_| Slot::Head)
    }

    pub(crate) fn last_slot(&self) -> Option<Slot> {
        if self.head.is_none() {
            return None;
        }
        match self.collisions.len() {
            0 => Some(Slot::Head),
            n => Some(Slot::Overflow(n - 1)),
        }
    }

    pub(crate) fn next_slot(&self, slot: Slot) -> Option<Slot> {
        let next = match slot {
            Slot::Head => 0,
            Slot::Overflow(i) => i + 1,
        };
        (next < self.collisions.len()).then_some(Slot::Overflow(next))
    }

    pub(crate) fn prev_slot(&self, slot: Slot) -> Option<Slot> {
        match slot {
            Slot::Head => None,
            Slot::Overflow(0) => self.first_slot(),
            Slot::Overflow(i) => Some(Slot::Overflow(i - 1)),
        }
    }

    /// Keys in bucket order: head first, then the collision list.
    #[cfg(test)]
    pub(crate) fn keys(&self) -> impl DoubleEndedIterator<Item = &K> {
        self.head
            .iter()
            .chain(self.collisions.iter())
            .map(|n| &n.key)
    }
}

impl<K> IntoIterator for Bucket<K> {
    type Item = Node<K>;
    type IntoIter = Chain<core::option::IntoIter<Node<K>>, vec_deque::IntoIter<Node<K>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.head.into_iter().chain(self.collisions)
    }
}

impl<'a, K> IntoIterator for &'a mut Bucket<K> {
    type Item = &'a mut Node<K>;
    type IntoIter = Chain<core::option::IterMut<'a, Node<K>>, vec_deque::IterMut<'a, Node<K>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.head.iter_mut().chain(self.collisions.iter_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{FnEq, NativeEq};

    fn keys_of(b: &Bucket<&'static str>) -> Vec<&'static str> {
        b.keys().copied().collect()
    }

    /// The first insert fills the head; later inserts append in order.
    #[test]
    fn insert_fills_head_then_collision_list() {
        let mut b: Bucket<&'static str> = Bucket::default();
        assert_eq!(b.len(), 0);
        assert!(b.insert(1, "a", &NativeEq));
        assert_eq!(b.len(), 1);
        assert!(b.collisions.is_empty());
        assert!(b.insert(2, "b", &NativeEq));
        assert!(b.insert(3, "c", &NativeEq));
        assert_eq!(b.len(), 3);
        assert_eq!(b.collisions.len(), 2);
        assert_eq!(keys_of(&b), ["a", "b", "c"]);
    }

    /// Duplicate inserts are rejected and leave the bucket unchanged.
    #[test]
    fn duplicate_insert_rejected() {
        let mut b: Bucket<String> = Bucket::default();
        assert!(b.insert(7, "k".to_string(), &NativeEq));
        assert!(!b.insert(7, "k".to_string(), &NativeEq));
        assert_eq!(b.len(), 1);
        // Same key under a different cached hash is a different entry.
        assert!(b.insert(8, "k".to_string(), &NativeEq));
        assert_eq!(b.len(), 2);
    }

    /// A matching key with a mismatched hash must never reach `eq`.
    #[test]
    fn hash_mismatch_skips_equality_call() {
        let calls = core::cell::Cell::new(0);
        let eq = FnEq(|a: &&str, b: &&str| {
            calls.set(calls.get() + 1);
            a == b
        });
        let mut b: Bucket<&'static str> = Bucket::default();
        b.insert(1, "a", &eq);
        b.insert(2, "b", &eq);
        calls.set(0);
        assert!(!b.contains(3, &"a", &eq));
        assert_eq!(calls.get(), 0);
        assert!(b.contains(2, &"b", &eq));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn find_and_find_mut() {
        let mut b: Bucket<(u32, u32)> = Bucket::default();
        let eq = FnEq(|a: &(u32, u32), b: &(u32, u32)| a.0 == b.0);
        b.insert(1, (1, 10), &eq);
        b.insert(2, (2, 20), &eq);
        assert_eq!(b.find(2, &(2, 0), &eq), Some(&(2, 20)));
        assert_eq!(b.find(9, &(9, 0), &eq), None);
        if let Some(k) = b.find_mut(2, &(2, 0), &eq) {
            k.1 = 21;
        }
        assert_eq!(b.find(2, &(2, 0), &eq), Some(&(2, 21)));
    }

    /// find_or_insert returns the existing entry or appends a new one.
    #[test]
    fn find_or_insert_reports_insertion() {
        let mut b: Bucket<String> = Bucket::default();
        let (k, inserted) = b.find_or_insert(5, "x".to_string(), &NativeEq);
        assert_eq!(k.as_str(), "x");
        assert!(inserted);
        let (_, inserted) = b.find_or_insert(5, "x".to_string(), &NativeEq);
        assert!(!inserted);
        let (k, inserted) = b.find_or_insert(6, "y".to_string(), &NativeEq);
        assert_eq!(k.as_str(), "y");
        assert!(inserted);
        assert_eq!(b.len(), 2);
    }

    /// A hit returns the stored key, not the argument, in either slot kind.
    #[test]
    fn find_or_insert_returns_stored_key() {
        let eq = FnEq(|a: &String, b: &String| a.eq_ignore_ascii_case(b));
        let mut b: Bucket<String> = Bucket::default();
        b.insert(7, "Head".to_string(), &eq);
        b.insert(7, "Tail".to_string(), &eq);
        let (k, inserted) = b.find_or_insert(7, "HEAD".to_string(), &eq);
        assert_eq!(k.as_str(), "Head");
        assert!(!inserted);
        let (k, inserted) = b.find_or_insert(7, "tail".to_string(), &eq);
        assert_eq!(k.as_str(), "Tail");
        assert!(!inserted);
        assert_eq!(b.len(), 2);
    }

    /// Removing the head promotes the first overflow node.
    #[test]
    fn remove_head_promotes_front_of_list() {
        let mut b: Bucket<&'static str> = Bucket::default();
        for (h, k) in [(1, "a"), (2, "b"), (3, "c")] {
            b.insert(h, k, &NativeEq);
        }
        assert!(b.remove(1, &"a", &NativeEq));
        assert_eq!(keys_of(&b), ["b", "c"]);
        assert_eq!(b.get(Slot::Head), Some(&"b"));
        assert_eq!(b.collisions.len(), 1);

        assert!(b.remove(2, &"b", &NativeEq));
        assert!(b.remove(3, &"c", &NativeEq));
        assert_eq!(b.len(), 0);
        assert!(b.first_slot().is_none());
        assert!(!b.remove(3, &"c", &NativeEq));
    }

    /// Removing from the middle of the list keeps survivor order.
    #[test]
    fn remove_overflow_preserves_order() {
        let mut b: Bucket<&'static str> = Bucket::default();
        for (h, k) in [(1, "a"), (2, "b"), (3, "c"), (4, "d")] {
            b.insert(h, k, &NativeEq);
        }
        assert_eq!(b.take(3, &"c", &NativeEq), Some("c"));
        assert_eq!(keys_of(&b), ["a", "b", "d"]);
        assert_eq!(b.take(3, &"c", &NativeEq), None);
    }

    #[test]
    fn clear_and_retain() {
        let mut b: Bucket<u32> = Bucket::default();
        for k in 0..6u32 {
            b.insert(u64::from(k), k, &NativeEq);
        }
        assert_eq!(b.retain(&mut |k: &u32| k % 2 == 1), 3);
        assert_eq!(b.keys().copied().collect::<Vec<_>>(), [1, 3, 5]);
        assert_eq!(b.get(Slot::Head), Some(&1));
        b.clear();
        assert_eq!(b.len(), 0);
        assert!(b.first_slot().is_none());
    }

    /// A panicking predicate leaves every entry of the bucket in place.
    #[test]
    fn retain_panic_keeps_entries() {
        use std::panic::{catch_unwind, AssertUnwindSafe};
        let mut b: Bucket<u32> = Bucket::default();
        for k in 0..5u32 {
            b.insert(1, k, &NativeEq);
        }
        let res = catch_unwind(AssertUnwindSafe(|| {
            b.retain(&mut |k: &u32| {
                if *k == 3 {
                    panic!("predicate failed");
                }
                *k != 1
            })
        }));
        assert!(res.is_err());
        assert_eq!(b.len(), 5);
        assert_eq!(b.get(Slot::Head), Some(&0));
        let mut keys: Vec<u32> = b.keys().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, [0, 1, 2, 3, 4]);
    }

    /// Rejecting the head promotes the first surviving overflow entry.
    #[test]
    fn retain_drops_head_and_promotes() {
        let mut b: Bucket<u32> = Bucket::default();
        for k in [4u32, 5, 6, 7] {
            b.insert(1, k, &NativeEq);
        }
        assert_eq!(b.retain(&mut |k: &u32| *k != 4 && *k != 5), 2);
        assert_eq!(b.get(Slot::Head), Some(&6));
        assert_eq!(b.keys().copied().collect::<Vec<_>>(), [6, 7]);
    }

    /// Slot navigation walks head, then every overflow node, and back.
    #[test]
    fn slot_navigation() {
        let mut b: Bucket<u32> = Bucket::default();
        assert_eq!(b.last_slot(), None);
        b.insert(1, 1, &NativeEq);
        assert_eq!(b.first_slot(), Some(Slot::Head));
        assert_eq!(b.last_slot(), Some(Slot::Head));
        assert_eq!(b.next_slot(Slot::Head), None);
        b.insert(2, 2, &NativeEq);
        b.insert(3, 3, &NativeEq);
        assert_eq!(b.next_slot(Slot::Head), Some(Slot::Overflow(0)));
        assert_eq!(b.next_slot(Slot::Overflow(0)), Some(Slot::Overflow(1)));
        assert_eq!(b.next_slot(Slot::Overflow(1)), None);
        assert_eq!(b.last_slot(), Some(Slot::Overflow(1)));
        assert_eq!(b.prev_slot(Slot::Overflow(1)), Some(Slot::Overflow(0)));
        assert_eq!(b.prev_slot(Slot::Overflow(0)), Some(Slot::Head));
        assert_eq!(b.prev_slot(Slot::Head), None);
    }

    /// Owned and mutable iteration follow the same head-then-list order.
    #[test]
    fn into_iter_order() {
        let mut b: Bucket<u32> = Bucket::default();
        for k in [4u32, 5, 6] {
            b.insert(u64::from(k), k, &NativeEq);
        }
        for node in &mut b {
            node.key *= 10;
        }
        let nodes: Vec<(u64, u32)> = b.into_iter().map(|n| (n.hash, n.key)).collect();
        assert_eq!(nodes, [(4, 40), (5, 50), (6, 60)]);
    }
}
