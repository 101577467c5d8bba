//! HashSetList: fixed bucket array with separate chaining and head cells.

use crate::bucket::Bucket;
use crate::hash::{Fnv1a, HashFunc, KeyEq, NativeEq, NULL_HASH};
use crate::iter::{Cursor, IntoIter, Iter, IterMut};
use core::borrow::Borrow;
use core::fmt;

/// Construction precondition failure.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CapacityError {
    /// A set needs at least one bucket.
    Zero,
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapacityError::Zero => f.write_str("zero is not a valid capacity"),
        }
    }
}

impl std::error::Error for CapacityError {}

/// A hash set with a fixed number of buckets chosen at construction.
///
/// Keys are placed in bucket `hash(key) % bucket_count`. The bucket count
/// only changes through [`rehash`](Self::rehash); the set never grows on
/// its own, so long collision chains are the caller's signal to rehash.
pub struct HashSetList<K, H = Fnv1a, E = NativeEq> {
    buckets: Box<[Bucket<K>]>,
    len: usize,
    hash_func: H,
    key_eq: E,
}

fn empty_buckets<K>(capacity: usize) -> Box<[Bucket<K>]> {
    core::iter::repeat_with(Bucket::default)
        .take(capacity)
        .collect()
}

/// Subtracts dropped keys from the cached length on scope exit, unwinding
/// included.
struct LenGuard<'a> {
    len: &'a mut usize,
    dropped: usize,
}

impl Drop for LenGuard<'_> {
    fn drop(&mut self) {
        *self.len -= self.dropped;
    }
}

impl<K> HashSetList<K> {
    /// Creates an empty set with `capacity` buckets, FNV-1a hashing and `==`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        Self::with_hasher_and_eq(capacity, Fnv1a, NativeEq)
    }
}

impl<K, H> HashSetList<K, H> {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_hasher(capacity: usize, hash_func: H) -> Self {
        Self::with_hasher_and_eq(capacity, hash_func, NativeEq)
    }
}

impl<K, H, E> HashSetList<K, H, E> {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_hasher_and_eq(capacity: usize, hash_func: H, key_eq: E) -> Self {
        match Self::try_with_hasher_and_eq(capacity, hash_func, key_eq) {
            Ok(set) => set,
            Err(e) => panic!("{e}"),
        }
    }

    /// Fallible constructor: reports a zero capacity instead of panicking.
    pub fn try_with_hasher_and_eq(
        capacity: usize,
        hash_func: H,
        key_eq: E,
    ) -> Result<Self, CapacityError> {
        if capacity == 0 {
            return Err(CapacityError::Zero);
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(capacity, "HashSetList::new()");
        Ok(Self {
            buckets: empty_buckets(capacity),
            len: 0,
            hash_func,
            key_eq,
        })
    }

    pub(crate) fn buckets(&self) -> &[Bucket<K>] {
        &self.buckets
    }

    pub(crate) fn buckets_mut(&mut self) -> &mut [Bucket<K>] {
        &mut self.buckets
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Average number of keys per bucket.
    pub fn load_factor(&self) -> f32 {
        self.len() as f32 / self.buckets.len() as f32
    }

    pub fn hash_func(&self) -> &H {
        &self.hash_func
    }

    pub fn key_eq(&self) -> &E {
        &self.key_eq
    }

    /// Removes every key. The bucket count is unchanged.
    pub fn clear(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::trace!(len = self.len, "HashSetList::clear()");
        for bucket in self.buckets.iter_mut() {
            bucket.clear();
        }
        self.len = 0;
    }

    /// Rebuilds the set with `new_capacity` buckets.
    ///
    /// Does nothing when the set is empty or when `new_capacity` is smaller
    /// than [`len`](Self::len). Nodes are relocated using their cached hash,
    /// so the hash function is not called again. Iteration order afterwards
    /// is unrelated to the order before.
    pub fn rehash(&mut self, new_capacity: usize) {
        if self.len == 0 || new_capacity < self.len {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                len = self.len,
                new_capacity,
                "HashSetList::rehash() skipped"
            );
            return;
        }

        let old = core::mem::replace(&mut self.buckets, empty_buckets(new_capacity));
        #[cfg(feature = "tracing")]
        tracing::debug!(
            len = self.len,
            old_capacity = old.len(),
            new_capacity,
            "HashSetList::rehash()"
        );
        for node in old.into_vec().into_iter().flatten() {
            let index = self.index_of(node.hash);
            self.buckets[index].push_unique(node);
        }
    }

    /// Exchanges the contents of two sets without copying any key.
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// Keeps only the keys for which `f` returns true.
    ///
    /// If `f` panics, buckets already visited stay filtered, the rest are
    /// untouched, and `len` still matches the stored keys.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K) -> bool,
    {
        let mut guard = LenGuard {
            len: &mut self.len,
            dropped: 0,
        };
        for bucket in self.buckets.iter_mut() {
            guard.dropped += bucket.retain(&mut f);
        }
    }

    /// Cursor on the first element, or [`Cursor::end`] for an empty set.
    pub fn cursor_front(&self) -> Cursor {
        let mut c = Cursor::before_start();
        c.move_next(self);
        c
    }

    /// Cursor on the last element, or [`Cursor::before_start`] for an empty set.
    pub fn cursor_back(&self) -> Cursor {
        let mut c = Cursor::end();
        c.move_prev(self);
        c
    }

    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(&self.buckets, self.len)
    }

    /// Mutable iteration over keys.
    ///
    /// Changing a key so that its hash or equality changes is a logic
    /// error; the key stays in the bucket it was inserted into.
    pub fn iter_mut(&mut self) -> IterMut<'_, K> {
        IterMut::new(&mut self.buckets, self.len)
    }
}

impl<K, H, E> HashSetList<K, H, E> {
    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized,
        H: HashFunc<Q>,
    {
        let hash = self.hash_func.hash(q);
        debug_assert_ne!(hash, NULL_HASH, "hash function returned the reserved null hash");
        hash
    }

    #[inline]
    fn index_of(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }

    /// The full hash of `key` under this set's hash function.
    pub fn hash<Q>(&self, key: &Q) -> u64
    where
        Q: ?Sized,
        H: HashFunc<Q>,
    {
        self.make_hash(key)
    }

    /// Index of the bucket `key` maps to.
    pub fn bucket<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized,
        H: HashFunc<Q>,
    {
        self.index_of(self.make_hash(key))
    }

    /// Number of keys stored in the bucket `key` maps to.
    pub fn bucket_len<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized,
        H: HashFunc<Q>,
    {
        self.buckets[self.bucket(key)].len()
    }

    /// Inserts `key` unless an equal key is present. Returns whether it was added;
    /// on false the argument is dropped and the stored key is kept.
    pub fn insert(&mut self, key: K) -> bool
    where
        H: HashFunc<K>,
        E: KeyEq<K>,
    {
        let hash = self.make_hash(&key);
        let index = self.index_of(hash);
        let inserted = self.buckets[index].insert(hash, key, &self.key_eq);
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Returns the stored key equal to `key`, inserting `key` if absent.
    pub fn find_or_insert(&mut self, key: K) -> &mut K
    where
        H: HashFunc<K>,
        E: KeyEq<K>,
    {
        let hash = self.make_hash(&key);
        let index = self.index_of(hash);
        let (stored, inserted) = self.buckets[index].find_or_insert(hash, key, &self.key_eq);
        if inserted {
            self.len += 1;
        }
        stored
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashFunc<Q>,
        E: KeyEq<Q>,
    {
        let hash = self.make_hash(key);
        self.buckets[self.index_of(hash)].contains(hash, key, &self.key_eq)
    }

    /// Borrows the stored key equal to `key`.
    pub fn find<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashFunc<Q>,
        E: KeyEq<Q>,
    {
        let hash = self.make_hash(key);
        self.buckets[self.index_of(hash)].find(hash, key, &self.key_eq)
    }

    /// Mutably borrows the stored key equal to `key`.
    ///
    /// Changing the key so that its hash or equality changes is a logic error.
    pub fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut K>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashFunc<Q>,
        E: KeyEq<Q>,
    {
        let hash = self.make_hash(key);
        let index = self.index_of(hash);
        self.buckets[index].find_mut(hash, key, &self.key_eq)
    }

    /// Removes `key`. Returns false if it was absent.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashFunc<Q>,
        E: KeyEq<Q>,
    {
        let hash = self.make_hash(key);
        let index = self.index_of(hash);
        let removed = self.buckets[index].remove(hash, key, &self.key_eq);
        if removed {
            self.len -= 1;
        }
        removed
    }

    /// Removes `key` and returns the stored key.
    pub fn take<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashFunc<Q>,
        E: KeyEq<Q>,
    {
        let hash = self.make_hash(key);
        let index = self.index_of(hash);
        let taken = self.buckets[index].take(hash, key, &self.key_eq)?;
        self.len -= 1;
        Some(taken)
    }
}

impl<K: Clone, H: Clone, E: Clone> Clone for HashSetList<K, H, E> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            len: self.len,
            hash_func: self.hash_func.clone(),
            key_eq: self.key_eq.clone(),
        }
    }

    /// Copy-and-swap: `self` is untouched if cloning `source` panics.
    fn clone_from(&mut self, source: &Self) {
        let mut tmp = source.clone();
        self.swap(&mut tmp);
    }
}

impl<K, H, E> PartialEq for HashSetList<K, H, E>
where
    H: HashFunc<K>,
    E: KeyEq<K>,
{
    /// Same membership; bucket counts and iteration order may differ.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|k| other.contains(k))
    }
}

impl<K, H, E> Eq for HashSetList<K, H, E>
where
    H: HashFunc<K>,
    E: KeyEq<K>,
{
}

impl<K: fmt::Debug, H, E> fmt::Debug for HashSetList<K, H, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K, H, E> Extend<K> for HashSetList<K, H, E>
where
    H: HashFunc<K>,
    E: KeyEq<K>,
{
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K, H, E> IntoIterator for &'a HashSetList<K, H, E> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

impl<'a, K, H, E> IntoIterator for &'a mut HashSetList<K, H, E> {
    type Item = &'a mut K;
    type IntoIter = IterMut<'a, K>;

    fn into_iter(self) -> IterMut<'a, K> {
        self.iter_mut()
    }
}

impl<K, H, E> IntoIterator for HashSetList<K, H, E> {
    type Item = K;
    type IntoIter = IntoIter<K>;

    fn into_iter(self) -> IntoIter<K> {
        IntoIter::new(self.buckets, self.len)
    }
}
