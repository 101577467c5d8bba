//! Pluggable hashing and key-equality strategies.
//!
//! A `HashSetList` is parameterised by two capability objects that stay
//! fixed for the lifetime of the set: a [`HashFunc`] mapping keys to a
//! `u64`, and a [`KeyEq`] deciding whether two keys are the same entry.

use core::fmt;
use core::hash::{BuildHasher, Hash, Hasher};
use hashbrown::hash_map::DefaultHashBuilder;

/// Reserved hash value marking an empty head slot. No adapter in this
/// module ever returns it for a real key.
pub const NULL_HASH: u64 = u64::MAX;

/// Maps `NULL_HASH` onto its neighbour so adapters never leak the sentinel.
#[inline]
pub(crate) const fn fold_null(hash: u64) -> u64 {
    if hash == NULL_HASH {
        NULL_HASH - 1
    } else {
        hash
    }
}

/// Hash strategy for keys (or borrowed forms of keys) of type `Q`.
///
/// Implementations must be deterministic for the lifetime of a set, must
/// agree with the paired [`KeyEq`] (equal keys hash equally), and must never
/// return [`NULL_HASH`].
pub trait HashFunc<Q: ?Sized> {
    fn hash(&self, key: &Q) -> u64;
}

/// Equality strategy for keys (or borrowed forms of keys) of type `Q`.
pub trait KeyEq<Q: ?Sized> {
    fn eq(&self, a: &Q, b: &Q) -> bool;
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a state fed through `core::hash::Hasher`.
#[derive(Clone, Copy, Debug)]
pub struct FnvHasher {
    state: u64,
}

impl Default for FnvHasher {
    fn default() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }
}

impl Hasher for FnvHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= u64::from(b);
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.state
    }
}

/// Deterministic FNV-1a over a key's `Hash` output. Default strategy.
///
/// Because it goes through `Hash`, a `String` key and its `&str` form hash
/// identically, so borrowed lookups work.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fnv1a;

impl BuildHasher for Fnv1a {
    type Hasher = FnvHasher;

    fn build_hasher(&self) -> FnvHasher {
        FnvHasher::default()
    }
}

impl<Q: ?Sized + Hash> HashFunc<Q> for Fnv1a {
    #[inline]
    fn hash(&self, key: &Q) -> u64 {
        fold_null(self.hash_one(key))
    }
}

/// Adapts any `BuildHasher` into a [`HashFunc`].
///
/// The default state is hashbrown's builder, which is seeded per process;
/// pass a fixed builder when iteration order must be reproducible.
#[derive(Clone, Debug, Default)]
pub struct BuildHasherFunc<S = DefaultHashBuilder>(pub S);

impl<S> BuildHasherFunc<S> {
    pub fn new(state: S) -> Self {
        Self(state)
    }
}

impl<Q, S> HashFunc<Q> for BuildHasherFunc<S>
where
    Q: ?Sized + Hash,
    S: BuildHasher,
{
    #[inline]
    fn hash(&self, key: &Q) -> u64 {
        let mut h = self.0.build_hasher();
        key.hash(&mut h);
        fold_null(h.finish())
    }
}

/// Wraps a closure `Fn(&Q) -> u64` as a [`HashFunc`].
#[derive(Clone, Copy)]
pub struct FnHash<F>(pub F);

impl<F> fmt::Debug for FnHash<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnHash")
    }
}

impl<Q, F> HashFunc<Q> for FnHash<F>
where
    Q: ?Sized,
    F: Fn(&Q) -> u64,
{
    #[inline]
    fn hash(&self, key: &Q) -> u64 {
        fold_null((self.0)(key))
    }
}

/// Native `==` on the key type. Default equality strategy.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeEq;

impl<Q: ?Sized + Eq> KeyEq<Q> for NativeEq {
    #[inline]
    fn eq(&self, a: &Q, b: &Q) -> bool {
        a == b
    }
}

/// Wraps a closure `Fn(&Q, &Q) -> bool` as a [`KeyEq`].
#[derive(Clone, Copy)]
pub struct FnEq<F>(pub F);

impl<F> fmt::Debug for FnEq<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnEq")
    }
}

impl<Q, F> KeyEq<Q> for FnEq<F>
where
    Q: ?Sized,
    F: Fn(&Q, &Q) -> bool,
{
    #[inline]
    fn eq(&self, a: &Q, b: &Q) -> bool {
        (self.0)(a, b)
    }
}
