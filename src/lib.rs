#![doc = include_str!("../README.md")]
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a hash set whose common case (no collision) never allocates a
//!   list node, with every layer small enough to reason about alone.
//! - Layers:
//!   - Bucket<K>: one inline head slot plus a `VecDeque` collision list.
//!     Owns membership, find, insert and remove for the keys that map to
//!     it. Removing the head promotes the front of the list.
//!   - HashSetList<K, H, E>: a boxed slice of buckets, a hash strategy and
//!     an equality strategy. Hashes once per call and forwards the hash to
//!     the target bucket.
//!   - Cursor / Iter: a position state machine (`BeforeFirst`,
//!     `At { bucket, slot }`, `PastLast`) that skips empty buckets in both
//!     directions.
//!
//! Constraints
//! - Fixed bucket count: the set never resizes on its own. `rehash` is the
//!   only way to change it, and it refuses to go below `len()` or to touch
//!   an empty set.
//! - Unique keys under the configured `KeyEq`; duplicate inserts return
//!   `false` and leave the set unchanged.
//! - Zero buckets is a programmer error: `new` panics, the `try_` form
//!   returns `CapacityError`.
//!
//! Hasher and rehashing invariants
//! - Each node stores its full `u64` hash next to the key. Probing compares
//!   hashes before calling `KeyEq`, and rehash relocates nodes from the
//!   cached hash without calling `HashFunc` again.
//! - `NULL_HASH` is reserved; the provided adapters fold it away.
//!
//! Borrowing
//! - Lookups hand out `&K`/`&mut K` tied to the set borrow, so the borrow
//!   checker rules out mutation while they live.
//! - `Cursor` is a detached position that takes the set as an argument on
//!   every access. A cursor that outlived a structural mutation resolves
//!   to `None` or to some other key; it never reads freed storage.
//! - Mutating a key through `find_mut`, `iter_mut` or `Cursor::key_mut` so
//!   that its hash or equality changes is a logic error.
//!
//! Notes and non-goals
//! - No internal synchronization; the set is `Send`/`Sync` exactly when
//!   its key and strategy types are.
//! - No open addressing, no serialization, no custom allocators.
//! - With the `tracing` feature (on by default), construction, `clear`
//!   and `rehash` emit trace events.

mod bucket;
pub mod hash;
mod hash_set_list;
mod hash_set_list_proptest;
mod iter;

// Public surface
pub use hash::{BuildHasherFunc, FnEq, FnHash, Fnv1a, FnvHasher, HashFunc, KeyEq, NativeEq, NULL_HASH};
pub use hash_set_list::{CapacityError, HashSetList};
pub use iter::{Cursor, IntoIter, Iter, IterMut};
