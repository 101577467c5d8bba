//! Cursor state machine and iterators over `HashSetList`.
//!
//! A cursor position is one of `BeforeFirst`, `At { bucket, slot }` or
//! `PastLast`. Advancing walks the current bucket (head, then each
//! overflow node) and then skips empty buckets until a populated one or
//! the end is reached; retreating is the mirror image. Order is an
//! artifact of the bucket layout and changes on rehash.

use crate::bucket::{Bucket, Node, Slot};
use crate::hash_set_list::HashSetList;
use core::iter::{Flatten, FusedIterator};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
enum Position {
    BeforeFirst,
    At { bucket: usize, slot: Slot },
    PastLast,
}

/// Next live position after `pos`; saturates at `PastLast`.
fn advance<K>(buckets: &[Bucket<K>], pos: Position) -> Position {
    let start = match pos {
        Position::PastLast => return Position::PastLast,
        Position::BeforeFirst => 0,
        Position::At { bucket, slot } => {
            if let Some(slot) = buckets.get(bucket).and_then(|b| b.next_slot(slot)) {
                return Position::At { bucket, slot };
            }
            bucket + 1
        }
    };
    buckets
        .iter()
        .enumerate()
        .skip(start)
        .find_map(|(bucket, b)| b.first_slot().map(|slot| Position::At { bucket, slot }))
        .unwrap_or(Position::PastLast)
}

/// Previous live position before `pos`; saturates at `BeforeFirst`.
fn retreat<K>(buckets: &[Bucket<K>], pos: Position) -> Position {
    let end = match pos {
        Position::BeforeFirst => return Position::BeforeFirst,
        Position::PastLast => buckets.len(),
        Position::At { bucket, slot } => {
            if let Some(slot) = buckets.get(bucket).and_then(|b| b.prev_slot(slot)) {
                return Position::At { bucket, slot };
            }
            bucket.min(buckets.len())
        }
    };
    buckets[..end]
        .iter()
        .enumerate()
        .rev()
        .find_map(|(bucket, b)| b.last_slot().map(|slot| Position::At { bucket, slot }))
        .unwrap_or(Position::BeforeFirst)
}

fn key_at<K>(buckets: &[Bucket<K>], pos: Position) -> Option<&K> {
    match pos {
        Position::At { bucket, slot } => buckets.get(bucket)?.get(slot),
        _ => None,
    }
}

/// A copyable position inside a `HashSetList`.
///
/// A cursor holds no borrow of the set; every access takes the set as an
/// argument. Any structural mutation (insert, remove, clear, rehash,
/// assignment) invalidates it: afterwards it may resolve to `None` or to a
/// different key, but never to freed memory.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Cursor {
    pos: Position,
}

impl Cursor {
    /// The sentinel one step before the first element.
    pub const fn before_start() -> Self {
        Self {
            pos: Position::BeforeFirst,
        }
    }

    /// The sentinel one step past the last element.
    pub const fn end() -> Self {
        Self {
            pos: Position::PastLast,
        }
    }

    pub fn is_before_start(&self) -> bool {
        self.pos == Position::BeforeFirst
    }

    pub fn is_end(&self) -> bool {
        self.pos == Position::PastLast
    }

    /// Index of the bucket the cursor points into, if it is on an element.
    pub fn bucket_index(&self) -> Option<usize> {
        match self.pos {
            Position::At { bucket, .. } => Some(bucket),
            _ => None,
        }
    }

    pub fn move_next<K, H, E>(&mut self, set: &HashSetList<K, H, E>) {
        self.pos = advance(set.buckets(), self.pos);
    }

    pub fn move_prev<K, H, E>(&mut self, set: &HashSetList<K, H, E>) {
        self.pos = retreat(set.buckets(), self.pos);
    }

    pub fn key<'a, K, H, E>(&self, set: &'a HashSetList<K, H, E>) -> Option<&'a K> {
        key_at(set.buckets(), self.pos)
    }

    /// Mutable access to the key under the cursor.
    ///
    /// Changing the key in a way that alters its hash or equality is a
    /// logic error: the entry stays in its old bucket.
    pub fn key_mut<'a, K, H, E>(&self, set: &'a mut HashSetList<K, H, E>) -> Option<&'a mut K> {
        match self.pos {
            Position::At { bucket, slot } => set.buckets_mut().get_mut(bucket)?.get_mut(slot),
            _ => None,
        }
    }
}

/// Borrowing iterator over the keys of a `HashSetList`.
pub struct Iter<'a, K> {
    buckets: &'a [Bucket<K>],
    front: Position,
    back: Position,
    remaining: usize,
}

impl<'a, K> Iter<'a, K> {
    pub(crate) fn new(buckets: &'a [Bucket<K>], len: usize) -> Self {
        Self {
            buckets,
            front: Position::BeforeFirst,
            back: Position::PastLast,
            remaining: len,
        }
    }
}

impl<K> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<&'a K> {
        if self.remaining == 0 {
            return None;
        }
        self.front = advance(self.buckets, self.front);
        self.remaining -= 1;
        key_at(self.buckets, self.front)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K> DoubleEndedIterator for Iter<'a, K> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a K> {
        if self.remaining == 0 {
            return None;
        }
        self.back = retreat(self.buckets, self.back);
        self.remaining -= 1;
        key_at(self.buckets, self.back)
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}
impl<K> FusedIterator for Iter<'_, K> {}

/// Iterator over mutable keys of a `HashSetList`.
///
/// Mutating a key so that its hash or equality changes is a logic error.
pub struct IterMut<'a, K> {
    inner: Flatten<core::slice::IterMut<'a, Bucket<K>>>,
    remaining: usize,
}

impl<'a, K> IterMut<'a, K> {
    pub(crate) fn new(buckets: &'a mut [Bucket<K>], len: usize) -> Self {
        Self {
            inner: buckets.iter_mut().flatten(),
            remaining: len,
        }
    }
}

impl<'a, K> Iterator for IterMut<'a, K> {
    type Item = &'a mut K;

    #[inline]
    fn next(&mut self) -> Option<&'a mut K> {
        let node = self.inner.next()?;
        self.remaining -= 1;
        Some(&mut node.key)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K> DoubleEndedIterator for IterMut<'a, K> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a mut K> {
        let node = self.inner.next_back()?;
        self.remaining -= 1;
        Some(&mut node.key)
    }
}

impl<K> ExactSizeIterator for IterMut<'_, K> {}
impl<K> FusedIterator for IterMut<'_, K> {}

/// Owning iterator returned by `HashSetList::into_iter`.
pub struct IntoIter<K> {
    inner: Flatten<std::vec::IntoIter<Bucket<K>>>,
    remaining: usize,
}

impl<K> IntoIter<K> {
    pub(crate) fn new(buckets: Box<[Bucket<K>]>, len: usize) -> Self {
        Self {
            inner: buckets.into_vec().into_iter().flatten(),
            remaining: len,
        }
    }
}

impl<K> Iterator for IntoIter<K> {
    type Item = K;

    #[inline]
    fn next(&mut self) -> Option<K> {
        let Node { key, .. } = self.inner.next()?;
        self.remaining -= 1;
        Some(key)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> DoubleEndedIterator for IntoIter<K> {
    #[inline]
    fn next_back(&mut self) -> Option<K> {
        let Node { key, .. } = self.inner.next_back()?;
        self.remaining -= 1;
        Some(key)
    }
}

impl<K> ExactSizeIterator for IntoIter<K> {}
impl<K> FusedIterator for IntoIter<K> {}
