//! Bidirectional traversal of a [`Set`](crate::Set) in sorted order.
//!
//! A [`Cursor`] points at one element of a set, or at the "end" position one past the last
//! element. It moves by following parent and child links only, so stepping never needs an
//! auxiliary stack. Because a cursor borrows its set, the set can't be modified while a cursor
//! exists.

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::node::{Node, NodePtr};

/// A position in a [`Set`](crate::Set): either an element or the end sentinel.
///
/// The end sentinel sits between the last and the first element. Moving forward from it lands on
/// the first element, moving backward lands on the last one. Two cursors are equal when they point
/// at the same element, or are both at the end.
///
/// # Examples
///
/// ```
/// use avl_set::Set;
///
/// let set = Set::from([1, 3, 5]);
///
/// let mut cursor = set.lower_bound(&2);
/// assert_eq!(cursor.get(), Some(&3));
///
/// cursor.move_next();
/// assert_eq!(cursor.get(), Some(&5));
///
/// cursor.move_next();
/// assert!(cursor.is_end());
/// assert_eq!(cursor, set.end());
///
/// cursor.move_prev();
/// assert_eq!(cursor.get(), Some(&5));
/// ```
pub struct Cursor<'a, T> {
    node: Option<NodePtr<T>>,
    root: Option<NodePtr<T>>,
    marker: PhantomData<&'a Node<T>>,
}

// SAFETY: A `Cursor` only ever hands out `&T`, like `&Set<T>` would.
unsafe impl<T: Sync> Send for Cursor<'_, T> {}
unsafe impl<T: Sync> Sync for Cursor<'_, T> {}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Cursor<'_, T> {}

impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}
impl<T> Eq for Cursor<'_, T> {}

impl<T> fmt::Debug for Cursor<'_, T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.get()).finish()
    }
}

impl<'a, T> Cursor<'a, T> {
    /// `root` is the root of the tree `node` belongs to, `node` is `None` for the end position.
    pub(crate) fn new(root: Option<NodePtr<T>>, node: Option<NodePtr<T>>) -> Self {
        Self {
            node,
            root,
            marker: PhantomData,
        }
    }

    fn node(&self) -> Option<&'a Node<T>> {
        // SAFETY: The cursor borrows the set for `'a`, so every node of the tree stays alive and
        // unmodified for `'a`.
        unsafe { self.node.map(|ptr| &*ptr.as_ptr()) }
    }

    fn root(&self) -> Option<&'a Node<T>> {
        // SAFETY: See `Cursor::node`.
        unsafe { self.root.map(|ptr| &*ptr.as_ptr()) }
    }

    /// The element under the cursor, or `None` at the end position.
    pub fn get(&self) -> Option<&'a T> {
        self.node().map(|node| &node.value)
    }

    /// Whether the cursor is at the end position.
    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }

    /// Moves to the next element in sorted order. Moving past the last element lands on the end
    /// position, and moving from the end position lands on the first element.
    pub fn move_next(&mut self) {
        let Some(node) = self.node() else {
            self.node = self.root().map(|root| root.min_ptr());
            return;
        };

        if let Some(right) = node.right() {
            self.node = Some(right.leftmost().into());
            return;
        }

        // Climb while we're a right child. The first parent we reach from its left is next.
        let mut child = node;
        self.node = loop {
            match child.parent() {
                Some(parent) if parent.right_ptr() == Some(child.into()) => child = parent,
                parent => break parent.map(NodePtr::from),
            }
        };
    }

    /// Moves to the previous element in sorted order. Moving from the end position lands on the
    /// last element, and moving before the first element lands on the end position.
    pub fn move_prev(&mut self) {
        let Some(node) = self.node() else {
            self.node = self.root().map(|root| root.max_ptr());
            return;
        };

        if let Some(left) = node.left() {
            self.node = Some(left.rightmost().into());
            return;
        }

        let mut child = node;
        self.node = loop {
            match child.parent() {
                Some(parent) if parent.left_ptr() == Some(child.into()) => child = parent,
                parent => break parent.map(NodePtr::from),
            }
        };
    }
}

/// An iterator over the elements of a [`Set`](crate::Set) in sorted order.
///
/// This `struct` is created by [`Set::iter`](crate::Set::iter).
pub struct Iter<'a, T> {
    front: Cursor<'a, T>,
    back: Cursor<'a, T>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(front: Cursor<'a, T>, back: Cursor<'a, T>, remaining: usize) -> Self {
        Self {
            front,
            back,
            remaining,
        }
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<T> fmt::Debug for Iter<'_, T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let value = self.front.get();
        self.front.move_next();
        self.remaining -= 1;
        value
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        self.back.move_prev();
        self.remaining -= 1;
        self.back.get()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use crate::Set;

    #[test]
    fn walks_forward_and_backward() {
        let set: Set<i32> = (0..32).map(|x| x * 3).collect();

        let mut cursor = set.begin();
        for expected in (0..32).map(|x| x * 3) {
            assert_eq!(cursor.get(), Some(&expected));
            cursor.move_next();
        }
        assert!(cursor.is_end());

        for expected in (0..32).rev().map(|x| x * 3) {
            cursor.move_prev();
            assert_eq!(cursor.get(), Some(&expected));
        }
    }

    #[test]
    fn end_wraps_around() {
        let set = Set::from([2, 4, 6]);

        let mut cursor = set.end();
        cursor.move_next();
        assert_eq!(cursor, set.begin());

        cursor.move_prev();
        assert_eq!(cursor, set.end());
        cursor.move_prev();
        assert_eq!(cursor.get(), Some(&6));
    }

    #[test]
    fn empty_set_cursors_stay_at_end() {
        let set: Set<u8> = Set::new();

        let mut cursor = set.begin();
        assert!(cursor.is_end());
        assert_eq!(cursor.get(), None);
        cursor.move_next();
        assert!(cursor.is_end());
        cursor.move_prev();
        assert_eq!(cursor, set.end());
    }

    #[test]
    fn iter_meets_in_the_middle() {
        let set: Set<i32> = (1..=5).collect();
        let mut iter = set.iter();

        assert_eq!(iter.len(), 5);
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next_back(), Some(&5));
        assert_eq!(iter.next_back(), Some(&4));
        assert_eq!(iter.next(), Some(&2));
        assert_eq!(iter.len(), 1);
        assert_eq!(iter.next(), Some(&3));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn iter_rev_is_descending() {
        let set: Set<i32> = [8, 1, 9, 3, 7, 2].into_iter().collect();
        let descending: Vec<_> = set.iter().rev().copied().collect();
        assert_eq!(descending, vec![9, 8, 7, 3, 2, 1]);
    }
}
