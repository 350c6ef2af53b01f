//! An ordered set backed by an AVL tree with parent links and cached subtree bounds.
//!
//! # Examples
//!
//! ```
//! use avl_set::Set;
//!
//! let mut set = Set::new();
//!
//! // Nothing in here yet.
//! assert!(set.find(&1).is_end());
//!
//! assert!(set.insert(1));
//! assert_eq!(set.find(&1).get(), Some(&1));
//!
//! // Inserting an existing value changes nothing.
//! assert!(!set.insert(1));
//! assert_eq!(set.len(), 1);
//!
//! set.extend([5, 3]);
//! assert_eq!(set.lower_bound(&2).get(), Some(&3));
//!
//! assert!(set.erase(&1));
//! assert!(set.find(&1).is_end());
//! assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![3, 5]);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::mem;

use compare::{Compare, Natural};

use crate::cursor::{Cursor, Iter};
use crate::node::{BalanceState, Link, Node, NodePtr};

/// An ordered set of unique values kept in a self-balancing binary search tree (specifically, an
/// AVL tree). Membership tests, insertion, deletion and [`lower_bound`](Set::lower_bound) all take
/// `O(lg N)` time.
///
/// Values are ordered by a comparator `C`, which defaults to the values' natural order. Values
/// comparing equal under `C` are considered the same value.
pub struct Set<T, C = Natural<T>>
where
    C: Compare<T>,
{
    root: Link<T>,
    len: usize,
    cmp: C,
    marker: PhantomData<Box<Node<T>>>,
}

// SAFETY: The tree exclusively owns its nodes, so sending or sharing a `Set` is like sending or
// sharing the values (and comparator) in it.
unsafe impl<T: Send, C: Compare<T> + Send> Send for Set<T, C> {}
unsafe impl<T: Sync, C: Compare<T> + Sync> Sync for Set<T, C> {}

impl<T> Set<T>
where
    T: Ord,
{
    /// Generates a new, empty `Set` ordered by the natural order of its values.
    pub fn new() -> Self {
        Self::with_cmp(compare::natural())
    }
}

impl<T> Default for Set<T>
where
    T: Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C> Drop for Set<T, C>
where
    C: Compare<T>,
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T, C> Clone for Set<T, C>
where
    T: Clone,
    C: Compare<T> + Clone,
{
    fn clone(&self) -> Self {
        let mut set = Self::with_cmp(self.cmp.clone());
        set.copy_tree(self);
        set
    }

    fn clone_from(&mut self, source: &Self) {
        self.clear();
        self.cmp = source.cmp.clone();
        self.copy_tree(source);
    }
}

impl<T, C> fmt::Debug for Set<T, C>
where
    T: fmt::Debug,
    C: Compare<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, C> PartialEq for Set<T, C>
where
    T: PartialEq,
    C: Compare<T>,
{
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T, C> Eq for Set<T, C>
where
    T: Eq,
    C: Compare<T>,
{
}

impl<T> FromIterator<T> for Set<T>
where
    T: Ord,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T, const N: usize> From<[T; N]> for Set<T>
where
    T: Ord,
{
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T, C> Extend<T> for Set<T, C>
where
    C: Compare<T>,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T, C> IntoIterator for &'a Set<T, C>
where
    C: Compare<T>,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T, C> Set<T, C>
where
    C: Compare<T>,
{
    /// Generates a new, empty `Set` ordered by the given comparator.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_set::Set;
    /// use compare::{natural, Compare};
    ///
    /// let mut set = Set::with_cmp(natural().rev());
    /// set.extend([2, 1, 3]);
    ///
    /// assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
    /// ```
    pub fn with_cmp(cmp: C) -> Self {
        Self {
            root: Link::NONE,
            len: 0,
            cmp,
            marker: PhantomData,
        }
    }

    /// The comparator ordering this set.
    pub fn cmp(&self) -> &C {
        &self.cmp
    }

    /// How many values are in the set.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the set has no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// How many levels the underlying tree has. An empty set has a height of 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_set::Set;
    ///
    /// // Sorted input would give a naive binary search tree 7 levels.
    /// let set: Set<_> = (1..=7).collect();
    /// assert_eq!(set.height(), 3);
    /// ```
    pub fn height(&self) -> usize {
        self.root.node().map_or(0, |root| root.height())
    }

    /// Inserts `value` into the set. Returns `false`, leaving the set untouched, if an equal value
    /// is already present.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_set::Set;
    ///
    /// let mut set = Set::new();
    ///
    /// assert!(set.insert(1));
    /// assert!(!set.insert(1));
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        let Some(mut current) = self.root.0 else {
            self.root = Link(Some(Node::new_leaf(value)));
            self.len = 1;
            return true;
        };

        // SAFETY: Every pointer reached from the root is a live node owned by this set, and we
        // hold `&mut self` so nothing else can be looking at them.
        unsafe {
            loop {
                let node = current.as_ref();
                match self.cmp.compare(&value, &node.value) {
                    Ordering::Less => match node.left_ptr() {
                        Some(left) => current = left,
                        None => {
                            Node::set_left(current, Some(Node::new_leaf(value)));
                            break;
                        }
                    },
                    Ordering::Equal => return false,
                    Ordering::Greater => match node.right_ptr() {
                        Some(right) => current = right,
                        None => {
                            Node::set_right(current, Some(Node::new_leaf(value)));
                            break;
                        }
                    },
                }
            }

            if cfg!(debug_assertions) {
                let node = current.as_ref();
                if let Some(left) = node.left() {
                    assert!(self.cmp.compares_lt(&left.value, &node.value));
                }
                if let Some(right) = node.right() {
                    assert!(self.cmp.compares_gt(&right.value, &node.value));
                }
            }

            self.len += 1;
            self.rebalance_from(Some(current));
        }
        true
    }

    /// Removes `value` from the set. Returns `false` if it wasn't there.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_set::Set;
    ///
    /// let mut set = Set::from([1, 2]);
    ///
    /// assert!(set.erase(&1));
    /// assert!(!set.erase(&1));
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn erase(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    /// Removes `value` from the set and returns the stored value equal to it, if any.
    ///
    /// A node with two children isn't unlinked directly. Instead its value is swapped with its
    /// in-order predecessor or successor, whichever sits on its taller side (the predecessor when
    /// both sides are as tall), and that node is unlinked in its place.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_set::Set;
    ///
    /// let mut set = Set::from([String::from("a"), String::from("b")]);
    ///
    /// assert_eq!(set.take(&String::from("a")), Some(String::from("a")));
    /// assert_eq!(set.take(&String::from("a")), None);
    /// ```
    pub fn take(&mut self, value: &T) -> Option<T> {
        let target = self.find_node(value)?;

        // SAFETY: `target` and everything reachable from it are live nodes owned by this set, and
        // we hold `&mut self`. `target` and `victim` are copies of stored links, which carry the
        // write access of the `Box` they were leaked from; a pointer made from a `&Node` would
        // only allow reads, so swapping values through it or freeing it would be undefined.
        // `removed` is unlinked from the tree before it is freed, and it is freed only after
        // rebalancing, which never reaches it again.
        unsafe {
            let removed = match (target.as_ref().left_ptr(), target.as_ref().right_ptr()) {
                (Some(left), Some(right)) => {
                    let state = target.as_ref().balance_state();
                    let victim = match state {
                        BalanceState::RightHeavy => Node::leftmost_ptr(right),
                        _ => Node::rightmost_ptr(left),
                    };
                    log::debug!("erase: swapping {:?} with {:?} ({:?})", target, victim, state);

                    mem::swap(
                        &mut (*target.as_ptr()).value,
                        &mut (*victim.as_ptr()).value,
                    );
                    victim
                }
                _ => target,
            };

            let parent = removed.as_ref().parent_ptr();
            // At most one of these is present.
            let child = removed.as_ref().left_ptr().or(removed.as_ref().right_ptr());
            self.replace_child(parent, removed, child);
            self.len -= 1;

            self.rebalance_from(parent);
            Some(Node::free(removed))
        }
    }

    /// Removes every value from the set.
    pub fn clear(&mut self) {
        let mut stack: Vec<NodePtr<T>> = self.root.0.take().into_iter().collect();
        while let Some(node) = stack.pop() {
            // SAFETY: Each node is reachable from exactly one owning link, which we just cut by
            // taking the root or by popping its parent, so every node is freed exactly once.
            let node = unsafe { Box::from_raw(node.as_ptr()) };
            stack.extend(node.left_ptr());
            stack.extend(node.right_ptr());
        }
        self.len = 0;
    }

    /// Finds `value` in the set. Returns the [`end`](Set::end) cursor if it isn't there.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_set::Set;
    ///
    /// let set = Set::from([1, 2]);
    ///
    /// assert_eq!(set.find(&1).get(), Some(&1));
    /// assert_eq!(set.find(&42), set.end());
    /// ```
    pub fn find(&self, value: &T) -> Cursor<'_, T> {
        Cursor::new(self.root.0, self.find_node(value))
    }

    /// Whether an equal value is in the set.
    pub fn contains(&self, value: &T) -> bool {
        self.find_node(value).is_some()
    }

    /// The stored value equal to `value`, if any.
    pub fn get(&self, value: &T) -> Option<&T> {
        self.find(value).get()
    }

    /// Finds the first value that is not less than `value`. Returns the [`end`](Set::end) cursor
    /// if every value is less.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_set::Set;
    ///
    /// let set = Set::from([10, 20, 30]);
    ///
    /// assert_eq!(set.lower_bound(&20).get(), Some(&20));
    /// assert_eq!(set.lower_bound(&21).get(), Some(&30));
    /// assert!(set.lower_bound(&31).is_end());
    /// ```
    pub fn lower_bound(&self, value: &T) -> Cursor<'_, T> {
        Cursor::new(self.root.0, self.lower_bound_node(value))
    }

    /// A cursor at the smallest value, or the [`end`](Set::end) cursor if the set is empty.
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::new(self.root.0, self.root.node().map(|root| root.min_ptr()))
    }

    /// The cursor one past the largest value.
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::new(self.root.0, None)
    }

    /// The smallest value, read from the root's cached minimum in `O(1)`.
    pub fn first(&self) -> Option<&T> {
        self.root.node().map(|root| root.min())
    }

    /// The largest value, read from the root's cached maximum in `O(1)`.
    pub fn last(&self) -> Option<&T> {
        self.root.node().map(|root| root.max())
    }

    /// Iterates over the values in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.begin(), self.end(), self.len)
    }

    /// Descends along the stored links rather than through `&Node`s, since [`Set::take`] writes
    /// through and frees the pointer this returns.
    fn find_node(&self, value: &T) -> Option<NodePtr<T>> {
        let mut current = self.root.0?;
        loop {
            // SAFETY: Every link reached from the root points at a live node owned by this set.
            let node = unsafe { current.as_ref() };
            current = match self.cmp.compare(value, &node.value) {
                Ordering::Less => node.left_ptr()?,
                Ordering::Equal => return Some(current),
                Ordering::Greater => node.right_ptr()?,
            };
        }
    }

    /// Going left is only worth it when the left subtree's cached maximum is not less than
    /// `value`. Otherwise `node` itself is the answer. Going right never needs such a check: we
    /// only get into a subtree known to hold an answer, and that answer can't be on the left of a
    /// node less than `value`.
    fn lower_bound_node(&self, value: &T) -> Option<NodePtr<T>> {
        let mut node = self.root.node()?;
        loop {
            node = match self.cmp.compare(value, &node.value) {
                Ordering::Less => match node.left() {
                    Some(left) if !self.cmp.compares_lt(left.max(), value) => left,
                    _ => return Some(node.into()),
                },
                Ordering::Equal => return Some(node.into()),
                Ordering::Greater => node.right()?,
            };
        }
    }

    /// Points whatever linked to `old` (its parent's matching child slot, or the root) at `new`.
    ///
    /// # Safety
    ///
    /// `parent` must be `old`'s current parent and all pointers must be live nodes of this set.
    unsafe fn replace_child(
        &mut self,
        parent: Option<NodePtr<T>>,
        old: NodePtr<T>,
        new: Option<NodePtr<T>>,
    ) {
        match parent {
            None => {
                self.root = Link(new);
                if let Some(new) = new {
                    Node::make_root(new);
                }
            }
            Some(parent) if parent.as_ref().left_ptr() == Some(old) => Node::set_left(parent, new),
            Some(parent) => Node::set_right(parent, new),
        }
    }

    /// Walks from `start` up to the root, rotating wherever one subtree got two levels taller than
    /// its sibling and refreshing every ancestor's cached fields on the way. The walk follows the
    /// ancestor chain as it was before any rotation: a rotation only changes which node tops the
    /// local subtree, not what lies above it.
    ///
    /// # Safety
    ///
    /// `start` must be a live node of this set (or `None`) whose descendants are already balanced
    /// with correct cached fields.
    unsafe fn rebalance_from(&mut self, start: Option<NodePtr<T>>) {
        let mut next = start;
        while let Some(node) = next {
            let parent = node.as_ref().parent_ptr();
            let state = node.as_ref().balance_state();
            let subtree = match state {
                BalanceState::LeftHeavyByTwo if node.as_ref().left_leans_outward() => {
                    log::trace!("rotating right at {:?}", node);
                    Node::rotate_right(node)
                }
                BalanceState::LeftHeavyByTwo => {
                    log::trace!("rotating left-right at {:?}", node);
                    Node::rotate_left_right(node)
                }
                BalanceState::RightHeavyByTwo if node.as_ref().right_leans_outward() => {
                    log::trace!("rotating left at {:?}", node);
                    Node::rotate_left(node)
                }
                BalanceState::RightHeavyByTwo => {
                    log::trace!("rotating right-left at {:?}", node);
                    Node::rotate_right_left(node)
                }
                BalanceState::Skewed => panic!(
                    "AVL balance lost at {:?}: subtree heights {} and {} differ by more than 2",
                    node,
                    node.as_ref().left_height(),
                    node.as_ref().right_height(),
                ),
                BalanceState::Balanced | BalanceState::LeftHeavy | BalanceState::RightHeavy => {
                    Node::recompute(node);
                    node
                }
            };
            if subtree != node {
                self.replace_child(parent, node, Some(subtree));
            }

            if cfg!(debug_assertions) {
                let top = subtree.as_ref();
                let left_height = top.left_height();
                let right_height = top.right_height();
                assert_eq!(top.height(), left_height.max(right_height) + 1);
                assert!(left_height.abs_diff(right_height) <= 1);
            }

            next = parent;
        }
    }

    /// Copies the shape and values of `source` into this (empty) set, then recomputes every
    /// node's cached fields bottom-up rather than trusting the source's.
    fn copy_tree(&mut self, source: &Self)
    where
        T: Clone,
    {
        debug_assert!(self.root.0.is_none());
        let Some(source_root) = source.root.node() else {
            return;
        };

        let root = Node::new_leaf(source_root.value.clone());
        // Linked right away so a panicking `clone` still frees everything copied so far.
        self.root = Link(Some(root));

        // Parents always come before their children in `copied`.
        let mut copied = Vec::with_capacity(source.len);
        let mut pending = vec![(source_root, root)];
        while let Some((from, to)) = pending.pop() {
            copied.push(to);
            // SAFETY: `to` is a live node owned by `self` and none of its children are linked yet.
            unsafe {
                if let Some(left) = from.left() {
                    let new_left = Node::new_leaf(left.value.clone());
                    Node::set_left(to, Some(new_left));
                    pending.push((left, new_left));
                }
                if let Some(right) = from.right() {
                    let new_right = Node::new_leaf(right.value.clone());
                    Node::set_right(to, Some(new_right));
                    pending.push((right, new_right));
                }
            }
        }

        for node in copied.into_iter().rev() {
            // SAFETY: Going backwards, a node's children have always been recomputed before it.
            unsafe { Node::recompute(node) };
        }
        self.len = source.len;
    }
}

#[cfg(test)]
impl<T, C> Set<T, C>
where
    C: Compare<T>,
{
    fn root(&self) -> Option<&Node<T>> {
        self.root.node()
    }

    /// Checks every invariant of the tree against an independent traversal: ordering, balance,
    /// parent links, the cached height, minimum and maximum, and the element count.
    pub(crate) fn validate(&self) {
        match self.root() {
            Some(root) => {
                assert!(root.parent_ptr().is_none(), "root has a parent");
                let summary = self.validate_node(root);
                assert_eq!(summary.count, self.len, "len doesn't match node count");
            }
            None => assert_eq!(self.len, 0, "empty tree with non-zero len"),
        }
    }

    fn validate_node<'a>(&self, node: &'a Node<T>) -> Summary<'a, T> {
        let node_ptr = NodePtr::from(node);
        let mut summary = Summary {
            height: 1,
            count: 1,
            min: &node.value,
            max: &node.value,
        };
        let mut left_height = 0;
        let mut right_height = 0;

        if let Some(left) = node.left() {
            assert_eq!(left.parent_ptr(), Some(node_ptr), "left child's parent is wrong");
            let left_summary = self.validate_node(left);
            assert!(
                self.cmp.compares_lt(left_summary.max, &node.value),
                "left subtree out of order"
            );
            left_height = left_summary.height;
            summary.count += left_summary.count;
            summary.min = left_summary.min;
        }
        if let Some(right) = node.right() {
            assert_eq!(right.parent_ptr(), Some(node_ptr), "right child's parent is wrong");
            let right_summary = self.validate_node(right);
            assert!(
                self.cmp.compares_gt(right_summary.min, &node.value),
                "right subtree out of order"
            );
            right_height = right_summary.height;
            summary.count += right_summary.count;
            summary.max = right_summary.max;
        }

        summary.height += left_height.max(right_height);
        assert!(left_height.abs_diff(right_height) <= 1, "node is unbalanced");
        assert_eq!(node.height(), summary.height, "cached height is stale");
        assert!(self.cmp.compares_eq(node.min(), summary.min), "cached min is stale");
        assert!(self.cmp.compares_eq(node.max(), summary.max), "cached max is stale");
        summary
    }
}

/// What an independent traversal found out about a subtree.
#[cfg(test)]
struct Summary<'a, T> {
    height: usize,
    count: usize,
    min: &'a T,
    max: &'a T,
}
