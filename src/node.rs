//! The augmented AVL node that [`Set`](crate::Set) is built from.
//!
//! Every node owns its children through raw `NonNull` links and keeps a non-owning link back to
//! its parent. Besides the value, each node caches the height of its subtree and links to the
//! nodes holding the smallest and largest values of its subtree. All structural edits go through
//! [`Node::set_left`] and [`Node::set_right`], which recompute those cached fields, so they can't
//! drift away from the actual shape of the tree.

use std::ptr::NonNull;

pub(crate) type NodePtr<T> = NonNull<Node<T>>;

/// A possibly empty link to a `Node`. Used for children (owning) and parents (non-owning) alike;
/// ownership is decided by the `Set`, never by the link itself.
pub(crate) struct Link<T>(pub(crate) Option<NodePtr<T>>);

impl<T> Clone for Link<T> {
    fn clone(&self) -> Self {
        Self(self.0)
    }
}
impl<T> Copy for Link<T> {}

impl<T> Link<T> {
    pub(crate) const NONE: Self = Link(None);

    pub(crate) fn node(&self) -> Option<&Node<T>> {
        // SAFETY: A non-`None` link always points at a live `Node` allocated by
        // `Node::new_leaf`. Nodes are only freed after every link to them has been cleared, and
        // mutation happens through `&mut Set`, so no `&mut Node` can exist alongside this
        // reference.
        unsafe { self.0.as_ref().map(|ptr| ptr.as_ref()) }
    }

    fn height(&self) -> usize {
        self.node().map_or(0, |n| n.height)
    }
}

/// How the heights of a node's two subtrees relate. See [the Wikipedia page][wiki] for the
/// rebalancing cases this feeds into.
///
/// [wiki]: https://en.wikipedia.org/wiki/AVL_tree#Rebalancing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BalanceState {
    Balanced,
    LeftHeavy,
    LeftHeavyByTwo,
    RightHeavy,
    RightHeavyByTwo,
    /// The subtrees differ by more than two levels. Correct maintenance never produces this.
    Skewed,
}

pub(crate) struct Node<T> {
    pub(crate) value: T,
    left: Link<T>,
    right: Link<T>,
    parent: Link<T>,
    /// How many levels are in the subtree rooted at this node. A node with no children has a
    /// height of 1.
    height: usize,
    /// The node holding the smallest value of this subtree.
    min: NodePtr<T>,
    /// The node holding the largest value of this subtree.
    max: NodePtr<T>,
}

impl<T> Node<T> {
    /// Allocates a detached leaf holding `value`. Its `min` and `max` point at itself.
    pub(crate) fn new_leaf(value: T) -> NodePtr<T> {
        let node = NonNull::from(Box::leak(Box::new(Node {
            value,
            left: Link::NONE,
            right: Link::NONE,
            parent: Link::NONE,
            height: 1,
            min: NonNull::dangling(),
            max: NonNull::dangling(),
        })));
        // SAFETY: `node` was just allocated and nothing else references it yet.
        unsafe {
            (*node.as_ptr()).min = node;
            (*node.as_ptr()).max = node;
        }
        node
    }

    /// Frees `node` and hands back its value. Its children are *not* freed.
    ///
    /// # Safety
    ///
    /// `node` must have been allocated by [`Node::new_leaf`], must not be freed twice, and no link
    /// that will ever be followed again may still point at it.
    pub(crate) unsafe fn free(node: NodePtr<T>) -> T {
        Box::from_raw(node.as_ptr()).value
    }

    pub(crate) fn left(&self) -> Option<&Self> {
        self.left.node()
    }

    pub(crate) fn right(&self) -> Option<&Self> {
        self.right.node()
    }

    pub(crate) fn parent(&self) -> Option<&Self> {
        self.parent.node()
    }

    pub(crate) fn left_ptr(&self) -> Option<NodePtr<T>> {
        self.left.0
    }

    pub(crate) fn right_ptr(&self) -> Option<NodePtr<T>> {
        self.right.0
    }

    pub(crate) fn parent_ptr(&self) -> Option<NodePtr<T>> {
        self.parent.0
    }

    pub(crate) fn height(&self) -> usize {
        self.height
    }

    pub(crate) fn left_height(&self) -> usize {
        self.left.height()
    }

    pub(crate) fn right_height(&self) -> usize {
        self.right.height()
    }

    fn left_left_height(&self) -> usize {
        self.left().map_or(0, |n| n.left_height())
    }

    fn left_right_height(&self) -> usize {
        self.left().map_or(0, |n| n.right_height())
    }

    fn right_left_height(&self) -> usize {
        self.right().map_or(0, |n| n.left_height())
    }

    fn right_right_height(&self) -> usize {
        self.right().map_or(0, |n| n.right_height())
    }

    /// Whether the left-heavy case at this node needs a single right rotation (the left child
    /// leans left or not at all) rather than the double one.
    pub(crate) fn left_leans_outward(&self) -> bool {
        self.left_left_height() >= self.left_right_height()
    }

    /// Mirror image of [`Node::left_leans_outward`].
    pub(crate) fn right_leans_outward(&self) -> bool {
        self.right_right_height() >= self.right_left_height()
    }

    /// The smallest value in this subtree, read from the cache.
    pub(crate) fn min(&self) -> &T {
        // SAFETY: `min` always points into this subtree, whose nodes outlive `&self`.
        unsafe { &self.min.as_ref().value }
    }

    /// The largest value in this subtree, read from the cache.
    pub(crate) fn max(&self) -> &T {
        // SAFETY: `max` always points into this subtree, whose nodes outlive `&self`.
        unsafe { &self.max.as_ref().value }
    }

    pub(crate) fn min_ptr(&self) -> NodePtr<T> {
        self.min
    }

    pub(crate) fn max_ptr(&self) -> NodePtr<T> {
        self.max
    }

    /// Descends along left children to the first node of this subtree's in-order sequence.
    pub(crate) fn leftmost(&self) -> &Self {
        let mut node = self;
        while let Some(left) = node.left() {
            node = left;
        }
        node
    }

    /// Descends along right children to the last node of this subtree's in-order sequence.
    pub(crate) fn rightmost(&self) -> &Self {
        let mut node = self;
        while let Some(right) = node.right() {
            node = right;
        }
        node
    }

    /// Like [`Node::leftmost`], but follows the stored child links instead of borrowing, so the
    /// returned pointer can still be written through and freed.
    ///
    /// # Safety
    ///
    /// `node` must be live and must itself come from a stored link (or [`Node::new_leaf`]).
    pub(crate) unsafe fn leftmost_ptr(mut node: NodePtr<T>) -> NodePtr<T> {
        while let Some(left) = node.as_ref().left_ptr() {
            node = left;
        }
        node
    }

    /// Mirror image of [`Node::leftmost_ptr`].
    ///
    /// # Safety
    ///
    /// See [`Node::leftmost_ptr`].
    pub(crate) unsafe fn rightmost_ptr(mut node: NodePtr<T>) -> NodePtr<T> {
        while let Some(right) = node.as_ref().right_ptr() {
            node = right;
        }
        node
    }

    pub(crate) fn balance_state(&self) -> BalanceState {
        let left_height = self.left_height();
        let right_height = self.right_height();
        if left_height >= right_height {
            match left_height - right_height {
                0 => BalanceState::Balanced,
                1 => BalanceState::LeftHeavy,
                2 => BalanceState::LeftHeavyByTwo,
                _ => BalanceState::Skewed,
            }
        } else {
            match right_height - left_height {
                1 => BalanceState::RightHeavy,
                2 => BalanceState::RightHeavyByTwo,
                _ => BalanceState::Skewed,
            }
        }
    }

    /// Rebuilds `height`, `min` and `max` of `node` from its children. Idempotent.
    ///
    /// # Safety
    ///
    /// `node` must be live and its children's cached fields must already be correct.
    pub(crate) unsafe fn recompute(node: NodePtr<T>) {
        let this = &mut *node.as_ptr();
        let mut height = 1;
        let mut min = node;
        let mut max = node;
        if let Some(left) = this.left() {
            min = left.min;
            height = height.max(left.height + 1);
        }
        if let Some(right) = this.right() {
            max = right.max;
            height = height.max(right.height + 1);
        }
        this.height = height;
        this.min = min;
        this.max = max;
    }

    /// Replaces the left child of `node` with `child`, points `child` back at `node` and
    /// recomputes `node`. The previous left child (if any) is left dangling for the caller.
    ///
    /// # Safety
    ///
    /// `node` and `child` must be live, distinct, and `child` must not be an ancestor of `node`.
    pub(crate) unsafe fn set_left(node: NodePtr<T>, child: Option<NodePtr<T>>) {
        (*node.as_ptr()).left = Link(child);
        if let Some(child) = child {
            (*child.as_ptr()).parent = Link(Some(node));
        }
        Self::recompute(node);
    }

    /// Mirror image of [`Node::set_left`].
    ///
    /// # Safety
    ///
    /// See [`Node::set_left`].
    pub(crate) unsafe fn set_right(node: NodePtr<T>, child: Option<NodePtr<T>>) {
        (*node.as_ptr()).right = Link(child);
        if let Some(child) = child {
            (*child.as_ptr()).parent = Link(Some(node));
        }
        Self::recompute(node);
    }

    /// Detaches `node` from its parent link, making it the top of a tree.
    ///
    /// # Safety
    ///
    /// `node` must be live and whatever pointed at it as a child must have been relinked already.
    pub(crate) unsafe fn make_root(node: NodePtr<T>) {
        (*node.as_ptr()).parent = Link::NONE;
    }

    /// Rotate `node` to the left. This moves the right child up vertically and `node` down
    /// vertically. The new local root inherits `node`'s parent link; the caller is responsible
    /// for pointing that parent at it. Without a right child this does nothing and returns `node`.
    ///
    /// # Diagram
    ///
    /// ```text
    ///    Option<parent>                  Option<parent>
    ///      /                               /
    ///   node                            pivot
    ///   /  \                            /   \
    ///  x   pivot       rotate ->     node    z
    ///       / \                      /  \
    ///      y   z                    x    y
    /// ```
    ///
    /// # Safety
    ///
    /// `node` must be live and part of a tree whose links are consistent.
    pub(crate) unsafe fn rotate_left(node: NodePtr<T>) -> NodePtr<T> {
        let Some(pivot) = (*node.as_ptr()).right.0 else {
            return node;
        };
        let parent = (*node.as_ptr()).parent;

        Self::set_right(node, (*pivot.as_ptr()).left.0);
        Self::set_left(pivot, Some(node));
        (*pivot.as_ptr()).parent = parent;
        pivot
    }

    /// Rotate `node` to the right. Mirror image of [`Node::rotate_left`].
    ///
    /// # Diagram
    ///
    /// ```text
    ///      Option<parent>            Option<parent>
    ///        /                         /
    ///     node                       pivot
    ///     /  \                       /   \
    ///  pivot  z      rotate ->      x    node
    ///   / \                              /  \
    ///  x   y                            y    z
    /// ```
    ///
    /// # Safety
    ///
    /// See [`Node::rotate_left`].
    pub(crate) unsafe fn rotate_right(node: NodePtr<T>) -> NodePtr<T> {
        let Some(pivot) = (*node.as_ptr()).left.0 else {
            return node;
        };
        let parent = (*node.as_ptr()).parent;

        Self::set_left(node, (*pivot.as_ptr()).right.0);
        Self::set_right(pivot, Some(node));
        (*pivot.as_ptr()).parent = parent;
        pivot
    }

    /// The "big" left rotation fixing a right child that leans left: rotates the right child to
    /// the right, then `node` to the left.
    ///
    /// # Safety
    ///
    /// See [`Node::rotate_left`].
    pub(crate) unsafe fn rotate_right_left(node: NodePtr<T>) -> NodePtr<T> {
        let Some(right) = (*node.as_ptr()).right.0 else {
            return node;
        };
        let right = Self::rotate_right(right);
        Self::set_right(node, Some(right));
        Self::rotate_left(node)
    }

    /// The "big" right rotation fixing a left child that leans right: rotates the left child to
    /// the left, then `node` to the right.
    ///
    /// # Safety
    ///
    /// See [`Node::rotate_left`].
    pub(crate) unsafe fn rotate_left_right(node: NodePtr<T>) -> NodePtr<T> {
        let Some(left) = (*node.as_ptr()).left.0 else {
            return node;
        };
        let left = Self::rotate_left(left);
        Self::set_left(node, Some(left));
        Self::rotate_right(node)
    }
}
