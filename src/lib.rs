//! An ordered set built on a height-balanced Binary Search Tree (BST).
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored records. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` will typically store
//! some sort of value (the value that was inserted, for example) and will
//! sometimes have child `Node`s. The most important invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    value less than its own value.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    value greater than its own value.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Searching for values in the tree takes `O(height)` (where `height` is defined as the longest
//! path from the root `Node` to a leaf `Node`). [`Set`] keeps the height at `O(lg N)` by
//! maintaining the AVL invariant: the two subtrees of every `Node` differ in height by at most one.
//!
//! ## Augmentation
//!
//! Every `Node` of a [`Set`] also remembers its parent and the smallest and largest values of its
//! subtree. The parent links let a [`Cursor`] step to the next or previous value without a stack,
//! and the cached bounds let [`Set::lower_bound`] skip subtrees that can't hold the answer.
//!
//! # Examples
//!
//! ```
//! use avl_set::Set;
//!
//! let mut set = Set::from([5, 3, 8, 1, 4, 7, 9]);
//! set.erase(&5);
//!
//! assert_eq!(set.len(), 6);
//! assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 3, 4, 7, 8, 9]);
//!
//! let mut cursor = set.lower_bound(&5);
//! assert_eq!(cursor.get(), Some(&7));
//! cursor.move_prev();
//! assert_eq!(cursor.get(), Some(&4));
//! ```

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

mod cursor;
mod node;
mod set;

#[cfg(test)]
mod test;

pub use crate::cursor::{Cursor, Iter};
pub use crate::set::Set;
