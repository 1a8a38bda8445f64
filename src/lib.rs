extern crate alloc;

use core::fmt;
use core::mem;
use std::cmp::Ordering;

use alloc::vec::Vec;

/*
Nodes live in a flat arena indexed by `NodeIndex`, with slot 0 acting as the
tree's always-black sentinel. Freed cells are chained through their `parent`
field into a free list headed by `free_head`: allocating pops the head, and
releasing a node pushes its cell back, so the arena never needs compaction.

Color is stored as a byte in every node; a bitmap (or tagging the parent
index) could shave memory if that ever matters.
*/

mod error;
mod iter;
mod map;

pub use crate::error::BlackwoodError;
pub use crate::iter::BlackwoodSortedIterator;
pub use crate::map::BlackwoodMap;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NodeColor {
    #[default]
    Red,
    Black,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct NodeIndex(usize);

#[derive(Debug)]
struct BlackwoodNode<K> {
    key: K,
    color: NodeColor,
    parent: NodeIndex,
    left: NodeIndex,
    right: NodeIndex,
}

impl<K> BlackwoodNode<K> {
    fn new_isolated(key: K) -> Self {
        Self {
            key,
            color: NodeColor::default(),
            parent: NodeIndex(0),
            left: NodeIndex(0),
            right: NodeIndex(0),
        }
    }

    fn left_child(&self) -> NodeIndex {
        self.left
    }

    fn right_child(&self) -> NodeIndex {
        self.right
    }
}

impl<K: Default> Default for BlackwoodNode<K> {
    fn default() -> Self {
        Self {
            key: K::default(),
            color: NodeColor::Black,
            parent: NodeIndex(0),
            left: NodeIndex(0),
            right: NodeIndex(0),
        }
    }
}

/// An ordered set of unique keys, backed by a Red-Black tree.
///
/// Inserting a key that is already present leaves the tree untouched, and
/// removing a missing key is a no-op. Both operations report what they did.
pub struct Blackwood<K: PartialEq + Ord> {
    storage: Vec<BlackwoodNode<K>>,
    root: NodeIndex,
    free_head: NodeIndex,
    length: usize,
}

impl<K: PartialEq + Ord> Blackwood<K> {
    const BLACK_NIL: NodeIndex = NodeIndex(0);

    #[must_use]
    pub fn len(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn reserve(&mut self, additional: usize) {
        self.storage.reserve(additional);
    }

    fn get_node_by_idx(&self, node_idx: NodeIndex) -> &BlackwoodNode<K> {
        &self.storage[node_idx.0]
    }

    fn get_node_by_idx_mut(&mut self, node_idx: NodeIndex) -> &mut BlackwoodNode<K> {
        &mut self.storage[node_idx.0]
    }

    pub fn contains(&self, key: &K) -> bool {
        self.find_node(key) != Self::BLACK_NIL
    }

    pub fn get(&self, key: &K) -> Option<&K> {
        let node_idx = self.find_node(key);

        if node_idx == Self::BLACK_NIL {
            return None;
        }

        Some(&self.get_node_by_idx(node_idx).key)
    }

    /// Mutable access to a stored key. The caller must not alter the part
    /// of the key its `Ord` implementation looks at.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut K> {
        let node_idx = self.find_node(key);

        if node_idx == Self::BLACK_NIL {
            return None;
        }

        Some(&mut self.get_node_by_idx_mut(node_idx).key)
    }

    fn find_node(&self, key: &K) -> NodeIndex {
        let mut current_node = self.root;

        while current_node != Self::BLACK_NIL {
            let curr_node_storage = self.get_node_by_idx(current_node);

            match key.cmp(&curr_node_storage.key) {
                Ordering::Less => {
                    current_node = curr_node_storage.left;
                }
                Ordering::Equal => {
                    return current_node;
                }
                Ordering::Greater => {
                    current_node = curr_node_storage.right;
                }
            }
        }

        Self::BLACK_NIL
    }

    fn minimum(&self, mut node_idx: NodeIndex) -> NodeIndex {
        while self.get_node_by_idx(node_idx).left != Self::BLACK_NIL {
            node_idx = self.get_node_by_idx(node_idx).left;
        }

        node_idx
    }

    /// Inserts `key` into the tree.
    ///
    /// Returns `Ok(true)` if the key was inserted, `Ok(false)` if an equal
    /// key was already present (the existing entry is kept untouched), and
    /// `Err(BlackwoodError::InvalidKey)` if no key was supplied. The tree is
    /// unchanged in the two latter cases.
    pub fn insert(&mut self, key: impl Into<Option<K>>) -> Result<bool, BlackwoodError> {
        let key = key.into().ok_or(BlackwoodError::InvalidKey)?;

        Ok(self.insert_key(key))
    }

    fn insert_key(&mut self, key: K) -> bool {
        let mut current_node = self.root;
        let mut parent_node = Self::BLACK_NIL;
        let mut goes_left = false;

        while current_node != Self::BLACK_NIL {
            parent_node = current_node;
            let curr_node_storage = self.get_node_by_idx(current_node);

            match key.cmp(&curr_node_storage.key) {
                Ordering::Less => {
                    goes_left = true;
                    current_node = curr_node_storage.left;
                }
                Ordering::Equal => {
                    return false;
                }
                Ordering::Greater => {
                    goes_left = false;
                    current_node = curr_node_storage.right;
                }
            }
        }

        let new_node_pos = self.allocate_node(key);

        if parent_node == Self::BLACK_NIL {
            self.root = new_node_pos;
        } else if goes_left {
            self.get_node_by_idx_mut(parent_node).left = new_node_pos;
        } else {
            self.get_node_by_idx_mut(parent_node).right = new_node_pos;
        }

        self.get_node_by_idx_mut(new_node_pos).parent = parent_node;
        self.length += 1;

        self.fix_red_violation(new_node_pos);

        true
    }

    fn allocate_node(&mut self, key: K) -> NodeIndex {
        let node = BlackwoodNode::new_isolated(key);

        if self.free_head != Self::BLACK_NIL {
            let slot = self.free_head;
            self.free_head = self.get_node_by_idx(slot).parent;
            self.storage[slot.0] = node;

            return slot;
        }

        let slot = NodeIndex(self.storage.len());
        self.storage.push(node);

        slot
    }

    fn fix_red_violation(&mut self, start_node_idx: NodeIndex) {
        let mut curr_node = start_node_idx;

        while matches!(
            self.get_node_by_idx(self.get_node_by_idx(curr_node).parent)
                .color,
            NodeColor::Red
        ) {
            let parent_idx = self.get_node_by_idx(curr_node).parent;
            let grandparent_idx = self.get_node_by_idx(parent_idx).parent;

            if grandparent_idx == Self::BLACK_NIL {
                break;
            }

            let grandparent = self.get_node_by_idx(grandparent_idx);
            let parent_is_right_child = grandparent.right == parent_idx;
            let uncle = if parent_is_right_child {
                grandparent.left
            } else {
                grandparent.right
            };

            if matches!(self.get_node_by_idx(uncle).color, NodeColor::Red) {
                self.get_node_by_idx_mut(parent_idx).color = NodeColor::Black;
                self.get_node_by_idx_mut(uncle).color = NodeColor::Black;
                self.get_node_by_idx_mut(grandparent_idx).color = NodeColor::Red;

                curr_node = grandparent_idx;
                continue;
            }

            let parent = self.get_node_by_idx(parent_idx);
            if (parent_is_right_child && parent.left == curr_node)
                || (!parent_is_right_child && parent.right == curr_node)
            {
                if parent_is_right_child {
                    self.rotate_right(parent_idx);
                } else {
                    self.rotate_left(parent_idx);
                }

                curr_node = parent_idx;
                continue;
            }

            self.get_node_by_idx_mut(parent_idx).color = NodeColor::Black;
            self.get_node_by_idx_mut(grandparent_idx).color = NodeColor::Red;

            if parent_is_right_child {
                self.rotate_left(grandparent_idx);
            } else {
                self.rotate_right(grandparent_idx);
            }
        }

        // The recoloring case can push red all the way up.
        let root = self.root;
        self.get_node_by_idx_mut(root).color = NodeColor::Black;
    }

    fn fix_black_violation(&mut self, start_node_idx: NodeIndex) {
        let mut curr_node = start_node_idx;

        while curr_node != self.root
            && matches!(self.get_node_by_idx(curr_node).color, NodeColor::Black)
        {
            let parent_idx = self.get_node_by_idx(curr_node).parent;
            let curr_is_left_child = self.get_node_by_idx(parent_idx).left == curr_node;

            let mut sibling = if curr_is_left_child {
                self.get_node_by_idx(parent_idx).right
            } else {
                self.get_node_by_idx(parent_idx).left
            };

            if matches!(self.get_node_by_idx(sibling).color, NodeColor::Red) {
                self.get_node_by_idx_mut(sibling).color = NodeColor::Black;
                self.get_node_by_idx_mut(parent_idx).color = NodeColor::Red;

                if curr_is_left_child {
                    self.rotate_left(parent_idx);
                    sibling = self.get_node_by_idx(parent_idx).right;
                } else {
                    self.rotate_right(parent_idx);
                    sibling = self.get_node_by_idx(parent_idx).left;
                }
            }

            let sibling_node = self.get_node_by_idx(sibling);
            let (near_nephew, mut far_nephew) = if curr_is_left_child {
                (sibling_node.left, sibling_node.right)
            } else {
                (sibling_node.right, sibling_node.left)
            };

            if matches!(self.get_node_by_idx(near_nephew).color, NodeColor::Black)
                && matches!(self.get_node_by_idx(far_nephew).color, NodeColor::Black)
            {
                self.get_node_by_idx_mut(sibling).color = NodeColor::Red;

                // The only case that moves the missing black upward.
                curr_node = parent_idx;
                continue;
            }

            if matches!(self.get_node_by_idx(far_nephew).color, NodeColor::Black) {
                self.get_node_by_idx_mut(near_nephew).color = NodeColor::Black;
                self.get_node_by_idx_mut(sibling).color = NodeColor::Red;

                if curr_is_left_child {
                    self.rotate_right(sibling);
                    sibling = self.get_node_by_idx(parent_idx).right;
                    far_nephew = self.get_node_by_idx(sibling).right;
                } else {
                    self.rotate_left(sibling);
                    sibling = self.get_node_by_idx(parent_idx).left;
                    far_nephew = self.get_node_by_idx(sibling).left;
                }
            }

            let parent_color = self.get_node_by_idx(parent_idx).color;
            self.get_node_by_idx_mut(sibling).color = parent_color;
            self.get_node_by_idx_mut(parent_idx).color = NodeColor::Black;
            self.get_node_by_idx_mut(far_nephew).color = NodeColor::Black;

            if curr_is_left_child {
                self.rotate_left(parent_idx);
            } else {
                self.rotate_right(parent_idx);
            }

            curr_node = self.root;
        }

        self.get_node_by_idx_mut(curr_node).color = NodeColor::Black;
    }

    // Replaces the subtree rooted at `removed` with the one rooted at
    // `replacement`, which may be the sentinel. The sentinel's parent field
    // is rewritten like any other so the delete fixup can walk up from it.
    fn transplant(&mut self, removed: NodeIndex, replacement: NodeIndex) {
        let removed_parent = self.get_node_by_idx(removed).parent;

        if removed_parent == Self::BLACK_NIL {
            self.root = replacement;
        } else if self.get_node_by_idx(removed_parent).left == removed {
            self.get_node_by_idx_mut(removed_parent).left = replacement;
        } else {
            self.get_node_by_idx_mut(removed_parent).right = replacement;
        }

        self.get_node_by_idx_mut(replacement).parent = removed_parent;
    }

    fn rotate_left(&mut self, center: NodeIndex) {
        let grandparent_idx = self.get_node_by_idx(center).parent;
        let sibling_idx = self.get_node_by_idx(center).right;

        let c_idx = self.get_node_by_idx(sibling_idx).left;

        self.get_node_by_idx_mut(center).right = c_idx;
        self.get_node_by_idx_mut(c_idx).parent = center;

        self.get_node_by_idx_mut(sibling_idx).left = center;
        self.get_node_by_idx_mut(center).parent = sibling_idx;
        self.get_node_by_idx_mut(sibling_idx).parent = grandparent_idx;

        if grandparent_idx != Self::BLACK_NIL {
            if self.get_node_by_idx(grandparent_idx).right == center {
                self.get_node_by_idx_mut(grandparent_idx).right = sibling_idx;
            } else {
                self.get_node_by_idx_mut(grandparent_idx).left = sibling_idx;
            }
        } else {
            self.root = sibling_idx;
        }
    }

    fn rotate_right(&mut self, center: NodeIndex) {
        let grandparent_idx = self.get_node_by_idx(center).parent;
        let sibling_idx = self.get_node_by_idx(center).left;

        let c_idx = self.get_node_by_idx(sibling_idx).right;

        self.get_node_by_idx_mut(center).left = c_idx;
        self.get_node_by_idx_mut(c_idx).parent = center;

        self.get_node_by_idx_mut(sibling_idx).right = center;
        self.get_node_by_idx_mut(center).parent = sibling_idx;
        self.get_node_by_idx_mut(sibling_idx).parent = grandparent_idx;

        if grandparent_idx != Self::BLACK_NIL {
            if self.get_node_by_idx(grandparent_idx).right == center {
                self.get_node_by_idx_mut(grandparent_idx).right = sibling_idx;
            } else {
                self.get_node_by_idx_mut(grandparent_idx).left = sibling_idx;
            }
        } else {
            self.root = sibling_idx;
        }
    }

    pub fn iter(&self) -> BlackwoodSortedIterator<'_, K> {
        BlackwoodSortedIterator {
            tree: self,
            curr: self.root,
            stack: Vec::new(),
        }
    }

    /// Ordered sequence of `(key, color)` pairs, freshly computed.
    pub fn inorder(&self) -> Vec<(&K, NodeColor)> {
        let mut output = Vec::with_capacity(self.length);
        let mut stack = Vec::new();
        let mut curr_node = self.root;

        loop {
            while curr_node != Self::BLACK_NIL {
                stack.push(curr_node);
                curr_node = self.get_node_by_idx(curr_node).left;
            }

            let Some(node_idx) = stack.pop() else {
                break;
            };

            let node = self.get_node_by_idx(node_idx);
            output.push((&node.key, node.color));
            curr_node = node.right;
        }

        output
    }

    /// Checks the Red-Black invariants: black root, no two adjacent red
    /// nodes, equal black counts on every path down to a sentinel, and
    /// strictly sorted entries.
    pub fn validate(&self) -> Result<(), BlackwoodError> {
        if self.root != Self::BLACK_NIL
            && matches!(self.get_node_by_idx(self.root).color, NodeColor::Red)
        {
            return Err(BlackwoodError::RedRoot);
        }

        self.validate_subtree(self.root)?;

        let entries = self.inorder();
        for pair in entries.windows(2) {
            if pair[0].0 >= pair[1].0 {
                return Err(BlackwoodError::SortError);
            }
        }

        Ok(())
    }

    fn validate_subtree(&self, node_idx: NodeIndex) -> Result<usize, BlackwoodError> {
        if node_idx == Self::BLACK_NIL {
            return Ok(1);
        }

        let node = self.get_node_by_idx(node_idx);

        if matches!(node.color, NodeColor::Red)
            && (matches!(self.get_node_by_idx(node.left).color, NodeColor::Red)
                || matches!(self.get_node_by_idx(node.right).color, NodeColor::Red))
        {
            return Err(BlackwoodError::ConsecutiveReds);
        }

        let left_blacks = self.validate_subtree(node.left)?;
        let right_blacks = self.validate_subtree(node.right)?;

        if left_blacks != right_blacks {
            return Err(BlackwoodError::UnbalancedBlacks(format!(
                "{left_blacks} blacks on the left, {right_blacks} on the right"
            )));
        }

        Ok(left_blacks + usize::from(matches!(node.color, NodeColor::Black)))
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.subtree_height(self.root)
    }

    fn subtree_height(&self, node_idx: NodeIndex) -> usize {
        if node_idx == Self::BLACK_NIL {
            return 0;
        }

        let node = self.get_node_by_idx(node_idx);

        1 + self
            .subtree_height(node.left)
            .max(self.subtree_height(node.right))
    }
}

impl<K: Default + PartialEq + Ord> Blackwood<K> {
    pub fn new() -> Self {
        Self {
            storage: alloc::vec![BlackwoodNode::default()],
            root: Self::BLACK_NIL,
            free_head: Self::BLACK_NIL,
            length: 0,
        }
    }

    /// Removes `key` from the tree, reporting whether it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        self.take(key).is_some()
    }

    /// Removes `key` from the tree and hands back the stored key.
    pub fn take(&mut self, key: &K) -> Option<K> {
        let target = self.find_node(key);

        if target == Self::BLACK_NIL {
            return None;
        }

        Some(self.remove_node(target))
    }

    fn remove_node(&mut self, target: NodeIndex) -> K {
        let mut removed_color = self.get_node_by_idx(target).color;
        let fixup_start;

        if self.get_node_by_idx(target).left == Self::BLACK_NIL {
            fixup_start = self.get_node_by_idx(target).right;
            self.transplant(target, fixup_start);
        } else if self.get_node_by_idx(target).right == Self::BLACK_NIL {
            fixup_start = self.get_node_by_idx(target).left;
            self.transplant(target, fixup_start);
        } else {
            let successor = self.minimum(self.get_node_by_idx(target).right);
            removed_color = self.get_node_by_idx(successor).color;
            fixup_start = self.get_node_by_idx(successor).right;

            if self.get_node_by_idx(successor).parent == target {
                // `fixup_start` can be the sentinel here, whose parent field
                // would otherwise go stale before the fixup walks up from it.
                self.get_node_by_idx_mut(fixup_start).parent = successor;
            } else {
                self.transplant(successor, fixup_start);

                let target_right = self.get_node_by_idx(target).right;
                self.get_node_by_idx_mut(successor).right = target_right;
                self.get_node_by_idx_mut(target_right).parent = successor;
            }

            self.transplant(target, successor);

            let target_left = self.get_node_by_idx(target).left;
            self.get_node_by_idx_mut(successor).left = target_left;
            self.get_node_by_idx_mut(target_left).parent = successor;

            let target_color = self.get_node_by_idx(target).color;
            self.get_node_by_idx_mut(successor).color = target_color;
        }

        if matches!(removed_color, NodeColor::Black) {
            self.fix_black_violation(fixup_start);
        }

        self.length -= 1;

        self.release_node(target)
    }

    fn release_node(&mut self, slot: NodeIndex) -> K {
        let free_head = self.free_head;
        let node = self.get_node_by_idx_mut(slot);

        let key = mem::take(&mut node.key);
        node.color = NodeColor::Black;
        node.parent = free_head;
        node.left = Self::BLACK_NIL;
        node.right = Self::BLACK_NIL;

        self.free_head = slot;

        key
    }
}

impl<K: Default + PartialEq + Ord> Default for Blackwood<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PartialEq + Ord + fmt::Debug> fmt::Debug for Blackwood<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.root == Self::BLACK_NIL {
            return writeln!(f, "empty tree");
        }

        self.fmt_subtree(f, self.root, 0, "root: ")
    }
}

impl<K: PartialEq + Ord + fmt::Debug> Blackwood<K> {
    fn fmt_subtree(
        &self,
        f: &mut fmt::Formatter<'_>,
        node_idx: NodeIndex,
        level: usize,
        prefix: &str,
    ) -> fmt::Result {
        let node = self.get_node_by_idx(node_idx);
        let tag = match node.color {
            NodeColor::Red => "R",
            NodeColor::Black => "B",
        };

        writeln!(
            f,
            "{:indent$}{prefix}{:?} ({tag})",
            "",
            node.key,
            indent = level * 4
        )?;

        if node.left == Self::BLACK_NIL && node.right == Self::BLACK_NIL {
            return Ok(());
        }

        if node.left != Self::BLACK_NIL {
            self.fmt_subtree(f, node.left, level + 1, "l: ")?;
        } else {
            writeln!(f, "{:indent$}l: NIL (B)", "", indent = (level + 1) * 4)?;
        }

        if node.right != Self::BLACK_NIL {
            self.fmt_subtree(f, node.right, level + 1, "r: ")?;
        } else {
            writeln!(f, "{:indent$}r: NIL (B)", "", indent = (level + 1) * 4)?;
        }

        Ok(())
    }
}
