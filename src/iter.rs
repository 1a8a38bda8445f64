use alloc::vec::Vec;

use crate::{Blackwood, NodeIndex};

/// In-order iterator over the keys of a [`Blackwood`] tree.
///
/// Walks the tree with an explicit stack, so the call depth stays constant
/// regardless of the tree's shape.
pub struct BlackwoodSortedIterator<'a, K: Ord> {
    pub(crate) tree: &'a Blackwood<K>,
    pub(crate) curr: NodeIndex,
    pub(crate) stack: Vec<NodeIndex>,
}

impl<'a, K: Ord> Iterator for BlackwoodSortedIterator<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        while self.curr != Blackwood::<K>::BLACK_NIL {
            self.stack.push(self.curr);
            self.curr = self.tree.get_node_by_idx(self.curr).left_child();
        }

        if let Some(node) = self.stack.pop() {
            self.curr = self.tree.get_node_by_idx(node).right_child();

            return Some(&self.tree.get_node_by_idx(node).key);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use crate::Blackwood;

    #[test]
    pub fn empty_tree_iteration() {
        let tree = Blackwood::<usize>::new();

        assert!(tree.iter().next().is_none());
    }

    #[test]
    pub fn sorted_iteration() {
        let mut tree = Blackwood::<i32>::new();

        for key in [41, 13, 8, 99, 27, -4, 56] {
            tree.insert(key).unwrap();
        }

        let keys: Vec<i32> = tree.iter().copied().collect();
        assert_eq!(keys, [-4, 8, 13, 27, 41, 56, 99]);
    }

    #[test]
    pub fn iteration_skips_removed_keys() {
        let mut tree = Blackwood::<i32>::new();

        for key in 0..10 {
            tree.insert(key).unwrap();
        }
        for key in [2, 5, 7] {
            tree.remove(&key);
        }

        let keys: Vec<i32> = tree.iter().copied().collect();
        assert_eq!(keys, [0, 1, 3, 4, 6, 8, 9]);
    }
}
