// src/leaf_chain.rs

use std::slice;

use crate::bp_tree::BPlusTree;
use crate::node::{Node, NodeId};
use crate::node_table::NodeTable;

/// Leaves in chain order, starting at the leftmost leaf.
///
/// Stops after as many steps as there are nodes, so a corrupted chain that
/// loops back on itself cannot spin forever.
pub struct Leaves<'a, K> {
    nodes: &'a NodeTable<K>,
    next: Option<NodeId>,
    remaining: usize,
}

impl<'a, K> Iterator for Leaves<'a, K> {
    type Item = (NodeId, &'a Node<K>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.next?;
        let node = self.nodes.get(id)?;
        self.next = node.next_leaf();
        self.remaining -= 1;
        Some((id, node))
    }
}

/// Every key in ascending order, read off the leaf chain.
pub struct Keys<'a, K> {
    leaves: Leaves<'a, K>,
    current: slice::Iter<'a, K>,
}

impl<'a, K> Iterator for Keys<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(key) = self.current.next() {
                return Some(key);
            }
            let (_, leaf) = self.leaves.next()?;
            self.current = leaf.keys().iter();
        }
    }
}

impl<K> BPlusTree<K> {
    pub fn leaves(&self) -> Leaves<'_, K> {
        Leaves {
            nodes: self.nodes(),
            next: self.leftmost_leaf().ok(),
            remaining: self.nodes().len(),
        }
    }

    pub fn iter(&self) -> Keys<'_, K> {
        Keys {
            leaves: self.leaves(),
            current: <&[K]>::default().iter(),
        }
    }
}

impl<'a, K> IntoIterator for &'a BPlusTree<K> {
    type Item = &'a K;
    type IntoIter = Keys<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
