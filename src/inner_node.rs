// src/inner_node.rs

use crate::error::{Result, TreeError};
use crate::node::NodeId;

/// Internal-node state: the owned child ids. Keys live in the shared node
/// record; `children.len() == keys.len() + 1` outside of a split.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InnerNode {
    children: Vec<NodeId>,
}

/// Keys and children of an overflowed internal node, partitioned for a split.
#[derive(Debug, PartialEq, Eq)]
pub struct InnerSplit<K> {
    pub left: Vec<K>,
    pub left_children: Vec<NodeId>,
    /// Promoted key. It appears in neither half.
    pub separator: K,
    pub right: Vec<K>,
    pub right_children: Vec<NodeId>,
}

impl InnerNode {
    pub fn new(children: Vec<NodeId>) -> Self {
        Self { children }
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Seeds a brand-new root with the node that is about to split under it.
    pub fn add_initial_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    /// Finds the child for `key`: the first position `i` with
    /// `key <= keys[i]`, or the last child when `key` exceeds every key.
    pub fn child_for<K: Ord>(&self, keys: &[K], key: &K) -> Option<NodeId> {
        let pos = keys.partition_point(|k| k < key);
        self.children.get(pos).copied()
    }

    /// Inserts `separator` and `right` so that `right` sits immediately after
    /// `left`, the child whose range was just split.
    pub fn add_separator<K>(
        &mut self,
        keys: &mut Vec<K>,
        separator: K,
        left: NodeId,
        right: NodeId,
    ) -> Result<()> {
        let pos = self
            .children
            .iter()
            .position(|&child| child == left)
            .ok_or_else(|| TreeError::invariant(format!("node {left} is not a child of its parent")))?;

        if pos > keys.len() {
            return Err(TreeError::invariant(format!(
                "child position {} past {} keys",
                pos,
                keys.len()
            )));
        }

        keys.insert(pos, separator);
        self.children.insert(pos + 1, right);
        Ok(())
    }

    /// Moves every child out, leaving the node empty until it is refilled.
    pub fn take_children(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.children)
    }

    pub fn set_children(&mut self, children: Vec<NodeId>) {
        self.children = children;
    }

    /// Splits ascending `keys` and their `children` in lock-step: the first
    /// `split_point` keys and `split_point + 1` children stay left, the next
    /// key is promoted, the rest go right.
    pub fn partition<K>(
        mut keys: Vec<K>,
        mut children: Vec<NodeId>,
        split_point: usize,
    ) -> Result<InnerSplit<K>> {
        if children.len() != keys.len() + 1 {
            return Err(TreeError::invariant(format!(
                "splitting internal node with {} keys but {} children",
                keys.len(),
                children.len()
            )));
        }
        if split_point >= keys.len() {
            return Err(TreeError::invariant(format!(
                "internal split point {} leaves no key to promote out of {}",
                split_point,
                keys.len()
            )));
        }

        let mut rest = keys.split_off(split_point).into_iter();
        let separator = rest
            .next()
            .ok_or_else(|| TreeError::invariant("internal split found no separator"))?;
        let right: Vec<K> = rest.collect();
        let right_children = children.split_off(split_point + 1);

        Ok(InnerSplit {
            left: keys,
            left_children: children,
            separator,
            right,
            right_children,
        })
    }
}
