// src/bp_tree.rs

use std::mem;

use log::{debug, trace};

use crate::config::TreeConfig;
use crate::error::{Result, TreeError};
use crate::inner_node::{InnerNode, InnerSplit};
use crate::leaf_node::{LeafNode, LeafSplit};
use crate::node::{Node, NodeId};
use crate::node_table::NodeTable;

/// In-memory B+ tree over keys only.
///
/// The tree owns a node table; every internal node routes to the ids of its
/// children, and leaves are chained left to right through `next`. Duplicate
/// keys are kept.
#[derive(Debug)]
pub struct BPlusTree<K> {
    config: TreeConfig,
    nodes: NodeTable<K>,
    root: NodeId,
    len: usize,
}

impl<K> BPlusTree<K> {
    /// Creates an empty tree with branching factor `degree`.
    ///
    /// Fails with [`TreeError::Configuration`] when `degree < 3`.
    pub fn new(degree: usize) -> Result<Self> {
        Ok(Self::with_config(TreeConfig::new(degree)?))
    }

    /// Creates an empty tree whose root is a single empty leaf.
    pub fn with_config(config: TreeConfig) -> Self {
        let mut nodes = NodeTable::new();
        let root = nodes.allocate(Node::leaf(None, Vec::new(), None));
        Self {
            config,
            nodes,
            root,
            len: 0,
        }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn degree(&self) -> usize {
        self.config.degree()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node<K>> {
        self.nodes.get(id)
    }

    pub(crate) fn nodes(&self) -> &NodeTable<K> {
        &self.nodes
    }

    /// Number of keys inserted so far, duplicates included.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels, counting the leaf level.
    pub fn height(&self) -> Result<usize> {
        let mut height = 1;
        let mut current = self.nodes.node(self.root)?;
        while let Some(&first) = current.children().first() {
            current = self.nodes.node(first)?;
            height += 1;
        }
        Ok(height)
    }

    /// Leaf reached by always following the first child.
    pub fn leftmost_leaf(&self) -> Result<NodeId> {
        let mut current = self.root;
        loop {
            let node = self.nodes.node(current)?;
            if node.is_leaf() {
                return Ok(current);
            }
            current = *node.children().first().ok_or_else(|| {
                TreeError::invariant(format!("internal node {current} has no children"))
            })?;
        }
    }
}

impl<K: Ord + Clone> BPlusTree<K> {
    /// Walks from the root to the leaf whose range covers `key`.
    pub fn descend_to_leaf(&self, key: &K) -> Result<NodeId> {
        let mut current = self.root;
        loop {
            let node = self.nodes.node(current)?;
            if node.is_leaf() {
                return Ok(current);
            }
            let child = node.child_for(key).ok_or_else(|| {
                TreeError::invariant(format!("internal node {current} has no child to route to"))
            })?;
            trace!("descend {} -> {}", current, child);
            current = child;
        }
    }

    /// Inserts `key` into the leaf that covers it, then climbs parent ids
    /// splitting each overflowed node until one absorbs its separator. A new
    /// root created along the way replaces the recorded one.
    pub fn insert(&mut self, key: K) -> Result<()> {
        let leaf = self.descend_to_leaf(&key)?;

        let mut overflowed = {
            let node = self.nodes.node_mut(leaf)?;
            node.push_key(key);
            node.is_overflowed(&self.config)
        };
        self.len += 1;

        let mut current = leaf;
        let mut new_root = None;
        while overflowed {
            let promotion = if self.nodes.node(current)?.is_leaf() {
                self.split_leaf(current)?
            } else {
                self.split_inner(current)?
            };
            if promotion.created_root.is_some() {
                new_root = promotion.created_root;
            }
            overflowed = self.insert_separator(
                promotion.parent,
                promotion.separator,
                current,
                promotion.sibling,
            )?;
            current = promotion.parent;
        }

        if let Some(new_root) = new_root {
            let old_root = mem::replace(&mut self.root, new_root);
            debug!("root {} replaced by {}", old_root, new_root);
        }
        Ok(())
    }

    /// Returns the parent of `child`, creating a new root above it first if
    /// `child` is the current root. The second value is that new root.
    fn parent_or_new_root(&mut self, child: NodeId) -> Result<(NodeId, Option<NodeId>)> {
        if let Some(parent) = self.nodes.node(child)?.parent() {
            return Ok((parent, None));
        }

        let mut root = Node::inner(None, Vec::new(), Vec::new());
        root.as_inner_mut()?.add_initial_child(child);
        let root_id = self.nodes.allocate(root);
        self.nodes.node_mut(child)?.parent = Some(root_id);

        debug!("node {} split without a parent, new root {}", child, root_id);
        Ok((root_id, Some(root_id)))
    }

    /// Splits an overflowed leaf. The separator is not registered yet.
    fn split_leaf(&mut self, leaf: NodeId) -> Result<Promotion<K>> {
        let (parent, created_root) = self.parent_or_new_root(leaf)?;

        let (keys, old_next) = {
            let node = self.nodes.node_mut(leaf)?;
            let old_next = node.as_leaf_mut()?.next();
            (node.take_all_keys_ascending(), old_next)
        };

        let LeafSplit {
            left,
            separator,
            right,
        } = LeafNode::partition(keys, self.config.leaf_split_point())?;

        let (left_len, right_len) = (left.len(), right.len());
        let sibling = self.nodes.allocate(Node::leaf(Some(parent), right, old_next));

        {
            let node = self.nodes.node_mut(leaf)?;
            node.keys = left;
            node.as_leaf_mut()?.set_next(Some(sibling));
        }

        debug!(
            "leaf {} split: {} keys stay, {} move to {}",
            leaf, left_len, right_len, sibling
        );

        Ok(Promotion {
            parent,
            separator,
            sibling,
            created_root,
        })
    }

    /// Splits an overflowed internal node, moving children with their keys.
    fn split_inner(&mut self, inner: NodeId) -> Result<Promotion<K>> {
        let (parent, created_root) = self.parent_or_new_root(inner)?;

        let (keys, children) = {
            let node = self.nodes.node_mut(inner)?;
            let children = node.as_inner_mut()?.take_children();
            (node.take_all_keys_ascending(), children)
        };

        let InnerSplit {
            left,
            left_children,
            separator,
            right,
            right_children,
        } = InnerNode::partition(keys, children, self.config.inner_split_point())?;

        let moved = right_children.clone();
        let (left_len, right_len) = (left.len(), right.len());
        let sibling = self
            .nodes
            .allocate(Node::inner(Some(parent), right, right_children));

        for child in moved {
            self.nodes.node_mut(child)?.parent = Some(sibling);
        }

        {
            let node = self.nodes.node_mut(inner)?;
            node.keys = left;
            node.as_inner_mut()?.set_children(left_children);
            node.check_fanout()?;
        }
        self.nodes.node(sibling)?.check_fanout()?;

        debug!(
            "internal node {} split: {} keys stay, {} move to {}",
            inner, left_len, right_len, sibling
        );

        Ok(Promotion {
            parent,
            separator,
            sibling,
            created_root,
        })
    }

    /// Registers `separator` and `right` in `parent`. Returns whether that
    /// overflowed `parent`.
    fn insert_separator(
        &mut self,
        parent: NodeId,
        separator: K,
        left: NodeId,
        right: NodeId,
    ) -> Result<bool> {
        let node = self.nodes.node_mut(parent)?;
        node.add_separator(separator, left, right)?;
        node.check_fanout()?;
        Ok(node.is_overflowed(&self.config))
    }

    /// Verifies the whole structure:
    /// - every internal node has one more child than keys, and each child
    ///   points back at it
    /// - keys are non-decreasing within every node
    /// - no node sits at or above its overflow threshold
    /// - every key under `children[i]` is `<= keys[i]`
    /// - the leaf chain visits every leaf once, left to right, in order
    /// - the total key count matches `len()`
    pub fn check_invariants(&self) -> Result<()> {
        let root = self.nodes.node(self.root)?;
        if root.parent().is_some() {
            return Err(TreeError::invariant(format!("root {} has a parent", self.root)));
        }

        let leaves = self.check_nodes()?;

        let mut chained = Vec::new();
        let mut current = Some(self.leftmost_leaf()?);
        while let Some(id) = current {
            if chained.len() > leaves.len() {
                return Err(TreeError::invariant("leaf chain is longer than the tree, cycle suspected"));
            }
            chained.push(id);
            current = self.nodes.node(id)?.next_leaf();
        }
        if chained != leaves {
            return Err(TreeError::invariant(format!(
                "leaf chain {:?} disagrees with tree order {:?}",
                chained, leaves
            )));
        }

        let mut total = 0;
        let mut previous: Option<&K> = None;
        for id in &chained {
            for key in self.nodes.node(*id)?.keys() {
                if previous.is_some_and(|p| p > key) {
                    return Err(TreeError::invariant(format!("leaf chain out of order at {id}")));
                }
                previous = Some(key);
                total += 1;
            }
        }
        if total != self.len {
            return Err(TreeError::invariant(format!(
                "leaf chain holds {} keys, expected {}",
                total, self.len
            )));
        }
        Ok(())
    }

    /// Depth-first check of every node with an explicit stack, so a tall
    /// tree cannot exhaust the call stack. Returns the leaves in order.
    fn check_nodes(&self) -> Result<Vec<NodeId>> {
        let mut leaves = Vec::new();
        let mut stack = vec![self.check_node(self.root)?];

        while let Some(top) = stack.last_mut() {
            if let Some(&child) = top.node.children().get(top.next_child) {
                let frame = self.check_node(child)?;
                if frame.node.parent() != Some(top.id) {
                    return Err(TreeError::invariant(format!(
                        "child {} does not point back at {}",
                        child, top.id
                    )));
                }
                stack.push(frame);
                continue;
            }

            let Some(done) = stack.pop() else { break };
            let max = if done.node.is_leaf() {
                leaves.push(done.id);
                done.node.keys().last()
            } else {
                done.max
            };

            if let Some(parent) = stack.last_mut() {
                if let (Some(bound), Some(max)) = (parent.node.keys().get(parent.next_child), max) {
                    if max > bound {
                        return Err(TreeError::invariant(format!(
                            "child {} of {} exceeds its separator",
                            done.id, parent.id
                        )));
                    }
                }
                if max.is_some() {
                    parent.max = max;
                }
                parent.next_child += 1;
            }
        }
        Ok(leaves)
    }

    /// Checks one node on its own: sorted keys, below overflow, fan-out.
    fn check_node(&self, id: NodeId) -> Result<CheckFrame<'_, K>> {
        let node = self.nodes.node(id)?;

        if node.keys().windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(TreeError::invariant(format!("keys of {id} are not sorted")));
        }
        if node.is_overflowed(&self.config) {
            return Err(TreeError::invariant(format!(
                "node {} holds {} keys, at its overflow threshold",
                id,
                node.len()
            )));
        }
        node.check_fanout()?;

        Ok(CheckFrame {
            id,
            node,
            next_child: 0,
            max: None,
        })
    }
}

/// What a split hands to the level above.
struct Promotion<K> {
    parent: NodeId,
    separator: K,
    sibling: NodeId,
    /// Set when the split node was the root and a new root was made for it.
    created_root: Option<NodeId>,
}

/// A node being visited by `check_nodes`, with the largest key seen so far
/// under the children already checked.
struct CheckFrame<'a, K> {
    id: NodeId,
    node: &'a Node<K>,
    next_child: usize,
    max: Option<&'a K>,
}

impl<K> Default for BPlusTree<K> {
    fn default() -> Self {
        Self::with_config(TreeConfig::default())
    }
}
