// src/node.rs

use std::fmt;
use std::mem;

use crate::config::TreeConfig;
use crate::error::{Result, TreeError};
use crate::inner_node::InnerNode;
use crate::leaf_node::LeafNode;

/// Handle to a node stored in the tree's node table.
///
/// Parent and sibling links are ids, not owning references: the table owns
/// every node and ids only name them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Variant-specific part of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Leaf(LeafNode),
    Inner(InnerNode),
}

/// Fields shared by both variants: the sorted key sequence and the
/// back-reference to the enclosing internal node (absent for the root).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<K> {
    pub(crate) keys: Vec<K>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind,
}

impl<K> Node<K> {
    pub fn leaf(parent: Option<NodeId>, keys: Vec<K>, next: Option<NodeId>) -> Self {
        Self {
            keys,
            parent,
            kind: NodeKind::Leaf(LeafNode::new(next)),
        }
    }

    pub fn inner(parent: Option<NodeId>, keys: Vec<K>, children: Vec<NodeId>) -> Self {
        Self {
            keys,
            parent,
            kind: NodeKind::Inner(InnerNode::new(children)),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Child ids of an internal node; empty for leaves.
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Inner(inner) => inner.children(),
            NodeKind::Leaf(_) => &[],
        }
    }

    /// Forward link of the leaf chain; always `None` for internal nodes.
    pub fn next_leaf(&self) -> Option<NodeId> {
        match &self.kind {
            NodeKind::Leaf(leaf) => leaf.next(),
            NodeKind::Inner(_) => None,
        }
    }

    pub fn as_leaf_mut(&mut self) -> Result<&mut LeafNode> {
        match &mut self.kind {
            NodeKind::Leaf(leaf) => Ok(leaf),
            NodeKind::Inner(_) => Err(TreeError::invariant("expected a leaf, found an internal node")),
        }
    }

    pub fn as_inner_mut(&mut self) -> Result<&mut InnerNode> {
        match &mut self.kind {
            NodeKind::Inner(inner) => Ok(inner),
            NodeKind::Leaf(_) => Err(TreeError::invariant("expected an internal node, found a leaf")),
        }
    }

    /// Whether the key count has reached the variant's overflow threshold.
    pub fn is_overflowed(&self, config: &TreeConfig) -> bool {
        match self.kind {
            NodeKind::Leaf(_) => self.keys.len() >= config.leaf_overflow(),
            NodeKind::Inner(_) => self.keys.len() >= config.inner_overflow(),
        }
    }

    /// Checks `children == keys + 1` for internal nodes.
    pub fn check_fanout(&self) -> Result<()> {
        if let NodeKind::Inner(inner) = &self.kind {
            let children = inner.children().len();
            if children != self.keys.len() + 1 {
                return Err(TreeError::invariant(format!(
                    "internal node holds {} keys but {} children",
                    self.keys.len(),
                    children
                )));
            }
        }
        Ok(())
    }
}

impl<K: Ord> Node<K> {
    /// Places `key` in ascending position, after any equal keys. This is the
    /// plain append path: overflow is the caller's concern.
    pub fn push_key(&mut self, key: K) {
        let pos = self.keys.partition_point(|k| k <= &key);
        self.keys.insert(pos, key);
    }

    /// Empties the key sequence and hands it back in ascending order.
    pub fn take_all_keys_ascending(&mut self) -> Vec<K> {
        let mut keys = mem::take(&mut self.keys);
        keys.sort(); // stable, so equal keys keep their insertion order
        keys
    }

    /// Routing child for `key`, or `None` for leaves.
    pub fn child_for(&self, key: &K) -> Option<NodeId> {
        match &self.kind {
            NodeKind::Inner(inner) => inner.child_for(&self.keys, key),
            NodeKind::Leaf(_) => None,
        }
    }

    /// Registers `separator` with `right` placed immediately after `left`.
    pub fn add_separator(&mut self, separator: K, left: NodeId, right: NodeId) -> Result<()> {
        match &mut self.kind {
            NodeKind::Inner(inner) => inner.add_separator(&mut self.keys, separator, left, right),
            NodeKind::Leaf(_) => Err(TreeError::invariant("cannot register a separator in a leaf")),
        }
    }
}
