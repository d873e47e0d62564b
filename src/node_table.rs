// src/node_table.rs

use crate::error::{Result, TreeError};
use crate::node::{Node, NodeId};

/// The NodeTable owns every node of a tree and maps ids to them.
/// - parent and `next` links elsewhere are plain ids into this table
/// - nodes are never removed, so an id is its node's position for the
///   tree's lifetime
#[derive(Debug)]
pub struct NodeTable<K> {
    table: Vec<Node<K>>,
}

impl<K> NodeTable<K> {
    pub fn new() -> Self {
        Self { table: Vec::new() }
    }

    /// Takes ownership of `node` under the next id.
    pub fn allocate(&mut self, node: Node<K>) -> NodeId {
        let id = NodeId(self.table.len());
        self.table.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<K>> {
        self.table.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<K>> {
        self.table.get_mut(id.index())
    }

    /// Like `get`, but a missing node is an invariant violation.
    pub fn node(&self, id: NodeId) -> Result<&Node<K>> {
        self.get(id)
            .ok_or_else(|| TreeError::invariant(format!("dangling node id {id}")))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node<K>> {
        self.get_mut(id)
            .ok_or_else(|| TreeError::invariant(format!("dangling node id {id}")))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.table.len()
    }

    /// Number of nodes ever allocated.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl<K> Default for NodeTable<K> {
    fn default() -> Self {
        Self::new()
    }
}
