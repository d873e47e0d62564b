// src/leaf_node.rs

use crate::error::{Result, TreeError};
use crate::node::NodeId;

/// Leaf-only state. Leaves hold keys and nothing else; the only extra field
/// is the forward link of the ascending leaf chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeafNode {
    next: Option<NodeId>,
}

/// Keys of an overflowed leaf, partitioned for a split.
#[derive(Debug, PartialEq, Eq)]
pub struct LeafSplit<K> {
    /// Keys the splitting leaf keeps.
    pub left: Vec<K>,
    /// Largest key of `left`, copied up into the parent. It stays in `left`.
    pub separator: K,
    /// Keys handed to the new sibling.
    pub right: Vec<K>,
}

impl LeafNode {
    pub fn new(next: Option<NodeId>) -> Self {
        Self { next }
    }

    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    pub fn set_next(&mut self, next: Option<NodeId>) {
        self.next = next;
    }

    /// Splits ascending `keys` after the first `split_point` of them.
    pub fn partition<K: Clone>(mut keys: Vec<K>, split_point: usize) -> Result<LeafSplit<K>> {
        if split_point == 0 || split_point >= keys.len() {
            return Err(TreeError::invariant(format!(
                "leaf split point {} out of range for {} keys",
                split_point,
                keys.len()
            )));
        }

        let right = keys.split_off(split_point);
        let separator = keys
            .last()
            .cloned()
            .ok_or_else(|| TreeError::invariant("leaf split left no keys behind"))?;

        Ok(LeafSplit {
            left: keys,
            separator,
            right,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_reference_split() {
        // degree 4: four keys, three stay, the third is the separator
        let split = LeafNode::partition(vec![0, 1, 2, 3], 3).expect("valid split");
        assert_eq!(split.left, vec![0, 1, 2]);
        assert_eq!(split.separator, 2);
        assert_eq!(split.right, vec![3]);
    }

    #[test]
    fn test_partition_keeps_duplicates_on_both_sides() {
        let split = LeafNode::partition(vec![7, 7, 7, 7, 7], 3).expect("valid split");
        assert_eq!(split.left, vec![7, 7, 7]);
        assert_eq!(split.separator, 7);
        assert_eq!(split.right, vec![7, 7]);
    }

    #[test]
    fn test_partition_rejects_empty_half() {
        assert!(matches!(
            LeafNode::partition(vec![1, 2, 3], 3),
            Err(TreeError::InvariantViolation(_))
        ));
        assert!(matches!(
            LeafNode::partition(vec![1, 2, 3], 0),
            Err(TreeError::InvariantViolation(_))
        ));
    }
}
