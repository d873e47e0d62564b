// src/display.rs

use std::collections::VecDeque;
use std::fmt;

use crate::bp_tree::BPlusTree;
use crate::node::Node;

impl<K> BPlusTree<K> {
    /// Nodes grouped by depth, root first, each level left to right.
    /// Read-only: only keys and child ids are consulted.
    pub fn levels(&self) -> Vec<Vec<&Node<K>>> {
        let mut levels = Vec::new();
        let mut queue = VecDeque::new();
        queue.extend(self.node(self.root()));

        while !queue.is_empty() {
            let level: Vec<&Node<K>> = queue.drain(..).collect();
            for node in &level {
                queue.extend(node.children().iter().filter_map(|&child| self.node(child)));
            }
            levels.push(level);
        }
        levels
    }
}

/// One line per level, one `[ k k ]` group per node.
impl<K: fmt::Display> fmt::Display for BPlusTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for level in self.levels() {
            for node in level {
                write!(f, "[ ")?;
                for key in node.keys() {
                    write!(f, "{key} ")?;
                }
                write!(f, "]")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
