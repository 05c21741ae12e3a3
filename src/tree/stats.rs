use super::node::{Edge, Node};
use crate::utils::encoding::Symbol;
use std::collections::BTreeMap;
use std::mem::size_of;

/// Shape and footprint of a tree, gathered in one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub nodes: usize,
    pub edges: usize,
    pub terminals: usize,
    pub total_count: u64,
    /// Deepest node, in edges from the root
    pub max_depth: usize,
    /// Longest edge label, in symbols
    pub max_label_len: usize,
    pub total_label_len: usize,
    /// Rough heap use: nodes, map entries and label limbs
    pub heap_bytes: usize,
}

impl TreeStats {
    pub fn collect(root: &Node) -> Self {
        let mut stats = TreeStats::default();
        let mut stack = vec![(root, 0usize)];
        let mut branching = 0;

        while let Some((node, depth)) = stack.pop() {
            stats.nodes += 1;
            stats.total_count = stats.total_count.saturating_add(node.count());
            if node.is_terminal() {
                stats.terminals += 1;
            }
            stats.max_depth = stats.max_depth.max(depth);
            if !node.is_leaf() {
                branching += 1;
            }

            for (label, child) in node.children() {
                stats.edges += 1;
                stats.max_label_len = stats.max_label_len.max(label.len());
                stats.total_label_len += label.len();
                stats.heap_bytes += label.heap_bytes();
                stack.push((child, depth + 1));
            }
        }

        // Non-root nodes live inline in their parent's map entries; each
        // non-empty map adds about one leaf allocation of bookkeeping.
        stats.heap_bytes += stats.edges * size_of::<(Symbol, Edge)>();
        stats.heap_bytes += branching * BTREE_LEAF_OVERHEAD;
        stats
    }

    /// Mean edge label length in symbols
    pub fn mean_label_len(&self) -> f64 {
        if self.edges == 0 {
            0.0
        } else {
            self.total_label_len as f64 / self.edges as f64
        }
    }
}

/// Bookkeeping bytes of one BTreeMap leaf beyond its entries.
const BTREE_LEAF_OVERHEAD: usize = size_of::<usize>() * 2 + size_of::<BTreeMap<(), ()>>();

/// Format byte size to human readable
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{RadixTree, SuffixTree};

    #[test]
    fn test_empty_tree() {
        let stats = TreeStats::collect(RadixTree::new().root());
        assert_eq!(stats.nodes, 1);
        assert_eq!(stats.edges, 0);
        assert_eq!(stats.terminals, 0);
        assert_eq!(stats.max_depth, 0);
        assert_eq!(stats.mean_label_len(), 0.0);
    }

    #[test]
    fn test_counts_shape() {
        let mut tree = RadixTree::new();
        for word in ["ATCG", "ATGA", "AT", "N", "ATCG"] {
            tree.store_word(word).unwrap();
        }
        // root -> AT -> {CG, GA}, root -> N
        let stats = TreeStats::collect(tree.root());
        assert_eq!(stats.nodes, 5);
        assert_eq!(stats.edges, 4);
        assert_eq!(stats.terminals, 4);
        assert_eq!(stats.total_count, 5);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.max_label_len, 2);
        assert_eq!(stats.total_label_len, 7);
        assert!(stats.heap_bytes > 0);
    }

    #[test]
    fn test_suffix_total_matches_sum_counts() {
        let mut tree = SuffixTree::new();
        tree.store_word("GATTACA").unwrap();
        let stats = TreeStats::collect(tree.root());
        assert_eq!(stats.total_count, tree.total_count());
        assert_eq!(stats.total_count, 7);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }
}
