//! Tree node and the read-only path walk shared by every tree type.
//!
//! Tree depth grows with word length (a homopolymer read stores one level
//! per symbol), so nothing here recurses: dropping, cloning, comparing,
//! printing and (de)serializing all run over explicit stacks.

use crate::error::TrieError;
use crate::output;
use crate::utils::encoding::{PackedSymbols, Symbol};
use log::trace;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use termcolor::NoColor;

/// A node of a radix tree.
///
/// `count` is the number of times a string ending exactly here was stored;
/// internal nodes that no stored string ends at have count 0. Each node owns
/// its children outright. Children are filed under the first symbol of
/// their edge label, so sibling labels never share a prefix and a node has
/// at most five children.
#[derive(Default)]
pub struct Node {
    count: u64,
    children: BTreeMap<Symbol, Edge>,
}

/// An outgoing edge: its label and the node it leads to.
pub(crate) struct Edge {
    label: PackedSymbols,
    node: Node,
}

impl Edge {
    fn new(label: &[Symbol], node: Node) -> Self {
        Self {
            label: PackedSymbols::from_symbols(label),
            node,
        }
    }
}

impl Node {
    fn with_count(count: u64) -> Self {
        Self {
            count,
            children: BTreeMap::new(),
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Whether some stored string ends at this node
    pub fn is_terminal(&self) -> bool {
        self.count > 0
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Children in alphabet order of their first symbol
    pub fn children(&self) -> impl Iterator<Item = (&PackedSymbols, &Node)> {
        self.children.values().map(|edge| (&edge.label, &edge.node))
    }

    /// The only edge that can share a prefix with a fragment starting at `first`.
    #[inline]
    pub fn edge_for(&self, first: Symbol) -> Option<(&PackedSymbols, &Node)> {
        self.children.get(&first).map(|edge| (&edge.label, &edge.node))
    }

    /// Pre-order walk of this node and its subtree.
    ///
    /// Yields `(depth, incoming label, node)`; this node comes first, at
    /// depth 0 with no label. Siblings come in alphabet order.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![(0, None, self)],
        }
    }

    /// Sum of `count` over this node and its entire subtree.
    ///
    /// Saturates at `u64::MAX`; [`Node::checked_sum_counts`] tells the two apart.
    pub fn sum_counts(&self) -> u64 {
        self.walk()
            .fold(0u64, |total, (_, _, node)| total.saturating_add(node.count))
    }

    /// Like [`Node::sum_counts`], but `None` if the sum overflows a `u64`.
    pub fn checked_sum_counts(&self) -> Option<u64> {
        self.walk()
            .try_fold(0u64, |total, (_, _, node)| total.checked_add(node.count))
    }

    fn increment(&mut self) {
        self.count = self.count.saturating_add(1);
    }

    /// Edge-split insertion of a validated word below this node.
    pub(crate) fn insert(&mut self, word: &[Symbol]) {
        let mut node = self;
        let mut fragment = word;

        while let Some(&first) = fragment.first() {
            let edge = match node.children.entry(first) {
                Entry::Vacant(slot) => {
                    // no edge shares a prefix: hang the whole fragment here
                    slot.insert(Edge::new(fragment, Node::with_count(1)));
                    return;
                }
                Entry::Occupied(slot) => slot.into_mut(),
            };

            let matched = edge.label.common_prefix_len(fragment);
            if matched == edge.label.len() {
                if matched == fragment.len() {
                    edge.node.increment();
                    return;
                }
                fragment = &fragment[matched..];
                node = &mut edge.node;
                continue;
            }

            // The word leaves this edge after `matched` symbols: the edge keeps
            // the shared head and leads to a new node, which takes the old
            // subtree under the unmatched tail of the label.
            let label: Vec<Symbol> = edge.label.iter().collect();
            let (head, tail) = label.split_at(matched);
            let remaining = &fragment[matched..];
            trace!("splitting edge {} at {}", edge.label, matched);

            let mut intermediate = Node::default();
            let old = std::mem::take(&mut edge.node);
            intermediate.children.insert(tail[0], Edge::new(tail, old));
            match remaining.first() {
                Some(&next) => {
                    intermediate
                        .children
                        .insert(next, Edge::new(remaining, Node::with_count(1)));
                }
                // the word ends exactly at the split point
                None => intermediate.count = 1,
            }
            *edge = Edge::new(head, intermediate);
            return;
        }
    }

    /// Check labels and compression below this node.
    ///
    /// Every label is non-empty and starts with the symbol it is filed
    /// under, and every non-terminal node other than this one branches at
    /// least twice.
    pub(crate) fn verify(&self) -> Result<(), TrieError> {
        for (depth, label, node) in self.walk() {
            if let Some(label) = label {
                if node.count == 0 && node.children.len() < 2 {
                    return Err(TrieError::MalformedTree(format!(
                        "non-terminal node below {:?} at depth {} has {} child(ren)",
                        label.to_string(),
                        depth,
                        node.children.len()
                    )));
                }
            }
            for (&first, edge) in &node.children {
                if edge.label.first() != Some(first) {
                    return Err(TrieError::MalformedTree(format!(
                        "edge {:?} at depth {} is filed under {:?}",
                        edge.label.to_string(),
                        depth + 1,
                        first.as_char()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Rebuild a tree from its pre-order entries.
    fn from_entries(entries: Vec<FlatEntry>) -> Result<Self, TrieError> {
        let mut entries = entries.into_iter();
        let mut root = match entries.next() {
            Some(FlatEntry {
                depth: 0,
                label: None,
                count,
            }) => Node::with_count(count),
            _ => {
                return Err(TrieError::MalformedTree(
                    "the first entry must be the root: depth 0, no label".into(),
                ))
            }
        };

        // (parent, label, node) where parent 0 is the root and parent i > 0
        // is links[i - 1]; path[d] is the open node at depth d
        let mut links: Vec<(usize, PackedSymbols, Node)> = Vec::new();
        let mut path = vec![0usize];
        for (index, entry) in entries.enumerate() {
            if entry.depth == 0 || entry.depth > path.len() {
                return Err(TrieError::MalformedTree(format!(
                    "entry {} at depth {} does not hang below the entry before it",
                    index + 1,
                    entry.depth
                )));
            }
            let label = entry.label.filter(|label| !label.is_empty()).ok_or_else(|| {
                TrieError::MalformedTree(format!("entry {} has no edge label", index + 1))
            })?;
            path.truncate(entry.depth);
            links.push((path[entry.depth - 1], label, Node::with_count(entry.count)));
            path.push(links.len());
        }

        // children come after their parent, so attaching from the back
        // finishes every subtree before it moves
        while let Some((parent, label, node)) = links.pop() {
            let target = match parent.checked_sub(1) {
                Some(i) => &mut links[i].2,
                None => &mut root,
            };
            target.attach(label, node)?;
        }
        Ok(root)
    }

    fn attach(&mut self, label: PackedSymbols, node: Node) -> Result<(), TrieError> {
        let first = label
            .first()
            .ok_or_else(|| TrieError::MalformedTree("empty edge label".into()))?;
        match self.children.entry(first) {
            Entry::Vacant(slot) => {
                slot.insert(Edge { label, node });
                Ok(())
            }
            Entry::Occupied(slot) => Err(TrieError::MalformedTree(format!(
                "sibling labels {:?} and {:?} share the prefix {:?}",
                slot.get().label.to_string(),
                label.to_string(),
                first.as_char()
            ))),
        }
    }
}

/// Pre-order iterator returned by [`Node::walk`].
pub struct Walk<'a> {
    stack: Vec<(usize, Option<&'a PackedSymbols>, &'a Node)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, Option<&'a PackedSymbols>, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.stack.pop()?;
        let (depth, _, node) = item;
        // reversed so children come off the stack in alphabet order
        self.stack.extend(
            node.children
                .values()
                .rev()
                .map(|edge| (depth + 1, Some(&edge.label), &edge.node)),
        );
        Some(item)
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        let mut stack: Vec<Node> = std::mem::take(&mut self.children)
            .into_values()
            .map(|edge| edge.node)
            .collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(
                std::mem::take(&mut node.children)
                    .into_values()
                    .map(|edge| edge.node),
            );
        }
    }
}

impl Clone for Node {
    fn clone(&self) -> Self {
        let mut root = Node::with_count(self.count);
        // (parent, first symbol, label, node), parents numbered as in from_entries
        let mut copies: Vec<(usize, Symbol, PackedSymbols, Node)> = Vec::new();
        let mut stack = vec![(0usize, self)];
        while let Some((index, node)) = stack.pop() {
            for (&first, edge) in &node.children {
                copies.push((index, first, edge.label.clone(), Node::with_count(edge.node.count)));
                stack.push((copies.len(), &edge.node));
            }
        }
        while let Some((parent, first, label, node)) = copies.pop() {
            let target = match parent.checked_sub(1) {
                Some(i) => &mut copies[i].3,
                None => &mut root,
            };
            target.children.insert(first, Edge { label, node });
        }
        root
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            if a.count != b.count || a.children.len() != b.children.len() {
                return false;
            }
            for ((first_a, edge_a), (first_b, edge_b)) in a.children.iter().zip(&b.children) {
                if first_a != first_b || edge_a.label != edge_b.label {
                    return false;
                }
                stack.push((&edge_a.node, &edge_b.node));
            }
        }
        true
    }
}

impl Eq for Node {}

/// Flat pre-order listing of `(depth, label, count)` entries.
impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.walk().map(|(depth, label, node)| (depth, label, node.count)))
            .finish()
    }
}

/// Indented dump: one line per node with its incoming label and count.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = NoColor::new(Vec::new());
        output::write_tree(&mut out, self).map_err(|_| fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(out.get_ref()))
    }
}

/// One node in the serialized form: a pre-order list where each entry
/// hangs below the closest earlier entry one level up.
#[derive(Serialize)]
struct FlatEntryRef<'a> {
    depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a PackedSymbols>,
    count: u64,
}

#[derive(Deserialize)]
struct FlatEntry {
    depth: usize,
    #[serde(default)]
    label: Option<PackedSymbols>,
    #[serde(default)]
    count: u64,
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.walk().map(|(depth, label, node)| FlatEntryRef {
            depth,
            label,
            count: node.count,
        }))
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<FlatEntry>::deserialize(deserializer)?;
        Node::from_entries(entries).map_err(de::Error::custom)
    }
}

/// Where a read-only walk for a pattern ended.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Descent<'a> {
    /// The pattern was consumed exactly at this node
    Boundary(&'a Node),
    /// The pattern ended partway along the edge into this node
    WithinEdge(&'a Node),
    /// The pattern left the tree
    Diverged,
}

/// Follow `pattern` from `root` without touching the tree.
pub(crate) fn descend<'a>(root: &'a Node, pattern: &[Symbol]) -> Descent<'a> {
    let mut node = root;
    let mut rest = pattern;
    loop {
        let Some(&first) = rest.first() else {
            return Descent::Boundary(node);
        };
        let Some((label, child)) = node.edge_for(first) else {
            return Descent::Diverged;
        };
        let matched = label.common_prefix_len(rest);
        if matched == label.len() {
            rest = &rest[matched..];
            node = child;
        } else if matched == rest.len() {
            return Descent::WithinEdge(child);
        } else {
            return Descent::Diverged;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::encoding::{encode, parse_symbols};

    fn node(count: u64, children: Vec<(&str, Node)>) -> Node {
        let mut node = Node::with_count(count);
        for (label, child) in children {
            node.attach(encode(label).unwrap(), child).unwrap();
        }
        node
    }

    fn sample() -> Node {
        // AT -> {CG, G}, N
        node(
            0,
            vec![
                ("AT", node(0, vec![("CG", node(1, vec![])), ("G", node(2, vec![]))])),
                ("N", node(1, vec![])),
            ],
        )
    }

    /// A single path of `depth` one-symbol edges, built without recursion.
    fn chain(depth: usize) -> Node {
        let mut node = Node::with_count(1);
        for _ in 1..depth {
            let mut parent = Node::with_count(1);
            parent.attach(encode("A").unwrap(), node).unwrap();
            node = parent;
        }
        let mut root = Node::default();
        root.attach(encode("A").unwrap(), node).unwrap();
        root
    }

    #[test]
    fn test_sum_counts() {
        let root = sample();
        assert_eq!(root.sum_counts(), 4);
        assert_eq!(root.checked_sum_counts(), Some(4));
        assert_eq!(Node::default().sum_counts(), 0);
    }

    #[test]
    fn test_sum_counts_overflow() {
        let root = node(0, vec![("A", node(u64::MAX, vec![])), ("C", node(1, vec![]))]);
        assert_eq!(root.checked_sum_counts(), None);
        assert_eq!(root.sum_counts(), u64::MAX);
    }

    #[test]
    fn test_increment_saturates() {
        let mut root = node(0, vec![("A", node(u64::MAX, vec![]))]);
        root.insert(&parse_symbols("A").unwrap());
        assert_eq!(root.edge_for(Symbol::A).unwrap().1.count(), u64::MAX);
    }

    #[test]
    fn test_edge_for_uses_first_symbol() {
        let root = sample();
        let (label, _) = root.edge_for(Symbol::A).unwrap();
        assert_eq!(label.to_string(), "AT");
        assert!(root.edge_for(Symbol::G).is_none());
    }

    #[test]
    fn test_walk_is_preorder() {
        let visited: Vec<(usize, String, u64)> = sample()
            .walk()
            .map(|(depth, label, node)| {
                (depth, label.map(|l| l.to_string()).unwrap_or_default(), node.count())
            })
            .collect();
        assert_eq!(
            visited,
            vec![
                (0, String::new(), 0),
                (1, "N".to_string(), 1),
                (1, "AT".to_string(), 0),
                (2, "CG".to_string(), 1),
                (2, "G".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_insert_splits_and_extends() {
        let mut root = Node::default();
        for word in ["ATCG", "ATGA", "AT", "ATGAC", "ATCG"] {
            root.insert(&parse_symbols(word).unwrap());
        }
        // AT [1] -> {CG [2], GA [1] -> C [1]}
        assert_eq!(
            root.to_string(),
            "(root) [0]\n  AT [1]\n    CG [2]\n    GA [1]\n      C [1]\n"
        );
        assert_eq!(root.sum_counts(), 5);
        root.verify().unwrap();
    }

    #[test]
    fn test_descend_outcomes() {
        fn walk<'a>(root: &'a Node, pattern: &str) -> Descent<'a> {
            descend(root, &parse_symbols(pattern).unwrap())
        }
        let root = sample();

        assert!(matches!(walk(&root, "AT"), Descent::Boundary(n) if n.count() == 0));
        assert!(matches!(walk(&root, "ATG"), Descent::Boundary(n) if n.count() == 2));
        assert!(matches!(walk(&root, "ATC"), Descent::WithinEdge(n) if n.count() == 1));
        assert!(matches!(walk(&root, "A"), Descent::WithinEdge(n) if n.child_count() == 2));
        assert!(matches!(walk(&root, "AG"), Descent::Diverged));
        assert!(matches!(walk(&root, "ATCGA"), Descent::Diverged));
        assert!(matches!(walk(&root, "C"), Descent::Diverged));
        assert!(matches!(walk(&root, ""), Descent::Boundary(n) if n.count() == 0));
    }

    #[test]
    fn test_verify_accepts_well_formed() {
        assert!(sample().verify().is_ok());
        assert!(Node::default().verify().is_ok());
    }

    #[test]
    fn test_verify_rejects_misfiled_label() {
        let mut root = Node::default();
        root.children.insert(
            Symbol::G,
            Edge {
                label: encode("AT").unwrap(),
                node: Node::with_count(1),
            },
        );
        assert!(matches!(root.verify(), Err(TrieError::MalformedTree(_))));
    }

    #[test]
    fn test_verify_rejects_uncompressed_chain() {
        let root = node(0, vec![("A", node(0, vec![("T", node(1, vec![]))]))]);
        assert!(root.verify().is_err());
    }

    #[test]
    fn test_attach_rejects_shared_prefix() {
        let mut root = node(0, vec![("AT", node(1, vec![]))]);
        let err = root.attach(encode("AG").unwrap(), node(1, vec![])).unwrap_err();
        assert!(matches!(err, TrieError::MalformedTree(_)));
    }

    #[test]
    fn test_display_lists_every_node() {
        let dump = sample().to_string();
        assert_eq!(dump, "(root) [0]\n  N [1]\n  AT [0]\n    CG [1]\n    G [2]\n");
    }

    #[test]
    fn test_debug_is_flat() {
        let short = chain(2);
        assert_eq!(
            format!("{:?}", short),
            r#"[(0, None, 0), (1, Some(PackedSymbols("A")), 1), (2, Some(PackedSymbols("A")), 1)]"#
        );
    }

    #[test]
    fn test_serialized_form_is_flat() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"[{"depth":0,"count":0},{"depth":1,"label":"N","count":1},{"depth":1,"label":"AT","count":0},{"depth":2,"label":"CG","count":1},{"depth":2,"label":"G","count":2}]"#
        );
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_deserialize_rejects_bad_listings() {
        for bad in [
            "[]",
            r#"[{"depth":1,"label":"A"}]"#,
            r#"[{"depth":0},{"depth":0}]"#,
            r#"[{"depth":0},{"depth":2,"label":"A"}]"#,
            r#"[{"depth":0},{"depth":1}]"#,
            r#"[{"depth":0},{"depth":1,"label":""}]"#,
            r#"[{"depth":0},{"depth":1,"label":"AT"},{"depth":1,"label":"AG"}]"#,
        ] {
            assert!(serde_json::from_str::<Node>(bad).is_err(), "accepted {}", bad);
        }
    }

    #[test]
    fn test_deep_chain_without_recursion() {
        let depth = 100_000;
        let root = chain(depth);
        let copy = root.clone();
        assert_eq!(copy, root);
        assert_eq!(copy.sum_counts(), depth as u64);
        assert!(root.walk().any(|(d, _, _)| d == depth));

        let json = serde_json::to_string(&root).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, root);

        drop(copy);
        drop(back);
        drop(root);
    }
}
