//! Compressed prefix tree over the read alphabet.
//!
//! Insertion walks down matching edges and, when a word diverges partway
//! along an edge, splits that edge at the divergence point:
//!
//! ```text
//! store "ATCG", then "ATGA":
//!
//!   (root)                 (root)
//!     └ ATCG [1]    →        └ AT [0]
//!                                ├ CG [1]
//!                                └ GA [1]
//! ```
//!
//! Edge labels are [`PackedSymbols`](crate::PackedSymbols); each edge is
//! filed under its first symbol, so the only candidate edge for a fragment
//! is found with a single lookup.

use super::node::{descend, Descent, Node};
use crate::error::TrieError;
use crate::utils::encoding::{parse_symbols, Symbol};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Radix tree counting how often each word was stored.
///
/// # Examples
///
/// ```
/// use basetrie::RadixTree;
///
/// let mut tree = RadixTree::new();
/// tree.store_word("ATCG").unwrap();
/// tree.store_word("ATCG").unwrap();
/// assert_eq!(tree.find_word("ATCG").unwrap().map(|n| n.count()), Some(2));
/// assert!(tree.find_word("NNN").unwrap().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Node")]
pub struct RadixTree {
    root: Node,
}

impl RadixTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store one occurrence of `word`.
    ///
    /// The word is validated in full before the tree is touched.
    pub fn store_word(&mut self, word: &str) -> Result<(), TrieError> {
        let symbols = parse_word(word)?;
        self.insert(&symbols);
        Ok(())
    }

    /// Store one occurrence of an already validated word.
    pub fn store_symbols(&mut self, word: &[Symbol]) -> Result<(), TrieError> {
        if word.is_empty() {
            return Err(empty_word());
        }
        self.insert(word);
        Ok(())
    }

    /// The node `word` ends at, if `word` was stored at least once.
    pub fn find_word(&self, word: &str) -> Result<Option<&Node>, TrieError> {
        let symbols = parse_symbols(word)?;
        Ok(self.find_symbols(&symbols))
    }

    pub fn find_symbols(&self, word: &[Symbol]) -> Option<&Node> {
        match descend(&self.root, word) {
            Descent::Boundary(node) if node.is_terminal() => Some(node),
            _ => None,
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Number of distinct stored words
    pub fn len(&self) -> usize {
        self.words().len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_leaf()
    }

    /// Total stored occurrences across all words
    pub fn total_count(&self) -> u64 {
        self.root.sum_counts()
    }

    /// Every stored word with its count, in alphabet order.
    pub fn words(&self) -> Vec<(String, u64)> {
        let mut words = Vec::new();
        let mut word = String::new();
        // ends[d]: length of `word` at the open node of depth d
        let mut ends = vec![0usize];
        for (depth, label, node) in self.root.walk() {
            if let Some(label) = label {
                ends.truncate(depth);
                word.truncate(ends[depth - 1]);
                word.push_str(&label.to_string());
                ends.push(word.len());
            }
            if node.is_terminal() {
                words.push((word.clone(), node.count()));
            }
        }
        words
    }

    /// Check the structural invariants of the whole tree.
    pub fn verify(&self) -> Result<(), TrieError> {
        if self.root.count() != 0 {
            return Err(TrieError::MalformedTree(
                "the root cannot hold a stored word".into(),
            ));
        }
        self.root.verify()?;
        if self.root.checked_sum_counts().is_none() {
            return Err(TrieError::MalformedTree(
                "stored counts add up to more than a 64-bit total".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn insert(&mut self, word: &[Symbol]) {
        self.root.insert(word);
    }
}

fn empty_word() -> TrieError {
    TrieError::InvalidArgument("cannot store an empty word".into())
}

/// Validate a word for insertion.
pub(crate) fn parse_word(word: &str) -> Result<Vec<Symbol>, TrieError> {
    let symbols = parse_symbols(word)?;
    if symbols.is_empty() {
        return Err(empty_word());
    }
    Ok(symbols)
}

impl TryFrom<Node> for RadixTree {
    type Error = TrieError;

    fn try_from(root: Node) -> Result<Self, TrieError> {
        let tree = Self { root };
        tree.verify()?;
        Ok(tree)
    }
}

impl Serialize for RadixTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}

impl fmt::Display for RadixTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}
