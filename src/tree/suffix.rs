//! Brute-force suffix tree: every suffix of every stored word goes into a
//! [`RadixTree`], so a substring query becomes a prefix walk followed by a
//! subtree count.
//!
//! Construction inserts `len(word)` suffixes per word, so building costs
//! time quadratic in the word length.

use super::node::{descend, Descent, Node};
use super::radix::{parse_word, RadixTree};
use crate::error::TrieError;
use crate::utils::encoding::{parse_symbols, Symbol};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffix index over stored words, answering substring occurrence counts.
///
/// ```
/// use basetrie::SuffixTree;
///
/// let mut tree = SuffixTree::new();
/// tree.store_word("ATCG").unwrap();
/// assert_eq!(tree.count_occurrence("TC").unwrap(), 1);
/// assert_eq!(tree.count_occurrence("NNN").unwrap(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuffixTree {
    tree: RadixTree,
}

impl SuffixTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every suffix of `word`.
    pub fn store_word(&mut self, word: &str) -> Result<(), TrieError> {
        let symbols = parse_word(word)?;
        self.store_suffixes(&symbols);
        Ok(())
    }

    pub fn store_symbols(&mut self, word: &[Symbol]) -> Result<(), TrieError> {
        if word.is_empty() {
            return Err(TrieError::InvalidArgument("cannot store an empty word".into()));
        }
        self.store_suffixes(word);
        Ok(())
    }

    fn store_suffixes(&mut self, word: &[Symbol]) {
        for start in 0..word.len() {
            self.tree.insert(&word[start..]);
        }
    }

    /// Insert a single suffix. Used by the sharded index, which routes each
    /// suffix to the shard of its first symbol.
    pub(crate) fn store_suffix(&mut self, suffix: &[Symbol]) {
        if !suffix.is_empty() {
            self.tree.insert(suffix);
        }
    }

    /// Number of positions in the stored words where `pattern` starts.
    ///
    /// A pattern consumed at a node boundary or partway along an edge counts
    /// the whole subtree below that point. A pattern that leaves the tree,
    /// and the empty pattern, count 0.
    pub fn count_occurrence(&self, pattern: &str) -> Result<u64, TrieError> {
        let symbols = parse_symbols(pattern)?;
        Ok(self.count_symbols(&symbols))
    }

    pub fn count_symbols(&self, pattern: &[Symbol]) -> u64 {
        if pattern.is_empty() {
            return 0;
        }
        match descend(self.tree.root(), pattern) {
            Descent::Boundary(node) | Descent::WithinEdge(node) => sum_counts(node),
            Descent::Diverged => 0,
        }
    }

    /// Share of stored symbols that belong to `symbols`.
    ///
    /// Each element must be a single alphabet character. Elements are counted
    /// as given, so a repeated element is counted twice. An empty tree gives 0.
    pub fn count_fraction<I, S>(&self, symbols: I) -> Result<f64, TrieError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let symbols = fraction_symbols(symbols)?;
        let matched = symbols
            .iter()
            .fold(0u64, |acc, &s| acc.saturating_add(self.count_symbols(&[s])));
        Ok(ratio(matched, self.total_count()))
    }

    /// Stored suffix lookup, delegated to the underlying radix tree.
    pub fn find_word(&self, word: &str) -> Result<Option<&Node>, TrieError> {
        self.tree.find_word(word)
    }

    /// Total stored suffix occurrences, i.e. `sum_counts` of the root.
    pub fn total_count(&self) -> u64 {
        sum_counts(self.tree.root())
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn as_radix(&self) -> &RadixTree {
        &self.tree
    }

    pub fn root(&self) -> &Node {
        self.tree.root()
    }
}

/// Count of `start` plus every count in its subtree.
pub fn sum_counts(start: &Node) -> u64 {
    start.sum_counts()
}

/// Validate a `count_fraction` symbol set.
pub(crate) fn fraction_symbols<I, S>(symbols: I) -> Result<Vec<Symbol>, TrieError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    symbols
        .into_iter()
        .map(|item| {
            let item = item.as_ref();
            let mut chars = item.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Symbol::from_char(c).ok_or(TrieError::InvalidSymbol {
                    symbol: c,
                    position: 0,
                }),
                _ => Err(TrieError::InvalidArgument(format!(
                    "expected a single symbol, got {:?}",
                    item
                ))),
            }
        })
        .collect()
}

pub(crate) fn ratio(matched: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        matched as f64 / total as f64
    }
}

impl fmt::Display for SuffixTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.tree, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_count(text: &str, pattern: &str) -> u64 {
        if pattern.is_empty() || pattern.len() > text.len() {
            return 0;
        }
        (0..=text.len() - pattern.len())
            .filter(|&i| &text[i..i + pattern.len()] == pattern)
            .count() as u64
    }

    #[test]
    fn test_counts_for_atcg() {
        let mut tree = SuffixTree::new();
        tree.store_word("ATCG").unwrap();
        assert_eq!(tree.count_occurrence("TC").unwrap(), 1);
        assert_eq!(tree.count_occurrence("NNN").unwrap(), 0);
        assert_eq!(tree.count_occurrence("ATC").unwrap(), 1);
        assert_eq!(tree.count_occurrence("ATCG").unwrap(), 1);
        assert_eq!(tree.count_occurrence("ATCGA").unwrap(), 0);
        assert_eq!(tree.total_count(), 4);
    }

    #[test]
    fn test_every_substring_matches_naive_count() {
        let word = "GATTACAGATTACANNAGAT";
        let mut tree = SuffixTree::new();
        tree.store_word(word).unwrap();
        for i in 0..word.len() {
            for j in i + 1..=word.len() {
                let pattern = &word[i..j];
                assert_eq!(
                    tree.count_occurrence(pattern).unwrap(),
                    naive_count(word, pattern),
                    "pattern {}",
                    pattern
                );
            }
        }
    }

    #[test]
    fn test_repeated_symbol_suffixes_nest() {
        // "AAA" stores AAA, AA, A: each suffix is a prefix of the previous
        let mut tree = SuffixTree::new();
        tree.store_word("AAA").unwrap();
        assert_eq!(tree.count_occurrence("A").unwrap(), 3);
        assert_eq!(tree.count_occurrence("AA").unwrap(), 2);
        assert_eq!(tree.count_occurrence("AAA").unwrap(), 1);
        assert_eq!(tree.count_occurrence("AAAA").unwrap(), 0);
        tree.as_radix().verify().unwrap();
    }

    #[test]
    fn test_long_homopolymer_builds_and_drops() {
        // every suffix nests inside the previous one: one tree level per symbol
        let len = 20_000;
        let mut tree = SuffixTree::new();
        tree.store_word(&"A".repeat(len)).unwrap();
        assert_eq!(tree.total_count(), len as u64);
        assert_eq!(tree.count_occurrence("A").unwrap(), len as u64);
        assert_eq!(tree.count_occurrence(&"A".repeat(len - 1)).unwrap(), 2);
        assert_eq!(tree.count_occurrence(&"A".repeat(len)).unwrap(), 1);
        assert_eq!(tree.count_fraction(["A"]).unwrap(), 1.0);
        tree.as_radix().verify().unwrap();

        let copy = tree.clone();
        assert_eq!(copy, tree);
        drop(copy);
        drop(tree);
    }

    #[test]
    fn test_overflowing_json_is_rejected() {
        let json = r#"[{"depth":0},{"depth":1,"label":"A","count":18446744073709551615},{"depth":1,"label":"C","count":1}]"#;
        assert!(matches!(
            serde_json::from_str::<SuffixTree>(json),
            Err(e) if e.to_string().contains("malformed tree")
        ));
    }

    #[test]
    fn test_pattern_ending_mid_edge_counts_subtree() {
        let mut tree = SuffixTree::new();
        tree.store_word("ACGTACGT").unwrap();
        // root edge "ACGT" leads to a terminal node with a single "ACGT" edge
        assert_eq!(tree.count_occurrence("AC").unwrap(), 2);
        assert_eq!(tree.count_occurrence("ACG").unwrap(), 2);
        assert_eq!(tree.count_occurrence("ACGTA").unwrap(), 1);
        assert_eq!(tree.count_occurrence("ACGTAC").unwrap(), 1);
    }

    #[test]
    fn test_divergence_inside_edge_counts_zero() {
        let mut tree = SuffixTree::new();
        tree.store_word("ATCG").unwrap();
        // matches "AT" then leaves the "ATCG" edge
        assert_eq!(tree.count_occurrence("ATG").unwrap(), 0);
        // first symbol matches no edge at all
        assert_eq!(tree.count_occurrence("N").unwrap(), 0);
        assert_eq!(tree.count_occurrence("").unwrap(), 0);
    }

    #[test]
    fn test_multiple_words_accumulate() {
        let mut tree = SuffixTree::new();
        for word in ["ACGT", "CGTA", "ACGT"] {
            tree.store_word(word).unwrap();
        }
        assert_eq!(tree.count_occurrence("CGT").unwrap(), 3);
        assert_eq!(tree.count_occurrence("ACGT").unwrap(), 2);
        assert_eq!(tree.count_occurrence("TA").unwrap(), 1);
        assert_eq!(tree.total_count(), 12);
    }

    #[test]
    fn test_count_fraction() {
        let mut tree = SuffixTree::new();
        tree.store_word("ATCG").unwrap();
        let gc = tree.count_fraction(["G", "C"]).unwrap();
        assert!((gc - 0.5).abs() < 1e-12);
        let at = tree.count_fraction(vec!["A".to_string()]).unwrap();
        assert!((at - 0.25).abs() < 1e-12);
        assert_eq!(tree.count_fraction(Vec::<&str>::new()).unwrap(), 0.0);
        assert_eq!(SuffixTree::new().count_fraction(["A"]).unwrap(), 0.0);
    }

    #[test]
    fn test_count_fraction_rejects_bad_elements() {
        let mut tree = SuffixTree::new();
        tree.store_word("ATCG").unwrap();
        assert!(matches!(
            tree.count_fraction(["GC"]),
            Err(TrieError::InvalidArgument(_))
        ));
        assert!(matches!(
            tree.count_fraction([""]),
            Err(TrieError::InvalidArgument(_))
        ));
        assert!(matches!(
            tree.count_fraction(["G", "x"]),
            Err(TrieError::InvalidSymbol { symbol: 'x', .. })
        ));
    }

    #[test]
    fn test_invalid_pattern_is_not_absence() {
        let mut tree = SuffixTree::new();
        tree.store_word("ATCG").unwrap();
        assert!(tree.count_occurrence("AUG").is_err());
        assert!(tree.store_word("ACU").is_err());
        assert_eq!(tree.total_count(), 4);
    }

    #[test]
    fn test_find_word_sees_suffixes() {
        let mut tree = SuffixTree::new();
        tree.store_word("ATCG").unwrap();
        assert!(tree.find_word("CG").unwrap().is_some());
        assert!(tree.find_word("AT").unwrap().is_none());
    }

    #[test]
    fn test_serde_is_transparent() {
        let mut tree = SuffixTree::new();
        tree.store_word("ACCA").unwrap();
        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(json, serde_json::to_string(tree.as_radix()).unwrap());
        let back: SuffixTree = serde_json::from_str(&json).unwrap();
        assert_eq!(back.count_occurrence("CA").unwrap(), 1);
    }
}
