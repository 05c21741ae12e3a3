//! # basetrie - radix and suffix trees for sequencing reads
//!
//! basetrie stores strings over the read alphabet {N, A, T, C, G} in a
//! compressed prefix tree whose edge labels are packed 3 bits per symbol,
//! and builds a brute-force suffix tree on top of it for substring
//! occurrence counts.
//!
//! ## Architecture
//!
//! - [`tree`] - Radix tree, suffix tree, sharded suffix index, statistics
//!   and building trees from reads files
//! - [`output`] - Colored tree dumps and result formatting
//! - [`utils`] - Symbol codec, ingest configuration, progress bars
//! - [`error`] - The library error type
//!
//! ## Quick Start
//!
//! ```
//! use basetrie::{RadixTree, SuffixTree};
//!
//! let mut radix = RadixTree::new();
//! radix.store_word("ATCG").unwrap();
//! radix.store_word("ATGA").unwrap();
//! assert!(radix.find_word("ATGA").unwrap().is_some());
//! assert!(radix.find_word("AT").unwrap().is_none());
//!
//! let mut suffixes = SuffixTree::new();
//! suffixes.store_word("ATCG").unwrap();
//! assert_eq!(suffixes.count_occurrence("TC").unwrap(), 1);
//! assert_eq!(suffixes.count_fraction(["G", "C"]).unwrap(), 0.5);
//! ```
//!
//! ## Performance
//!
//! Suffix construction inserts every suffix of every read, so it is
//! quadratic in read length. Queries only walk one root-to-node path and
//! then sum the subtree below it. For large read sets the
//! [`ShardedSuffixIndex`] splits the work into five trees, one per leading
//! symbol, and builds them in parallel.

pub mod error;
pub mod output;
pub mod tree;
pub mod utils;

pub use error::TrieError;
pub use tree::{sum_counts, Node, RadixTree, ShardedSuffixIndex, SuffixTree, TreeStats};
pub use utils::encoding::{decode, encode, PackedSymbols, Symbol, SYMBOLS};
