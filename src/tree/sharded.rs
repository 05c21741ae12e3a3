//! Suffix index partitioned by leading symbol.
//!
//! Every suffix lands in the shard of its first symbol and every query
//! touches exactly one shard, so the five shards never need to see each
//! other. That makes them safe to build on separate rayon workers, each
//! owning its shard exclusively.

use super::suffix::{fraction_symbols, ratio, SuffixTree};
use crate::error::TrieError;
use crate::utils::encoding::{parse_symbols, Symbol, SYMBOLS};
use log::debug;
use rayon::prelude::*;

/// Five suffix trees, one per symbol, indexed by [`Symbol::index`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardedSuffixIndex {
    shards: [SuffixTree; 5],
}

impl ShardedSuffixIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build all shards in parallel from validated reads.
    pub fn build(reads: &[Vec<Symbol>]) -> Self {
        let mut index = Self::new();
        index
            .shards
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, shard)| {
                let symbol = SYMBOLS[i];
                for read in reads {
                    for (start, _) in read.iter().enumerate().filter(|(_, s)| **s == symbol) {
                        shard.store_suffix(&read[start..]);
                    }
                }
                debug!("shard {} holds {} suffixes", symbol, shard.total_count());
            });
        index
    }

    /// Index every suffix of `word`, routing each to its shard.
    pub fn store_word(&mut self, word: &str) -> Result<(), TrieError> {
        let symbols = parse_symbols(word)?;
        if symbols.is_empty() {
            return Err(TrieError::InvalidArgument("cannot store an empty word".into()));
        }
        for start in 0..symbols.len() {
            self.shards[symbols[start].index()].store_suffix(&symbols[start..]);
        }
        Ok(())
    }

    pub fn count_occurrence(&self, pattern: &str) -> Result<u64, TrieError> {
        let symbols = parse_symbols(pattern)?;
        Ok(match symbols.first() {
            Some(first) => self.shards[first.index()].count_symbols(&symbols),
            None => 0,
        })
    }

    pub fn count_fraction<I, S>(&self, symbols: I) -> Result<f64, TrieError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let symbols = fraction_symbols(symbols)?;
        let matched = symbols.iter().fold(0u64, |acc, &s| {
            acc.saturating_add(self.shards[s.index()].count_symbols(&[s]))
        });
        Ok(ratio(matched, self.total_count()))
    }

    pub fn total_count(&self) -> u64 {
        self.shards
            .iter()
            .fold(0u64, |acc, shard| acc.saturating_add(shard.total_count()))
    }

    pub fn shard(&self, symbol: Symbol) -> &SuffixTree {
        &self.shards[symbol.index()]
    }

    pub fn shards(&self) -> impl Iterator<Item = (Symbol, &SuffixTree)> {
        SYMBOLS.into_iter().zip(self.shards.iter())
    }
}
