//! Loading reads files and building trees from them.
//!
//! A reads file holds one read per line. Lines are trimmed of trailing
//! whitespace, blank lines are ignored, and each remaining line is
//! normalized and validated according to [`IngestConfig`] before any tree
//! sees it.

use super::radix::RadixTree;
use super::sharded::ShardedSuffixIndex;
use super::suffix::SuffixTree;
use crate::error::TrieError;
use crate::utils::config::IngestConfig;
use crate::utils::encoding::{parse_symbol_bytes, Symbol};
use crate::utils::progress::{ingest_bar, ProgressBar};
use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Bytes between progress bar updates
const PROGRESS_STEP: usize = 1 << 20;

/// Validated reads ready for insertion, plus what was dropped on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadSet {
    pub reads: Vec<Vec<Symbol>>,
    /// Reads rejected for invalid symbols (only with `skip_invalid`)
    pub skipped_invalid: usize,
    /// Reads dropped by `min_read_len`
    pub skipped_short: usize,
}

impl ReadSet {
    pub fn len(&self) -> usize {
        self.reads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }

    /// Total symbols over all kept reads
    pub fn symbol_count(&self) -> usize {
        self.reads.iter().map(Vec::len).sum()
    }
}

/// Memory-map a reads file and parse it.
pub fn load_reads(path: &Path, config: &IngestConfig, silent: bool) -> Result<ReadSet> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let len = file
        .metadata()
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .len();

    // mapping a zero-length file fails on some platforms
    if len == 0 {
        debug!("{} is empty", path.display());
        return Ok(ReadSet::default());
    }

    let mmap = unsafe { Mmap::map(&file)? };
    let progress = ingest_bar(len, silent);
    let reads = parse_reads(&mmap, config, progress.as_ref())
        .with_context(|| format!("Failed to load reads from {}", path.display()))?;

    if let Some(pb) = progress {
        pb.finish_with_message(format!("Loaded {} reads", reads.len()));
    }
    info!(
        "loaded {} reads ({} symbols) from {}",
        reads.len(),
        reads.symbol_count(),
        path.display()
    );
    Ok(reads)
}

/// Parse newline-delimited reads from a byte buffer.
pub fn parse_reads(
    content: &[u8],
    config: &IngestConfig,
    progress: Option<&ProgressBar>,
) -> Result<ReadSet> {
    let mut set = ReadSet::default();
    let mut start = 0;
    let mut line_no = 0;
    let mut reported = 0;

    while start < content.len() {
        let end = memchr::memchr(b'\n', &content[start..]).map_or(content.len(), |i| start + i);
        line_no += 1;
        let line = content[start..end].trim_ascii_end();
        start = end + 1;

        if let Some(pb) = progress {
            if start - reported >= PROGRESS_STEP {
                pb.set_position(start.min(content.len()) as u64);
                reported = start;
            }
        }

        if line.is_empty() {
            continue;
        }

        match parse_symbol_bytes(line, config.case_insensitive) {
            Ok(read) if read.len() < config.min_read_len => set.skipped_short += 1,
            Ok(read) => set.reads.push(read),
            Err(e) if config.skip_invalid => {
                warn!("skipping read on line {}: {}", line_no, e);
                set.skipped_invalid += 1;
            }
            Err(e) => bail!("line {}: {}", line_no, e),
        }
    }

    if let Some(pb) = progress {
        pb.set_position(content.len() as u64);
    }
    if set.skipped_invalid + set.skipped_short > 0 {
        debug!(
            "dropped {} invalid and {} short reads",
            set.skipped_invalid, set.skipped_short
        );
    }
    Ok(set)
}

pub fn build_radix(reads: &ReadSet) -> Result<RadixTree> {
    let mut tree = RadixTree::new();
    for read in &reads.reads {
        tree.store_symbols(read)?;
    }
    debug!("radix tree holds {} distinct reads", tree.len());
    Ok(tree)
}

pub fn build_suffix(reads: &ReadSet) -> Result<SuffixTree> {
    let mut tree = SuffixTree::new();
    for read in &reads.reads {
        tree.store_symbols(read)?;
    }
    debug!("suffix tree holds {} suffixes", tree.total_count());
    Ok(tree)
}

pub fn build_sharded(reads: &ReadSet) -> ShardedSuffixIndex {
    ShardedSuffixIndex::build(&reads.reads)
}

/// A suffix index in either layout, answering the same queries.
#[derive(Debug, Clone)]
pub enum SuffixIndex {
    Single(SuffixTree),
    Sharded(ShardedSuffixIndex),
}

impl SuffixIndex {
    /// Build the layout `config.parallel_shards` asks for.
    pub fn build(reads: &ReadSet, config: &IngestConfig) -> Result<Self> {
        if config.parallel_shards {
            Ok(SuffixIndex::Sharded(build_sharded(reads)))
        } else {
            Ok(SuffixIndex::Single(build_suffix(reads)?))
        }
    }

    pub fn count_occurrence(&self, pattern: &str) -> Result<u64, TrieError> {
        match self {
            SuffixIndex::Single(tree) => tree.count_occurrence(pattern),
            SuffixIndex::Sharded(index) => index.count_occurrence(pattern),
        }
    }

    pub fn count_fraction<S: AsRef<str>>(&self, symbols: &[S]) -> Result<f64, TrieError> {
        match self {
            SuffixIndex::Single(tree) => tree.count_fraction(symbols),
            SuffixIndex::Sharded(index) => index.count_fraction(symbols),
        }
    }

    pub fn total_count(&self) -> u64 {
        match self {
            SuffixIndex::Single(tree) => tree.total_count(),
            SuffixIndex::Sharded(index) => index.total_count(),
        }
    }
}
