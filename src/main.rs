use anyhow::{Context, Result};
use basetrie::output;
use basetrie::tree::build::{build_radix, load_reads, ReadSet, SuffixIndex};
use basetrie::tree::{Node, TreeStats};
use basetrie::utils::{random_reads, IngestConfig};
use clap::{Parser, Subcommand};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "basetrie")]
#[command(about = "Radix and suffix trees over N/A/T/C/G reads")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Ingest config file (defaults to the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Hide progress bars
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a tree from a reads file and show its statistics
    Build {
        /// Reads file, one read per line
        reads: PathBuf,

        /// Index every suffix instead of whole reads
        #[arg(short, long)]
        suffix: bool,

        /// Print the tree after the statistics
        #[arg(short, long)]
        dump: bool,

        /// Print the tree as JSON instead of statistics
        #[arg(long)]
        json: bool,
    },
    /// Look up whole reads and report how often each was stored
    Find {
        reads: PathBuf,

        /// Words to look up
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Count substring occurrences across all reads
    Count {
        reads: PathBuf,

        /// Patterns to count
        #[arg(required = true)]
        patterns: Vec<String>,
    },
    /// Share of all stored symbols belonging to a symbol set
    Fraction {
        reads: PathBuf,

        /// Single symbols, e.g. `G C` for GC content
        #[arg(required = true)]
        symbols: Vec<String>,
    },
    /// Print random reads
    Generate {
        /// Symbols per read
        #[arg(short, long)]
        length: usize,

        /// Number of reads
        #[arg(short, long)]
        count: usize,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let color = !cli.no_color;
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Build {
            reads,
            suffix,
            dump,
            json,
        } => {
            let (reads, config) = load(&reads, config_path, cli.quiet)?;
            if suffix {
                let index = SuffixIndex::build(&reads, &config)?;
                show_suffix_index(&index, reads.len(), dump, json, color)?;
            } else {
                let tree = build_radix(&reads)?;
                if json {
                    print_json(&tree)?;
                } else {
                    show_tree("Radix Tree Statistics", tree.root(), reads.len(), dump, color)?;
                }
            }
        }
        Commands::Find { reads, words } => {
            let (reads, _) = load(&reads, config_path, cli.quiet)?;
            let tree = build_radix(&reads)?;
            let mut results = Vec::with_capacity(words.len());
            for word in words {
                let found = tree
                    .find_word(&word)
                    .with_context(|| format!("Invalid word {:?}", word))?
                    .map(Node::count);
                results.push((word, found));
            }
            output::print_found(&results, color)?;
        }
        Commands::Count { reads, patterns } => {
            let (reads, config) = load(&reads, config_path, cli.quiet)?;
            let index = SuffixIndex::build(&reads, &config)?;
            let mut results = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let count = index
                    .count_occurrence(&pattern)
                    .with_context(|| format!("Invalid pattern {:?}", pattern))?;
                results.push((pattern, count));
            }
            output::print_occurrences(&results, color)?;
        }
        Commands::Fraction { reads, symbols } => {
            let (reads, config) = load(&reads, config_path, cli.quiet)?;
            let index = SuffixIndex::build(&reads, &config)?;
            let fraction = index
                .count_fraction(&symbols)
                .context("Invalid symbol set")?;
            output::print_fraction(&symbols, fraction, color)?;
        }
        Commands::Generate {
            length,
            count,
            seed,
        } => {
            generate(length, count, seed)?;
        }
    }

    Ok(())
}

/// Resolve the ingest config and load a reads file with it
fn load(path: &Path, config_path: Option<&Path>, quiet: bool) -> Result<(ReadSet, IngestConfig)> {
    let config = IngestConfig::load(config_path)?;
    let reads = load_reads(path, &config, quiet)?;
    if reads.skipped_invalid > 0 {
        info!("skipped {} reads with invalid symbols", reads.skipped_invalid);
    }
    Ok((reads, config))
}

fn show_tree(title: &str, root: &Node, reads: usize, dump: bool, color: bool) -> Result<()> {
    output::print_stats(title, reads, &TreeStats::collect(root))?;
    if dump {
        println!();
        output::print_tree(root, color)?;
    }
    Ok(())
}

fn show_suffix_index(
    index: &SuffixIndex,
    reads: usize,
    dump: bool,
    json: bool,
    color: bool,
) -> Result<()> {
    match index {
        SuffixIndex::Single(tree) if json => print_json(tree),
        SuffixIndex::Single(tree) => {
            show_tree("Suffix Tree Statistics", tree.root(), reads, dump, color)
        }
        SuffixIndex::Sharded(index) if json => {
            let shards: BTreeMap<char, _> = index
                .shards()
                .map(|(symbol, shard)| (symbol.as_char(), shard))
                .collect();
            print_json(&shards)
        }
        SuffixIndex::Sharded(index) => {
            for (i, (symbol, shard)) in index.shards().enumerate() {
                if i > 0 {
                    println!();
                }
                let title = format!("Shard {} Statistics", symbol);
                show_tree(&title, shard.root(), reads, dump, color)?;
            }
            Ok(())
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let mut stdout = BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut stdout, value).context("Failed to serialize tree")?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

fn generate(length: usize, count: usize, seed: Option<u64>) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut stdout = BufWriter::new(io::stdout().lock());
    for read in random_reads(&mut rng, length, count) {
        writeln!(stdout, "{}", read)?;
    }
    stdout.flush()?;
    Ok(())
}
