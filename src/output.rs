//! Terminal output for tree dumps, query results and statistics

use crate::tree::stats::{format_size, TreeStats};
use crate::tree::Node;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

fn stdout(color: bool) -> StandardStream {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// Print an indented tree dump: edge labels in cyan, stored counts in green
pub fn print_tree(root: &Node, color: bool) -> io::Result<()> {
    write_tree(&mut stdout(color), root)
}

/// Indented dump, one line per node in pre-order; the root is labelled `(root)`.
pub fn write_tree<W: WriteColor>(out: &mut W, root: &Node) -> io::Result<()> {
    for (depth, label, node) in root.walk() {
        write!(out, "{:indent$}", "", indent = depth * 2)?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(depth == 0))?;
        match label {
            Some(label) => write!(out, "{}", label)?,
            None => write!(out, "(root)")?,
        }
        out.reset()?;

        if node.is_terminal() {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        }
        writeln!(out, " [{}]", node.count())?;
        out.reset()?;
    }

    Ok(())
}

/// Print `find` results, one `word:count` line per word
pub fn print_found(results: &[(String, Option<u64>)], color: bool) -> io::Result<()> {
    write_found(&mut stdout(color), results)
}

pub fn write_found<W: WriteColor>(out: &mut W, results: &[(String, Option<u64>)]) -> io::Result<()> {
    for (word, count) in results {
        write_key(out, word)?;
        match count {
            Some(count) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
                writeln!(out, "{}", count)?;
            }
            None => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
                writeln!(out, "not found")?;
            }
        }
        out.reset()?;
    }
    Ok(())
}

/// Print `count` results, one `pattern:occurrences` line per pattern
pub fn print_occurrences(results: &[(String, u64)], color: bool) -> io::Result<()> {
    write_occurrences(&mut stdout(color), results)
}

pub fn write_occurrences<W: WriteColor>(out: &mut W, results: &[(String, u64)]) -> io::Result<()> {
    for (pattern, count) in results {
        write_key(out, pattern)?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        writeln!(out, "{}", count)?;
        out.reset()?;
    }
    Ok(())
}

/// Print a `count_fraction` result for a symbol set
pub fn print_fraction(symbols: &[String], fraction: f64, color: bool) -> io::Result<()> {
    write_fraction(&mut stdout(color), symbols, fraction)
}

pub fn write_fraction<W: WriteColor>(out: &mut W, symbols: &[String], fraction: f64) -> io::Result<()> {
    write_key(out, &symbols.join(","))?;
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    writeln!(out, "{:.6}", fraction)?;
    out.reset()
}

fn write_key<W: WriteColor>(out: &mut W, key: &str) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
    write!(out, "{}", key)?;
    out.reset()?;
    write!(out, ":")
}

/// Print tree statistics
pub fn print_stats(title: &str, reads: usize, stats: &TreeStats) -> io::Result<()> {
    write_stats(&mut io::stdout().lock(), title, reads, stats)
}

pub fn write_stats<W: Write>(out: &mut W, title: &str, reads: usize, stats: &TreeStats) -> io::Result<()> {
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "=".repeat(title.len()))?;
    writeln!(out)?;
    writeln!(out, "Reads:            {}", reads)?;
    writeln!(out, "Stored count:     {}", stats.total_count)?;
    writeln!(out, "Nodes:            {}", stats.nodes)?;
    writeln!(out, "Edges:            {}", stats.edges)?;
    writeln!(out, "Terminal nodes:   {}", stats.terminals)?;
    writeln!(out, "Max depth:        {}", stats.max_depth)?;
    writeln!(out, "Max label:        {}", stats.max_label_len)?;
    writeln!(out, "Mean label:       {:.2}", stats.mean_label_len())?;
    writeln!(out)?;
    writeln!(out, "Approx. memory:   {}", format_size(stats.heap_bytes as u64))?;
    Ok(())
}
