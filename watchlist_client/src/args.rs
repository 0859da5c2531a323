//! Command-line arguments for the watchlist dashboard.
//!
//! Flags override the `WATCHLIST_*` environment settings. See `main` for
//! end-to-end usage.
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use log::warn;
use watchlist_common::config::parse_symbol_list;
use watchlist_common::tickers::TickerParser;
use watchlist_common::{Config, HistoryRange, Result, Symbol, WatchError};

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Initial watchlist, separated by commas or spaces.
    #[clap(long)]
    pub symbols: Option<String>,

    /// Path to a text file with one symbol per line.
    /// Appended after `--symbols` when both are given.
    #[clap(long)]
    pub watchlist_file: Option<String>,

    /// Symbol selected at start; defaults to the first watchlist entry.
    #[clap(long)]
    pub select: Option<String>,

    /// Push feed period in milliseconds.
    #[clap(long)]
    pub tick_ms: Option<u64>,

    /// Answer quote source calls immediately instead of simulating latency.
    #[clap(long)]
    pub no_latency: bool,

    /// Initial chart range.
    #[clap(long, value_enum, default_value_t = HistoryRange::OneMonth)]
    pub range: HistoryRange,

    /// Render one frame once quotes are loaded, then exit.
    #[clap(long)]
    pub once: bool,

    /// Print the watchlist snapshot as JSON instead of text.
    #[clap(long)]
    pub json: bool,
}

impl Args {
    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, config: &mut Config) -> Result<()> {
        let mut symbols = match &self.symbols {
            Some(raw) => parse_symbol_list(raw)?,
            None if self.watchlist_file.is_some() => Vec::new(),
            None => config.symbols.clone(),
        };
        if let Some(raw) = &self.watchlist_file {
            for symbol in load_watchlist_file(&normalize_path(raw))? {
                if !symbols.contains(&symbol) {
                    symbols.push(symbol);
                }
            }
        }
        config.symbols = symbols;

        if let Some(raw) = &self.select {
            config.selected = Some(Symbol::new(raw)?);
        } else if let Some(dropped) = config
            .selected
            .take_if(|s| !config.symbols.contains(s))
        {
            warn!("Selection {} is not on the watchlist, ignoring it", dropped);
        }
        if let Some(millis) = self.tick_ms {
            config.tick_interval = Duration::from_millis(millis);
        }
        if self.no_latency {
            config.simulate_latency = false;
        }
        Ok(())
    }
}

/// Read a watchlist file, one symbol per line.
pub fn load_watchlist_file(path: &Path) -> Result<Vec<Symbol>> {
    if !is_file_exist(path) {
        return Err(WatchError::Config(format!(
            "watchlist file {} does not exist",
            path.display()
        )));
    }
    let file = File::open(path)?;
    Symbol::parse_from_file(BufReader::new(file))
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}

/// Returns `true` if the provided path exists and is a regular file.
fn is_file_exist(path: &Path) -> bool {
    path.exists() && path.is_file()
}
