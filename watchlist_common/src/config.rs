//! Session configuration and timing constants.

use std::env;
use std::time::Duration;

use log::{info, warn};

use crate::error::WatchError;
use crate::tickers::{Symbol, Ticker};

// Session defaults
/// Watchlist a session starts with when nothing else is configured.
pub const DEFAULT_WATCHLIST: [Ticker; 4] = [Ticker::AAPL, Ticker::MSFT, Ticker::GOOGL, Ticker::AMZN];
/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Push feed
/// Push feed period in milliseconds.
pub const TICK_INTERVAL_MS: u64 = 3000;
/// Largest per-tick move as a fraction of the current price.
pub const TICK_MAX_STEP: f64 = 0.005;

// Simulated market
/// Base price for symbols missing from the reference table.
pub const UNKNOWN_BASE_PRICE: f64 = 100.0;
/// Spread of a freshly synthesized quote as a fraction of its base price.
pub const SYNTHETIC_SPREAD: f64 = 0.025;
/// Largest daily move of a history walk as a fraction of the base price.
pub const HISTORY_DAILY_STEP: f64 = 0.01;

// Simulated network latency
/// Artificial roundtrip of a quote fetch.
pub const QUOTE_LATENCY_MS: u64 = 500;
/// Artificial roundtrip of a history fetch.
pub const HISTORY_LATENCY_MS: u64 = 800;
/// Artificial roundtrip of a news fetch.
pub const NEWS_LATENCY_MS: u64 = 600;
/// Artificial roundtrip of a symbol search.
pub const SEARCH_LATENCY_MS: u64 = 300;

// Presentation
/// Quiet period after the last keystroke before a search is issued.
pub const SEARCH_DEBOUNCE_MS: u64 = 300;
/// Dashboard redraw period.
pub const RENDER_INTERVAL_MS: u64 = 1000;

/// Effective settings for one dashboard session.
#[derive(Debug, Clone)]
pub struct Config {
    /// Initial watchlist, in display order.
    pub symbols: Vec<Symbol>,
    /// Initial selection; `None` selects the first watchlist member.
    pub selected: Option<Symbol>,
    /// Push feed period.
    pub tick_interval: Duration,
    /// Whether quote source calls sleep to emulate a network roundtrip.
    pub simulate_latency: bool,
    /// `RUST_LOG` filter.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_WATCHLIST.iter().copied().map(Symbol::from).collect(),
            selected: None,
            tick_interval: Duration::from_millis(TICK_INTERVAL_MS),
            simulate_latency: true,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Reads `WATCHLIST_*` and `RUST_LOG` from the process environment.
    pub fn from_env() -> Result<Self, WatchError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, WatchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(raw) = lookup("WATCHLIST_SYMBOLS") {
            config.symbols = parse_symbol_list(&raw)?;
        }
        if let Some(raw) = lookup("WATCHLIST_SELECTED") {
            config.selected = Some(Symbol::new(&raw)?);
        }
        if let Some(raw) = lookup("WATCHLIST_TICK_MS") {
            let millis = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| WatchError::Config(format!("WATCHLIST_TICK_MS={raw}: {e}")))?;
            config.tick_interval = Duration::from_millis(millis);
        }
        if let Some(raw) = lookup("WATCHLIST_SIMULATE_LATENCY") {
            config.simulate_latency = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(WatchError::Config(format!(
                        "WATCHLIST_SIMULATE_LATENCY must be true or false, got {other:?}"
                    )));
                }
            };
        }
        if let Some(level) = lookup("RUST_LOG") {
            config.log_level = level;
        }
        Ok(config)
    }

    /// Rejects settings the session cannot run with.
    pub fn validate(&self) -> Result<(), WatchError> {
        if self.tick_interval.is_zero() {
            return Err(WatchError::Config("tick interval must be greater than zero".to_string()));
        }

        if let Some(selected) = &self.selected {
            if !self.symbols.contains(selected) {
                return Err(WatchError::Config(format!(
                    "selected symbol {selected} is not on the watchlist"
                )));
            }
        }

        if self.symbols.is_empty() {
            warn!("Starting with an empty watchlist");
        }
        Ok(())
    }

    /// Selection the store starts with.
    pub fn initial_selection(&self) -> Option<Symbol> {
        self.selected.clone().or_else(|| self.symbols.first().cloned())
    }

    /// Logs the effective settings at `info`.
    pub fn log_config(&self) {
        let symbols: Vec<&str> = self.symbols.iter().map(Symbol::as_str).collect();
        info!("Session configuration:");
        info!("  Watchlist: {}", symbols.join(", "));
        info!(
            "  Selected: {}",
            self.initial_selection().map(|s| s.to_string()).unwrap_or_else(|| "-".to_string())
        );
        info!("  Tick interval: {} ms", self.tick_interval.as_millis());
        info!("  Simulated latency: {}", self.simulate_latency);
        info!("  Log level: {}", self.log_level);
    }
}

/// Parses a comma/whitespace separated list, dropping duplicates but keeping order.
pub fn parse_symbol_list(raw: &str) -> Result<Vec<Symbol>, WatchError> {
    let mut symbols: Vec<Symbol> = Vec::new();
    for part in raw.split(|c: char| c == ',' || c.is_whitespace()) {
        if part.is_empty() {
            continue;
        }
        let symbol = Symbol::new(part)?;
        if !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
    Ok(symbols)
}
