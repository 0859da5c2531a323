//! Error types shared by the feed, the store and the dashboard.
//!
//! `WatchError` covers both non-fatal failure classes of the system: `Fetch`
//! for quote source calls that did not produce data and `Listener` for update
//! callbacks that failed during delivery. Neither is allowed to take the
//! process down; callers log them and keep the previous state.
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

/// Unified error type shared by every crate in the workspace.
#[derive(Error, Debug)]
pub enum WatchError {
    /// I/O error originating from the standard library (files, stdin).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The backing data does not recognise this symbol at all.
    #[error("Symbol not found: {0}")]
    NotFound(String),

    /// Raw input could not be turned into a ticker symbol.
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    /// A quote source call failed (network/timeout equivalent).
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// An update listener failed while a quote was being delivered.
    #[error("Listener failed: {0}")]
    Listener(String),

    /// A periodic task was requested outside of an async runtime.
    #[error("Runtime unavailable: {0}")]
    Runtime(String),

    /// Channel send failed because the receiving side was dropped.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),

    /// A search result index that does not exist was chosen.
    #[error("No search result at position {0}")]
    InvalidSelection(usize),

    /// Dashboard input line that is not a known command.
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Configuration value is missing or out of range.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error while parsing a watchlist file into symbols.
    #[error("Parse watchlist file error: {0}")]
    ParseTickersFile(String),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),
}

impl<T> From<PoisonError<T>> for WatchError {
    fn from(err: PoisonError<T>) -> Self {
        WatchError::MutexLock(err.to_string())
    }
}
