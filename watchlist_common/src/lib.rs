//!
//! Common types and utilities shared by the market feed and the watchlist client.
//!
//! This crate aggregates:
//! - `error`: unified error type `WatchError` used across the workspace.
//! - `result`: handy `Result<T, WatchError>` alias.
//! - `tickers`: `Symbol`, the reference company table and parsing helpers.
//! - `quote`: the `Quote` snapshot and its synthetic price math.
//! - `history`: daily price series and chart ranges.
//! - `news`: market headlines.
//! - `config`: session settings and timing constants.
#![warn(missing_docs)]
pub mod config;
pub mod error;
pub mod history;
pub mod news;
pub mod quote;
pub mod result;
pub mod tickers;

pub use config::Config;
pub use error::WatchError;
pub use history::{HistoryRange, PricePoint};
pub use news::NewsItem;
pub use quote::Quote;
pub use result::Result;
pub use tickers::{Symbol, SymbolInfo, Ticker};
