//! Simulated market data for the watchlist dashboard.
//!
//! This crate stands in for a remote market-data provider. It wires together
//! three building blocks:
//!
//! - `MarketSimulator`: last known quote per symbol, seeded from the
//!   reference ticker table and advanced by a bounded random walk.
//! - `QuoteSource`: one-shot asynchronous requests (quote, history, symbol
//!   search, news); `SimulatedQuoteSource` answers them from the simulator
//!   after an artificial latency.
//! - `PushFeed`: a connection-like broadcaster that, while connected, ticks
//!   on a `PeriodicTask` and delivers one fresh quote per subscribed symbol to
//!   every registered listener.
//!
//! A live provider replaces `SimulatedQuoteSource` and the feed's
//! `TickSource` behind the same contracts; nothing downstream changes.
//!
//! Errors are surfaced as `WatchError`. Fetch failures are returned to the
//! caller; listener failures are logged per listener and never stop the
//! timer or delivery to other listeners.
#![warn(missing_docs)]
pub mod feed;
pub mod model;
pub mod periodic;
pub mod source;

pub use feed::{FeedState, ListenerHandle, PushFeed, TickSource};
pub use model::market::MarketSimulator;
pub use periodic::PeriodicTask;
pub use source::{Latency, QuoteSource, SimulatedQuoteSource};
