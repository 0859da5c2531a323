//! Watchlist dashboard client.
//!
//! Owns the session state and its terminal presentation:
//! - `store`: the watchlist, its quote cache and the selection, merged from
//!   fetches and push updates.
//! - `session`: builds market, source, feed and store from a `Config`.
//! - `search`: debounced symbol search.
//! - `view`: plain-text panels.
//! - `dashboard`: line commands and the redraw loop.
#![warn(missing_docs)]
pub mod dashboard;
pub mod search;
pub mod session;
pub mod store;
pub mod view;

pub use dashboard::{Command, Dashboard, DashboardOptions};
pub use search::{SearchBox, SearchState};
pub use session::Session;
pub use store::{StoreSnapshot, WatchlistStore};
