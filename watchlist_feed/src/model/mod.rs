//! Domain models backing the simulated market.
//!
//! - `market`: last known quote per symbol, advanced by push ticks and read
//!   by one-shot fetches.

pub mod market;
