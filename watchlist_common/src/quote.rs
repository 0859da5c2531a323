//! Quote data model and synthetic price helpers.
//!
//! A `Quote` is a full snapshot of price and derived statistics for one
//! symbol. Quotes are replaced wholesale on every fetch or push update and
//! never mutated in place, so every constructor here returns a new value.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{SYNTHETIC_SPREAD, TICK_MAX_STEP};
use crate::error::WatchError;
use crate::tickers::Symbol;

/// Lowest price a synthetic walk may reach.
pub const MIN_PRICE: f64 = 0.01;

/// Market quote for a single symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Symbol this quote belongs to.
    pub symbol: Symbol,
    /// Last traded price.
    pub current_price: f64,
    /// `current_price - previous_close`.
    pub change: f64,
    /// `change / previous_close * 100`.
    pub change_percent: f64,
    /// Day's high.
    pub high: f64,
    /// Day's low.
    pub low: f64,
    /// Day's open.
    pub open: f64,
    /// Previous session close.
    pub previous_close: f64,
    /// UTC timestamp in milliseconds since Unix epoch.
    pub timestamp: u64,
}

impl Quote {
    /// Calculate the next synthetic price using a small random walk around `current_price`.
    ///
    /// The change is sampled uniformly from `[-max_step, +max_step)` as a
    /// fraction of the current price and the result is clamped to
    /// [`MIN_PRICE`].
    pub fn next_price(current_price: f64, max_step: f64) -> f64 {
        let mut rng = rand::rng();
        let change: f64 = rng.random_range(-max_step..max_step);
        let new_price = current_price * (1.0 + change);
        new_price.max(MIN_PRICE)
    }

    /// Fresh quote scattered around `base_price`, which becomes the previous close.
    pub fn synthesize(symbol: Symbol, base_price: f64) -> Quote {
        let mut rng = rand::rng();
        let change = rng.random_range(-SYNTHETIC_SPREAD..SYNTHETIC_SPREAD) * base_price;
        let swing = change.abs() * 1.5;

        Quote {
            symbol,
            current_price: base_price + change,
            change,
            change_percent: change / base_price * 100.0,
            high: base_price + swing,
            low: (base_price - swing).max(MIN_PRICE),
            open: base_price - change / 2.0,
            previous_close: base_price,
            timestamp: now_millis(),
        }
    }

    /// Quote one push tick later.
    ///
    /// High and low are running extrema, open and previous close carry over,
    /// change is measured against the previous close.
    pub fn next_tick(&self) -> Quote {
        let price = Self::next_price(self.current_price, TICK_MAX_STEP);
        self.with_price(price)
    }

    /// Quote at an explicit `price`, keeping this quote's session values.
    pub fn with_price(&self, price: f64) -> Quote {
        let change = price - self.previous_close;
        Quote {
            symbol: self.symbol.clone(),
            current_price: price,
            change,
            change_percent: change / self.previous_close * 100.0,
            high: self.high.max(price),
            low: self.low.min(price),
            open: self.open,
            previous_close: self.previous_close,
            timestamp: now_millis(),
        }
    }

    /// Encode the quote to JSON bytes.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, WatchError> {
        let json = serde_json::to_vec(self)?;
        Ok(json)
    }
}

/// Current UTC time in milliseconds since Unix epoch.
pub fn now_millis() -> u64 {
    Utc::now().timestamp_millis() as u64
}
