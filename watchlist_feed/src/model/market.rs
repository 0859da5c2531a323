//! Simulated market state shared by the quote source and the push feed.
//!
//! The simulator keeps the last known `Quote` per symbol. One-shot fetches
//! read it and push ticks advance it, so a fetch issued between two ticks
//! observes the most recently pushed price.
//!
//! Design notes:
//! - Reference tickers are seeded at construction with a quote synthesized
//!   around their base price.
//! - Unknown symbols are synthesized around `UNKNOWN_BASE_PRICE` on first
//!   sight and remembered, unless the simulator is strict, in which case they
//!   are `NotFound`.

use std::collections::HashMap;
use std::sync::Mutex;

use log::debug;
use strum::IntoEnumIterator;
use watchlist_common::config::UNKNOWN_BASE_PRICE;
use watchlist_common::{Quote, Result, Symbol, Ticker, WatchError};

use crate::feed::TickSource;

/// Last known quote per symbol.
pub struct MarketSimulator {
    quotes: Mutex<HashMap<Symbol, Quote>>,
    strict: bool,
}

impl MarketSimulator {
    /// Create a simulator seeded with every reference ticker.
    pub fn new() -> Self {
        let quotes = Ticker::iter()
            .map(|ticker| {
                let symbol = Symbol::from(ticker);
                (symbol.clone(), Quote::synthesize(symbol, ticker.base_price()))
            })
            .collect();
        Self {
            quotes: Mutex::new(quotes),
            strict: false,
        }
    }

    /// Reject symbols outside the reference table instead of inventing them.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Current quote for `symbol`.
    pub fn quote(&self, symbol: &Symbol) -> Result<Quote> {
        let mut quotes = self.quotes.lock()?;
        if let Some(quote) = quotes.get(symbol) {
            return Ok(quote.clone());
        }
        let quote = self.synthesize_unknown(symbol)?;
        quotes.insert(symbol.clone(), quote.clone());
        Ok(quote)
    }

    /// Move `symbol` one tick forward and return the new quote.
    pub fn advance(&self, symbol: &Symbol) -> Result<Quote> {
        let mut quotes = self.quotes.lock()?;
        let next = match quotes.get(symbol) {
            Some(last) => last.next_tick(),
            None => self.synthesize_unknown(symbol)?.next_tick(),
        };
        quotes.insert(symbol.clone(), next.clone());
        Ok(next)
    }

    /// Last traded price, if the symbol has been seen.
    pub fn last_price(&self, symbol: &Symbol) -> Option<f64> {
        self.quotes
            .lock()
            .ok()
            .and_then(|quotes| quotes.get(symbol).map(|q| q.current_price))
    }

    fn synthesize_unknown(&self, symbol: &Symbol) -> Result<Quote> {
        if self.strict {
            return Err(WatchError::NotFound(symbol.to_string()));
        }
        debug!("Synthesizing quote for unknown symbol {}", symbol);
        Ok(Quote::synthesize(symbol.clone(), UNKNOWN_BASE_PRICE))
    }
}

impl Default for MarketSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for MarketSimulator {
    fn next_quote(&self, symbol: &Symbol) -> Result<Quote> {
        self.advance(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use watchlist_common::config::{SYNTHETIC_SPREAD, TICK_MAX_STEP};

    fn sym(s: &str) -> Symbol {
        Symbol::new(s).unwrap()
    }

    #[test]
    fn test_reference_symbols_start_near_base_price() {
        let market = MarketSimulator::new();
        let quote = market.quote(&sym("NVDA")).unwrap();
        assert_eq!(quote.previous_close, 819.49);
        assert!((quote.current_price - 819.49).abs() <= 819.49 * SYNTHETIC_SPREAD);
    }

    #[test]
    fn test_unknown_symbol_is_synthesized_and_remembered() {
        let market = MarketSimulator::new();
        let first = market.quote(&sym("ZZZZ")).unwrap();
        assert_eq!(first.previous_close, UNKNOWN_BASE_PRICE);
        let again = market.quote(&sym("ZZZZ")).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_strict_market_rejects_unknown_symbol() {
        let market = MarketSimulator::new().strict();
        assert!(matches!(market.quote(&sym("ZZZZ")), Err(WatchError::NotFound(_))));
        assert!(matches!(market.advance(&sym("ZZZZ")), Err(WatchError::NotFound(_))));
        assert!(market.quote(&sym("AAPL")).is_ok());
    }

    #[test]
    fn test_advance_is_visible_to_fetches() {
        let market = MarketSimulator::new();
        let before = market.quote(&sym("AAPL")).unwrap();
        let ticked = market.advance(&sym("AAPL")).unwrap();
        assert!((ticked.current_price - before.current_price).abs() <= before.current_price * TICK_MAX_STEP);
        assert_eq!(market.quote(&sym("AAPL")).unwrap(), ticked);
        assert_eq!(market.last_price(&sym("AAPL")), Some(ticked.current_price));
    }
}
