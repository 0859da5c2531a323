//! One-shot request/response market data.
//!
//! `QuoteSource` is the seam the store and the views fetch through. The
//! simulated implementation answers from the shared `MarketSimulator`, the
//! reference ticker table and the fixed news list, sleeping for a configured
//! latency first to emulate a network roundtrip.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use watchlist_common::config::{
    HISTORY_LATENCY_MS, NEWS_LATENCY_MS, QUOTE_LATENCY_MS, SEARCH_LATENCY_MS, UNKNOWN_BASE_PRICE,
};
use watchlist_common::history::generate_history;
use watchlist_common::news::sample_news;
use watchlist_common::quote::now_millis;
use watchlist_common::tickers::search_reference;
use watchlist_common::{HistoryRange, NewsItem, PricePoint, Quote, Result, Symbol, SymbolInfo};

use crate::model::market::MarketSimulator;

/// Request/response market data provider.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Point-in-time quote for `symbol`.
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote>;

    /// Daily series covering `range`, oldest first, ending today.
    async fn fetch_history(&self, symbol: &Symbol, range: HistoryRange) -> Result<Vec<PricePoint>>;

    /// Symbols whose ticker or company name contains `query`, ignoring case.
    async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolInfo>>;

    /// Headlines, newest first.
    async fn fetch_news(&self) -> Result<Vec<NewsItem>>;
}

/// Artificial delay applied to each kind of call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    /// `fetch_quote` delay.
    pub quote: Duration,
    /// `fetch_history` delay.
    pub history: Duration,
    /// `fetch_news` delay.
    pub news: Duration,
    /// `search_symbols` delay.
    pub search: Duration,
}

impl Latency {
    /// Delays resembling a real network roundtrip.
    pub fn network() -> Self {
        Self {
            quote: Duration::from_millis(QUOTE_LATENCY_MS),
            history: Duration::from_millis(HISTORY_LATENCY_MS),
            news: Duration::from_millis(NEWS_LATENCY_MS),
            search: Duration::from_millis(SEARCH_LATENCY_MS),
        }
    }

    /// Answer immediately.
    pub fn none() -> Self {
        Self {
            quote: Duration::ZERO,
            history: Duration::ZERO,
            news: Duration::ZERO,
            search: Duration::ZERO,
        }
    }
}

/// Quote source backed by the simulated market.
pub struct SimulatedQuoteSource {
    market: Arc<MarketSimulator>,
    latency: Latency,
}

impl SimulatedQuoteSource {
    /// Create a source over `market` with the given delays.
    pub fn new(market: Arc<MarketSimulator>, latency: Latency) -> Self {
        Self { market, latency }
    }
}

async fn simulate_roundtrip(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl QuoteSource for SimulatedQuoteSource {
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote> {
        simulate_roundtrip(self.latency.quote).await;
        self.market.quote(symbol)
    }

    async fn fetch_history(&self, symbol: &Symbol, range: HistoryRange) -> Result<Vec<PricePoint>> {
        simulate_roundtrip(self.latency.history).await;
        let base = self.market.last_price(symbol).unwrap_or(UNKNOWN_BASE_PRICE);
        let today = Utc::now().date_naive();
        debug!("Generating {} history for {} from {:.2}", range, symbol, base);
        Ok(generate_history(base, range.days(), today))
    }

    async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolInfo>> {
        simulate_roundtrip(self.latency.search).await;
        Ok(search_reference(query))
    }

    async fn fetch_news(&self) -> Result<Vec<NewsItem>> {
        simulate_roundtrip(self.latency.news).await;
        Ok(sample_news(now_millis()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use watchlist_common::WatchError;

    fn sym(s: &str) -> Symbol {
        Symbol::new(s).unwrap()
    }

    fn source() -> SimulatedQuoteSource {
        SimulatedQuoteSource::new(Arc::new(MarketSimulator::new()), Latency::none())
    }

    #[tokio::test]
    async fn test_fetch_quote_for_known_and_unknown_symbols() {
        let source = source();
        let aapl = source.fetch_quote(&sym("AAPL")).await.unwrap();
        assert_eq!(aapl.symbol, sym("AAPL"));
        assert_eq!(aapl.previous_close, 185.92);

        let unknown = source.fetch_quote(&sym("QQQQ")).await.unwrap();
        assert_eq!(unknown.previous_close, UNKNOWN_BASE_PRICE);
    }

    #[tokio::test]
    async fn test_strict_source_reports_not_found() {
        let market = Arc::new(MarketSimulator::new().strict());
        let source = SimulatedQuoteSource::new(market, Latency::none());
        let err = source.fetch_quote(&sym("QQQQ")).await.unwrap_err();
        assert!(matches!(err, WatchError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_history_has_one_point_per_day_plus_today() {
        let source = source();
        let series = source.fetch_history(&sym("MSFT"), HistoryRange::OneWeek).await.unwrap();
        assert_eq!(series.len(), 8);
        assert_eq!(series.last().unwrap().date, Utc::now().date_naive());
    }

    #[tokio::test]
    async fn test_history_is_redrawn_each_call() {
        let source = source();
        let first = source.fetch_history(&sym("AAPL"), HistoryRange::OneYear).await.unwrap();
        let second = source.fetch_history(&sym("AAPL"), HistoryRange::OneYear).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_search() {
        let source = source();
        let hits = source.search_symbols("aap").await.unwrap();
        assert!(hits.iter().any(|h| h.symbol == sym("AAPL")));
        assert!(source.search_symbols("zzzNoMatch").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_news_newest_first() {
        let news = source().fetch_news().await.unwrap();
        assert!(!news.is_empty());
        assert!(news.windows(2).all(|w| w[0].datetime >= w[1].datetime));
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_applied() {
        let source = SimulatedQuoteSource::new(Arc::new(MarketSimulator::new()), Latency::network());
        let started = tokio::time::Instant::now();
        source.fetch_quote(&sym("AAPL")).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(QUOTE_LATENCY_MS));
    }
}
