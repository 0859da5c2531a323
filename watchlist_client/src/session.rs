//! Session context: one market, one source, one feed and one store, built
//! together from a `Config` and torn down together.

use std::sync::Arc;

use log::info;
use watchlist_common::{Config, Result};
use watchlist_feed::{FeedState, Latency, MarketSimulator, PushFeed, QuoteSource, SimulatedQuoteSource};

use crate::store::WatchlistStore;

/// Everything a dashboard needs, wired to the same simulated market.
pub struct Session {
    source: Arc<dyn QuoteSource>,
    store: WatchlistStore,
}

impl Session {
    /// Build the session and connect its push feed.
    ///
    /// Must be called inside a tokio runtime. Quotes are not loaded yet;
    /// await [`Session::load`] for that.
    pub fn start(config: &Config) -> Result<Self> {
        config.validate()?;
        let market = Arc::new(MarketSimulator::new());
        let latency = if config.simulate_latency {
            Latency::network()
        } else {
            Latency::none()
        };
        let source: Arc<dyn QuoteSource> =
            Arc::new(SimulatedQuoteSource::new(Arc::clone(&market), latency));
        let feed = PushFeed::new(market, config.tick_interval);
        let store = WatchlistStore::new(
            Arc::clone(&source),
            feed.clone(),
            config.symbols.clone(),
            config.initial_selection(),
        )?;
        feed.connect()?;
        info!("Session started with {} symbols", config.symbols.len());

        Ok(Self { source, store })
    }

    /// Initial bulk quote load.
    pub async fn load(&self) {
        self.store.load_initial().await;
    }

    /// Watchlist store of this session.
    pub fn store(&self) -> &WatchlistStore {
        &self.store
    }

    /// Request/response source.
    pub fn source(&self) -> Arc<dyn QuoteSource> {
        Arc::clone(&self.source)
    }

    /// Push feed the store listens to.
    pub fn feed(&self) -> &PushFeed {
        self.store.feed()
    }

    /// Whether the push feed is still connected.
    pub fn is_live(&self) -> bool {
        self.feed().state() == FeedState::Connected
    }

    /// Unregister the store listener and stop the feed timer.
    pub fn end(self) {
        self.store.shutdown();
        info!("Session ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use watchlist_common::Symbol;

    fn quick_config() -> Config {
        Config {
            simulate_latency: false,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_start_selects_first_symbol_and_connects() {
        let session = Session::start(&quick_config()).unwrap();
        assert!(session.is_live());
        assert_eq!(session.store().selected(), Some(Symbol::new("AAPL").unwrap()));
        assert_eq!(session.feed().subscriptions().len(), 4);

        session.load().await;
        assert!(session.store().is_ready());
        session.end();
    }

    #[tokio::test]
    async fn test_end_disconnects_feed() {
        let session = Session::start(&quick_config()).unwrap();
        let feed = session.feed().clone();
        session.end();
        assert_eq!(feed.state(), FeedState::Disconnected);
        assert_eq!(feed.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let config = Config {
            tick_interval: Duration::ZERO,
            ..quick_config()
        };
        assert!(Session::start(&config).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_observe_pushed_prices() {
        let session = Session::start(&quick_config()).unwrap();
        session.load().await;
        let aapl = Symbol::new("AAPL").unwrap();

        tokio::time::sleep(Duration::from_millis(3100)).await;
        let cached = session.store().quote(&aapl).unwrap();
        let fetched = session.source().fetch_quote(&aapl).await.unwrap();
        assert_eq!(cached.current_price, fetched.current_price);
        session.end();
    }
}
