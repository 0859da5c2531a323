//! Debounced symbol search.
//!
//! Every keystroke replaces the query and restarts the quiet period. Only the
//! latest query is ever sent to the source, and a response that arrives for
//! an older query is discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::{debug, warn};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use watchlist_common::{Result, SymbolInfo, WatchError};
use watchlist_feed::QuoteSource;

use crate::store::WatchlistStore;

/// What the search box currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    /// Text typed so far.
    pub query: String,
    /// Results of the latest completed search.
    pub results: Vec<SymbolInfo>,
    /// A search request is in flight.
    pub is_searching: bool,
    /// Result list is open.
    pub visible: bool,
}

/// Search input with debounce and stale-response suppression.
pub struct SearchBox {
    source: Arc<dyn QuoteSource>,
    debounce: Duration,
    generation: Arc<AtomicU64>,
    state: Arc<Mutex<SearchState>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl SearchBox {
    /// Search box querying `source` once input has been quiet for `debounce`.
    pub fn new(source: Arc<dyn QuoteSource>, debounce: Duration) -> Self {
        Self {
            source,
            debounce,
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(Mutex::new(SearchState::default())),
            pending: Mutex::new(None),
        }
    }

    /// Replace the query text.
    ///
    /// A blank query clears the results right away. Otherwise a search is
    /// scheduled after the debounce delay, superseding any earlier one.
    pub fn set_query(&self, query: &str) -> Result<()> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = self.pending.lock()?.take() {
            previous.abort();
        }

        {
            let mut state = self.state.lock()?;
            state.query = query.to_string();
            if query.trim().is_empty() {
                state.results.clear();
                state.is_searching = false;
                state.visible = false;
                return Ok(());
            }
            state.visible = true;
        }

        let runtime = Handle::try_current().map_err(|e| WatchError::Runtime(e.to_string()))?;
        let source = Arc::clone(&self.source);
        let current = Arc::clone(&self.generation);
        let state = Arc::clone(&self.state);
        let debounce = self.debounce;
        let query = query.trim().to_string();

        let handle = runtime.spawn(async move {
            tokio::time::sleep(debounce).await;
            if current.load(Ordering::SeqCst) != generation {
                return;
            }
            lock(&state).is_searching = true;
            debug!("Searching symbols for {:?}", query);

            let outcome = source.search_symbols(&query).await;
            if current.load(Ordering::SeqCst) != generation {
                debug!("Dropping stale results for {:?}", query);
                return;
            }
            let mut state = lock(&state);
            state.is_searching = false;
            match outcome {
                Ok(results) => state.results = results,
                Err(e) => {
                    warn!("Symbol search for {:?} failed: {}", query, e);
                    state.results.clear();
                }
            }
        });
        *self.pending.lock()? = Some(handle);
        Ok(())
    }

    /// Hide the result list without touching the query.
    pub fn dismiss(&self) {
        lock(&self.state).visible = false;
    }

    /// Reset to an empty query and cancel any scheduled search.
    pub fn clear(&self) -> Result<()> {
        self.set_query("")
    }

    /// Add the `index`-th result to the watchlist and select it.
    pub async fn choose(&self, index: usize, store: &WatchlistStore) -> Result<SymbolInfo> {
        let chosen = lock(&self.state)
            .results
            .get(index)
            .cloned()
            .ok_or(WatchError::InvalidSelection(index))?;

        store.set_selected_stock(Some(chosen.symbol.clone()));
        store.add_to_watchlist(chosen.symbol.clone()).await?;
        self.clear()?;
        Ok(chosen)
    }

    /// Copy of the current state.
    pub fn state(&self) -> SearchState {
        lock(&self.state).clone()
    }

    /// Whether a result list should be drawn.
    pub fn is_showing(&self) -> bool {
        let state = lock(&self.state);
        state.visible && (!state.query.trim().is_empty() || !state.results.is_empty())
    }
}

impl Drop for SearchBox {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.get_mut().unwrap_or_else(PoisonError::into_inner).take() {
            pending.abort();
        }
    }
}

fn lock(state: &Mutex<SearchState>) -> std::sync::MutexGuard<'_, SearchState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::time::sleep;
    use watchlist_common::{HistoryRange, NewsItem, PricePoint, Quote, Symbol};
    use watchlist_feed::{Latency, MarketSimulator, PushFeed, SimulatedQuoteSource};

    const DEBOUNCE: Duration = Duration::from_millis(300);

    /// Counts searches and answers from the reference table.
    struct Recording {
        inner: SimulatedQuoteSource,
        queries: Mutex<Vec<String>>,
        fail: bool,
    }

    impl Recording {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                inner: SimulatedQuoteSource::new(Arc::new(MarketSimulator::new()), Latency::network()),
                queries: Mutex::new(Vec::new()),
                fail,
            })
        }
    }

    #[async_trait]
    impl QuoteSource for Recording {
        async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote> {
            self.inner.fetch_quote(symbol).await
        }
        async fn fetch_history(&self, symbol: &Symbol, range: HistoryRange) -> Result<Vec<PricePoint>> {
            self.inner.fetch_history(symbol, range).await
        }
        async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolInfo>> {
            self.queries.lock().unwrap().push(query.to_string());
            if self.fail {
                return Err(WatchError::Fetch("search backend down".to_string()));
            }
            self.inner.search_symbols(query).await
        }
        async fn fetch_news(&self) -> Result<Vec<NewsItem>> {
            self.inner.fetch_news().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_last_keystroke_is_searched() {
        let source = Recording::new(false);
        let search = SearchBox::new(source.clone(), DEBOUNCE);
        for typed in ["a", "aa", "aap"] {
            search.set_query(typed).unwrap();
            sleep(Duration::from_millis(100)).await;
        }
        sleep(Duration::from_secs(1)).await;

        assert_eq!(*source.queries.lock().unwrap(), vec!["aap".to_string()]);
        let state = search.state();
        assert!(!state.is_searching);
        assert!(state.results.iter().any(|r| r.symbol.as_str() == "AAPL"));
        assert!(search.is_showing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_discarded() {
        let source = Recording::new(false);
        let search = SearchBox::new(source.clone(), DEBOUNCE);
        search.set_query("micro").unwrap();
        // Past the debounce, the first request is in flight.
        sleep(Duration::from_millis(400)).await;
        assert!(search.state().is_searching);

        search.set_query("tes").unwrap();
        sleep(Duration::from_secs(1)).await;

        let results = search.state().results;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].symbol.as_str(), "TSLA");
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_query_clears_without_searching() {
        let source = Recording::new(false);
        let search = SearchBox::new(source.clone(), DEBOUNCE);
        search.set_query("nv").unwrap();
        sleep(Duration::from_secs(1)).await;
        assert!(!search.state().results.is_empty());

        search.set_query("   ").unwrap();
        sleep(Duration::from_secs(1)).await;
        assert!(search.state().results.is_empty());
        assert!(!search.is_showing());
        assert_eq!(source.queries.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_failure_clears_results() {
        let search = SearchBox::new(Recording::new(true), DEBOUNCE);
        search.set_query("aap").unwrap();
        sleep(Duration::from_secs(1)).await;
        let state = search.state();
        assert!(state.results.is_empty());
        assert!(!state.is_searching);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_hides_results_but_keeps_query() {
        let search = SearchBox::new(Recording::new(false), DEBOUNCE);
        search.set_query("j").unwrap();
        sleep(Duration::from_secs(1)).await;
        assert!(search.is_showing());

        search.dismiss();
        assert!(!search.is_showing());
        assert_eq!(search.state().query, "j");
    }

    #[tokio::test(start_paused = true)]
    async fn test_choose_adds_selects_and_clears() {
        let source = Recording::new(false);
        let market = Arc::new(MarketSimulator::new());
        let feed = PushFeed::new(market, Duration::from_secs(3));
        let store = WatchlistStore::new(source.clone(), feed, Vec::new(), None).unwrap();
        let search = SearchBox::new(source, DEBOUNCE);

        search.set_query("tesla").unwrap();
        sleep(Duration::from_secs(1)).await;
        let chosen = search.choose(0, &store).await.unwrap();

        assert_eq!(chosen.symbol.as_str(), "TSLA");
        assert_eq!(store.watchlist(), vec![chosen.symbol.clone()]);
        assert_eq!(store.selected(), Some(chosen.symbol));
        assert!(store.quote(&Symbol::new("TSLA").unwrap()).is_some());
        assert_eq!(search.state(), SearchState::default());
    }

    #[tokio::test]
    async fn test_choose_out_of_range() {
        let source = Recording::new(false);
        let feed = PushFeed::new(Arc::new(MarketSimulator::new()), Duration::from_secs(3));
        let store = WatchlistStore::new(source.clone(), feed, Vec::new(), None).unwrap();
        let search = SearchBox::new(source, DEBOUNCE);
        let err = search.choose(2, &store).await.unwrap_err();
        assert!(matches!(err, WatchError::InvalidSelection(2)));
    }

    #[test]
    fn test_set_query_outside_runtime_fails() {
        let search = SearchBox::new(Recording::new(false), DEBOUNCE);
        assert!(matches!(search.set_query("a"), Err(WatchError::Runtime(_))));
    }
}
