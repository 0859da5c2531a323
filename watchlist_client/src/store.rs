//! Watchlist store: tracked symbols, quote cache and selection.
//!
//! The store mediates between user actions and the market side. Adding a
//! symbol subscribes it on the push feed and fetches a first quote; every
//! quote the feed delivers replaces the cached entry for its symbol.
//!
//! Ordering is last-writer-wins with no sequencing: a slow fetch that
//! resolves after a fresher push update overwrites it, and a fetch that
//! resolves after its symbol was removed still lands in the cache. Removal
//! never purges the cache; only watchlist membership gates what is shown.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::join_all;
use log::{debug, info, warn};
use serde::Serialize;
use watchlist_common::{Quote, Result, Symbol};
use watchlist_feed::{ListenerHandle, PushFeed, QuoteSource};

#[derive(Default)]
struct StoreState {
    watchlist: Vec<Symbol>,
    quotes: HashMap<Symbol, Quote>,
    selected: Option<Symbol>,
    ready: bool,
}

impl StoreState {
    fn install(&mut self, quote: Quote) {
        self.quotes.insert(quote.symbol.clone(), quote);
    }
}

struct StoreInner {
    source: Arc<dyn QuoteSource>,
    feed: PushFeed,
    state: Arc<Mutex<StoreState>>,
    listener: Mutex<Option<ListenerHandle>>,
}

impl StoreInner {
    fn state(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn shutdown(&self) {
        let handle = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.unregister();
            self.feed.disconnect();
            info!("Watchlist store shut down");
        }
    }
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Consistent read of the store for rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    /// Tracked symbols in insertion order.
    pub watchlist: Vec<Symbol>,
    /// Cached quotes of watchlist members only.
    pub quotes: BTreeMap<Symbol, Quote>,
    /// Focused symbol.
    pub selected: Option<Symbol>,
    /// Initial bulk fetch has finished.
    pub ready: bool,
}

impl StoreSnapshot {
    /// Quote of a visible symbol.
    pub fn quote(&self, symbol: &Symbol) -> Option<&Quote> {
        self.quotes.get(symbol)
    }

    /// Quote of the selected symbol, if both exist.
    pub fn selected_quote(&self) -> Option<&Quote> {
        self.selected.as_ref().and_then(|s| self.quotes.get(s))
    }
}

/// Shared watchlist state for one session. Clones share the same store.
#[derive(Clone)]
pub struct WatchlistStore {
    inner: Arc<StoreInner>,
}

impl WatchlistStore {
    /// Build a store tracking `symbols`, subscribe them on `feed` and start
    /// merging its updates.
    ///
    /// Duplicate symbols are dropped. The feed is not connected here.
    pub fn new(
        source: Arc<dyn QuoteSource>,
        feed: PushFeed,
        symbols: Vec<Symbol>,
        selected: Option<Symbol>,
    ) -> Result<Self> {
        let mut watchlist: Vec<Symbol> = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            if !watchlist.contains(&symbol) {
                watchlist.push(symbol);
            }
        }
        for symbol in &watchlist {
            feed.subscribe(symbol)?;
        }

        let state = Arc::new(Mutex::new(StoreState {
            watchlist,
            selected,
            ..StoreState::default()
        }));

        let sink = Arc::clone(&state);
        let handle = feed.on_update(move |quote| {
            sink.lock()?.install(quote.clone());
            Ok(())
        })?;

        Ok(Self {
            inner: Arc::new(StoreInner {
                source,
                feed,
                state,
                listener: Mutex::new(Some(handle)),
            }),
        })
    }

    /// Fetch quotes for the whole watchlist at once, then mark the store ready.
    ///
    /// Failed fetches are logged and leave their symbol without a quote;
    /// readiness is set either way.
    pub async fn load_initial(&self) {
        let symbols = self.watchlist();
        let fetches = symbols.iter().map(|symbol| self.inner.source.fetch_quote(symbol));
        let results = join_all(fetches).await;

        let mut state = self.inner.state();
        for (symbol, result) in symbols.iter().zip(results) {
            match result {
                Ok(quote) => state.install(quote),
                Err(e) => warn!("Failed to load initial quote for {}: {}", symbol, e),
            }
        }
        state.ready = true;
        info!("Watchlist ready with {}/{} quotes", state.quotes.len(), symbols.len());
    }

    /// Track `symbol`. Returns false when it was already tracked.
    ///
    /// A new symbol is appended, subscribed on the feed and given a freshly
    /// fetched quote. A failed fetch is logged and leaves the cache as is.
    pub async fn add_to_watchlist(&self, symbol: Symbol) -> Result<bool> {
        if !self.track(symbol.clone())? {
            return Ok(false);
        }
        self.refresh_quote(&symbol).await;
        Ok(true)
    }

    /// Append and subscribe `symbol` without fetching a quote. Returns false
    /// when it was already tracked.
    pub fn track(&self, symbol: Symbol) -> Result<bool> {
        let mut state = self.inner.state();
        if state.watchlist.contains(&symbol) {
            debug!("{} is already on the watchlist", symbol);
            return Ok(false);
        }
        // Membership and subscription change under the same lock.
        self.inner.feed.subscribe(&symbol)?;
        state.watchlist.push(symbol.clone());
        info!("Added {} to the watchlist", symbol);
        Ok(true)
    }

    /// Fetch a quote for `symbol` and cache it. Failures are logged.
    pub async fn refresh_quote(&self, symbol: &Symbol) {
        match self.inner.source.fetch_quote(symbol).await {
            Ok(quote) => self.inner.state().install(quote),
            Err(e) => warn!("Failed to fetch quote for {}: {}", symbol, e),
        }
    }

    /// Stop tracking `symbol`. Returns false when it was not tracked.
    ///
    /// If it was selected, the selection moves to the first remaining member
    /// or clears when the watchlist is empty. The cached quote is kept.
    pub fn remove_from_watchlist(&self, symbol: &Symbol) -> Result<bool> {
        let mut state = self.inner.state();
        let Some(index) = state.watchlist.iter().position(|s| s == symbol) else {
            return Ok(false);
        };
        self.inner.feed.unsubscribe(symbol)?;
        state.watchlist.remove(index);
        if state.selected.as_ref() == Some(symbol) {
            state.selected = state.watchlist.first().cloned();
            debug!("Selection moved to {:?}", state.selected);
        }
        info!("Removed {} from the watchlist", symbol);
        Ok(true)
    }

    /// Set the selection. Membership is the caller's responsibility.
    pub fn set_selected_stock(&self, symbol: Option<Symbol>) {
        self.inner.state().selected = symbol;
    }

    /// Replace the cached quote for `quote.symbol`.
    pub fn merge_quote(&self, quote: Quote) {
        self.inner.state().install(quote);
    }

    /// Tracked symbols in insertion order.
    pub fn watchlist(&self) -> Vec<Symbol> {
        self.inner.state().watchlist.clone()
    }

    /// Cached quote for `symbol`, including stale entries of removed symbols.
    pub fn quote(&self, symbol: &Symbol) -> Option<Quote> {
        self.inner.state().quotes.get(symbol).cloned()
    }

    /// Whole quote cache.
    pub fn quotes(&self) -> HashMap<Symbol, Quote> {
        self.inner.state().quotes.clone()
    }

    /// Focused symbol.
    pub fn selected(&self) -> Option<Symbol> {
        self.inner.state().selected.clone()
    }

    /// Whether the initial bulk fetch has finished.
    pub fn is_ready(&self) -> bool {
        self.inner.state().ready
    }

    /// Snapshot for rendering; quotes are limited to watchlist members.
    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.inner.state();
        let quotes = state
            .watchlist
            .iter()
            .filter_map(|s| state.quotes.get(s).map(|q| (s.clone(), q.clone())))
            .collect();
        StoreSnapshot {
            watchlist: state.watchlist.clone(),
            quotes,
            selected: state.selected.clone(),
            ready: state.ready,
        }
    }

    /// Feed the store is subscribed to.
    pub fn feed(&self) -> &PushFeed {
        &self.inner.feed
    }

    /// Stop merging updates and disconnect the feed. Idempotent.
    pub fn shutdown(&self) {
        self.inner.shutdown();
    }
}
