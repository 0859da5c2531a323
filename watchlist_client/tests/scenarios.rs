use std::sync::{Arc, Mutex};
use std::time::Duration;

use watchlist_client::{Session, WatchlistStore};
use watchlist_common::{Config, Quote, Symbol};
use watchlist_feed::{Latency, MarketSimulator, PushFeed, QuoteSource, SimulatedQuoteSource};

fn sym(s: &str) -> Symbol {
    Symbol::new(s).unwrap()
}

fn default_watchlist() -> Vec<Symbol> {
    ["AAPL", "MSFT", "GOOGL", "AMZN"].iter().map(|s| sym(s)).collect()
}

fn parts() -> (Arc<MarketSimulator>, Arc<SimulatedQuoteSource>, PushFeed) {
    let market = Arc::new(MarketSimulator::new());
    let source = Arc::new(SimulatedQuoteSource::new(Arc::clone(&market), Latency::none()));
    let feed = PushFeed::new(market.clone(), Duration::from_secs(3));
    (market, source, feed)
}

fn recorder(feed: &PushFeed) -> Arc<Mutex<Vec<Quote>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    feed.on_update(move |quote| {
        sink.lock()?.push(quote.clone());
        Ok(())
    })
    .unwrap();
    seen
}

#[tokio::test]
async fn remove_selected_symbol_keeps_stale_quote() {
    let (_market, source, feed) = parts();
    let store = WatchlistStore::new(source, feed, default_watchlist(), Some(sym("AAPL"))).unwrap();
    store.load_initial().await;

    store.remove_from_watchlist(&sym("AAPL")).unwrap();

    assert_eq!(store.watchlist(), vec![sym("MSFT"), sym("GOOGL"), sym("AMZN")]);
    assert_eq!(store.selected(), Some(sym("MSFT")));
    assert!(store.quote(&sym("AAPL")).is_some());
}

#[tokio::test]
async fn adding_twice_tracks_and_subscribes_once() {
    let (_market, source, feed) = parts();
    let store = WatchlistStore::new(source, feed.clone(), default_watchlist(), Some(sym("AAPL"))).unwrap();

    store.add_to_watchlist(sym("TSLA")).await.unwrap();
    store.add_to_watchlist(sym("TSLA")).await.unwrap();

    let count = |list: Vec<Symbol>| list.into_iter().filter(|s| *s == sym("TSLA")).count();
    assert_eq!(count(store.watchlist()), 1);
    assert_eq!(count(feed.subscriptions()), 1);
}

#[tokio::test]
async fn selection_clears_only_when_watchlist_empties() {
    let (_market, source, feed) = parts();
    let store = WatchlistStore::new(source, feed, default_watchlist(), Some(sym("AAPL"))).unwrap();

    let mut remaining = default_watchlist();
    while let Some(selected) = store.selected() {
        store.remove_from_watchlist(&selected).unwrap();
        remaining.retain(|s| *s != selected);
        match store.selected() {
            Some(next) => assert!(remaining.contains(&next)),
            None => assert!(remaining.is_empty()),
        }
    }
    assert!(store.watchlist().is_empty());
}

#[tokio::test]
async fn one_tick_delivers_one_quote_per_subscription() {
    let (_market, _source, feed) = parts();
    feed.subscribe(&sym("NVDA")).unwrap();
    let seen = recorder(&feed);

    feed.tick();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].symbol, sym("NVDA"));
}

#[tokio::test]
async fn unsubscribed_symbol_is_never_delivered_again() {
    let (_market, _source, feed) = parts();
    feed.subscribe(&sym("AAPL")).unwrap();
    feed.subscribe(&sym("MSFT")).unwrap();
    let seen = recorder(&feed);

    feed.tick();
    feed.unsubscribe(&sym("AAPL")).unwrap();
    seen.lock().unwrap().clear();
    for _ in 0..5 {
        feed.tick();
    }

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 5);
    assert!(seen.iter().all(|q| q.symbol == sym("MSFT")));
}

#[tokio::test]
async fn symbol_search() {
    let (_market, source, _feed) = parts();
    let hits = source.search_symbols("aap").await.unwrap();
    assert!(hits.iter().any(|h| h.symbol == sym("AAPL")));
    assert!(source.search_symbols("zzzNoMatch").await.unwrap().is_empty());
}

#[tokio::test]
async fn fetched_quote_merges_into_cache() {
    let (_market, source, feed) = parts();
    let store = WatchlistStore::new(source.clone(), feed, default_watchlist(), None).unwrap();

    let fetched = source.fetch_quote(&sym("AAPL")).await.unwrap();
    store.merge_quote(fetched.clone());

    assert_eq!(store.quote(&sym("AAPL")).unwrap().current_price, fetched.current_price);
}

#[tokio::test(start_paused = true)]
async fn connected_session_keeps_quotes_moving_until_ended() {
    let config = Config {
        simulate_latency: false,
        tick_interval: Duration::from_secs(3),
        ..Config::default()
    };
    let session = Session::start(&config).unwrap();
    session.load().await;
    let (updates, _handle) = session.feed().update_channel().unwrap();

    tokio::time::sleep(Duration::from_millis(6500)).await;
    assert_eq!(updates.try_iter().count(), 8);

    let feed = session.feed().clone();
    session.end();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(updates.try_iter().count(), 0);
    assert_eq!(feed.listener_count(), 1);
}
