//! Simulated real-time push feed.
//!
//! `PushFeed` behaves like a market-data connection: once connected it ticks
//! at a fixed period, derives a new quote for every subscribed symbol through
//! its `TickSource`, and delivers each quote to every registered listener.
//!
//! State machine: `Disconnected -> Connected -> Disconnected`. `connect` and
//! `disconnect` are both idempotent; subscriptions and listeners survive a
//! disconnect and resume on the next connect.
//!
//! Delivery rules:
//! - listeners run in registration order for every quote;
//! - a listener that returns an error or panics is logged and skipped, the
//!   remaining listeners still receive the quote and the timer keeps running;
//! - symbols within one tick are delivered in subscription order, which is
//!   not part of the contract.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use crossbeam_channel::{Receiver, unbounded};
use log::{debug, error, info, warn};
use strum_macros::Display;
use watchlist_common::{Quote, Result, Symbol, WatchError};

use crate::periodic::PeriodicTask;

/// Produces the next quote of a symbol for each tick.
///
/// The simulator implements this with a bounded random walk; a live provider
/// would return the latest quote it has received.
pub trait TickSource: Send + Sync {
    /// Next quote for `symbol`.
    fn next_quote(&self, symbol: &Symbol) -> Result<Quote>;
}

/// Connection state of the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FeedState {
    /// Timer stopped.
    Disconnected,
    /// Timer running.
    Connected,
}

type Listener = Arc<dyn Fn(&Quote) -> Result<()> + Send + Sync>;

struct ListenerEntry {
    id: u64,
    active: Arc<AtomicBool>,
    callback: Listener,
}

#[derive(Default)]
struct FeedInner {
    subscriptions: Vec<Symbol>,
    listeners: Vec<ListenerEntry>,
    next_listener_id: u64,
    task: Option<PeriodicTask>,
}

struct Shared {
    period: Duration,
    source: Arc<dyn TickSource>,
    inner: Mutex<FeedInner>,
}

/// Periodic quote broadcaster with dynamic subscriptions.
///
/// Cloning yields another handle to the same feed.
#[derive(Clone)]
pub struct PushFeed {
    shared: Arc<Shared>,
}

impl PushFeed {
    /// Create a disconnected feed ticking every `period`.
    pub fn new(source: Arc<dyn TickSource>, period: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                period,
                source,
                inner: Mutex::new(FeedInner::default()),
            }),
        }
    }

    /// Start the periodic timer if it is not already running.
    pub fn connect(&self) -> Result<()> {
        let mut inner = self.shared.inner.lock()?;
        if inner.task.is_some() {
            return Ok(());
        }

        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let task = PeriodicTask::spawn(self.shared.period, move || {
            if let Some(shared) = weak.upgrade() {
                tick_shared(&shared);
            }
        })?;
        inner.task = Some(task);
        info!("Push feed connected (period {} ms)", self.shared.period.as_millis());
        Ok(())
    }

    /// Stop the timer. After this returns no further tick is delivered.
    pub fn disconnect(&self) {
        let task = match self.shared.inner.lock() {
            Ok(mut inner) => inner.task.take(),
            Err(poisoned) => poisoned.into_inner().task.take(),
        };
        // Cancel outside the state lock: an in-flight tick needs it to finish.
        if let Some(task) = task {
            task.cancel();
            info!("Push feed disconnected");
        }
    }

    /// Current connection state.
    pub fn state(&self) -> FeedState {
        match self.shared.inner.lock() {
            Ok(inner) if inner.task.is_some() => FeedState::Connected,
            _ => FeedState::Disconnected,
        }
    }

    /// Add `symbol` to the tick set. Returns false if it was already there.
    pub fn subscribe(&self, symbol: &Symbol) -> Result<bool> {
        let mut inner = self.shared.inner.lock()?;
        if inner.subscriptions.contains(symbol) {
            return Ok(false);
        }
        inner.subscriptions.push(symbol.clone());
        debug!("Push feed subscribed to {}", symbol);
        Ok(true)
    }

    /// Remove `symbol` from the tick set. Returns false if it was not there.
    pub fn unsubscribe(&self, symbol: &Symbol) -> Result<bool> {
        let mut inner = self.shared.inner.lock()?;
        let before = inner.subscriptions.len();
        inner.subscriptions.retain(|s| s != symbol);
        let removed = inner.subscriptions.len() != before;
        if removed {
            debug!("Push feed unsubscribed from {}", symbol);
        }
        Ok(removed)
    }

    /// Symbols currently receiving ticks, in subscription order.
    pub fn subscriptions(&self) -> Vec<Symbol> {
        self.shared
            .inner
            .lock()
            .map(|inner| inner.subscriptions.clone())
            .unwrap_or_default()
    }

    /// Register `listener` for every delivered quote.
    pub fn on_update<F>(&self, listener: F) -> Result<ListenerHandle>
    where
        F: Fn(&Quote) -> Result<()> + Send + Sync + 'static,
    {
        let mut inner = self.shared.inner.lock()?;
        let id = inner.next_listener_id;
        inner.next_listener_id += 1;
        let active = Arc::new(AtomicBool::new(true));
        inner.listeners.push(ListenerEntry {
            id,
            active: Arc::clone(&active),
            callback: Arc::new(listener),
        });
        debug!("Registered update listener #{} ({} total)", id, inner.listeners.len());

        Ok(ListenerHandle {
            id,
            active,
            feed: Arc::downgrade(&self.shared),
        })
    }

    /// Register a listener that forwards quotes into a channel.
    ///
    /// Once the receiver is dropped every delivery fails as a listener error
    /// until the handle is unregistered.
    pub fn update_channel(&self) -> Result<(Receiver<Quote>, ListenerHandle)> {
        let (tx, rx) = unbounded::<Quote>();
        let handle = self.on_update(move |quote| {
            tx.send(quote.clone())
                .map_err(|e| WatchError::ChannelSend(e.to_string()))
        })?;
        Ok((rx, handle))
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.shared
            .inner
            .lock()
            .map(|inner| inner.listeners.len())
            .unwrap_or(0)
    }

    /// Run one tick immediately and return the number of quotes produced.
    ///
    /// The timer calls the same routine; this entry point exists for manual
    /// stepping, e.g. when the feed is disconnected.
    pub fn tick(&self) -> usize {
        tick_shared(&self.shared)
    }
}

/// Deregisters one listener. Calling `unregister` more than once is a no-op.
///
/// Dropping the handle without unregistering leaves the listener in place.
pub struct ListenerHandle {
    id: u64,
    active: Arc<AtomicBool>,
    feed: Weak<Shared>,
}

impl ListenerHandle {
    /// Remove the listener from its feed.
    pub fn unregister(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(shared) = self.feed.upgrade() {
            let mut inner = match shared.inner.lock() {
                Ok(inner) => inner,
                Err(poisoned) => poisoned.into_inner(),
            };
            inner.listeners.retain(|entry| entry.id != self.id);
            debug!("Unregistered update listener #{}", self.id);
        }
    }

    /// Whether the listener is still registered.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

fn tick_shared(shared: &Shared) -> usize {
    let (symbols, listeners) = {
        let inner = match shared.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };
        let listeners: Vec<(u64, Arc<AtomicBool>, Listener)> = inner
            .listeners
            .iter()
            .map(|entry| (entry.id, Arc::clone(&entry.active), Arc::clone(&entry.callback)))
            .collect();
        (inner.subscriptions.clone(), listeners)
    };

    let mut produced = 0;
    for symbol in &symbols {
        let quote = match shared.source.next_quote(symbol) {
            Ok(quote) => quote,
            Err(e) => {
                warn!("Skipping tick for {}: {}", symbol, e);
                continue;
            }
        };
        produced += 1;
        deliver(&quote, &listeners);
    }
    produced
}

fn deliver(quote: &Quote, listeners: &[(u64, Arc<AtomicBool>, Listener)]) {
    for (id, active, callback) in listeners {
        if !active.load(Ordering::SeqCst) {
            continue;
        }
        match catch_unwind(AssertUnwindSafe(|| callback(quote))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!("Listener #{} failed on {}: {}", id, quote.symbol, e);
            }
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                let err = WatchError::Listener(message);
                error!("Listener #{} panicked on {}: {}", id, quote.symbol, err);
            }
        }
    }
}
