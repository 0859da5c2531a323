//! Interactive terminal dashboard.
//!
//! Line commands typed on stdin drive the session; the screen is redrawn
//! every second and after every command. Panels that depend on on-demand
//! fetches (chart, news) are loaded in the background and drawn as
//! `Loading...` until their response arrives.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crossbeam_channel::Receiver;
use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tokio::time::{MissedTickBehavior, interval};
use watchlist_common::config::{RENDER_INTERVAL_MS, SEARCH_DEBOUNCE_MS};
use watchlist_common::{HistoryRange, NewsItem, PricePoint, Quote, Result, Symbol, WatchError};
use watchlist_feed::{ListenerHandle, QuoteSource};

use crate::search::SearchBox;
use crate::session::Session;
use crate::view::{ChartPanel, DEFAULT_WIDTH, Frame, Loadable, render_dashboard};

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

/// Help text listing every command.
pub const HELP: &str = "\
Commands:
  add SYM        add a symbol to the watchlist
  rm SYM         remove a symbol from the watchlist
  select SYM     show details for a symbol
  search TEXT    search symbols (empty TEXT clears)
  pick N         add and select search result N
  dismiss        close the search results
  range R        chart range: 1D 1W 1M 3M 1Y
  help           show this help
  quit           leave the dashboard";

/// One line of user input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Track a symbol.
    Add(Symbol),
    /// Stop tracking a symbol.
    Remove(Symbol),
    /// Focus a symbol.
    Select(Symbol),
    /// Replace the search query.
    Search(String),
    /// Choose a search result by index.
    Pick(usize),
    /// Close the search result list.
    Dismiss,
    /// Change the chart range.
    Range(HistoryRange),
    /// Show the command list.
    Help,
    /// End the session.
    Quit,
    /// Redraw only.
    Refresh,
}

impl FromStr for Command {
    type Err = WatchError;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let symbol = || {
            if rest.is_empty() {
                Err(WatchError::InvalidCommand(format!("{} needs a symbol", verb)))
            } else {
                Symbol::new(rest)
            }
        };

        match verb.to_ascii_lowercase().as_str() {
            "" => Ok(Command::Refresh),
            "add" => Ok(Command::Add(symbol()?)),
            "rm" | "remove" => Ok(Command::Remove(symbol()?)),
            "select" | "sel" => Ok(Command::Select(symbol()?)),
            "search" | "/" => Ok(Command::Search(rest.to_string())),
            "pick" => rest
                .parse()
                .map(Command::Pick)
                .map_err(|_| WatchError::InvalidCommand(format!("pick needs an index, got {:?}", rest))),
            "dismiss" => Ok(Command::Dismiss),
            "range" => HistoryRange::from_str(rest)
                .map(Command::Range)
                .map_err(|_| WatchError::InvalidCommand(format!("unknown range {:?}", rest))),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            _ => Err(WatchError::InvalidCommand(line.to_string())),
        }
    }
}

/// Presentation settings.
#[derive(Debug, Clone, Copy)]
pub struct DashboardOptions {
    /// Initial chart range.
    pub range: HistoryRange,
    /// Print the store snapshot as JSON instead of the text frame.
    pub json: bool,
    /// Frame width in columns.
    pub width: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            range: HistoryRange::default(),
            json: false,
            width: DEFAULT_WIDTH,
        }
    }
}

/// Dashboard over one session.
pub struct Dashboard {
    session: Session,
    search: SearchBox,
    options: DashboardOptions,
    chart: Arc<Mutex<Option<ChartPanel>>>,
    news: Arc<Mutex<Loadable<Vec<NewsItem>>>>,
    updates: Receiver<Quote>,
    updates_handle: ListenerHandle,
    status: Option<String>,
}

impl Dashboard {
    /// Wrap `session`. Must be called inside a tokio runtime.
    pub fn new(session: Session, options: DashboardOptions) -> Result<Self> {
        let search = SearchBox::new(session.source(), Duration::from_millis(SEARCH_DEBOUNCE_MS));
        let (updates, updates_handle) = session.feed().update_channel()?;
        Ok(Self {
            session,
            search,
            options,
            chart: Arc::new(Mutex::new(None)),
            news: Arc::new(Mutex::new(Loadable::Loading)),
            updates,
            updates_handle,
            status: None,
        })
    }

    /// Session being shown.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Current chart range.
    pub fn range(&self) -> HistoryRange {
        self.options.range
    }

    /// Apply one command. Returns `false` when the session should end.
    pub async fn execute(&mut self, command: Command) -> Result<bool> {
        debug!("Executing {:?}", command);
        let store = self.session.store();
        match command {
            Command::Add(symbol) => {
                if store.track(symbol.clone())? {
                    let store = store.clone();
                    tokio::spawn(async move { store.refresh_quote(&symbol).await });
                } else {
                    self.status = Some(format!("{} is already on the watchlist", symbol));
                }
            }
            Command::Remove(symbol) => {
                if !store.remove_from_watchlist(&symbol)? {
                    self.status = Some(format!("{} is not on the watchlist", symbol));
                }
            }
            Command::Select(symbol) => store.set_selected_stock(Some(symbol)),
            Command::Search(query) => self.search.set_query(&query)?,
            Command::Pick(index) => {
                let chosen = self.search.choose(index, store).await?;
                self.status = Some(format!("Added {} ({})", chosen.symbol, chosen.description));
            }
            Command::Dismiss => self.search.dismiss(),
            Command::Range(range) => self.options.range = range,
            Command::Help => self.status = Some(HELP.to_string()),
            Command::Quit => return Ok(false),
            Command::Refresh => {}
        }
        self.sync_chart();
        Ok(true)
    }

    /// Start loading the market news panel.
    pub fn load_news(&self) {
        *lock(&self.news) = Loadable::Loading;
        let source = self.session.source();
        let news = Arc::clone(&self.news);
        tokio::spawn(async move {
            let loaded = fetch_news(source.as_ref()).await;
            *lock(&news) = Loadable::Ready(loaded);
        });
    }

    /// Make the chart follow the selection and range, fetching when needed.
    pub fn sync_chart(&self) {
        let selected = self.session.store().selected();
        let range = self.options.range;
        let mut chart = lock(&self.chart);

        let Some(symbol) = selected else {
            *chart = None;
            return;
        };
        let current = chart
            .as_ref()
            .is_some_and(|panel| panel.symbol == symbol && panel.range == range);
        if current {
            return;
        }
        *chart = Some(ChartPanel {
            symbol: symbol.clone(),
            range,
            points: Loadable::Loading,
        });
        drop(chart);

        let source = self.session.source();
        let slot = Arc::clone(&self.chart);
        tokio::spawn(async move {
            let points = fetch_history(source.as_ref(), &symbol, range).await;
            let mut chart = lock(&slot);
            match chart.as_mut() {
                Some(panel) if panel.symbol == symbol && panel.range == range => {
                    panel.points = Loadable::Ready(points);
                }
                _ => debug!("Discarding {} history for {}, selection moved on", range, symbol),
            }
        });
    }

    /// Text of the next frame. Consumes pending push updates for flashing.
    pub fn frame(&mut self) -> String {
        let flashing: HashSet<Symbol> = self.updates.try_iter().map(|quote| quote.symbol).collect();
        let snapshot = self.session.store().snapshot();
        let search = self.search.state();
        let chart = lock(&self.chart).clone();
        let news = lock(&self.news).clone();

        let mut out = render_dashboard(&Frame {
            snapshot: &snapshot,
            search: &search,
            search_open: self.search.is_showing(),
            chart: chart.as_ref(),
            news: &news,
            flashing: &flashing,
            width: self.options.width,
        });
        if let Some(status) = &self.status {
            out.push('\n');
            out.push_str(status);
            out.push('\n');
        }
        out
    }

    /// Store snapshot as pretty JSON.
    pub fn snapshot_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.session.store().snapshot())?)
    }

    fn output(&mut self) -> Result<String> {
        if self.options.json {
            let skipped = self.updates.try_iter().count();
            if skipped > 0 {
                debug!("Dropped {} push updates in JSON mode", skipped);
            }
            self.snapshot_json()
        } else {
            Ok(self.frame())
        }
    }

    /// Wait for the initial quotes, chart and news, then render one frame.
    pub async fn render_once(mut self) -> Result<String> {
        self.session.load().await;
        let source = self.session.source();
        if let Some(symbol) = self.session.store().selected() {
            let range = self.options.range;
            let points = fetch_history(source.as_ref(), &symbol, range).await;
            *lock(&self.chart) = Some(ChartPanel {
                symbol,
                range,
                points: Loadable::Ready(points),
            });
        }
        *lock(&self.news) = Loadable::Ready(fetch_news(source.as_ref()).await);
        let out = self.output();
        self.close();
        out
    }

    /// Interactive loop until `quit` or `shutdown`.
    ///
    /// Closed input leaves the dashboard running as a read-only view.
    pub async fn run(mut self, shutdown: Arc<Notify>) -> Result<()> {
        let store = self.session.store().clone();
        tokio::spawn(async move { store.load_initial().await });
        self.load_news();
        self.sync_chart();

        let mut redraw = interval(Duration::from_millis(RENDER_INTERVAL_MS));
        redraw.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut input = BufReader::new(tokio::io::stdin()).lines();
        let mut input_open = true;
        info!("Dashboard running. Type `help` for commands, Ctrl+C to exit.");

        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    info!("Shutdown requested");
                    break;
                }
                _ = redraw.tick() => {
                    self.sync_chart();
                    self.draw()?;
                }
                line = input.next_line(), if input_open => {
                    match line? {
                        None => {
                            debug!("Input closed, continuing in view-only mode");
                            input_open = false;
                        }
                        Some(line) => {
                            self.status = None;
                            let keep_running = match line.parse::<Command>() {
                                Ok(command) => self.execute(command).await.unwrap_or_else(|e| {
                                    warn!("Command failed: {}", e);
                                    self.status = Some(e.to_string());
                                    true
                                }),
                                Err(e) => {
                                    self.status = Some(format!("{} (type `help`)", e));
                                    true
                                }
                            };
                            if !keep_running {
                                break;
                            }
                            self.draw()?;
                        }
                    }
                }
            }
        }
        self.close();
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        let out = self.output()?;
        if self.options.json {
            println!("{}", out);
        } else {
            print!("{}{}", CLEAR_SCREEN, out);
        }
        Ok(())
    }

    fn close(self) {
        self.updates_handle.unregister();
        self.session.end();
    }
}

async fn fetch_history(source: &dyn QuoteSource, symbol: &Symbol, range: HistoryRange) -> Vec<PricePoint> {
    match source.fetch_history(symbol, range).await {
        Ok(points) => points,
        Err(e) => {
            warn!("Failed to load {} chart data for {}: {}", range, symbol, e);
            Vec::new()
        }
    }
}

async fn fetch_news(source: &dyn QuoteSource) -> Vec<NewsItem> {
    match source.fetch_news().await {
        Ok(items) => items,
        Err(e) => {
            warn!("Failed to load news: {}", e);
            Vec::new()
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
