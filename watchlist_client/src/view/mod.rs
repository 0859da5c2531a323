//! Plain-text rendering of the dashboard.
//!
//! Every panel is a pure function from data to lines, so a frame can be
//! rendered and asserted on without a terminal.

pub mod chart;
pub mod details;
pub mod header;
pub mod news;
pub mod watchlist;

use std::collections::HashSet;

use watchlist_common::{HistoryRange, NewsItem, PricePoint, Symbol};

use crate::search::SearchState;
use crate::store::StoreSnapshot;

/// Application name shown in the header.
pub const APP_NAME: &str = "TradingEye";

/// Shown in place of the detail panels when nothing is selected.
pub const NO_SELECTION: &str = "Select a stock from your watchlist to view details";

/// Shown when the selected symbol has nothing to display.
pub const NO_DATA: &str = "No data";

/// Fallback frame width when the terminal size is unknown.
pub const DEFAULT_WIDTH: usize = 72;

/// Data that is fetched on demand and may still be on its way.
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    /// Request in flight.
    Loading,
    /// Last response; failures land here as empty data.
    Ready(T),
}

/// Price history shown for the selected symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPanel {
    /// Symbol the series belongs to.
    pub symbol: Symbol,
    /// Requested range.
    pub range: HistoryRange,
    /// Series, oldest first.
    pub points: Loadable<Vec<PricePoint>>,
}

/// Everything one frame is drawn from.
pub struct Frame<'a> {
    /// Store state.
    pub snapshot: &'a StoreSnapshot,
    /// Search box state.
    pub search: &'a SearchState,
    /// Whether the search result list is open.
    pub search_open: bool,
    /// Chart of the selected symbol, if one was requested.
    pub chart: Option<&'a ChartPanel>,
    /// Market news.
    pub news: &'a Loadable<Vec<NewsItem>>,
    /// Symbols that received a push update since the previous frame.
    pub flashing: &'a HashSet<Symbol>,
    /// Frame width in columns.
    pub width: usize,
}

/// Render a full dashboard frame.
pub fn render_dashboard(frame: &Frame<'_>) -> String {
    let mut lines = header::render_header(frame.search, frame.search_open, frame.width);
    lines.push(String::new());
    lines.extend(watchlist::render_watchlist(frame.snapshot, frame.flashing));
    lines.push(String::new());

    match &frame.snapshot.selected {
        None => lines.push(NO_SELECTION.to_string()),
        Some(symbol) => {
            lines.extend(details::render_details(symbol, frame.snapshot.selected_quote()));
            lines.push(String::new());
            match frame.chart.filter(|chart| &chart.symbol == symbol) {
                Some(chart) => lines.extend(chart::render_chart(chart, frame.width)),
                None => lines.extend(chart::render_chart_title(symbol, None)),
            }
        }
    }

    lines.push(String::new());
    lines.extend(news::render_news(frame.news));
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// `$1,234.56` style price.
pub fn format_price(value: f64) -> String {
    let cents = format!("{:.2}", value.abs());
    let (whole, fraction) = cents.split_once('.').unwrap_or((&cents, "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if value < 0.0 && cents != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, fraction)
}

/// Value with an explicit `+` when not negative, two decimals.
pub fn format_signed(value: f64) -> String {
    if value >= 0.0 {
        format!("+{:.2}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Up or down arrow by sign of `change`; zero counts as up.
pub fn arrow(change: f64) -> &'static str {
    if change >= 0.0 { "▲" } else { "▼" }
}

/// Panel title underlined to `width`.
pub fn title(text: &str, width: usize) -> Vec<String> {
    vec![text.to_string(), "─".repeat(width.max(text.chars().count()))]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use watchlist_common::Quote;

    fn sym(s: &str) -> Symbol {
        Symbol::new(s).unwrap()
    }

    fn snapshot(selected: Option<&str>, quoted: &[&str]) -> StoreSnapshot {
        let watchlist = vec![sym("AAPL"), sym("MSFT")];
        let quotes: BTreeMap<Symbol, Quote> = quoted
            .iter()
            .map(|s| (sym(s), Quote::synthesize(sym(s), 100.0).with_price(101.0)))
            .collect();
        StoreSnapshot {
            watchlist,
            quotes,
            selected: selected.map(sym),
            ready: true,
        }
    }

    fn render(snapshot: &StoreSnapshot) -> String {
        let search = SearchState::default();
        let flashing = HashSet::new();
        render_dashboard(&Frame {
            snapshot,
            search: &search,
            search_open: false,
            chart: None,
            news: &Loadable::Ready(Vec::new()),
            flashing: &flashing,
            width: DEFAULT_WIDTH,
        })
    }

    #[test]
    fn test_price_formatting() {
        assert_eq!(format_price(185.923), "$185.92");
        assert_eq!(format_price(1234567.5), "$1,234,567.50");
        assert_eq!(format_price(0.004), "$0.00");
        assert_eq!(format_price(-12.5), "-$12.50");
        assert_eq!(format_signed(0.0), "+0.00");
        assert_eq!(format_signed(-1.234), "-1.23");
        assert_eq!(arrow(0.0), "▲");
        assert_eq!(arrow(-0.1), "▼");
    }

    #[test]
    fn test_frame_without_selection_shows_hint() {
        let out = render(&snapshot(None, &["AAPL", "MSFT"]));
        assert!(out.starts_with(APP_NAME));
        assert!(out.contains(NO_SELECTION));
        assert!(!out.contains("Market Data"));
    }

    #[test]
    fn test_selected_without_quote_shows_no_data() {
        let out = render(&snapshot(Some("MSFT"), &["AAPL"]));
        assert!(out.contains("Market Data"));
        assert!(out.contains(NO_DATA));
        assert!(!out.contains(NO_SELECTION));
    }

    #[test]
    fn test_selected_with_quote_shows_details_and_news() {
        let out = render(&snapshot(Some("AAPL"), &["AAPL", "MSFT"]));
        assert!(out.contains("Previous Close"));
        assert!(out.contains("$101.00"));
        assert!(out.contains("Market News"));
    }
}
