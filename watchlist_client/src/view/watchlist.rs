//! Watchlist panel.

use std::collections::HashSet;

use watchlist_common::Symbol;

use crate::store::StoreSnapshot;
use crate::view::{arrow, format_price, format_signed, title};

const EMPTY_HINT: &str = "Your watchlist is empty. Use the search bar to add stocks.";
const PANEL_WIDTH: usize = 40;

/// One row per watchlist member that has a quote, in watchlist order.
///
/// The selected row is marked with `>`; rows updated since the last frame
/// carry a trailing `*`. Members without a quote are not drawn.
pub fn render_watchlist(snapshot: &StoreSnapshot, flashing: &HashSet<Symbol>) -> Vec<String> {
    let mut lines = title("Watchlist", PANEL_WIDTH);
    if snapshot.watchlist.is_empty() {
        lines.push(EMPTY_HINT.to_string());
        return lines;
    }
    if !snapshot.ready && snapshot.quotes.is_empty() {
        lines.push("Loading quotes...".to_string());
        return lines;
    }

    for symbol in &snapshot.watchlist {
        let Some(quote) = snapshot.quote(symbol) else {
            continue;
        };
        let marker = if snapshot.selected.as_ref() == Some(symbol) { ">" } else { " " };
        let flash = if flashing.contains(symbol) { " *" } else { "" };
        lines.push(format!(
            "{} {:<6} {:>11} {:>8} {} {:.2}%{}",
            marker,
            symbol,
            format_price(quote.current_price),
            format_signed(quote.change),
            arrow(quote.change),
            quote.change_percent.abs(),
            flash,
        ));
    }
    lines
}
