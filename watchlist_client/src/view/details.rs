//! Market data panel of the selected symbol.

use watchlist_common::{Quote, Symbol};

use crate::view::{NO_DATA, format_price, format_signed, title};

const PANEL_WIDTH: usize = 40;

/// Price, change and session values of `symbol`, or `No data`.
pub fn render_details(symbol: &Symbol, quote: Option<&Quote>) -> Vec<String> {
    let mut lines = title("Market Data", PANEL_WIDTH);
    let name = symbol
        .ticker()
        .map(|ticker| format!("{}  {}", symbol, ticker.company_name()))
        .unwrap_or_else(|| symbol.to_string());
    lines.push(name);

    let Some(quote) = quote else {
        lines.push(NO_DATA.to_string());
        return lines;
    };
    lines.push(format!(
        "{}   {} ({}%)",
        format_price(quote.current_price),
        format_signed(quote.change),
        format_signed(quote.change_percent),
    ));
    for (label, value) in [
        ("Open", quote.open),
        ("Previous Close", quote.previous_close),
        ("Day's High", quote.high),
        ("Day's Low", quote.low),
    ] {
        lines.push(format!("  {:<16}{:>12}", label, format_price(value)));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_for_known_symbol() {
        let aapl = Symbol::new("AAPL").unwrap();
        let quote = Quote::synthesize(aapl.clone(), 200.0).with_price(202.0);
        let lines = render_details(&aapl, Some(&quote));

        assert_eq!(lines[2], "AAPL  Apple Inc.");
        assert_eq!(lines[3], "$202.00   +2.00 (+1.00%)");
        assert!(lines[5].starts_with("  Previous Close"));
        assert!(lines[5].ends_with("$200.00"));
    }

    #[test]
    fn test_details_without_quote() {
        let lines = render_details(&Symbol::new("ZZZ").unwrap(), None);
        assert_eq!(lines[2], "ZZZ");
        assert_eq!(lines.last().unwrap(), NO_DATA);
    }
}
