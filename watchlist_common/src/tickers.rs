//! Ticker symbols, the reference company table and parsing helpers.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::io::BufRead;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::WatchError;

/// Longest ticker accepted as a symbol.
pub const MAX_SYMBOL_LEN: usize = 10;

/// Security kind reported for every entry of the reference table.
pub const COMMON_STOCK: &str = "Common Stock";

/// Uppercase ticker string identifying a tradable instrument.
///
/// Construction trims and uppercases the input, so `" aapl"` and `"AAPL"`
/// name the same symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Validates and normalises a raw ticker.
    pub fn new(raw: &str) -> Result<Self, WatchError> {
        let trimmed = raw.trim();
        let valid = !trimmed.is_empty()
            && trimmed.len() <= MAX_SYMBOL_LEN
            && trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
        if !valid {
            return Err(WatchError::InvalidSymbol(raw.to_string()));
        }
        Ok(Symbol(trimmed.to_ascii_uppercase()))
    }

    /// The ticker as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Entry of the reference table for this symbol, if it has one.
    pub fn ticker(&self) -> Option<Ticker> {
        self.0.parse().ok()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::new(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = WatchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Symbol::new(&value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl From<Ticker> for Symbol {
    fn from(ticker: Ticker) -> Self {
        Symbol(ticker.to_string())
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Search hit returned by symbol lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    /// Ticker symbol.
    pub symbol: Symbol,
    /// Company name.
    pub description: String,
    /// Symbol as shown to the user.
    pub display_symbol: String,
    /// Security kind, e.g. `Common Stock`.
    pub kind: String,
}

impl From<Ticker> for SymbolInfo {
    fn from(ticker: Ticker) -> Self {
        SymbolInfo {
            symbol: Symbol::from(ticker),
            description: ticker.company_name().to_string(),
            display_symbol: ticker.to_string(),
            kind: COMMON_STOCK.to_string(),
        }
    }
}

/// Fixed reference table of known instruments.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Display, EnumString, EnumIter, Hash, Eq, PartialEq)]
#[strum(ascii_case_insensitive)]
pub enum Ticker {
    AAPL,
    MSFT,
    GOOGL,
    AMZN,
    META,
    TSLA,
    NVDA,
    V,
    JPM,
    JNJ,
}

impl Ticker {
    /// Company name used for display and search.
    pub fn company_name(&self) -> &'static str {
        match self {
            Ticker::AAPL => "Apple Inc.",
            Ticker::MSFT => "Microsoft Corporation",
            Ticker::GOOGL => "Alphabet Inc.",
            Ticker::AMZN => "Amazon.com, Inc.",
            Ticker::META => "Meta Platforms, Inc.",
            Ticker::TSLA => "Tesla, Inc.",
            Ticker::NVDA => "NVIDIA Corporation",
            Ticker::V => "Visa Inc.",
            Ticker::JPM => "JPMorgan Chase & Co.",
            Ticker::JNJ => "Johnson & Johnson",
        }
    }

    /// Price the simulated market starts from.
    pub fn base_price(&self) -> f64 {
        match self {
            Ticker::AAPL => 185.92,
            Ticker::MSFT => 402.56,
            Ticker::GOOGL => 165.12,
            Ticker::AMZN => 178.22,
            Ticker::META => 445.71,
            Ticker::TSLA => 193.57,
            Ticker::NVDA => 819.49,
            Ticker::V => 275.96,
            Ticker::JPM => 183.08,
            Ticker::JNJ => 153.42,
        }
    }
}

/// Case-insensitive substring match over ticker and company name.
///
/// Results keep the reference table order. No match yields an empty vector.
pub fn search_reference(query: &str) -> Vec<SymbolInfo> {
    let needle = query.trim().to_lowercase();
    Ticker::iter()
        .filter(|ticker| {
            ticker.to_string().to_lowercase().contains(&needle)
                || ticker.company_name().to_lowercase().contains(&needle)
        })
        .map(SymbolInfo::from)
        .collect()
}

/// Trait providing file parsing for watchlists.
pub trait TickerParser: Sized {
    /// Parses one symbol per non-empty line from a buffered reader.
    ///
    /// Returns an error if any line is not a valid symbol.
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<Self>, WatchError>;
}

impl TickerParser for Symbol {
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<Self>, WatchError> {
        let mut symbols = Vec::new();

        for line_result in reader.lines() {
            let line = line_result.map_err(WatchError::Io)?;
            let trimmed_line = line.trim();
            if trimmed_line.is_empty() {
                continue;
            }

            match trimmed_line.parse::<Self>() {
                Ok(symbol) => symbols.push(symbol),
                Err(e) => return Err(WatchError::ParseTickersFile(e.to_string())),
            }
        }
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_symbol_is_normalised() {
        let symbol = Symbol::new("  brk.b ").unwrap();
        assert_eq!(symbol.as_str(), "BRK.B");
        assert_eq!("aapl".parse::<Symbol>().unwrap(), Symbol::from(Ticker::AAPL));
    }

    #[test]
    fn test_symbol_rejects_garbage() {
        assert!(Symbol::new("").is_err());
        assert!(Symbol::new("   ").is_err());
        assert!(Symbol::new("AA PL").is_err());
        assert!(Symbol::new("WAYTOOLONGSYMBOL").is_err());
    }

    #[test]
    fn test_search_matches_ticker_and_name() {
        let hits = search_reference("aap");
        assert!(hits.iter().any(|h| h.symbol.as_str() == "AAPL"));

        let by_name: Vec<_> = search_reference("MICRO")
            .into_iter()
            .map(|h| h.symbol.to_string())
            .collect();
        assert_eq!(by_name, vec!["MSFT"]);
    }

    #[test]
    fn test_search_without_match_is_empty() {
        assert!(search_reference("zzzNoMatch").is_empty());
    }

    #[test]
    fn test_parse_watchlist_file() {
        let input = Cursor::new("aapl\n\n  tsla \nBRK.B\n");
        let symbols = Symbol::parse_from_file(input).unwrap();
        let names: Vec<_> = symbols.iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["AAPL", "TSLA", "BRK.B"]);
    }

    #[test]
    fn test_parse_watchlist_file_reports_bad_line() {
        let input = Cursor::new("AAPL\nnot a symbol\n");
        let err = Symbol::parse_from_file(input).unwrap_err();
        assert!(matches!(err, WatchError::ParseTickersFile(_)));
    }

    #[test]
    fn test_symbol_serde_is_transparent() {
        let json = serde_json::to_string(&Symbol::from(Ticker::NVDA)).unwrap();
        assert_eq!(json, "\"NVDA\"");
        let back: Symbol = serde_json::from_str("\"jpm\"").unwrap();
        assert_eq!(back.as_str(), "JPM");
        assert!(serde_json::from_str::<Symbol>("\"\"").is_err());
    }
}
