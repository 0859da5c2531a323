//! App title and search box.

use crate::search::SearchState;
use crate::view::APP_NAME;

const SEARCH_PLACEHOLDER: &str = "Search stocks...";

/// Title bar, search input and, while open, the result list.
///
/// Results are numbered from zero, matching `pick N`.
pub fn render_header(search: &SearchState, open: bool, width: usize) -> Vec<String> {
    let mut lines = vec![APP_NAME.to_string(), "═".repeat(width.max(APP_NAME.len()))];
    let input = if search.query.is_empty() {
        SEARCH_PLACEHOLDER
    } else {
        search.query.as_str()
    };
    lines.push(format!("Search: [{}]", input));

    if !open {
        return lines;
    }
    if search.is_searching {
        lines.push("  Searching...".to_string());
    } else if search.results.is_empty() {
        lines.push("  No results found".to_string());
    } else {
        for (i, hit) in search.results.iter().enumerate() {
            lines.push(format!("  [{}] {:<6} {}", i, hit.symbol, hit.description));
        }
    }
    lines
}
