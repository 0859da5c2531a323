//! Market news items shown below the chart.

use serde::{Deserialize, Serialize};

const HOUR_MS: u64 = 3_600_000;
const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/640x360";

/// A single headline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Stable identifier.
    pub id: u32,
    /// Sector/category label.
    pub category: String,
    /// Publication time in milliseconds since Unix epoch.
    pub datetime: u64,
    /// Headline text.
    pub headline: String,
    /// Thumbnail URL.
    pub image: String,
    /// Ticker the story is about.
    pub related: String,
    /// Publisher.
    pub source: String,
    /// Short summary.
    pub summary: String,
    /// Link to the full story.
    pub url: String,
}

/// Fixed headlines stamped relative to `now_ms`, newest first.
pub fn sample_news(now_ms: u64) -> Vec<NewsItem> {
    let entries = [
        (
            "technology",
            "Apple Announces New iPhone Model with Revolutionary Features",
            "AAPL",
            "Financial Times",
            "Apple Inc. has unveiled its latest iPhone with groundbreaking features including enhanced AI capabilities and improved battery life.",
        ),
        (
            "technology",
            "Microsoft Cloud Services Revenue Exceeds Expectations",
            "MSFT",
            "Wall Street Journal",
            "Microsoft reported quarterly earnings that beat analyst estimates, driven primarily by strong growth in its Azure cloud computing services.",
        ),
        (
            "automotive",
            "Tesla Expands Production Capacity with New Gigafactory",
            "TSLA",
            "Reuters",
            "Tesla announced plans to build a new Gigafactory in Asia to meet growing demand for electric vehicles in the region.",
        ),
        (
            "technology",
            "NVIDIA Reports Record Gaming and Data Center Revenue",
            "NVDA",
            "Bloomberg",
            "NVIDIA corporation announced record-breaking quarterly results, with substantial growth in both gaming and data center segments.",
        ),
    ];

    entries
        .iter()
        .zip(1u32..)
        .map(|((category, headline, related, source, summary), id)| NewsItem {
            id,
            category: category.to_string(),
            datetime: now_ms.saturating_sub(HOUR_MS * id as u64),
            headline: headline.to_string(),
            image: PLACEHOLDER_IMAGE.to_string(),
            related: related.to_string(),
            source: source.to_string(),
            summary: summary.to_string(),
            url: "#".to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_news_is_newest_first() {
        let news = sample_news(10 * HOUR_MS);
        assert_eq!(news.len(), 4);
        assert!(news.windows(2).all(|w| w[0].datetime > w[1].datetime));
        assert_eq!(news[0].datetime, 9 * HOUR_MS);
        assert_eq!(news[0].related, "AAPL");
    }
}
