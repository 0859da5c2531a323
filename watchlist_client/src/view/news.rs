//! Market news panel.

use chrono::{DateTime, Local, TimeZone};
use watchlist_common::NewsItem;

use crate::view::{Loadable, title};

const PANEL_WIDTH: usize = 40;

/// `Mon D, HH:MM AM` timestamp as shown under each headline.
pub fn format_news_time<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%b %-d, %I:%M %p").to_string()
}

/// Headline list, newest first as delivered.
pub fn render_news(news: &Loadable<Vec<NewsItem>>) -> Vec<String> {
    let mut lines = title("Market News", PANEL_WIDTH);
    let items = match news {
        Loadable::Loading => {
            lines.push("Loading news...".to_string());
            return lines;
        }
        Loadable::Ready(items) if items.is_empty() => {
            lines.push("No news available".to_string());
            return lines;
        }
        Loadable::Ready(items) => items,
    };

    for item in items {
        let published = DateTime::from_timestamp_millis(item.datetime as i64)
            .map(|utc| format_news_time(&utc.with_timezone(&Local)))
            .unwrap_or_default();
        lines.push(format!("• {}", item.headline));
        lines.push(format!("  {} · {}", item.source, published));
    }
    lines
}
