//! Text price chart.
//!
//! The series is resampled to the available width by linear interpolation
//! and plotted on a fixed number of rows between its minimum and maximum.

use strum_macros::Display;
use watchlist_common::{HistoryRange, PricePoint, Symbol};

use crate::view::{ChartPanel, Loadable, NO_DATA, format_price, title};

/// Plot rows.
pub const CHART_HEIGHT: usize = 8;
const AXIS_WIDTH: usize = 12;
const MIN_PLOT_WIDTH: usize = 8;

/// Direction of a series from its first to its last point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Trend {
    /// Last value above the first.
    #[strum(serialize = "up")]
    Up,
    /// Last value at or below the first.
    #[strum(serialize = "down")]
    Down,
}

/// Trend of `points`; flat and empty series count as down.
pub fn trend(points: &[PricePoint]) -> Trend {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if first.value < last.value => Trend::Up,
        _ => Trend::Down,
    }
}

/// Resample `values` to exactly `width` samples.
pub fn resample(values: &[f64], width: usize) -> Vec<f64> {
    match (values.len(), width) {
        (0, _) | (_, 0) => Vec::new(),
        (1, _) => vec![values[0]; width],
        (_, 1) => vec![values[values.len() - 1]],
        (n, _) => (0..width)
            .map(|i| {
                let position = i as f64 * (n - 1) as f64 / (width - 1) as f64;
                let left = position.floor() as usize;
                let right = (left + 1).min(n - 1);
                let fraction = position - left as f64;
                values[left] + (values[right] - values[left]) * fraction
            })
            .collect(),
    }
}

/// Chart heading with the range tabs, active range in brackets.
pub fn render_chart_title(symbol: &Symbol, active: Option<HistoryRange>) -> Vec<String> {
    use strum::IntoEnumIterator;

    let tabs: Vec<String> = HistoryRange::iter()
        .map(|range| match active {
            Some(active) if active == range => format!("[{}]", range),
            _ => range.to_string(),
        })
        .collect();
    let mut lines = title(&format!("{} Price Chart", symbol), 0);
    lines[0] = format!("{}   {}", lines[0], tabs.join(" "));
    lines
}

/// Full chart panel at `width` columns.
pub fn render_chart(chart: &ChartPanel, width: usize) -> Vec<String> {
    let mut lines = render_chart_title(&chart.symbol, Some(chart.range));
    let points = match &chart.points {
        Loadable::Loading => {
            lines.push("Loading chart...".to_string());
            return lines;
        }
        Loadable::Ready(points) if points.is_empty() => {
            lines.push(NO_DATA.to_string());
            return lines;
        }
        Loadable::Ready(points) => points,
    };

    let plot_width = width.saturating_sub(AXIS_WIDTH).max(MIN_PLOT_WIDTH);
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    lines.extend(plot(&resample(&values, plot_width), CHART_HEIGHT));

    let first = &points[0];
    let last = &points[points.len() - 1];
    let from = first.date.format("%b %-d").to_string();
    let to = last.date.format("%b %-d").to_string();
    let gap = plot_width.saturating_sub(from.len() + to.len()).max(1);
    lines.push(format!("{:>w$} {}{}{}", "", from, " ".repeat(gap), to, w = AXIS_WIDTH - 1));
    lines.push(format!(
        "Trend: {} ({} -> {})",
        trend(points),
        format_price(first.value),
        format_price(last.value)
    ));
    lines
}

fn plot(samples: &[f64], height: usize) -> Vec<String> {
    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    let rows = height.max(2);

    let levels: Vec<usize> = samples
        .iter()
        .map(|v| {
            if span <= f64::EPSILON {
                rows / 2
            } else {
                (((v - min) / span) * (rows - 1) as f64).round() as usize
            }
        })
        .collect();

    (0..rows)
        .rev()
        .map(|row| {
            let label = if row == rows - 1 {
                format_price(max)
            } else if row == 0 {
                format_price(min)
            } else {
                String::new()
            };
            let cells: String = levels
                .iter()
                .map(|level| if *level == row { '*' } else { ' ' })
                .collect();
            format!("{:>w$} │{}", label, cells.trim_end(), w = AXIS_WIDTH - 2)
        })
        .collect()
}
