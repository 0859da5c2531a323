//! Daily price series used by the chart.

use chrono::{Days, NaiveDate};
use clap::ValueEnum;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::config::HISTORY_DAILY_STEP;
use crate::quote::MIN_PRICE;

/// One point of a price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Calendar day, serialised as `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Closing value for that day.
    pub value: f64,
}

/// Time window shown by the chart.
#[derive(
    Debug, Clone, Copy, Default, Display, EnumString, EnumIter, ValueEnum, Hash, Eq, PartialEq,
)]
#[strum(ascii_case_insensitive)]
pub enum HistoryRange {
    /// One day.
    #[strum(serialize = "1D")]
    #[value(name = "1D", alias = "1d")]
    OneDay,
    /// One week.
    #[strum(serialize = "1W")]
    #[value(name = "1W", alias = "1w")]
    OneWeek,
    /// One month.
    #[default]
    #[strum(serialize = "1M")]
    #[value(name = "1M", alias = "1m")]
    OneMonth,
    /// Three months.
    #[strum(serialize = "3M")]
    #[value(name = "3M", alias = "3m")]
    ThreeMonths,
    /// One year.
    #[strum(serialize = "1Y")]
    #[value(name = "1Y", alias = "1y")]
    OneYear,
}

impl HistoryRange {
    /// Number of days covered; the series has one more point than this.
    pub fn days(&self) -> u64 {
        match self {
            HistoryRange::OneDay => 1,
            HistoryRange::OneWeek => 7,
            HistoryRange::OneMonth => 30,
            HistoryRange::ThreeMonths => 90,
            HistoryRange::OneYear => 365,
        }
    }
}

/// Bounded random walk of `days + 1` daily points ending at `today`.
///
/// Every step moves by at most `HISTORY_DAILY_STEP` of `base_price`, so the
/// whole walk stays within `days * HISTORY_DAILY_STEP * base_price` of the
/// start. Each call draws a fresh walk.
pub fn generate_history(base_price: f64, days: u64, today: NaiveDate) -> Vec<PricePoint> {
    let mut rng = rand::rng();
    let mut price = base_price;
    let mut series = Vec::with_capacity(days as usize + 1);

    for back in (0..=days).rev() {
        let date = today.checked_sub_days(Days::new(back)).unwrap_or(today);
        price += rng.random_range(-HISTORY_DAILY_STEP..HISTORY_DAILY_STEP) * base_price;
        price = price.max(MIN_PRICE);
        series.push(PricePoint { date, value: price });
    }
    series
}
