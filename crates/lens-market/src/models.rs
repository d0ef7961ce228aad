//! Market data models shared by the fetchers, the views and the renderer

use crate::error::{LensError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One daily bar as returned by a price source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: u64,
}

/// A single (date, price) observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// Date-ascending price series for one ticker.
///
/// Dates are unique. The series is built once from fetched data and never
/// mutated afterwards; a refetch produces a new series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, sorting by date. For duplicate dates the point that
    /// came last in `points` wins.
    pub fn new(symbol: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        // stable sort keeps fetch order among equal dates
        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }

        Self {
            symbol: symbol.into(),
            points: deduped,
        }
    }

    /// Empty series for a symbol, used when a fetch fails
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            points: Vec::new(),
        }
    }

    /// Build a close-price series from daily bars
    pub fn from_bars(symbol: impl Into<String>, bars: &[DailyBar]) -> Self {
        Self::new(
            symbol,
            bars.iter().map(|b| PricePoint::new(b.date, b.close)).collect(),
        )
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Whether `date` lies within the first and last date of the series
    pub fn covers(&self, date: NaiveDate) -> bool {
        match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => first <= date && date <= last,
            _ => false,
        }
    }
}

/// Latest price snapshot for a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
    pub last_updated: NaiveDateTime,
}

impl Quote {
    /// Build a snapshot from the two most recent bars.
    ///
    /// Returns `None` when fewer than two bars are available or the previous
    /// close is zero.
    pub fn from_bars(symbol: &str, bars: &[DailyBar], fetched_at: NaiveDateTime) -> Option<Self> {
        let [.., previous, latest] = bars else {
            return None;
        };
        if previous.close == 0.0 {
            return None;
        }

        let change = latest.close - previous.close;
        let change_percent = change / previous.close * 100.0;

        Some(Self {
            symbol: symbol.to_uppercase(),
            price: round2(latest.close),
            change: round2(change),
            change_percent: round2(change_percent),
            volume: latest.volume,
            last_updated: fetched_at,
        })
    }

    pub fn is_up(&self) -> bool {
        self.change >= 0.0
    }

    /// Change formatted as `+1.23 (+0.45%)`
    pub fn change_text(&self) -> String {
        format!("{:+.2} ({:+.2}%)", self.change, self.change_percent)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A news article with a parsed publish time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub source: String,
    pub published_at: NaiveDateTime,
    pub link: String,
}

impl NewsItem {
    /// Calendar date a correlation view centers on
    pub fn anchor_date(&self) -> NaiveDate {
        self.published_at.date()
    }

    pub fn display_time(&self) -> String {
        self.published_at.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// Named history spans understood by the price source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Lookback {
    FiveDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
    TenYears,
    YearToDate,
    Max,
}

impl Lookback {
    /// Range parameter as used by the Yahoo chart API
    pub fn as_range(self) -> &'static str {
        match self {
            Self::FiveDays => "5d",
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
            Self::FiveYears => "5y",
            Self::TenYears => "10y",
            Self::YearToDate => "ytd",
            Self::Max => "max",
        }
    }
}

impl Default for Lookback {
    fn default() -> Self {
        Self::OneYear
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_range())
    }
}

impl FromStr for Lookback {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "5d" => Ok(Self::FiveDays),
            "1mo" => Ok(Self::OneMonth),
            "3mo" => Ok(Self::ThreeMonths),
            "6mo" => Ok(Self::SixMonths),
            "1y" => Ok(Self::OneYear),
            "2y" => Ok(Self::TwoYears),
            "5y" => Ok(Self::FiveYears),
            "10y" => Ok(Self::TenYears),
            "ytd" => Ok(Self::YearToDate),
            "max" => Ok(Self::Max),
            other => Err(LensError::ConfigError(format!("Invalid lookback: {other}"))),
        }
    }
}

impl TryFrom<String> for Lookback {
    type Error = LensError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Lookback> for String {
    fn from(value: Lookback) -> Self {
        value.as_range().to_string()
    }
}
