//! Terminal rendering of the dashboard

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use lens_market::{EventChart, NewsItem, PriceSeries, Quote, Renderer};
use std::io::Write;

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const CHART_WIDTH: usize = 60;
const HEADLINE_WIDTH: usize = 72;

/// Renderer that prints to a writer, normally stdout
pub struct TerminalRenderer<W: Write> {
    out: W,
    currency: String,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, currency: impl Into<String>) -> Self {
        Self {
            out,
            currency: currency.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}").and_then(|()| self.out.flush()) {
            tracing::warn!("Failed to write to terminal: {}", e);
        }
    }

    fn price(&self, value: f64) -> String {
        format!("{}{:.2}", self.currency, value)
    }

    /// Print the popular symbol list with 1-based positions
    pub fn show_popular(&mut self, symbols: &[String]) {
        let mut table = table();
        table.set_header(vec!["#", "Symbol"]);
        for (i, symbol) in symbols.iter().enumerate() {
            table.add_row(vec![(i + 1).to_string(), symbol.clone()]);
        }
        self.emit(&table.to_string());
    }

    /// Print a listing of open correlation views
    pub fn show_views<'a, I>(&mut self, views: I)
    where
        I: IntoIterator<Item = (u64, &'a str, u32, u32)>,
    {
        let mut table = table();
        table.set_header(vec!["View", "Headline", "Before", "After"]);
        let mut empty = true;
        for (id, headline, before, after) in views {
            empty = false;
            table.add_row(vec![
                id.to_string(),
                truncate(headline, HEADLINE_WIDTH),
                before.to_string(),
                after.to_string(),
            ]);
        }
        if empty {
            self.emit("No analysis views open.");
        } else {
            self.emit(&table.to_string());
        }
    }

    pub fn show_text(&mut self, text: &str) {
        self.emit(text);
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn show_quote(&mut self, quote: &Quote) {
        let color = if quote.is_up() { Color::Green } else { Color::Red };
        let mut table = table();
        table.set_header(vec![Cell::new(&quote.symbol), Cell::new("")]);
        table.add_row(vec![Cell::new("Price"), Cell::new(self.price(quote.price))]);
        table.add_row(vec![
            Cell::new("Change"),
            Cell::new(quote.change_text()).fg(color),
        ]);
        table.add_row(vec![
            Cell::new("Volume"),
            Cell::new(group_thousands(quote.volume)),
        ]);
        table.add_row(vec![
            Cell::new("Last updated"),
            Cell::new(quote.last_updated.format("%Y-%m-%d %H:%M:%S")),
        ]);
        self.emit(&table.to_string());
    }

    fn show_history(&mut self, symbol: &str, series: &PriceSeries) {
        let (Some(first), Some(last)) = (series.first_date(), series.last_date()) else {
            self.emit(&format!("No historical data available for {symbol}"));
            return;
        };

        let prices: Vec<f64> = series.points().iter().map(|p| p.price).collect();
        let (low, high) = bounds(&prices);
        self.emit(&format!(
            "{symbol} price history {first} to {last} ({} days)\n{}\nlow {}  high {}",
            prices.len(),
            sparkline(&prices, CHART_WIDTH),
            self.price(low),
            self.price(high),
        ));
    }

    fn show_news(&mut self, symbol: &str, items: &[NewsItem]) {
        if items.is_empty() {
            self.emit(&format!("No news found for {symbol}"));
            return;
        }

        let mut table = table();
        table.set_header(vec!["#", "Published", "Source", "Headline"]);
        for (i, item) in items.iter().enumerate() {
            table.add_row(vec![
                (i + 1).to_string(),
                item.display_time(),
                item.source.clone(),
                truncate(&item.title, HEADLINE_WIDTH),
            ]);
        }
        self.emit(&format!("Latest news for {symbol}\n{table}"));
    }

    fn show_status(&mut self, message: &str) {
        self.emit(&format!("» {message}"));
    }

    fn notify(&mut self, title: &str, message: &str) {
        self.emit(&format!("[{title}] {message}"));
    }

    fn open_view(&mut self, view_id: u64, title: &str, headline: &str) {
        self.emit(&format!(
            "{title} (view {view_id})\n  {headline}\n  Loading price history..."
        ));
    }

    fn close_view(&mut self, view_id: u64) {
        self.emit(&format!("Closed view {view_id}"));
    }

    fn show_event_chart(&mut self, chart: &EventChart<'_>) {
        let points = chart.range.points();
        let prices: Vec<f64> = points.iter().map(|p| p.price).collect();
        let spark = sparkline(&prices, CHART_WIDTH);

        let anchor_index = points.partition_point(|p| p.date < chart.anchor);
        let marker = format!(
            "{}^ {}",
            " ".repeat(column(anchor_index, prices.len(), CHART_WIDTH)),
            chart.anchor
        );

        let change = match (prices.first(), prices.last()) {
            (Some(first), Some(last)) if *first != 0.0 => {
                format!("{:+.2}%", (last - first) / first * 100.0)
            }
            _ => "n/a".to_string(),
        };

        self.emit(&format!(
            "{} [view {}]\n  {}\n  -{}d / +{}d, {} to {}, {} points, change {}\n{}\n{}",
            chart.title,
            chart.view_id,
            truncate(chart.headline, HEADLINE_WIDTH),
            chart.window.days_before(),
            chart.window.days_after(),
            chart.range.start,
            chart.range.end,
            points.len(),
            change,
            spark,
            marker,
        ));
    }
}

fn table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn bounds(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        })
}

/// Column a value index lands in once the series is squeezed into `width`
fn column(index: usize, len: usize, width: usize) -> usize {
    if len <= width {
        index.min(len.saturating_sub(1))
    } else {
        (index * width / len).min(width - 1)
    }
}

/// Block-character sparkline, downsampled to at most `width` columns
pub fn sparkline(values: &[f64], width: usize) -> String {
    if values.is_empty() || width == 0 {
        return String::new();
    }

    let columns = values.len().min(width);
    let sampled: Vec<f64> = (0..columns)
        .map(|c| values[c * values.len() / columns])
        .collect();
    let (low, high) = bounds(&sampled);
    let span = high - low;
    let top = SPARK_LEVELS.len() - 1;

    sampled
        .iter()
        .map(|v| {
            if span <= f64::EPSILON {
                SPARK_LEVELS[top / 2]
            } else {
                let level = ((v - low) / span * top as f64).round() as usize;
                SPARK_LEVELS[level.min(top)]
            }
        })
        .collect()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

/// `1234567` → `1,234,567`
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use lens_market::{DateWindowSelector, PricePoint, Recorder};

    fn output(renderer: TerminalRenderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn test_sparkline() {
        assert_eq!(sparkline(&[], 10), "");
        assert_eq!(sparkline(&[1.0, 2.0, 3.0], 10), "▁▅█");
        assert_eq!(sparkline(&[5.0, 5.0], 10), "▄▄");
        assert_eq!(sparkline(&vec![1.0; 200], 60).chars().count(), 60);
    }

    #[test]
    fn test_helpers() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long headline", 8), "a lon...");
        assert_eq!(column(5, 10, 60), 5);
        assert_eq!(column(199, 200, 60), 59);
    }

    #[test]
    fn test_empty_placeholders() {
        let mut renderer = TerminalRenderer::new(Vec::new(), "₹");
        renderer.show_history("TCS.NS", &PriceSeries::empty("TCS.NS"));
        renderer.show_news("TCS.NS", &[]);
        let text = output(renderer);
        assert!(text.contains("No historical data available for TCS.NS"));
        assert!(text.contains("No news found for TCS.NS"));
    }

    #[test]
    fn test_event_chart_marks_anchor() {
        let series = PriceSeries::new(
            "INFY.NS",
            NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .iter_days()
                .take(30)
                .enumerate()
                .map(|(i, d)| PricePoint::new(d, 1500.0 + i as f64))
                .collect(),
        );
        let anchor = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let selector = DateWindowSelector::new("INFY.NS", anchor);

        let mut renderer = TerminalRenderer::new(Vec::new(), "₹");
        assert!(selector.refresh(3, "Infosys wins deal", &series, &mut renderer));
        let text = output(renderer);
        assert!(text.contains("Price Trend Around News Event (INFY.NS) [view 3]"));
        assert!(text.contains("^ 2024-06-15"));
        assert!(text.contains("30 points"));

        // same selector against the recorder draws the same range
        let mut recorder = Recorder::new();
        selector.refresh(3, "Infosys wins deal", &series, &mut recorder);
        assert_eq!(recorder.event_frames(3).len(), 1);
    }
}
