//! Week-over-week comparison engine.
//!
//! A pure function of the current indices: the two most recent 7-date windows
//! are aggregated per (store, platform, keyword) and compared. Nothing is
//! cached; callers recompute after every refresh.

use std::collections::{BTreeMap, HashSet};

use crate::domain::{ComparisonResult, Platform, compare_date_labels_desc};
use crate::index::Indices;

/// Dates per comparison window.
pub const WINDOW_DAYS: usize = 7;

/// Keyword → comparison for one (store, platform).
pub type KeywordComparison = BTreeMap<String, ComparisonResult>;

/// Store → platform → keyword → comparison.
pub type WeeklyComparison = BTreeMap<String, BTreeMap<Platform, KeywordComparison>>;

#[derive(Debug, Clone, Copy, Default)]
struct WindowTotals {
    total: u64,
    count: usize,
}

impl WindowTotals {
    fn add(&mut self, posts: u32) {
        self.total += u64::from(posts);
        self.count += 1;
    }

    fn average(self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total as f64 / self.count as f64
        }
    }
}

/// Compare the most recent 7 dates against the 7 before them.
///
/// Returns an empty map when fewer than 7 distinct dates exist. Stores (and
/// platforms) without any keyword in either window are omitted.
pub fn calculate_weekly_comparison(indices: &Indices) -> WeeklyComparison {
    let mut out = WeeklyComparison::new();

    let mut dates: Vec<&str> = indices.dates().iter().map(String::as_str).collect();
    if dates.len() < WINDOW_DAYS {
        tracing::debug!(dates = dates.len(), "not enough dates for weekly comparison");
        return out;
    }
    dates.sort_by(|a, b| compare_date_labels_desc(a, b));

    let recent = &dates[..WINDOW_DAYS];
    let previous = &dates[WINDOW_DAYS..dates.len().min(2 * WINDOW_DAYS)];

    for store in indices.stores() {
        let mut per_platform = BTreeMap::new();
        for platform in Platform::ALL {
            let keywords = compare_store_platform(indices, store, platform, recent, previous);
            if !keywords.is_empty() {
                per_platform.insert(platform, keywords);
            }
        }
        if !per_platform.is_empty() {
            out.insert(store.clone(), per_platform);
        }
    }

    out
}

fn compare_store_platform(
    indices: &Indices,
    store: &str,
    platform: Platform,
    recent: &[&str],
    previous: &[&str],
) -> KeywordComparison {
    let recent_totals = aggregate_window(indices, store, platform, recent);
    let previous_totals = aggregate_window(indices, store, platform, previous);

    let keywords: HashSet<&String> = recent_totals.keys().chain(previous_totals.keys()).collect();

    keywords
        .into_iter()
        .map(|keyword| {
            let r = recent_totals.get(keyword).copied().unwrap_or_default();
            let p = previous_totals.get(keyword).copied().unwrap_or_default();
            let recent_avg = r.average();
            let previous_avg = p.average();
            let result = ComparisonResult {
                recent_avg,
                previous_avg,
                change_rate: change_rate(recent_avg, previous_avg),
                recent_total: r.total,
                previous_total: p.total,
                recent_count: r.count,
                previous_count: p.count,
            };
            (keyword.clone(), result)
        })
        .collect()
}

fn aggregate_window(
    indices: &Indices,
    store: &str,
    platform: Platform,
    window: &[&str],
) -> BTreeMap<String, WindowTotals> {
    let mut totals: BTreeMap<String, WindowTotals> = BTreeMap::new();
    for date in window {
        for record in indices.cell(store, date, platform) {
            totals
                .entry(record.main_keyword().to_string())
                .or_default()
                .add(record.total_posts());
        }
    }
    totals
}

/// Percent change from `previous_avg` to `recent_avg`, one decimal place.
///
/// A zero baseline counts as a full increase when anything was observed
/// recently, and as no change otherwise.
pub fn change_rate(recent_avg: f64, previous_avg: f64) -> f64 {
    let rate = if previous_avg > 0.0 {
        (recent_avg - previous_avg) / previous_avg * 100.0
    } else if recent_avg > 0.0 {
        100.0
    } else {
        0.0
    };
    round_to_tenth(rate)
}

pub fn round_to_tenth(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Record, Trend};

    const NAVER: &str = "네이버";
    const INSTA: &str = "인스타그램";

    fn record(date: &str, store: &str, platform: &str, keyword: &str, total: u32) -> Record {
        let total = total.to_string();
        let fields = [
            "", date, store, platform, keyword, total.as_str(), "-", "0", "-", "0", "-", "0",
        ];
        Record::from_fields(&fields, 12).unwrap()
    }

    /// Labels `1/1..=1/n`; the last one is the most recent.
    fn labels(n: u32) -> Vec<String> {
        (1..=n).map(|d| format!("1/{d}")).collect()
    }

    #[test]
    fn fewer_than_seven_dates_is_empty() {
        let records = labels(6)
            .iter()
            .map(|d| record(d, "S", NAVER, "K", 10))
            .collect();
        let comparison = calculate_weekly_comparison(&Indices::rebuild(records));
        assert!(comparison.is_empty());
    }

    #[test]
    fn empty_indices_are_empty() {
        assert!(calculate_weekly_comparison(&Indices::default()).is_empty());
    }

    #[test]
    fn doubled_average_is_full_increase() {
        let dates = labels(14);
        let mut records = Vec::new();
        for (i, d) in dates.iter().enumerate() {
            // 1/8..1/14 are the recent window.
            let total = if i >= 7 { 10 } else { 5 };
            records.push(record(d, "S", NAVER, "K", total));
        }

        let comparison = calculate_weekly_comparison(&Indices::rebuild(records));
        let k = comparison["S"][&Platform::Naver]["K"];
        assert_eq!(k.recent_avg, 10.0);
        assert_eq!(k.previous_avg, 5.0);
        assert_eq!(k.change_rate, 100.0);
        assert_eq!(k.recent_total, 70);
        assert_eq!(k.previous_total, 35);
        assert_eq!(k.trend(), Trend::Up);
    }

    #[test]
    fn average_uses_contributing_record_count() {
        let mut records: Vec<Record> = labels(14)
            .iter()
            .map(|d| record(d, "S", NAVER, "filler", 1))
            .collect();
        records.push(record("1/14", "S", NAVER, "new", 12));
        records.push(record("1/10", "S", NAVER, "new", 8));

        let comparison = calculate_weekly_comparison(&Indices::rebuild(records));
        let k = comparison["S"][&Platform::Naver]["new"];
        assert_eq!(k.recent_total, 20);
        assert_eq!(k.recent_count, 2);
        assert_eq!(k.recent_avg, 10.0);
        assert_eq!(k.previous_avg, 0.0);
        assert_eq!(k.change_rate, 100.0);
    }

    #[test]
    fn keyword_only_in_previous_window_drops_fully() {
        let mut records: Vec<Record> = labels(14)
            .iter()
            .map(|d| record(d, "S", NAVER, "filler", 1))
            .collect();
        records.push(record("1/3", "S", NAVER, "gone", 6));

        let comparison = calculate_weekly_comparison(&Indices::rebuild(records));
        let k = comparison["S"][&Platform::Naver]["gone"];
        assert_eq!(k.recent_avg, 0.0);
        assert_eq!(k.previous_avg, 6.0);
        assert_eq!(k.change_rate, -100.0);
        assert_eq!(k.trend(), Trend::Down);
    }

    #[test]
    fn short_history_compares_against_empty_previous_window() {
        let records = labels(9)
            .iter()
            .map(|d| record(d, "S", INSTA, "K", 4))
            .collect();
        let comparison = calculate_weekly_comparison(&Indices::rebuild(records));
        let k = comparison["S"][&Platform::Instagram]["K"];
        assert_eq!(k.recent_count, 7);
        assert_eq!(k.previous_count, 2);
        assert_eq!(k.change_rate, 0.0);
        assert_eq!(k.trend(), Trend::Flat);
    }

    #[test]
    fn dates_beyond_two_windows_are_ignored() {
        let dates = labels(20);
        let mut records: Vec<Record> = dates.iter().map(|d| record(d, "S", NAVER, "K", 2)).collect();
        // 1/1..1/6 fall outside both windows.
        records.push(record("1/2", "S", NAVER, "old", 50));

        let comparison = calculate_weekly_comparison(&Indices::rebuild(records));
        assert!(!comparison["S"][&Platform::Naver].contains_key("old"));
        assert_eq!(comparison["S"][&Platform::Naver]["K"].previous_count, 7);
    }

    #[test]
    fn stores_without_window_data_are_omitted() {
        let mut records: Vec<Record> = labels(14)
            .iter()
            .map(|d| record(d, "S", NAVER, "K", 3))
            .collect();
        // Unparseable labels sort last, outside both windows.
        records.push(record("합계", "T", NAVER, "K", 99));

        let comparison = calculate_weekly_comparison(&Indices::rebuild(records));
        assert!(comparison.contains_key("S"));
        assert!(!comparison.contains_key("T"));
        assert!(!comparison["S"].contains_key(&Platform::Instagram));
    }

    #[test]
    fn change_rate_rounds_to_one_decimal() {
        assert_eq!(change_rate(4.0, 3.0), 33.3);
        assert_eq!(change_rate(2.0, 3.0), -33.3);
        assert_eq!(change_rate(0.0, 0.0), 0.0);
        assert_eq!(change_rate(0.5, 0.0), 100.0);
    }
}
