//! Formatted terminal output for the CLI.
//!
//! We keep formatting code in one place so:
//! - ingestion and comparison code stays free of presentation concerns
//! - output changes are localized

use crate::app::pipeline::Dashboard;
use crate::compare::{KeywordComparison, WINDOW_DAYS, WeeklyComparison};
use crate::domain::{ComparisonResult, Platform, Record, display_date_label};
use crate::index::Indices;

/// Per-store keyword tables for one date.
pub fn format_daily(indices: &Indices, date: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== kwdash - daily keyword exposure ({}) ===\n", display_date_label(date)));

    let Some(day) = indices.by_date(date) else {
        out.push_str("No data for the selected date.\n");
        return out;
    };

    for store in indices.stores() {
        let Some(buckets) = day.get(store) else { continue };

        out.push_str(&format!("\n[{store}]\n"));
        if buckets.is_empty() {
            out.push_str("  (no data)\n");
            continue;
        }

        for platform in Platform::ALL {
            let rows = buckets.get(platform);
            if rows.is_empty() {
                continue;
            }
            out.push_str(&format!("  {} - {} keyword(s)\n", platform.display_name(), rows.len()));
            for record in rows {
                out.push_str(&format_daily_row(record, platform));
            }
        }
    }

    out
}

fn format_daily_row(record: &Record, platform: Platform) -> String {
    match platform {
        Platform::Naver => format!(
            "    {:<24} {:>7}  {}\n",
            record.main_keyword(),
            record.total_posts(),
            format_categories(record)
        ),
        Platform::Instagram => format!("    {:<24} {:>7}\n", record.main_keyword(), record.total_posts()),
    }
}

/// `kw (n) / kw (n)` for the non-placeholder categories, or `-`.
pub fn format_categories(record: &Record) -> String {
    let parts: Vec<String> = record
        .active_categories()
        .map(|c| format!("{} ({})", c.keyword, c.posts))
        .collect();
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(" / ")
    }
}

/// Source, dates and stores of the loaded snapshot.
pub fn format_overview(dashboard: &Dashboard) -> String {
    let indices = dashboard.indices();
    let mut out = String::new();

    out.push_str("=== kwdash - sheet overview ===\n");
    if let Some(fetch) = dashboard.last_fetch() {
        out.push_str(&format!(
            "Source: {} | fetched {} | rows used={} dropped={}\n",
            fetch.candidate,
            fetch.fetched_at.format("%Y-%m-%d %H:%M:%S"),
            fetch.stats.rows_used,
            fetch.stats.rows_dropped
        ));
    }

    out.push_str(&format!("\nDates ({}):\n", indices.dates().len()));
    for date in indices.dates() {
        out.push_str(&format!("  {}\n", display_date_label(date)));
    }

    out.push_str(&format!("\nStores ({}):\n", indices.stores().len()));
    for store in indices.stores() {
        out.push_str(&format!("  {store}\n"));
    }

    out
}

/// Week-over-week tables, stores in index order.
pub fn format_comparison(indices: &Indices, comparison: &WeeklyComparison) -> String {
    let mut out = String::new();
    out.push_str("=== kwdash - week-over-week comparison ===\n");

    if comparison.is_empty() {
        out.push_str(&format!(
            "Not enough data: at least {} dates are needed ({} available).\n",
            WINDOW_DAYS,
            indices.dates().len()
        ));
        return out;
    }

    for store in indices.stores() {
        let Some(platforms) = comparison.get(store) else { continue };
        out.push_str(&format!("\n[{store}]\n"));
        for (platform, keywords) in platforms {
            out.push_str(&format!("  {}\n", platform.display_name()));
            out.push_str(&format_keyword_table(keywords));
        }
    }

    out
}

fn format_keyword_table(keywords: &KeywordComparison) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "    {:<24} {:>10} {:>10} {:>10}\n",
        "keyword", "recent", "previous", "change"
    ));
    for (keyword, result) in keywords {
        out.push_str(&format!(
            "    {:<24} {:>10.1} {:>10.1} {:>10}\n",
            keyword,
            result.recent_avg,
            result.previous_avg,
            format_change(result)
        ));
    }
    out
}

/// `↑ 33.3%` style change label.
pub fn format_change(result: &ComparisonResult) -> String {
    format!("{} {:.1}%", result.trend().arrow(), result.change_rate.abs())
}
