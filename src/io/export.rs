//! Export the weekly comparison to CSV.
//!
//! One row per (store, platform, keyword), stores in sheet order, so the file
//! opens cleanly in a spreadsheet next to the source sheet.

use std::path::Path;

use serde::Serialize;

use crate::compare::WeeklyComparison;
use crate::domain::ComparisonResult;
use crate::error::AppError;
use crate::index::Indices;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    store: &'a str,
    platform: &'static str,
    keyword: &'a str,
    recent_avg: String,
    previous_avg: String,
    change_rate: f64,
    trend: &'static str,
    recent_total: u64,
    previous_total: u64,
    recent_count: usize,
    previous_count: usize,
}

impl<'a> ExportRow<'a> {
    fn new(store: &'a str, platform: &'static str, keyword: &'a str, r: &ComparisonResult) -> Self {
        Self {
            store,
            platform,
            keyword,
            recent_avg: format!("{:.4}", r.recent_avg),
            previous_avg: format!("{:.4}", r.previous_avg),
            change_rate: r.change_rate,
            trend: r.trend().arrow(),
            recent_total: r.recent_total,
            previous_total: r.previous_total,
            recent_count: r.recent_count,
            previous_count: r.previous_count,
        }
    }
}

/// Write the comparison to `path`. An empty comparison produces a header-only file.
pub fn write_comparison_csv(path: &Path, indices: &Indices, comparison: &WeeklyComparison) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    if comparison.is_empty() {
        writer
            .write_record([
                "store",
                "platform",
                "keyword",
                "recent_avg",
                "previous_avg",
                "change_rate",
                "trend",
                "recent_total",
                "previous_total",
                "recent_count",
                "previous_count",
            ])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;
    }

    for store in indices.stores() {
        let Some(platforms) = comparison.get(store) else { continue };
        for (platform, keywords) in platforms {
            for (keyword, result) in keywords {
                writer
                    .serialize(ExportRow::new(store, platform.tag(), keyword, result))
                    .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
            }
        }
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV '{}': {e}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::calculate_weekly_comparison;
    use crate::domain::Record;

    fn record(date: &str, store: &str, keyword: &str, total: u32) -> Record {
        let total = total.to_string();
        let fields = [
            "", date, store, "네이버", keyword, total.as_str(), "-", "0", "-", "0", "-", "0",
        ];
        Record::from_fields(&fields, 12).unwrap()
    }

    #[test]
    fn writes_one_row_per_keyword() {
        let mut records = Vec::new();
        for day in 1..=14 {
            let posts = if day > 7 { 4 } else { 2 };
            records.push(record(&format!("1/{day}"), "가게", "맛집", posts));
        }
        let indices = Indices::rebuild(records);
        let comparison = calculate_weekly_comparison(&indices);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compare.csv");
        write_comparison_csv(&path, &indices, &comparison).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("store,platform,keyword,recent_avg"));
        assert_eq!(lines[1], "가게,naver,맛집,4.0000,2.0000,100.0,↑,28,14,7,7");
    }

    #[test]
    fn empty_comparison_writes_header_only() {
        let indices = Indices::rebuild(vec![record("1/1", "가게", "맛집", 1)]);
        let comparison = calculate_weekly_comparison(&indices);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_comparison_csv(&path, &indices, &comparison).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
