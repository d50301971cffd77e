//! Shared domain types.
//!
//! These types are intentionally kept small and serializable so they can be:
//!
//! - indexed in-memory by date and store
//! - aggregated by the weekly comparison engine
//! - exported to JSON/CSV or rendered by the CLI/TUI

use std::cmp::Ordering;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Year used to place `"month/day"` labels on the calendar.
///
/// The sheet only records month and day; every label is ordered as if it
/// belonged to this year.
pub const REFERENCE_YEAR: i32 = 2026;

/// Source token the sheet uses for Naver rows.
pub const NAVER_TOKEN: &str = "네이버";

/// Platform a keyword was measured on.
///
/// Normalization is binary: anything that is not the Naver token is Instagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Naver,
    Instagram,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Naver, Platform::Instagram];

    pub fn from_source_token(token: &str) -> Self {
        if token.trim() == NAVER_TOKEN {
            Platform::Naver
        } else {
            Platform::Instagram
        }
    }

    /// Internal tag (`naver` / `instagram`).
    pub fn tag(self) -> &'static str {
        match self {
            Platform::Naver => "naver",
            Platform::Instagram => "instagram",
        }
    }

    /// Label shown in the dashboard.
    pub fn display_name(self) -> &'static str {
        match self {
            Platform::Naver => "네이버",
            Platform::Instagram => "인스타그램",
        }
    }
}

/// Delimiter variant of a raw sheet export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelimiterFormat {
    /// Comma-separated, with quoted fields.
    Csv,
    /// Tab-separated, no quoting.
    Tsv,
}

impl DelimiterFormat {
    pub fn delimiter(self) -> u8 {
        match self {
            DelimiterFormat::Csv => b',',
            DelimiterFormat::Tsv => b'\t',
        }
    }

    /// Query value for the sheet export endpoint.
    pub fn export_param(self) -> &'static str {
        match self {
            DelimiterFormat::Csv => "csv",
            DelimiterFormat::Tsv => "tsv",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            DelimiterFormat::Csv => "text/csv",
            DelimiterFormat::Tsv => "text/tab-separated-values",
        }
    }
}

/// Parse a `"month/day"` label onto the reference-year calendar.
///
/// Returns `None` for labels that are not two integers separated by `/`, or
/// that name a day the reference year does not have.
pub fn parse_date_label(label: &str) -> Option<NaiveDate> {
    let (month, day) = label.trim().split_once('/')?;
    let month = month.trim().parse::<u32>().ok()?;
    let day = day.trim().parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(REFERENCE_YEAR, month, day)
}

/// Ordering for date labels: most recent first.
///
/// Unparseable labels sort after every parseable one, lexicographically
/// among themselves, so the order is total.
pub fn compare_date_labels_desc(a: &str, b: &str) -> Ordering {
    match (parse_date_label(a), parse_date_label(b)) {
        (Some(da), Some(db)) => db.cmp(&da).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Display label for a date (`2026/1/15`).
pub fn display_date_label(label: &str) -> String {
    match parse_date_label(label) {
        Some(date) => format!("{}/{}/{}", date.year(), date.month(), date.day()),
        None => label.to_string(),
    }
}

/// One category keyword and its post count.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryCount {
    pub keyword: String,
    pub posts: u32,
}

impl CategoryCount {
    /// Empty cells and the sheet's `-` filler mark an unused category slot.
    pub fn is_placeholder(&self) -> bool {
        let k = self.keyword.trim();
        k.is_empty() || k == "-"
    }
}

/// Field positions in a sheet row.
pub mod columns {
    pub const DATE: usize = 1;
    pub const STORE: usize = 2;
    pub const PLATFORM: usize = 3;
    pub const MAIN_KEYWORD: usize = 4;
    pub const TOTAL_POSTS: usize = 5;
    /// `(keyword, posts)` column pairs for the three categories.
    pub const CATEGORIES: [(usize, usize); 3] = [(6, 7), (8, 9), (10, 11)];
}

/// One parsed observation row.
///
/// Constructed only through [`Record::from_fields`]; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    date: String,
    store_name: String,
    platform: Platform,
    main_keyword: String,
    total_posts: u32,
    categories: [CategoryCount; 3],
}

impl Record {
    /// Build a record from the positional fields of one row.
    ///
    /// Returns `None` when the row has fewer than `min_fields` fields or an
    /// empty store/platform cell.
    pub fn from_fields<S: AsRef<str>>(fields: &[S], min_fields: usize) -> Option<Self> {
        let min_fields = min_fields.max(columns::CATEGORIES[2].1 + 1);
        if fields.len() < min_fields {
            return None;
        }
        let field = |idx: usize| fields[idx].as_ref().trim();

        let store_name = field(columns::STORE);
        let platform = field(columns::PLATFORM);
        if store_name.is_empty() || platform.is_empty() {
            return None;
        }

        let categories = columns::CATEGORIES.map(|(kw, posts)| CategoryCount {
            keyword: field(kw).to_string(),
            posts: parse_count(field(posts)),
        });

        Some(Self {
            date: field(columns::DATE).to_string(),
            store_name: store_name.to_string(),
            platform: Platform::from_source_token(platform),
            main_keyword: field(columns::MAIN_KEYWORD).to_string(),
            total_posts: parse_count(field(columns::TOTAL_POSTS)),
            categories,
        })
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn main_keyword(&self) -> &str {
        &self.main_keyword
    }

    pub fn total_posts(&self) -> u32 {
        self.total_posts
    }

    pub fn categories(&self) -> &[CategoryCount; 3] {
        &self.categories
    }

    /// Categories that carry a real keyword.
    pub fn active_categories(&self) -> impl Iterator<Item = &CategoryCount> {
        self.categories.iter().filter(|c| !c.is_placeholder())
    }
}

/// Parse a non-negative post count; anything unparseable is 0.
///
/// Sheets exports may group thousands (`1,234`) inside a quoted cell.
pub fn parse_count(raw: &str) -> u32 {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse::<u32>().unwrap_or(0)
}

/// Direction of a week-over-week change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn arrow(self) -> &'static str {
        match self {
            Trend::Up => "↑",
            Trend::Down => "↓",
            Trend::Flat => "→",
        }
    }
}

/// Recent-vs-previous week aggregate for one (store, platform, keyword).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Unrounded mean of `total_posts` over contributing records.
    pub recent_avg: f64,
    pub previous_avg: f64,
    /// Percent change, rounded to one decimal place.
    pub change_rate: f64,
    pub recent_total: u64,
    pub previous_total: u64,
    pub recent_count: usize,
    pub previous_count: usize,
}

impl ComparisonResult {
    pub fn trend(&self) -> Trend {
        if self.change_rate > 0.0 {
            Trend::Up
        } else if self.change_rate < 0.0 {
            Trend::Down
        } else {
            Trend::Flat
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(store: &str, platform: &str) -> Vec<String> {
        [
            "", "1/15", store, platform, "강남 맛집", "42", "카페", "3", "-", "", "", "x",
        ]
        .into_iter()
        .map(str::to_string)
        .collect()
    }

    #[test]
    fn platform_normalization_is_binary() {
        assert_eq!(Platform::from_source_token("네이버"), Platform::Naver);
        assert_eq!(Platform::from_source_token(" 네이버 "), Platform::Naver);
        assert_eq!(Platform::from_source_token("인스타그램"), Platform::Instagram);
        assert_eq!(Platform::from_source_token("naver"), Platform::Instagram);
        assert_eq!(Platform::from_source_token("blog"), Platform::Instagram);
    }

    #[test]
    fn record_requires_store_and_platform() {
        assert!(Record::from_fields(&row("가게", "네이버"), 12).is_some());
        assert!(Record::from_fields(&row("  ", "네이버"), 12).is_none());
        assert!(Record::from_fields(&row("가게", ""), 12).is_none());
    }

    #[test]
    fn record_requires_minimum_field_count() {
        let mut fields = row("가게", "네이버");
        fields.pop();
        assert!(Record::from_fields(&fields, 12).is_none());
    }

    #[test]
    fn record_maps_positional_fields() {
        let record = Record::from_fields(&row("가게", "네이버"), 12).unwrap();
        assert_eq!(record.date(), "1/15");
        assert_eq!(record.store_name(), "가게");
        assert_eq!(record.platform(), Platform::Naver);
        assert_eq!(record.main_keyword(), "강남 맛집");
        assert_eq!(record.total_posts(), 42);
        assert_eq!(record.categories()[0].keyword, "카페");
        assert_eq!(record.categories()[0].posts, 3);
        // Unparseable count falls back to zero.
        assert_eq!(record.categories()[2].posts, 0);
        assert_eq!(record.active_categories().count(), 1);
    }

    #[test]
    fn counts_default_to_zero() {
        assert_eq!(parse_count("17"), 17);
        assert_eq!(parse_count(" 1,234 "), 1234);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("abc"), 0);
        assert_eq!(parse_count("-5"), 0);
    }

    #[test]
    fn date_labels_order_descending() {
        let mut labels = vec!["1/9", "1/15", "12/1", "2/1", "1/10"];
        labels.sort_by(|a, b| compare_date_labels_desc(a, b));
        assert_eq!(labels, vec!["12/1", "2/1", "1/15", "1/10", "1/9"]);
    }

    #[test]
    fn unparseable_labels_sort_last() {
        let mut labels = vec!["합계", "1/2", "2/30", "3/1"];
        labels.sort_by(|a, b| compare_date_labels_desc(a, b));
        assert_eq!(labels, vec!["3/1", "1/2", "2/30", "합계"]);
    }

    #[test]
    fn display_label_uses_reference_year() {
        assert_eq!(display_date_label("1/15"), "2026/1/15");
        assert_eq!(display_date_label("n/a"), "n/a");
    }
}
