//! Date- and store-keyed lookup structures over parsed records.
//!
//! Indices are derived data: they are rebuilt wholesale from a record list by
//! [`Indices::rebuild`] and never patched in place.

use std::collections::{HashMap, HashSet};

use crate::domain::{Platform, Record, compare_date_labels_desc};

/// Records for one (date, store) cell, split by platform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlatformBuckets {
    pub naver: Vec<Record>,
    pub instagram: Vec<Record>,
}

impl PlatformBuckets {
    pub fn get(&self, platform: Platform) -> &[Record] {
        match platform {
            Platform::Naver => &self.naver,
            Platform::Instagram => &self.instagram,
        }
    }

    fn push(&mut self, record: Record) {
        match record.platform() {
            Platform::Naver => self.naver.push(record),
            Platform::Instagram => self.instagram.push(record),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.naver.is_empty() && self.instagram.is_empty()
    }
}

/// Store name → per-platform records.
pub type StoreBuckets = HashMap<String, PlatformBuckets>;

/// Indexed view of one sheet snapshot.
///
/// `Indices::default()` is the "no data" state.
#[derive(Debug, Clone, Default)]
pub struct Indices {
    dates: Vec<String>,
    stores: Vec<String>,
    by_date: HashMap<String, StoreBuckets>,
    by_store: HashMap<String, HashMap<String, PlatformBuckets>>,
    records: Vec<Record>,
}

impl Indices {
    /// Build indices from records in source order.
    ///
    /// - `dates` are distinct labels, most recent first
    /// - `stores` are distinct names in first-appearance order
    pub fn rebuild(records: Vec<Record>) -> Self {
        let mut dates = Vec::new();
        let mut seen_dates = HashSet::new();
        let mut stores = Vec::new();
        let mut seen_stores = HashSet::new();
        let mut by_date: HashMap<String, StoreBuckets> = HashMap::new();
        let mut by_store: HashMap<String, HashMap<String, PlatformBuckets>> = HashMap::new();

        for record in &records {
            if seen_dates.insert(record.date()) {
                dates.push(record.date().to_string());
            }
            if seen_stores.insert(record.store_name()) {
                stores.push(record.store_name().to_string());
            }

            by_date
                .entry(record.date().to_string())
                .or_default()
                .entry(record.store_name().to_string())
                .or_default()
                .push(record.clone());
            by_store
                .entry(record.store_name().to_string())
                .or_default()
                .entry(record.date().to_string())
                .or_default()
                .push(record.clone());
        }

        dates.sort_by(|a, b| compare_date_labels_desc(a, b));

        Self {
            dates,
            stores,
            by_date,
            by_store,
            records,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct date labels, most recent first.
    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    /// Distinct store names in first-appearance order.
    pub fn stores(&self) -> &[String] {
        &self.stores
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn latest_date(&self) -> Option<&str> {
        self.dates.first().map(String::as_str)
    }

    /// All stores' records for a date.
    pub fn by_date(&self, date: &str) -> Option<&StoreBuckets> {
        self.by_date.get(date)
    }

    /// All dates' records for a store.
    pub fn by_store(&self, store: &str) -> Option<&HashMap<String, PlatformBuckets>> {
        self.by_store.get(store)
    }

    /// Records for one (store, date, platform) cell.
    pub fn cell(&self, store: &str, date: &str, platform: Platform) -> &[Record] {
        self.by_store
            .get(store)
            .and_then(|dates| dates.get(date))
            .map(|buckets| buckets.get(platform))
            .unwrap_or(&[])
    }
}
