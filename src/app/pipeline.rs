//! Shared "load the sheet" workflow used by both CLI and TUI front-ends.
//!
//! `Dashboard` owns the source and the latest indices snapshot. A refresh
//! either replaces the whole snapshot in one assignment or leaves the old one
//! readable, so the front-ends never observe a half-built state.

use chrono::{DateTime, Local};

use crate::compare::{WeeklyComparison, calculate_weekly_comparison};
use crate::data::{FetchOutcome, SheetSource, SourceConfig};
use crate::error::{AppError, IngestError};
use crate::index::Indices;
use crate::io::ingest::ParseStats;

/// Metadata about the snapshot currently held.
#[derive(Debug, Clone)]
pub struct FetchInfo {
    pub candidate: String,
    pub stats: ParseStats,
    pub fetched_at: DateTime<Local>,
    pub raw: String,
}

pub struct Dashboard {
    source: SheetSource,
    indices: Indices,
    last_fetch: Option<FetchInfo>,
    last_error: Option<String>,
}

impl Dashboard {
    /// A dashboard with no data yet.
    pub fn new(source: SheetSource) -> Self {
        Self {
            source,
            indices: Indices::default(),
            last_fetch: None,
            last_error: None,
        }
    }

    /// Fetch the sheet and swap in the new snapshot.
    ///
    /// On failure the previous snapshot (possibly empty) is kept and the error
    /// message is remembered for display.
    pub fn refresh(&mut self) -> Result<&Indices, IngestError> {
        match self.source.fetch_data() {
            Ok(FetchOutcome {
                indices,
                candidate,
                stats,
                raw,
            }) => {
                self.indices = indices;
                self.last_fetch = Some(FetchInfo {
                    candidate,
                    stats,
                    fetched_at: Local::now(),
                    raw,
                });
                self.last_error = None;
                Ok(&self.indices)
            }
            Err(err) => {
                tracing::error!(error = %err, "sheet refresh failed; keeping previous data");
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn indices(&self) -> &Indices {
        &self.indices
    }

    pub fn has_data(&self) -> bool {
        !self.indices.is_empty()
    }

    /// Recomputed on every call from the current snapshot.
    pub fn weekly_comparison(&self) -> WeeklyComparison {
        calculate_weekly_comparison(&self.indices)
    }

    pub fn last_fetch(&self) -> Option<&FetchInfo> {
        self.last_fetch.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn candidate_labels(&self) -> Vec<&str> {
        self.source.candidate_labels()
    }
}

/// Build the HTTP-backed dashboard and perform the initial load.
pub fn load_dashboard(config: &SourceConfig) -> Result<Dashboard, AppError> {
    let source = SheetSource::from_config(config)?;
    let mut dashboard = Dashboard::new(source);
    dashboard.refresh()?;
    Ok(dashboard)
}
