//! Keyword sheet retrieval: candidate fallback → validation → parse → indices.

use std::time::Duration;

use crate::data::source::SourceConfig;
use crate::data::transport::{Transport, first_success, validate_payload};
use crate::error::{AppError, IngestError};
use crate::index::Indices;
use crate::io::ingest::{ParseOptions, ParseStats, parse_document};

/// Result of one successful ingestion.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub indices: Indices,
    /// Label of the candidate that produced the data.
    pub candidate: String,
    pub stats: ParseStats,
    /// Raw body as retrieved (kept for debug bundles).
    pub raw: String,
}

/// The published keyword sheet, reachable through ordered candidates.
pub struct SheetSource {
    candidates: Vec<Box<dyn Transport>>,
    parse: ParseOptions,
    retry_delay: Duration,
}

impl SheetSource {
    pub fn new(candidates: Vec<Box<dyn Transport>>, parse: ParseOptions, retry_delay: Duration) -> Self {
        Self {
            candidates,
            parse,
            retry_delay,
        }
    }

    /// Build the HTTP candidates described by `config`.
    pub fn from_config(config: &SourceConfig) -> Result<Self, AppError> {
        Ok(Self::new(config.candidates()?, config.parse, config.retry_delay))
    }

    pub fn candidate_labels(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.label()).collect()
    }

    /// Fetch and index the sheet.
    ///
    /// Fails only with `AllCandidatesExhausted`, after every candidate was tried.
    pub fn fetch_data(&self) -> Result<FetchOutcome, IngestError> {
        let (_, outcome) = first_success(&self.candidates, self.retry_delay, |idx, candidate| {
            tracing::info!(
                attempt = idx + 1,
                candidate = candidate.label(),
                "fetching keyword sheet"
            );
            self.try_candidate(candidate.as_ref())
        })?;

        tracing::info!(
            candidate = %outcome.candidate,
            rows = outcome.stats.rows_used,
            dropped = outcome.stats.rows_dropped,
            dates = outcome.indices.dates().len(),
            stores = outcome.indices.stores().len(),
            "keyword sheet loaded"
        );
        Ok(outcome)
    }

    fn try_candidate(&self, candidate: &dyn Transport) -> Result<FetchOutcome, IngestError> {
        let label = candidate.label();
        let raw = candidate.retrieve()?;
        let body = validate_payload(label, &raw)?;

        let parsed = parse_document(body, candidate.format(), &self.parse);
        if parsed.records.is_empty() {
            return Err(IngestError::NoRecordsParsed {
                candidate: label.to_string(),
            });
        }

        Ok(FetchOutcome {
            indices: Indices::rebuild(parsed.records),
            candidate: label.to_string(),
            stats: parsed.stats,
            raw,
        })
    }
}
