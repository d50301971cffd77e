//! Transport candidates and the sequential "first success" fallback.
//!
//! A candidate is one way of retrieving the same sheet document (direct export
//! or relay, CSV or TSV). Candidates are tried strictly in order, one request
//! at a time; the first that yields usable data wins.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;

use crate::domain::DelimiterFormat;
use crate::error::IngestError;

/// One way of retrieving the raw sheet text.
pub trait Transport {
    /// Short name used in logs and status lines.
    fn label(&self) -> &str;

    /// Delimiter of the text this candidate returns.
    fn format(&self) -> DelimiterFormat;

    /// Retrieve the raw body.
    fn retrieve(&self) -> Result<String, IngestError>;
}

/// HTTP GET against a fixed URL.
pub struct HttpTransport {
    label: String,
    url: String,
    format: DelimiterFormat,
    client: Client,
}

impl HttpTransport {
    pub fn new(label: impl Into<String>, url: impl Into<String>, format: DelimiterFormat, client: Client) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            format,
            client,
        }
    }
}

impl Transport for HttpTransport {
    fn label(&self) -> &str {
        &self.label
    }

    fn format(&self) -> DelimiterFormat {
        self.format
    }

    fn retrieve(&self) -> Result<String, IngestError> {
        let failure = |message: String| IngestError::TransportFailure {
            candidate: self.label.clone(),
            message,
        };

        let resp = self
            .client
            .get(&self.url)
            .header(ACCEPT, self.format.mime())
            .send()
            .map_err(|e| failure(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(failure(format!("HTTP status {}", resp.status())));
        }

        resp.text()
            .map_err(|e| failure(format!("failed to read body: {e}")))
    }
}

/// Reject bodies that cannot be tabular sheet data.
///
/// Relays answer failures with their own HTML error pages, often with a 200.
pub fn validate_payload<'a>(candidate: &str, body: &'a str) -> Result<&'a str, IngestError> {
    let invalid = |reason: &str| IngestError::InvalidPayload {
        candidate: candidate.to_string(),
        reason: reason.to_string(),
    };

    if body.trim().is_empty() {
        return Err(invalid("empty body"));
    }

    let lower = body.to_ascii_lowercase();
    if lower.contains("<!doctype") || lower.contains("<html") {
        return Err(invalid("HTML document instead of tabular data"));
    }

    Ok(body)
}

/// Try `attempt` on each candidate in order and return the first success.
///
/// Sleeps `delay` between attempts (not before the first). Every failure is
/// logged; when all fail, the last failure's message is carried in
/// `AllCandidatesExhausted`.
pub fn first_success<C, T, F>(candidates: &[C], delay: Duration, mut attempt: F) -> Result<(usize, T), IngestError>
where
    F: FnMut(usize, &C) -> Result<T, IngestError>,
{
    let mut last: Option<IngestError> = None;

    for (idx, candidate) in candidates.iter().enumerate() {
        if idx > 0 && !delay.is_zero() {
            thread::sleep(delay);
        }

        match attempt(idx, candidate) {
            Ok(value) => return Ok((idx, value)),
            Err(err) => {
                tracing::warn!(attempt = idx + 1, error = %err, "data source candidate failed");
                last = Some(err);
            }
        }
    }

    Err(IngestError::AllCandidatesExhausted {
        attempts: candidates.len(),
        last: last
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no data source candidates configured".to_string()),
    })
}
