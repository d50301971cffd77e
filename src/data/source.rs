//! Location of the published keyword sheet and the fixed ingestion knobs.

use std::time::Duration;

use crate::data::transport::{HttpTransport, Transport};
use crate::domain::DelimiterFormat;
use crate::error::AppError;
use crate::io::ingest::{HEADER_SKIP_LINES, MIN_FIELDS, ParseOptions};

pub const SHEET_ID: &str = "1U8WL2QcUY-Ujh8pJW6D4zljvRx1lFQkRH8-PXOReXwg";
pub const SHEET_GID: &str = "0";

/// Relays that wrap the export URL, tried after the direct exports.
///
/// `(prefix, encode)`: whether the target URL must be percent-encoded.
pub const PROXY_PREFIXES: [(&str, bool); 3] = [
    ("https://api.allorigins.win/raw?url=", true),
    ("https://corsproxy.io/?", true),
    ("https://cors-anywhere.herokuapp.com/", false),
];

/// Pause between two candidate attempts.
pub const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Upper bound for a single candidate request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const ENV_SHEET_ID: &str = "KWDASH_SHEET_ID";
const ENV_SHEET_GID: &str = "KWDASH_SHEET_GID";

/// Everything needed to build the ordered transport candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub sheet_id: String,
    pub gid: String,
    pub proxies: Vec<(String, bool)>,
    pub parse: ParseOptions,
    pub retry_delay: Duration,
    pub request_timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            sheet_id: SHEET_ID.to_string(),
            gid: SHEET_GID.to_string(),
            proxies: PROXY_PREFIXES
                .iter()
                .map(|(prefix, encode)| (prefix.to_string(), *encode))
                .collect(),
            parse: ParseOptions {
                header_skip_lines: HEADER_SKIP_LINES,
                min_fields: MIN_FIELDS,
            },
            retry_delay: RETRY_DELAY,
            request_timeout: REQUEST_TIMEOUT,
        }
    }
}

impl SourceConfig {
    /// Defaults, with the sheet id/gid optionally overridden from `.env`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut config = Self::default();
        if let Some(id) = non_empty_var(ENV_SHEET_ID) {
            config.sheet_id = id;
        }
        if let Some(gid) = non_empty_var(ENV_SHEET_GID) {
            config.gid = gid;
        }
        config
    }

    /// Direct export URL for the given delimiter.
    pub fn export_url(&self, format: DelimiterFormat) -> String {
        format!(
            "https://docs.google.com/spreadsheets/d/{}/export?format={}&gid={}",
            self.sheet_id,
            format.export_param(),
            self.gid
        )
    }

    /// Ordered candidates: direct TSV, direct CSV, then every relay (CSV).
    pub fn candidates(&self) -> Result<Vec<Box<dyn Transport>>, AppError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| AppError::new(2, format!("Failed to build HTTP client: {e}")))?;

        let mut out: Vec<Box<dyn Transport>> = Vec::new();
        for format in [DelimiterFormat::Tsv, DelimiterFormat::Csv] {
            out.push(Box::new(HttpTransport::new(
                format!("direct-{}", format.export_param()),
                self.export_url(format),
                format,
                client.clone(),
            )));
        }

        let csv_url = self.export_url(DelimiterFormat::Csv);
        for (prefix, encode) in &self.proxies {
            let target = if *encode {
                urlencoding::encode(&csv_url).into_owned()
            } else {
                csv_url.clone()
            };
            out.push(Box::new(HttpTransport::new(
                relay_label(prefix),
                format!("{prefix}{target}"),
                DelimiterFormat::Csv,
                client.clone(),
            )));
        }

        Ok(out)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Short label for a relay prefix (its host).
fn relay_label(prefix: &str) -> String {
    let host = prefix
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .split(['/', '?'])
        .next()
        .unwrap_or(prefix);
    format!("relay-{host}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_url_names_sheet_and_format() {
        let config = SourceConfig::default();
        let url = config.export_url(DelimiterFormat::Tsv);
        assert!(url.contains(SHEET_ID));
        assert!(url.ends_with("export?format=tsv&gid=0"));
    }

    #[test]
    fn candidates_try_direct_exports_first() {
        let config = SourceConfig::default();
        let candidates = config.candidates().unwrap();
        let labels: Vec<&str> = candidates.iter().map(|c| c.label()).collect();
        assert_eq!(
            labels,
            vec![
                "direct-tsv",
                "direct-csv",
                "relay-api.allorigins.win",
                "relay-corsproxy.io",
                "relay-cors-anywhere.herokuapp.com",
            ]
        );
        assert_eq!(candidates[0].format(), DelimiterFormat::Tsv);
        assert!(candidates[2..].iter().all(|c| c.format() == DelimiterFormat::Csv));
    }

    #[test]
    fn relay_labels_use_host() {
        assert_eq!(relay_label("https://corsproxy.io/?"), "relay-corsproxy.io");
    }
}
