//! Sheet text ingest and normalization.
//!
//! This module turns a raw CSV/TSV export of the keyword sheet into validated
//! `Record`s. It knows nothing about transports or indices.
//!
//! Design goals:
//! - **Positional schema**: the export has banner rows and no usable header,
//!   so fields are addressed by column index
//! - **Row-level tolerance**: malformed rows are dropped and counted, never
//!   escalated
//! - **Deterministic behavior**: same text in, same records out

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;

use crate::domain::{DelimiterFormat, Record};

/// Banner/header lines that precede tabular data in the export.
pub const HEADER_SKIP_LINES: usize = 3;

/// Minimum positional fields for a row to yield a record.
pub const MIN_FIELDS: usize = 12;

/// Parser knobs shared by every transport candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub header_skip_lines: usize,
    pub min_fields: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            header_skip_lines: HEADER_SKIP_LINES,
            min_fields: MIN_FIELDS,
        }
    }
}

/// Row accounting for one parsed document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    pub rows_read: usize,
    pub rows_used: usize,
    pub rows_dropped: usize,
}

/// Parse output: records in source order + row accounting.
#[derive(Debug, Clone, Default)]
pub struct ParsedSheet {
    pub records: Vec<Record>,
    pub stats: ParseStats,
}

/// Parse a whole export body into records.
///
/// Each physical line is split on its own, so a malformed line (including an
/// unbalanced quote) costs only that line.
pub fn parse_document(text: &str, format: DelimiterFormat, options: &ParseOptions) -> ParsedSheet {
    let body = skip_lines(text, options.header_skip_lines);

    let mut out = ParsedSheet::default();
    for (offset, line) in body.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        out.stats.rows_read += 1;

        let fields = split_fields(line, format);
        match Record::from_fields(&fields, options.min_fields) {
            Some(record) => out.records.push(record),
            None => {
                out.stats.rows_dropped += 1;
                // 1-based physical line in the source text.
                let line_no = offset + options.header_skip_lines + 1;
                tracing::debug!(line = line_no, fields = fields.len(), "dropping malformed sheet row");
            }
        }
    }

    out.stats.rows_used = out.records.len();
    out
}

/// Split a single line into trimmed fields.
///
/// CSV honors quotes that open a field (`""` is a literal quote, delimiters
/// inside quotes are text); a quote in the middle of a field is kept as text.
/// An unterminated quote swallows the rest of the line. TSV splits on every
/// tab.
pub fn split_fields(line: &str, format: DelimiterFormat) -> Vec<String> {
    let mut reader = reader_builder(format).from_reader(line.as_bytes());
    let mut row = StringRecord::new();
    match reader.read_record(&mut row) {
        Ok(true) => row.iter().map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

fn reader_builder(format: DelimiterFormat) -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .delimiter(format.delimiter());
    if format == DelimiterFormat::Tsv {
        builder.quoting(false);
    }
    builder
}

/// Drop the first `n` physical lines (and a UTF-8 BOM, if present).
fn skip_lines(text: &str, n: usize) -> &str {
    let mut rest = text.trim_start_matches('\u{feff}');
    for _ in 0..n {
        match rest.find('\n') {
            Some(idx) => rest = &rest[idx + 1..],
            None => return "",
        }
    }
    rest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Platform;

    const BANNER: &str = "키워드 노출 현황\n,,,,\n,날짜,매장명,플랫폼,메인 키워드,총 게시물\n";

    #[test]
    fn quoted_delimiter_is_literal() {
        assert_eq!(split_fields(r#"a,"b,c",d"#, DelimiterFormat::Csv), vec!["a", "b,c", "d"]);
    }

    #[test]
    fn doubled_quote_is_escaped_literal() {
        assert_eq!(split_fields(r#"a,"b""c",d"#, DelimiterFormat::Csv), vec!["a", "b\"c", "d"]);
    }

    #[test]
    fn tsv_has_no_quoting() {
        assert_eq!(
            split_fields("a\t\"b\tc\"\td", DelimiterFormat::Tsv),
            vec!["a", "\"b", "c\"", "d"]
        );
    }

    #[test]
    fn banner_lines_are_skipped() {
        let text = format!("{BANNER}1,1/15,가게,네이버,맛집,10,카페,2,-,0,-,0\n");
        let parsed = parse_document(&text, DelimiterFormat::Csv, &ParseOptions::default());
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.stats.rows_read, 1);
        assert_eq!(parsed.records[0].platform(), Platform::Naver);
    }

    #[test]
    fn malformed_rows_are_dropped_and_counted() {
        let text = format!(
            "{BANNER}\
             1,1/15,가게,네이버,맛집,10,카페,2,-,0,-,0\n\
             2,1/15,가게,네이버,too,short\n\
             3,1/15,,네이버,맛집,10,카페,2,-,0,-,0\n\
             4,1/15,가게,,맛집,10,카페,2,-,0,-,0\n\
             \n\
             5,1/14,가게,인스타그램,\"맛집, 강남\",n/a,,,,,,\n"
        );
        let parsed = parse_document(&text, DelimiterFormat::Csv, &ParseOptions::default());
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.stats.rows_dropped, 3);
        assert_eq!(parsed.stats.rows_used, 2);

        let last = &parsed.records[1];
        assert_eq!(last.main_keyword(), "맛집, 강남");
        assert_eq!(last.total_posts(), 0);
        assert_eq!(last.platform(), Platform::Instagram);
    }

    #[test]
    fn mid_field_quote_is_text() {
        assert_eq!(
            split_fields("a,b\"c,d\",e", DelimiterFormat::Csv),
            vec!["a", "b\"c", "d\"", "e"]
        );
    }

    #[test]
    fn stray_quote_costs_only_its_line() {
        let text = format!(
            "{BANNER}\
             1,1/15,가게,네이버,\"강남 맛집,10,카페,2,-,0,-,0\n\
             2,1/15,가게,네이버,맛집,10,카페,2,-,0,-,0\n\
             3,1/14,가게,인스타그램,\"맛집, 강남\",5,-,0,-,0,-,0\n\
             4,1/13,다른가게,네이버,카페,\"1,204\",-,0,-,0,-,0\n"
        );
        let parsed = parse_document(&text, DelimiterFormat::Csv, &ParseOptions::default());
        assert_eq!(parsed.records.len(), 3);
        assert_eq!(
            parsed.stats,
            ParseStats {
                rows_read: 4,
                rows_used: 3,
                rows_dropped: 1,
            }
        );
        assert_eq!(parsed.records[1].main_keyword(), "맛집, 강남");
        assert_eq!(parsed.records[2].total_posts(), 1204);
    }

    #[test]
    fn tsv_document_parses() {
        let text = "a\nb\nc\n1\t1/15\t가게\t네이버\t맛집\t7\t카페\t1\t-\t0\t-\t0\n";
        let parsed = parse_document(text, DelimiterFormat::Tsv, &ParseOptions::default());
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].total_posts(), 7);
    }

    #[test]
    fn short_document_yields_nothing() {
        let parsed = parse_document("only\ntwo lines", DelimiterFormat::Csv, &ParseOptions::default());
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.stats, ParseStats::default());
    }
}
