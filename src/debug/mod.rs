//! Debug bundle writer for inspecting what the sheet fetch produced.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::app::pipeline::Dashboard;
use crate::domain::display_date_label;
use crate::error::AppError;
use crate::report::format_change;

/// Lines of the raw payload copied into the bundle.
const RAW_HEAD_LINES: usize = 20;

pub fn write_debug_bundle(dashboard: &Dashboard) -> Result<PathBuf, AppError> {
    write_debug_bundle_in(Path::new("debug"), dashboard)
}

pub fn write_debug_bundle_in(dir: &Path, dashboard: &Dashboard) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::new(4, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("kwdash_debug_{ts}.md"));

    let mut file = File::create(&path)
        .map_err(|e| AppError::new(4, format!("Failed to create debug file: {e}")))?;

    write_header(&mut file, dashboard)
        .map_err(|e| AppError::new(4, format!("Failed to write debug header: {e}")))?;
    write_body(&mut file, dashboard).map_err(|e| AppError::new(4, format!("Failed to write debug: {e}")))?;

    Ok(path)
}

fn write_header(file: &mut File, dashboard: &Dashboard) -> std::io::Result<()> {
    writeln!(file, "# kwdash debug bundle")?;
    writeln!(file, "- generated: {}", Local::now().to_rfc3339())?;
    writeln!(file, "- candidates: {}", dashboard.candidate_labels().join(", "))?;

    match dashboard.last_fetch() {
        Some(fetch) => {
            writeln!(file, "- source: {}", fetch.candidate)?;
            writeln!(file, "- fetched_at: {}", fetch.fetched_at.to_rfc3339())?;
            writeln!(
                file,
                "- rows: read={} used={} dropped={}",
                fetch.stats.rows_read, fetch.stats.rows_used, fetch.stats.rows_dropped
            )?;
        }
        None => writeln!(file, "- source: (none)")?,
    }
    if let Some(err) = dashboard.last_error() {
        writeln!(file, "- last_error: {err}")?;
    }
    Ok(())
}

fn write_body(file: &mut File, dashboard: &Dashboard) -> std::io::Result<()> {
    let indices = dashboard.indices();

    writeln!(file, "\n## Dates")?;
    writeln!(file, "| label | display | stores |")?;
    writeln!(file, "| - | - | - |")?;
    for date in indices.dates() {
        let stores = indices.by_date(date).map_or(0, |d| d.len());
        writeln!(file, "| {} | {} | {} |", date, display_date_label(date), stores)?;
    }

    writeln!(file, "\n## Stores")?;
    for store in indices.stores() {
        let dates = indices.by_store(store).map_or(0, |s| s.len());
        writeln!(file, "- {store} ({dates} dates)")?;
    }

    let comparison = dashboard.weekly_comparison();
    writeln!(file, "\n## Weekly comparison")?;
    if comparison.is_empty() {
        writeln!(file, "Not enough dates ({}).", indices.dates().len())?;
    } else {
        writeln!(file, "| store | platform | keyword | recent | previous | change | n_recent | n_previous |")?;
        writeln!(file, "| - | - | - | - | - | - | - | - |")?;
        for store in indices.stores() {
            let Some(platforms) = comparison.get(store) else { continue };
            for (platform, keywords) in platforms {
                for (keyword, r) in keywords {
                    writeln!(
                        file,
                        "| {} | {} | {} | {:.2} | {:.2} | {} | {} | {} |",
                        store,
                        platform.tag(),
                        keyword,
                        r.recent_avg,
                        r.previous_avg,
                        format_change(r),
                        r.recent_count,
                        r.previous_count
                    )?;
                }
            }
        }
    }

    if let Some(fetch) = dashboard.last_fetch() {
        writeln!(file, "\n## Raw payload (first {RAW_HEAD_LINES} lines)")?;
        writeln!(file, "```")?;
        for line in fetch.raw.lines().take(RAW_HEAD_LINES) {
            writeln!(file, "{line}")?;
        }
        writeln!(file, "```")?;
    }

    Ok(())
}
