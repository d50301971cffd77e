//! Command-line parsing for the keyword exposure dashboard.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! ingestion and comparison code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "kwdash", version, about = "Keyword exposure dashboard (Google Sheets-based)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print per-store keyword tables for one date.
    Daily(DailyArgs),
    /// List the dates and stores present in the sheet.
    Dates,
    /// Print the week-over-week comparison, optionally exporting it.
    Compare(CompareArgs),
    /// Write a debug bundle (source, parse stats, comparison, raw payload head).
    Debug,
    /// Launch the interactive TUI.
    Tui,
}

#[derive(Debug, Parser, Clone)]
pub struct DailyArgs {
    /// Date label as it appears in the sheet (e.g. `1/15`). Defaults to the latest date.
    #[arg(short = 'd', long)]
    pub date: Option<String>,
}

#[derive(Debug, Parser, Clone)]
pub struct CompareArgs {
    /// Print the comparison as JSON instead of tables.
    #[arg(long)]
    pub json: bool,

    /// Export the comparison to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}
