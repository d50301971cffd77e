//! `kw-dash` library crate.
//!
//! The binary (`kwdash`) is a thin wrapper around this library so that:
//!
//! - ingestion and comparison logic is testable without spawning processes
//! - the CLI and the TUI share one loading path

pub mod app;
pub mod cli;
pub mod compare;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod index;
pub mod io;
pub mod logging;
pub mod report;
pub mod tui;
