//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - loads the keyword sheet
//! - prints reports or launches the TUI
//! - writes optional exports

use clap::Parser;

use crate::cli::{CompareArgs, Command, DailyArgs};
use crate::data::SourceConfig;
use crate::error::AppError;
use crate::logging::LogTarget;

pub mod pipeline;

/// Entry point for the `kwdash` binary.
pub fn run() -> Result<(), AppError> {
    // `kwdash` alone should open the dashboard, like `kwdash tui`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let target = match cli.command {
        Command::Tui => LogTarget::File(crate::logging::TUI_LOG_FILE.into()),
        _ => LogTarget::Stderr,
    };
    crate::logging::init(target)?;

    let config = SourceConfig::from_env();
    match cli.command {
        Command::Daily(args) => handle_daily(&config, args),
        Command::Dates => handle_dates(&config),
        Command::Compare(args) => handle_compare(&config, args),
        Command::Debug => handle_debug(&config),
        Command::Tui => crate::tui::run(config),
    }
}

fn handle_daily(config: &SourceConfig, args: DailyArgs) -> Result<(), AppError> {
    let dashboard = pipeline::load_dashboard(config)?;
    let indices = dashboard.indices();

    let date = match args.date.as_deref().or(indices.latest_date()) {
        Some(date) => date.to_string(),
        None => return Err(AppError::new(3, "The sheet contains no dates.")),
    };
    if indices.by_date(&date).is_none() {
        return Err(AppError::new(
            2,
            format!("Unknown date '{date}'. Run `kwdash dates` to list available dates."),
        ));
    }

    println!("{}", crate::report::format_daily(indices, &date));
    Ok(())
}

fn handle_dates(config: &SourceConfig) -> Result<(), AppError> {
    let dashboard = pipeline::load_dashboard(config)?;
    println!("{}", crate::report::format_overview(&dashboard));
    Ok(())
}

fn handle_compare(config: &SourceConfig, args: CompareArgs) -> Result<(), AppError> {
    let dashboard = pipeline::load_dashboard(config)?;
    let comparison = dashboard.weekly_comparison();

    if args.json {
        let json = serde_json::to_string_pretty(&comparison)
            .map_err(|e| AppError::new(2, format!("Failed to serialize comparison: {e}")))?;
        println!("{json}");
    } else {
        println!(
            "{}",
            crate::report::format_comparison(dashboard.indices(), &comparison)
        );
    }

    if let Some(path) = &args.export {
        crate::io::export::write_comparison_csv(path, dashboard.indices(), &comparison)?;
        tracing::info!(path = %path.display(), "wrote comparison export");
    }

    Ok(())
}

fn handle_debug(config: &SourceConfig) -> Result<(), AppError> {
    let dashboard = pipeline::load_dashboard(config)?;
    let path = crate::debug::write_debug_bundle(&dashboard)?;
    println!("Wrote debug bundle: {}", path.display());
    Ok(())
}

/// Rewrite argv so `kwdash` defaults to `kwdash tui`.
///
/// Rules:
/// - `kwdash`                      -> `kwdash tui`
/// - `kwdash --help/--version/-h`  -> unchanged (show top-level help/version)
/// - `kwdash <subcommand> ...`     -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "daily" | "dates" | "compare" | "debug" | "tui");
    if is_subcommand {
        return argv;
    }

    // A leading flag belongs to the default subcommand.
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}
