//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments (with `.env` and environment fallbacks)
//! - resolves the workbook, the dashboard config and the date range
//! - runs the dashboard pipeline
//! - prints JSON / summaries / plots, writes exports, or starts the TUI

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::debug;

use crate::cli::{Command, ExportCsvArgs, PlotArgs, RenderArgs, SourceArgs};
use crate::domain::{DEFAULT_WORKBOOK, DashboardConfig, DateRange};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `dcdash` binary.
pub fn run() -> Result<(), AppError> {
    // A `.env` in the working directory may provide DCDASH_WORKBOOK / DCDASH_CONFIG.
    dotenvy::dotenv().ok();

    // We want `dcdash` and `dcdash -f book.xlsx` to behave like `dcdash tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Render(args) => handle_render(args),
        Command::Summary(args) => handle_summary(args),
        Command::Plot(args) => handle_plot(args),
        Command::ExportCsv(args) => handle_export_csv(args),
        Command::Tui(args) => handle_tui(args),
    }
}

/// Everything a subcommand needs before rendering.
struct Session {
    source: PathBuf,
    config: DashboardConfig,
    loaded: pipeline::LoadedTable,
    range: DateRange,
}

impl Session {
    fn open(args: &SourceArgs, allow_picker: bool) -> Result<Self, AppError> {
        let config = load_config(args.config.as_deref())?;
        let source = resolve_source(args.file.as_deref(), allow_picker)?;
        let range = resolve_range(args, &config);
        let loaded = pipeline::load(&source, &config)?;
        debug!(source = %source.display(), %range, "session ready");
        Ok(Self {
            source,
            config,
            loaded,
            range,
        })
    }

    fn render(&self) -> crate::chart::DashboardOutput {
        pipeline::render(&self.loaded.table, self.range, &self.config)
    }
}

fn handle_render(args: RenderArgs) -> Result<(), AppError> {
    let session = Session::open(&args.source, false)?;
    let output = session.render();

    match &args.out {
        Some(path) => crate::io::export::write_dashboard_json(path, &output, args.compact)?,
        None => println!("{}", crate::io::export::dashboard_json(&output, args.compact)?),
    }
    Ok(())
}

fn handle_summary(args: SourceArgs) -> Result<(), AppError> {
    let session = Session::open(&args, false)?;
    let output = session.render();
    print!("{}", crate::report::format_summary(&output, &session.loaded.stats));
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let session = Session::open(&args.source, false)?;
    let output = session.render();

    let text = match args.group {
        Some(group) => match output.charts.iter().find(|c| c.id == group) {
            Some(chart) => crate::plot::render_chart_plot(chart, args.width, args.height),
            None => format!(
                "{}\n",
                output.message.as_deref().unwrap_or(crate::domain::NO_DATA_MESSAGE)
            ),
        },
        None => crate::plot::render_dashboard_plot(&output, args.width, args.height),
    };
    print!("{text}");
    Ok(())
}

fn handle_export_csv(args: ExportCsvArgs) -> Result<(), AppError> {
    let session = Session::open(&args.source, false)?;
    let filtered = crate::transform::filter_range(&session.loaded.table, session.range);
    crate::io::export::write_table_csv(&args.out, &filtered)?;
    eprintln!("Wrote {} rows to {}", filtered.len(), args.out.display());
    Ok(())
}

fn handle_tui(args: SourceArgs) -> Result<(), AppError> {
    let session = Session::open(&args, true)?;
    crate::tui::run(session.source, session.config, session.loaded, session.range)
}

/// Defaults, with the TOML file at `path` applied when given.
pub fn load_config(path: Option<&Path>) -> Result<DashboardConfig, AppError> {
    let Some(path) = path else {
        return Ok(DashboardConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::schema(format!("Failed to read config '{}': {e}", path.display())))?;
    DashboardConfig::from_toml_str(&text)
}

/// `--file`, else the default workbook, else (interactive only) the picker.
fn resolve_source(file: Option<&Path>, allow_picker: bool) -> Result<PathBuf, AppError> {
    if let Some(file) = file {
        return Ok(file.to_path_buf());
    }

    let default = PathBuf::from(DEFAULT_WORKBOOK);
    if default.exists() || !allow_picker || !std::io::stdin().is_terminal() {
        return Ok(default);
    }
    crate::cli::picker::prompt_for_workbook()
}

/// `--start/--end`, each falling back to the configured default range.
pub fn resolve_range(args: &SourceArgs, config: &DashboardConfig) -> DateRange {
    DateRange::new(
        args.start.unwrap_or(config.default_range.start),
        args.end.unwrap_or(config.default_range.end),
    )
}

/// Rewrite argv so `dcdash` defaults to `dcdash tui`.
///
/// Rules:
/// - `dcdash`                          -> `dcdash tui`
/// - `dcdash -f book.xlsx ...`         -> `dcdash tui -f book.xlsx ...`
/// - `dcdash --help/--version/-h/-V`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }

    argv
}
