//! Command-line parsing for the DC production dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the transform and rendering code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::MetricGroup;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "dcdash", version, about = "DC daily production dashboard (actual vs plan)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Assemble the six charts and print them as JSON.
    Render(RenderArgs),
    /// Print a text summary: latest date, y-ranges, first/last labels per chart.
    Summary(SourceArgs),
    /// Draw one chart (or all of them) as ASCII.
    Plot(PlotArgs),
    /// Write the rows of the selected range as CSV with canonical headers.
    ExportCsv(ExportCsvArgs),
    /// Launch the interactive dashboard.
    ///
    /// This runs the same pipeline as `dcdash render`, with the date range
    /// editable in a terminal UI using Ratatui.
    Tui(SourceArgs),
}

/// Where the data comes from and which dates to show. Shared by every subcommand.
#[derive(Debug, Args, Clone, Default)]
pub struct SourceArgs {
    /// Workbook to read (xlsx, xls, xlsb, ods or csv). Defaults to `Actual vs Plan.xlsx`.
    #[arg(short = 'f', long = "file", env = "DCDASH_WORKBOOK", value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Dashboard config (TOML) overriding columns, header rows, default range and chart settings.
    #[arg(long, env = "DCDASH_CONFIG", value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// First day of the range (YYYY-MM-DD, inclusive).
    #[arg(long, value_parser = parse_cli_date)]
    pub start: Option<NaiveDate>,

    /// Last day of the range (YYYY-MM-DD, inclusive).
    #[arg(long, value_parser = parse_cli_date)]
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Write the JSON to this file instead of stdout.
    #[arg(long, value_name = "JSON")]
    pub out: Option<PathBuf>,

    /// Single-line JSON.
    #[arg(long)]
    pub compact: bool,
}

#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Chart to draw; all six when omitted.
    #[arg(long, value_enum)]
    pub group: Option<MetricGroup>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ExportCsvArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output CSV path.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,
}

fn parse_cli_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD ({e})"))
}
