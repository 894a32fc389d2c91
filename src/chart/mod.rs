//! Chart assembly.
//!
//! Turns a filtered `Table` and the per-group configuration into chart
//! descriptions: x dates, y series with styling, per-point labels and the
//! y-axis range. These are the structures handed to any renderer (JSON for a
//! web charting layer, the ASCII plot, the terminal dashboard).

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{
    AxisRange, DashboardConfig, DateRange, Dash, Field, FillMode, GroupConfig, LayoutSpec, MetricGroup, Rgb,
    SeriesConfig, SeriesRole, Table, TextPosition, FILL_OPACITY,
};
use crate::transform::{axis_range, format_labels};

/// Text style of the per-point labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelFont {
    pub family: String,
    pub color: String,
    pub size: f64,
}

/// One assembled line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSpec {
    pub name: String,
    pub field: Field,
    pub role: SeriesRole,
    /// Row-aligned with `ChartSpec::x`; `None` is a gap.
    pub y: Vec<Option<f64>>,
    /// Row-aligned annotation text, `""` where nothing is shown.
    pub labels: Vec<String>,
    pub color: String,
    pub width: f64,
    pub dash: Dash,
    pub markers: bool,
    pub fill: Option<FillMode>,
    /// Fill colour (`rgba(...)`) when `fill` is set.
    pub fill_color: Option<String>,
    pub text_position: TextPosition,
    pub label_font: LabelFont,
}

impl SeriesSpec {
    /// Label at the last row, `None` when that row shows nothing.
    pub fn last_label(&self) -> Option<&str> {
        self.labels.last().map(String::as_str).filter(|l| !l.is_empty())
    }

    pub fn first_label(&self) -> Option<&str> {
        self.labels.first().map(String::as_str).filter(|l| !l.is_empty())
    }
}

/// One dashboard chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub id: MetricGroup,
    pub title: String,
    pub x: Vec<NaiveDate>,
    pub series: Vec<SeriesSpec>,
    pub y_range: AxisRange,
    pub layout: LayoutSpec,
}

/// Complete result of one render cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardOutput {
    pub title: String,
    pub range: DateRange,
    pub rows_total: usize,
    pub rows_in_range: usize,
    /// `DD MONTH YYYY` or `N/A`.
    pub latest_date: String,
    /// Set instead of charts when the range selected no rows.
    pub message: Option<String>,
    pub charts: Vec<ChartSpec>,
}

pub fn assemble_chart(table: &Table, group: &GroupConfig, layout: &LayoutSpec) -> ChartSpec {
    let series = group
        .series
        .iter()
        .map(|cfg| assemble_series(table, cfg, &layout.label_font_family))
        .collect();

    ChartSpec {
        id: group.group,
        title: group.title.clone(),
        x: table.dates(),
        series,
        y_range: axis_range(table, &group.axis_fields, group.padding),
        layout: layout.clone(),
    }
}

/// One chart per configured group, in configuration order.
pub fn assemble_dashboard(table: &Table, config: &DashboardConfig) -> Vec<ChartSpec> {
    config
        .groups
        .iter()
        .map(|group| assemble_chart(table, group, &config.layout))
        .collect()
}

fn assemble_series(table: &Table, cfg: &SeriesConfig, font_family: &str) -> SeriesSpec {
    let fill_color = cfg
        .fill
        .and_then(|_| Rgb::from_hex(&cfg.line.color))
        .map(|rgb| rgb.to_rgba(FILL_OPACITY));

    SeriesSpec {
        name: cfg.field.name().to_string(),
        field: cfg.field,
        role: cfg.role,
        y: table.column(cfg.field),
        labels: format_labels(table, cfg.field, &cfg.label),
        color: cfg.line.color.clone(),
        width: cfg.line.width,
        dash: cfg.line.dash,
        markers: cfg.markers,
        fill: cfg.fill,
        fill_color,
        text_position: cfg.text_position,
        label_font: LabelFont {
            family: font_family.to_string(),
            color: cfg.line.color.clone(),
            size: cfg.font_size,
        },
    }
}
