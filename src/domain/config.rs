//! Dashboard configuration.
//!
//! The built-in defaults reproduce the production dashboard: column positions,
//! palette, per-chart label policy and axis padding. An optional TOML file can
//! override a subset of these values; everything else stays read-only for the
//! lifetime of the process.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{DateRange, Field, LabelPolicy, LabelSpec, MetricGroup, Padding};
use crate::error::AppError;

/// Workbook path used when none is given on the command line or in the environment.
pub const DEFAULT_WORKBOOK: &str = "Actual vs Plan.xlsx";

pub const DASHBOARD_TITLE: &str = "DC Daily Production Dashboard";

/// Shown instead of charts when the selected range holds no rows.
pub const NO_DATA_MESSAGE: &str = "No data found for the selected date range.";

/// Opacity applied to a series color for its area fill.
pub const FILL_OPACITY: f64 = 0.15;

/// Fixed palette (hex `#rrggbb`).
pub mod palette {
    pub const CF_ACTUAL: &str = "#1f77b4";
    pub const YIELD_C_ACTUAL: &str = "#2ca02c";
    pub const YIELD_B_ACTUAL: &str = "#9467bd";
    pub const FS_C_ACTUAL: &str = "#00ced1";
    pub const FS_B_ACTUAL: &str = "#ff8c00";
    pub const VIN_ACTUAL: &str = "#e377c2";
    pub const SALE_ACTUAL: &str = "#edc948";
    pub const ETH_ACTUAL: &str = "#17becf";
    pub const PLAN_RED: &str = "#d62728";
}

/// An RGB color parsed from `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn from_hex(hex: &str) -> Option<Rgb> {
        let hex = hex.trim().strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// CSS `rgba(...)` string with the given opacity.
    pub fn to_rgba(self, opacity: f64) -> String {
        format!("rgba({}, {}, {}, {opacity})", self.0, self.1, self.2)
    }
}

/// Whether a series is the realized value or its comparison baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesRole {
    Actual,
    Plan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dash {
    Solid,
    Dash,
    Dot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillMode {
    /// Fill down to y = 0.
    #[serde(rename = "tozeroy")]
    ToZeroY,
    /// Fill down to the previous series.
    #[serde(rename = "tonexty")]
    ToNextY,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextPosition {
    #[serde(rename = "top center")]
    TopCenter,
    #[serde(rename = "bottom center")]
    BottomCenter,
    #[serde(rename = "top right")]
    TopRight,
    #[serde(rename = "bottom right")]
    BottomRight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: String,
    pub width: f64,
    pub dash: Dash,
}

/// One line on a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesConfig {
    pub field: Field,
    pub role: SeriesRole,
    pub label: LabelSpec,
    pub line: LineStyle,
    pub fill: Option<FillMode>,
    pub markers: bool,
    pub text_position: TextPosition,
    pub font_size: f64,
}

impl SeriesConfig {
    /// Solid, filled, marked series labelled at both ends.
    fn actual(field: Field, color: &str, label: LabelSpec, fill: FillMode, text_position: TextPosition) -> Self {
        Self {
            field,
            role: SeriesRole::Actual,
            label,
            line: LineStyle {
                color: color.to_string(),
                width: 3.0,
                dash: Dash::Solid,
            },
            fill: Some(fill),
            markers: true,
            text_position,
            font_size: 11.0,
        }
    }

    /// Red baseline series labelled at its last point.
    fn plan(field: Field, label: LabelSpec, dash: Dash, text_position: TextPosition) -> Self {
        Self {
            field,
            role: SeriesRole::Plan,
            label,
            line: LineStyle {
                color: palette::PLAN_RED.to_string(),
                width: 2.0,
                dash,
            },
            fill: None,
            markers: false,
            text_position,
            font_size: 11.0,
        }
    }
}

/// Everything needed to assemble one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupConfig {
    pub group: MetricGroup,
    pub title: String,
    pub series: Vec<SeriesConfig>,
    /// Fields pooled by the axis range calculator.
    pub axis_fields: Vec<Field>,
    pub padding: Padding,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub t: u32,
    pub b: u32,
    pub l: u32,
    pub r: u32,
}

/// Chart-level display options shared by every chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSpec {
    pub template: String,
    pub height: u32,
    pub margin: Margin,
    pub show_legend: bool,
    pub display_mode_bar: bool,
    pub label_font_family: String,
}

impl Default for LayoutSpec {
    fn default() -> Self {
        Self {
            template: "plotly_white".to_string(),
            height: 400,
            margin: Margin {
                t: 50,
                b: 20,
                l: 50,
                r: 120,
            },
            show_legend: false,
            display_mode_bar: false,
            label_font_family: "Arial Black".to_string(),
        }
    }
}

/// Positional binding of source columns (0-based) to fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMap {
    positions: BTreeMap<Field, usize>,
}

impl Default for ColumnMap {
    fn default() -> Self {
        let positions = [
            (Field::Date, 1),
            (Field::CfActual, 15),
            (Field::YieldCActual, 16),
            (Field::YieldBActual, 17),
            (Field::CfTarget, 26),
            (Field::YieldCPlan, 27),
            (Field::YieldBPlan, 28),
            (Field::FsCActual, 7),
            (Field::FsBActual, 8),
            (Field::FsCPlan, 29),
            (Field::FsBPlan, 30),
            (Field::VinActual, 11),
            (Field::VinPlan, 31),
            (Field::SaleActual, 12),
            (Field::SalePlan, 32),
            (Field::EthName, 22),
            (Field::EthActual, 23),
            (Field::EthPlan, 36),
        ];
        Self {
            positions: positions.into_iter().collect(),
        }
    }
}

impl ColumnMap {
    /// Source column bound to `field`.
    pub fn position(&self, field: Field) -> usize {
        // Every field is present: the map starts from the full default and is
        // only ever updated in place.
        self.positions.get(&field).copied().unwrap_or_default()
    }

    /// Highest referenced column index.
    pub fn max_index(&self) -> usize {
        self.positions.values().copied().max().unwrap_or_default()
    }

    /// Override positions by canonical field name.
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, usize>) -> Result<(), AppError> {
        for (name, &pos) in overrides {
            let field = Field::from_name(name).ok_or_else(|| {
                AppError::schema(format!(
                    "Unknown field `{name}` in [columns]. Expected one of: {}.",
                    field_names()
                ))
            })?;
            self.positions.insert(field, pos);
        }
        Ok(())
    }
}

fn field_names() -> String {
    Field::ALL.iter().map(|f| f.name()).collect::<Vec<_>>().join(", ")
}

/// Full dashboard configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub title: String,
    pub columns: ColumnMap,
    /// Leading source rows skipped as headers.
    pub header_rows: usize,
    pub default_range: DateRange,
    pub layout: LayoutSpec,
    pub groups: Vec<GroupConfig>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: DASHBOARD_TITLE.to_string(),
            columns: ColumnMap::default(),
            header_rows: 1,
            default_range: DateRange::new(ymd(2026, 1, 1), ymd(2026, 1, 31)),
            layout: LayoutSpec::default(),
            groups: MetricGroup::ALL.into_iter().map(default_group).collect(),
        }
    }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn default_group(group: MetricGroup) -> GroupConfig {
    use FillMode::{ToNextY, ToZeroY};
    use LabelPolicy::{FirstAndLast, LastOnly};
    use TextPosition::{BottomCenter, BottomRight, TopCenter, TopRight};

    let fixed = LabelSpec::fixed;
    let int = LabelSpec::integer;

    let (series, axis_fields) = match group {
        MetricGroup::Cf => (
            vec![
                SeriesConfig::actual(Field::CfActual, palette::CF_ACTUAL, fixed(FirstAndLast, 3), ToZeroY, TopCenter),
                SeriesConfig::plan(Field::CfTarget, fixed(LastOnly, 3), Dash::Dash, BottomRight),
            ],
            vec![Field::CfActual, Field::CfTarget],
        ),
        MetricGroup::Yield => (
            vec![
                SeriesConfig::actual(Field::YieldCActual, palette::YIELD_C_ACTUAL, int(FirstAndLast), ToZeroY, TopCenter),
                SeriesConfig::actual(Field::YieldBActual, palette::YIELD_B_ACTUAL, int(FirstAndLast), ToNextY, BottomCenter),
                SeriesConfig::plan(Field::YieldCPlan, int(LastOnly), Dash::Dot, TopRight),
            ],
            vec![Field::YieldCActual, Field::YieldBActual],
        ),
        MetricGroup::FsRawMaterial => (
            vec![
                SeriesConfig::actual(Field::FsCActual, palette::FS_C_ACTUAL, fixed(FirstAndLast, 2), ToZeroY, TopCenter),
                SeriesConfig::actual(Field::FsBActual, palette::FS_B_ACTUAL, fixed(FirstAndLast, 2), ToNextY, BottomCenter),
                SeriesConfig::plan(Field::FsCPlan, fixed(LastOnly, 2), Dash::Dot, TopRight),
            ],
            vec![Field::FsCActual, Field::FsBActual],
        ),
        MetricGroup::VinassesProduction => (
            vec![
                SeriesConfig::actual(Field::VinActual, palette::VIN_ACTUAL, int(FirstAndLast), ToZeroY, TopCenter),
                SeriesConfig::plan(Field::VinPlan, int(LastOnly), Dash::Dot, BottomRight),
            ],
            vec![Field::VinActual, Field::VinPlan],
        ),
        MetricGroup::VinassesSale => (
            vec![
                SeriesConfig::actual(Field::SaleActual, palette::SALE_ACTUAL, int(FirstAndLast), ToZeroY, TopCenter),
                SeriesConfig::plan(Field::SalePlan, int(LastOnly), Dash::Dot, BottomRight),
            ],
            vec![Field::SaleActual, Field::SalePlan],
        ),
        MetricGroup::Ethanol => (
            vec![
                SeriesConfig::actual(
                    Field::EthActual,
                    palette::ETH_ACTUAL,
                    int(FirstAndLast).with_prefix(Field::EthName),
                    ToZeroY,
                    TopCenter,
                ),
                SeriesConfig::plan(Field::EthPlan, int(LastOnly).with_prefix(Field::EthName), Dash::Dot, BottomRight),
            ],
            vec![Field::EthActual, Field::EthPlan],
        ),
    };

    GroupConfig {
        group,
        title: group.title().to_string(),
        series,
        axis_fields,
        padding: Padding::default(),
    }
}

/// Optional overrides read from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub title: Option<String>,
    pub header_rows: Option<usize>,
    pub default_range: Option<DateRange>,
    #[serde(default)]
    pub columns: BTreeMap<String, usize>,
    pub layout: Option<LayoutOverride>,
    /// Keyed by chart id (`cf`, `yield`, `fs`, `vinasses`, `sale`, `ethanol`).
    #[serde(default)]
    pub groups: BTreeMap<String, GroupOverride>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutOverride {
    pub show_legend: Option<bool>,
    pub height: Option<u32>,
}

/// Per-chart overrides; number formatting applies to every series of the chart.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupOverride {
    pub title: Option<String>,
    pub padding_top: Option<f64>,
    pub padding_bottom: Option<f64>,
    pub precision: Option<usize>,
    pub integer: Option<bool>,
    pub actual_policy: Option<LabelPolicy>,
    pub plan_policy: Option<LabelPolicy>,
}

impl DashboardConfig {
    pub fn group(&self, group: MetricGroup) -> Option<&GroupConfig> {
        self.groups.iter().find(|g| g.group == group)
    }

    /// Defaults with the overrides of a TOML document applied.
    pub fn from_toml_str(text: &str) -> Result<Self, AppError> {
        let file: ConfigFile =
            toml::from_str(text).map_err(|e| AppError::schema(format!("Invalid dashboard config: {e}")))?;
        let mut config = Self::default();
        config.apply(file)?;
        Ok(config)
    }

    pub fn apply(&mut self, file: ConfigFile) -> Result<(), AppError> {
        if let Some(title) = file.title {
            self.title = title;
        }
        if let Some(rows) = file.header_rows {
            self.header_rows = rows;
        }
        if let Some(range) = file.default_range {
            self.default_range = range;
        }
        self.columns.apply_overrides(&file.columns)?;

        if let Some(layout) = file.layout {
            if let Some(show) = layout.show_legend {
                self.layout.show_legend = show;
            }
            if let Some(height) = layout.height {
                self.layout.height = height;
            }
        }

        for (id, ov) in file.groups {
            let group = MetricGroup::from_id(&id).ok_or_else(|| {
                AppError::schema(format!(
                    "Unknown chart `[groups.{id}]`. Expected one of: cf, yield, fs, vinasses, sale, ethanol."
                ))
            })?;
            let Some(cfg) = self.groups.iter_mut().find(|g| g.group == group) else {
                continue;
            };
            apply_group_override(cfg, ov)?;
        }

        Ok(())
    }
}

fn apply_group_override(cfg: &mut GroupConfig, ov: GroupOverride) -> Result<(), AppError> {
    let id = cfg.group.id();
    if let Some(title) = ov.title {
        cfg.title = title;
    }
    if let Some(top) = ov.padding_top {
        cfg.padding.top = check_padding(id, "padding_top", top)?;
    }
    if let Some(bottom) = ov.padding_bottom {
        cfg.padding.bottom = check_padding(id, "padding_bottom", bottom)?;
    }

    for series in &mut cfg.series {
        if let Some(precision) = ov.precision {
            series.label.precision = precision;
        }
        if let Some(integer) = ov.integer {
            series.label.integer = integer;
        }
        let policy = match series.role {
            SeriesRole::Actual => ov.actual_policy,
            SeriesRole::Plan => ov.plan_policy,
        };
        if let Some(policy) = policy {
            series.label.policy = policy;
        }
    }
    Ok(())
}

fn check_padding(group: &str, key: &str, value: f64) -> Result<f64, AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::schema(format!(
            "Invalid `{key}` for [groups.{group}]: must be finite and >= 0 (got {value})."
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_columns_need_37_source_columns() {
        let map = ColumnMap::default();
        assert_eq!(map.max_index(), 36);
        assert_eq!(map.position(Field::Date), 1);
        assert_eq!(map.position(Field::EthName), 22);
        assert_eq!(map.position(Field::EthPlan), 36);
    }

    #[test]
    fn default_dashboard_has_six_groups_in_order() {
        let config = DashboardConfig::default();
        let groups: Vec<MetricGroup> = config.groups.iter().map(|g| g.group).collect();
        assert_eq!(groups, MetricGroup::ALL.to_vec());

        let yield_cfg = config.group(MetricGroup::Yield).unwrap();
        assert_eq!(yield_cfg.series.len(), 3);
        assert_eq!(yield_cfg.axis_fields, vec![Field::YieldCActual, Field::YieldBActual]);
        assert_eq!(yield_cfg.series[1].fill, Some(FillMode::ToNextY));

        let eth = config.group(MetricGroup::Ethanol).unwrap();
        assert!(eth.series.iter().all(|s| s.label.prefix == Some(Field::EthName)));
    }

    #[test]
    fn rgb_parses_hex_and_formats_rgba() {
        let rgb = Rgb::from_hex(palette::CF_ACTUAL).unwrap();
        assert_eq!(rgb, Rgb(31, 119, 180));
        assert_eq!(rgb.to_rgba(FILL_OPACITY), "rgba(31, 119, 180, 0.15)");
        assert_eq!(Rgb::from_hex("1f77b4"), None);
        assert_eq!(Rgb::from_hex("#1f77"), None);
    }

    #[test]
    fn toml_overrides_apply_to_the_named_group() {
        let text = r#"
            header_rows = 2

            [default_range]
            start = "2026-02-01"
            end = "2026-02-28"

            [columns]
            CF_Actual = 40

            [layout]
            show_legend = true

            [groups.cf]
            padding_top = 0.6
            padding_bottom = 0.15
            actual_policy = "last-only"
            plan_policy = "none"
            precision = 2
        "#;
        let config = DashboardConfig::from_toml_str(text).unwrap();
        assert_eq!(config.header_rows, 2);
        assert_eq!(config.default_range.start, ymd(2026, 2, 1));
        assert_eq!(config.columns.position(Field::CfActual), 40);
        assert_eq!(config.columns.max_index(), 40);
        assert!(config.layout.show_legend);

        let cf = config.group(MetricGroup::Cf).unwrap();
        assert_eq!(cf.padding, Padding { top: 0.6, bottom: 0.15 });
        assert_eq!(cf.series[0].label.policy, LabelPolicy::LastOnly);
        assert_eq!(cf.series[1].label.policy, LabelPolicy::None);
        assert!(cf.series.iter().all(|s| s.label.precision == 2));

        // Untouched groups keep their defaults.
        let sale = config.group(MetricGroup::VinassesSale).unwrap();
        assert_eq!(sale.padding, Padding::default());
    }

    #[test]
    fn toml_rejects_unknown_keys_fields_and_bad_padding() {
        let err = DashboardConfig::from_toml_str("colour = 1").unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = DashboardConfig::from_toml_str("[columns]\nCF = 3").unwrap_err();
        assert!(err.to_string().contains("Unknown field `CF`"));

        let err = DashboardConfig::from_toml_str("[groups.sale]\npadding_top = -0.1").unwrap_err();
        assert!(err.to_string().contains("padding_top"));

        let err = DashboardConfig::from_toml_str("[groups.steam]\nprecision = 1").unwrap_err();
        assert!(err.to_string().contains("steam"));
    }
}
