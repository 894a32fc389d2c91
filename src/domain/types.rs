//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the transform (filter, labels, axis ranges)
//! - exported to JSON/CSV
//! - named from a TOML dashboard config

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Number of numeric (metric) fields carried by a `Record`.
pub const NUMERIC_FIELD_COUNT: usize = 16;

/// The canonical field schema, in the fixed order the loader binds columns.
///
/// Serialized names match the column headers used in exports and configs
/// (`CF_Actual`, `Yield_C_Plan`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "Date")]
    Date,
    #[serde(rename = "CF_Actual")]
    CfActual,
    #[serde(rename = "Yield_C_Act")]
    YieldCActual,
    #[serde(rename = "Yield_B_Act")]
    YieldBActual,
    #[serde(rename = "CF_Target")]
    CfTarget,
    #[serde(rename = "Yield_C_Plan")]
    YieldCPlan,
    #[serde(rename = "Yield_B_Plan")]
    YieldBPlan,
    #[serde(rename = "FS_C_Act")]
    FsCActual,
    #[serde(rename = "FS_B_Act")]
    FsBActual,
    #[serde(rename = "FS_C_Plan")]
    FsCPlan,
    #[serde(rename = "FS_B_Plan")]
    FsBPlan,
    #[serde(rename = "Vin_Act")]
    VinActual,
    #[serde(rename = "Vin_Plan")]
    VinPlan,
    #[serde(rename = "Sale_Act")]
    SaleActual,
    #[serde(rename = "Sale_Plan")]
    SalePlan,
    #[serde(rename = "Eth_Name")]
    EthName,
    #[serde(rename = "Eth_Act")]
    EthActual,
    #[serde(rename = "Eth_Plan")]
    EthPlan,
}

/// Value kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Date,
    Numeric,
    Text,
}

impl Field {
    /// All fields in schema order.
    pub const ALL: [Field; 18] = [
        Field::Date,
        Field::CfActual,
        Field::YieldCActual,
        Field::YieldBActual,
        Field::CfTarget,
        Field::YieldCPlan,
        Field::YieldBPlan,
        Field::FsCActual,
        Field::FsBActual,
        Field::FsCPlan,
        Field::FsBPlan,
        Field::VinActual,
        Field::VinPlan,
        Field::SaleActual,
        Field::SalePlan,
        Field::EthName,
        Field::EthActual,
        Field::EthPlan,
    ];

    /// Canonical column name.
    pub fn name(self) -> &'static str {
        match self {
            Field::Date => "Date",
            Field::CfActual => "CF_Actual",
            Field::YieldCActual => "Yield_C_Act",
            Field::YieldBActual => "Yield_B_Act",
            Field::CfTarget => "CF_Target",
            Field::YieldCPlan => "Yield_C_Plan",
            Field::YieldBPlan => "Yield_B_Plan",
            Field::FsCActual => "FS_C_Act",
            Field::FsBActual => "FS_B_Act",
            Field::FsCPlan => "FS_C_Plan",
            Field::FsBPlan => "FS_B_Plan",
            Field::VinActual => "Vin_Act",
            Field::VinPlan => "Vin_Plan",
            Field::SaleActual => "Sale_Act",
            Field::SalePlan => "Sale_Plan",
            Field::EthName => "Eth_Name",
            Field::EthActual => "Eth_Act",
            Field::EthPlan => "Eth_Plan",
        }
    }

    /// Look up a field by its canonical name (case-sensitive).
    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Date => FieldKind::Date,
            Field::EthName => FieldKind::Text,
            _ => FieldKind::Numeric,
        }
    }

    /// Storage slot of a numeric field inside `Record::values`.
    fn slot(self) -> Option<usize> {
        let slot = match self {
            Field::Date | Field::EthName => return None,
            Field::CfActual => 0,
            Field::YieldCActual => 1,
            Field::YieldBActual => 2,
            Field::CfTarget => 3,
            Field::YieldCPlan => 4,
            Field::YieldBPlan => 5,
            Field::FsCActual => 6,
            Field::FsBActual => 7,
            Field::FsCPlan => 8,
            Field::FsBPlan => 9,
            Field::VinActual => 10,
            Field::VinPlan => 11,
            Field::SaleActual => 12,
            Field::SalePlan => 13,
            Field::EthActual => 14,
            Field::EthPlan => 15,
        };
        Some(slot)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single spreadsheet cell, detached from the reader that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    DateTime(NaiveDateTime),
}

/// A loaded row before date normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Unparsed date cell.
    pub date: Cell,
    pub values: [Option<f64>; NUMERIC_FIELD_COUNT],
    pub eth_name: Option<String>,
}

/// Loader output: rows in source order, date not yet coerced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub records: Vec<RawRecord>,
}

/// One production day.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: NaiveDate,
    /// Numeric fields; `None` is an absent reading.
    pub values: [Option<f64>; NUMERIC_FIELD_COUNT],
    /// Ethanol batch name.
    pub eth_name: Option<String>,
}

impl Record {
    /// A record with every metric absent.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            values: [None; NUMERIC_FIELD_COUNT],
            eth_name: None,
        }
    }

    /// Builder-style setter, mostly handy in tests and fixtures.
    pub fn with(mut self, field: Field, value: f64) -> Self {
        self.set_value(field, Some(value));
        self
    }

    pub fn with_eth_name(mut self, name: &str) -> Self {
        self.eth_name = Some(name.to_string());
        self
    }

    /// Numeric value of `field` (`None` for absent readings and non-numeric fields).
    pub fn value(&self, field: Field) -> Option<f64> {
        field.slot().and_then(|slot| self.values[slot])
    }

    /// Store a numeric value; non-finite values are stored as absent.
    pub fn set_value(&mut self, field: Field, value: Option<f64>) {
        if let Some(slot) = field.slot() {
            self.values[slot] = value.filter(|v| v.is_finite());
        }
    }

    /// Display text of any field, used for label prefixes and exports.
    pub fn text(&self, field: Field) -> Option<String> {
        match field.kind() {
            FieldKind::Date => Some(self.date.to_string()),
            FieldKind::Text => self.eth_name.clone(),
            FieldKind::Numeric => self.value(field).map(|v| v.to_string()),
        }
    }
}

/// An ordered, immutable sequence of records (ascending by date once normalized).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    records: Vec<Record>,
}

impl Table {
    /// Wrap records as-is; callers are responsible for ordering.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records.iter().map(|r| r.date).collect()
    }

    /// One numeric column, row-aligned.
    pub fn column(&self, field: Field) -> Vec<Option<f64>> {
        self.records.iter().map(|r| r.value(field)).collect()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Inclusive date range. `start <= end` is expected but not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

/// Which row positions of a series receive a text annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelPolicy {
    None,
    FirstAndLast,
    LastOnly,
}

/// Label policy plus number formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSpec {
    pub policy: LabelPolicy,
    /// Fractional digits when `integer` is false.
    pub precision: usize,
    /// Round to an integer and group thousands with `,`.
    pub integer: bool,
    /// Field whose text is prepended as `"{prefix}: {number}"`.
    pub prefix: Option<Field>,
}

impl LabelSpec {
    pub fn fixed(policy: LabelPolicy, precision: usize) -> Self {
        Self {
            policy,
            precision,
            integer: false,
            prefix: None,
        }
    }

    pub fn integer(policy: LabelPolicy) -> Self {
        Self {
            policy,
            precision: 0,
            integer: true,
            prefix: None,
        }
    }

    pub fn with_prefix(mut self, field: Field) -> Self {
        self.prefix = Some(field);
        self
    }
}

/// Fractions of the data spread added above/below the data on the y-axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub top: f64,
    pub bottom: f64,
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            top: 0.5,
            bottom: 0.2,
        }
    }
}

/// Y-axis bounds in data units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub low: f64,
    pub high: f64,
}

/// The six dashboard charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
pub enum MetricGroup {
    #[serde(rename = "cf")]
    #[value(name = "cf")]
    Cf,
    #[serde(rename = "yield")]
    #[value(name = "yield")]
    Yield,
    #[serde(rename = "fs")]
    #[value(name = "fs")]
    FsRawMaterial,
    #[serde(rename = "vinasses")]
    #[value(name = "vinasses")]
    VinassesProduction,
    #[serde(rename = "sale")]
    #[value(name = "sale")]
    VinassesSale,
    #[serde(rename = "ethanol")]
    #[value(name = "ethanol")]
    Ethanol,
}

impl MetricGroup {
    pub const ALL: [MetricGroup; 6] = [
        MetricGroup::Cf,
        MetricGroup::Yield,
        MetricGroup::FsRawMaterial,
        MetricGroup::VinassesProduction,
        MetricGroup::VinassesSale,
        MetricGroup::Ethanol,
    ];

    /// Short identifier (same as the serialized / CLI name).
    pub fn id(self) -> &'static str {
        match self {
            MetricGroup::Cf => "cf",
            MetricGroup::Yield => "yield",
            MetricGroup::FsRawMaterial => "fs",
            MetricGroup::VinassesProduction => "vinasses",
            MetricGroup::VinassesSale => "sale",
            MetricGroup::Ethanol => "ethanol",
        }
    }

    pub fn from_id(id: &str) -> Option<MetricGroup> {
        MetricGroup::ALL.into_iter().find(|g| g.id() == id)
    }

    pub fn title(self) -> &'static str {
        match self {
            MetricGroup::Cf => "1. CF Performance",
            MetricGroup::Yield => "2. Yield Performance",
            MetricGroup::FsRawMaterial => "3. %FS Raw Material",
            MetricGroup::VinassesProduction => "4. Vinasses Production",
            MetricGroup::VinassesSale => "5. Vinasses Sale",
            MetricGroup::Ethanol => "6. Ethanol Production",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    #[test]
    fn field_names_round_trip_through_lookup() {
        for field in Field::ALL {
            assert_eq!(Field::from_name(field.name()), Some(field));
        }
        assert_eq!(Field::from_name("cf_actual"), None);
    }

    #[test]
    fn numeric_slots_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for field in Field::ALL {
            if let Some(slot) = field.slot() {
                assert!(slot < NUMERIC_FIELD_COUNT);
                assert!(seen.insert(slot), "duplicate slot for {field}");
            }
        }
        assert_eq!(seen.len(), NUMERIC_FIELD_COUNT);
    }

    #[test]
    fn record_drops_non_finite_values() {
        let mut r = Record::new(day(1)).with(Field::CfActual, 1.5);
        r.set_value(Field::CfTarget, Some(f64::NAN));
        assert_eq!(r.value(Field::CfActual), Some(1.5));
        assert_eq!(r.value(Field::CfTarget), None);
        assert_eq!(r.value(Field::EthName), None);
    }

    #[test]
    fn record_text_covers_every_kind() {
        let r = Record::new(day(2)).with(Field::EthActual, 12.0).with_eth_name("B7");
        assert_eq!(r.text(Field::Date).as_deref(), Some("2026-01-02"));
        assert_eq!(r.text(Field::EthName).as_deref(), Some("B7"));
        assert_eq!(r.text(Field::EthActual).as_deref(), Some("12"));
        assert_eq!(r.text(Field::EthPlan), None);
    }

    #[test]
    fn date_range_is_inclusive() {
        let range = DateRange::new(day(2), day(4));
        assert!(!range.contains(day(1)));
        assert!(range.contains(day(2)));
        assert!(range.contains(day(4)));
        assert!(!range.contains(day(5)));
    }
}
