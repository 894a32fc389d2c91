//! Shared dashboard pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! read sheet -> select columns -> normalize dates -> filter -> labels/axis -> charts
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::path::Path;

use tracing::info;

use crate::chart::{DashboardOutput, assemble_dashboard};
use crate::domain::{DashboardConfig, DateRange, NO_DATA_MESSAGE, Table};
use crate::error::AppError;
use crate::io::ingest::{NormalizeStats, load_table, normalize_dates};
use crate::io::sheet::read_sheet;
use crate::transform::{filter_range, latest_date_label};

/// A normalized table plus how it was obtained. Built once per load/reload.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: Table,
    pub stats: NormalizeStats,
}

/// Read the workbook at `path` and normalize it into a date-sorted table.
pub fn load(path: &Path, config: &DashboardConfig) -> Result<LoadedTable, AppError> {
    let sheet = read_sheet(path)?;
    let raw = load_table(&sheet, &config.columns, config.header_rows)?;
    let (table, stats) = normalize_dates(raw);

    info!(
        path = %path.display(),
        rows = table.len(),
        dropped = stats.rows_dropped,
        "loaded production table"
    );
    Ok(LoadedTable { table, stats })
}

/// Run one render cycle over an already loaded table.
///
/// An empty selection is not an error: charts are omitted and `message` is set.
pub fn render(table: &Table, range: DateRange, config: &DashboardConfig) -> DashboardOutput {
    let filtered = filter_range(table, range);
    let latest_date = latest_date_label(&filtered);

    let (message, charts) = if filtered.is_empty() {
        info!(%range, "no rows in selected range");
        (Some(NO_DATA_MESSAGE.to_string()), Vec::new())
    } else {
        (None, assemble_dashboard(&filtered, config))
    };

    DashboardOutput {
        title: config.title.clone(),
        range,
        rows_total: table.len(),
        rows_in_range: filtered.len(),
        latest_date,
        message,
        charts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Field, Record};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn table() -> Table {
        Table::new(vec![
            Record::new(day(3)).with(Field::CfActual, 10.0),
            Record::new(day(10)).with(Field::CfActual, 12.0),
            Record::new(day(20)).with(Field::CfActual, 11.0),
        ])
    }

    #[test]
    fn render_filters_and_builds_all_charts() {
        let config = DashboardConfig::default();
        let out = render(&table(), DateRange::new(day(1), day(15)), &config);
        assert_eq!(out.rows_total, 3);
        assert_eq!(out.rows_in_range, 2);
        assert_eq!(out.latest_date, "10 JANUARY 2026");
        assert_eq!(out.message, None);
        assert_eq!(out.charts.len(), 6);
        assert_eq!(out.charts[0].x, vec![day(3), day(10)]);
    }

    #[test]
    fn inverted_range_reports_no_data() {
        let out = render(&table(), DateRange::new(day(15), day(1)), &DashboardConfig::default());
        assert_eq!(out.rows_in_range, 0);
        assert_eq!(out.latest_date, "N/A");
        assert_eq!(out.message.as_deref(), Some(NO_DATA_MESSAGE));
        assert!(out.charts.is_empty());
    }

    #[test]
    fn load_reports_missing_workbook_as_input_error() {
        let err = load(Path::new("no/such/Actual vs Plan.xlsx"), &DashboardConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
    }
}
