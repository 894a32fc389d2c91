//! Sheet ingest and date normalization.
//!
//! This module turns the first worksheet of the production workbook into a
//! clean, date-sorted `Table` that is safe to filter and chart.
//!
//! Design goals:
//! - **Strict schema** for the column layout (clear errors + exit code 2)
//! - **Row-level tolerance** (rows with unreadable dates are dropped and counted)
//! - **Deterministic behavior** (stable sort, fixed format order)
//! - **Separation of concerns**: no charting logic here

use chrono::{Days, NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use crate::domain::{Cell, ColumnMap, Field, FieldKind, NUMERIC_FIELD_COUNT, RawRecord, RawTable, Record, Table};
use crate::error::AppError;
use crate::io::sheet::Sheet;

/// Counters reported by the date normalizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub rows_read: usize,
    /// Rows whose Date cell could not be read as a calendar date.
    pub rows_dropped: usize,
}

impl NormalizeStats {
    pub fn rows_used(&self) -> usize {
        self.rows_read - self.rows_dropped
    }
}

/// Select the mapped columns of `sheet` and bind them to the canonical fields.
///
/// The first `header_rows` rows are skipped. Values are coerced but dates are
/// left as raw cells for [`normalize_dates`].
pub fn load_table(sheet: &Sheet, columns: &ColumnMap, header_rows: usize) -> Result<RawTable, AppError> {
    let required = columns.max_index() + 1;
    if sheet.width < required {
        return Err(AppError::schema(format!(
            "Sheet has {} columns but the column map references column index {} ({} columns required).",
            sheet.width,
            columns.max_index(),
            required
        )));
    }

    let mut records = Vec::with_capacity(sheet.rows.len().saturating_sub(header_rows));
    for row in header_rows..sheet.rows.len() {
        let mut values = [None; NUMERIC_FIELD_COUNT];
        let mut slot = 0usize;
        let mut eth_name = None;
        let mut date = Cell::Empty;

        for field in Field::ALL {
            let cell = sheet.cell(row, columns.position(field));
            match field.kind() {
                FieldKind::Date => date = cell.clone(),
                FieldKind::Text => eth_name = cell_text(cell),
                FieldKind::Numeric => {
                    values[slot] = cell_number(cell);
                    slot += 1;
                }
            }
        }

        records.push(RawRecord { date, values, eth_name });
    }

    debug!(rows = records.len(), header_rows, "loaded raw table");
    Ok(RawTable { records })
}

/// Coerce the Date field, drop rows that fail, and sort ascending.
pub fn normalize_dates(raw: RawTable) -> (Table, NormalizeStats) {
    let mut stats = NormalizeStats {
        rows_read: raw.records.len(),
        rows_dropped: 0,
    };

    let mut records = Vec::with_capacity(raw.records.len());
    for (idx, raw_record) in raw.records.into_iter().enumerate() {
        let Some(date) = parse_date_cell(&raw_record.date) else {
            debug!(row = idx, cell = ?raw_record.date, "dropping row with unreadable date");
            stats.rows_dropped += 1;
            continue;
        };
        let mut record = Record::new(date);
        record.values = raw_record.values;
        record.eth_name = raw_record.eth_name;
        records.push(record);
    }

    // `sort_by_key` is stable: same-day rows keep their sheet order.
    records.sort_by_key(|r| r.date);

    if stats.rows_dropped > 0 {
        info!(
            dropped = stats.rows_dropped,
            read = stats.rows_read,
            "rows without a usable date were skipped"
        );
    }

    (Table::new(records), stats)
}

/// Read a Date cell as a calendar date.
///
/// Numeric cells are spreadsheet serial day numbers; numeric *text* is not a date.
pub fn parse_date_cell(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::DateTime(dt) => Some(dt.date()),
        Cell::Number(serial) => excel_serial_to_date(*serial),
        Cell::Text(text) => parse_date_text(text),
        Cell::Empty | Cell::Bool(_) => None,
    }
}

/// Parse date text in one of the accepted formats, first match wins.
pub fn parse_date_text(s: &str) -> Option<NaiveDate> {
    // Slashed dates are read month-first, with day-first as the fallback for
    // values like 31/01/2026 that cannot be month-first.
    const DATE_FMTS: [&str; 9] = [
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%m/%d/%Y",
        "%d/%m/%Y",
        "%d-%m-%Y",
        "%d %B %Y",
        "%d %b %Y",
        "%B %d, %Y",
        "%b %d, %Y",
    ];
    const DATETIME_FMTS: [&str; 4] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"];

    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    // Fractional seconds are ignored.
    let without_fraction = s.split('.').next().unwrap_or(s);
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(without_fraction, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Convert a 1900-system spreadsheet serial (days since 1899-12-30) to a date.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial <= 0.0 || serial >= 2_958_466.0 {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_days(Days::new(serial.floor() as u64))
}

fn cell_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(v) => Some(*v).filter(|v| v.is_finite()),
        Cell::Text(text) => parse_opt_f64(text),
        Cell::Empty | Cell::Bool(_) | Cell::DateTime(_) => None,
    }
}

fn cell_text(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Text(text) => Some(text.trim().to_string()).filter(|t| !t.is_empty()),
        // numeric names keep their float form (`7.0`)
        Cell::Number(v) if v.is_finite() => Some(format!("{v:?}")),
        Cell::Bool(b) => Some(b.to_string()),
        Cell::DateTime(dt) => Some(dt.date().to_string()),
        _ => None,
    }
}

fn parse_opt_f64(s: &str) -> Option<f64> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    let v = cleaned.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// A sheet wide enough for the default column map, with one header row.
    fn default_sheet(data_rows: Vec<Vec<(usize, Cell)>>) -> Sheet {
        let width = ColumnMap::default().max_index() + 1;
        let mut rows = vec![vec![Cell::Text("h".to_string()); width]];
        for cells in data_rows {
            let mut row = vec![Cell::Empty; width];
            for (col, cell) in cells {
                row[col] = cell;
            }
            rows.push(row);
        }
        Sheet::from_rows(rows)
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn too_few_columns_is_a_schema_error() {
        let sheet = Sheet::from_rows(vec![vec![Cell::Empty; 20]]);
        let err = load_table(&sheet, &ColumnMap::default(), 1).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
        assert!(err.to_string().contains("20 columns"));
    }

    #[test]
    fn binds_columns_by_position_and_skips_header() {
        let map = ColumnMap::default();
        let sheet = default_sheet(vec![vec![
            (map.position(Field::Date), text("2026-01-05")),
            (map.position(Field::CfActual), Cell::Number(10.5)),
            (map.position(Field::CfTarget), text("11")),
            (map.position(Field::EthName), text("  BatchA ")),
            (map.position(Field::EthActual), text("1,234")),
        ]]);

        let raw = load_table(&sheet, &map, 1).unwrap();
        assert_eq!(raw.records.len(), 1);

        let (table, stats) = normalize_dates(raw);
        assert_eq!(stats.rows_dropped, 0);
        let r = &table.records()[0];
        assert_eq!(r.date, ymd(2026, 1, 5));
        assert_eq!(r.value(Field::CfActual), Some(10.5));
        assert_eq!(r.value(Field::CfTarget), Some(11.0));
        assert_eq!(r.value(Field::EthActual), Some(1234.0));
        assert_eq!(r.value(Field::YieldCActual), None);
        assert_eq!(r.eth_name.as_deref(), Some("BatchA"));
    }

    #[test]
    fn non_numeric_text_becomes_null() {
        assert_eq!(cell_number(&text("n/a")), None);
        assert_eq!(cell_number(&text(" 2,500.75 ")), Some(2500.75));
        assert_eq!(cell_number(&text("NaN")), None);
        assert_eq!(cell_number(&Cell::Bool(true)), None);
        assert_eq!(cell_number(&Cell::Number(f64::INFINITY)), None);
    }

    #[test]
    fn batch_name_cell_variants() {
        assert_eq!(cell_text(&text("   ")), None);
        assert_eq!(cell_text(&Cell::Number(7.0)).as_deref(), Some("7.0"));
        assert_eq!(cell_text(&Cell::Number(7.25)).as_deref(), Some("7.25"));
        assert_eq!(cell_text(&Cell::Empty), None);
    }

    #[test]
    fn parses_mixed_date_formats() {
        let jan5 = ymd(2026, 1, 5);
        assert_eq!(parse_date_text("2026-01-05"), Some(jan5));
        assert_eq!(parse_date_text("2026/01/05"), Some(jan5));
        assert_eq!(parse_date_text("01/05/2026"), Some(jan5));
        assert_eq!(parse_date_text("31/01/2026"), Some(ymd(2026, 1, 31)));
        assert_eq!(parse_date_text("05-01-2026"), Some(jan5));
        assert_eq!(parse_date_text("5 January 2026"), Some(jan5));
        assert_eq!(parse_date_text("05 Jan 2026"), Some(jan5));
        assert_eq!(parse_date_text("January 5, 2026"), Some(jan5));
        assert_eq!(parse_date_text("2026-01-05 13:45:00"), Some(jan5));
        assert_eq!(parse_date_text("2026-01-05T13:45"), Some(jan5));
        assert_eq!(parse_date_text("2026-01-05 13:45:00.250"), Some(jan5));
        assert_eq!(parse_date_text("Total"), None);
        assert_eq!(parse_date_text(""), None);
    }

    #[test]
    fn excel_serials_use_the_1900_system() {
        assert_eq!(excel_serial_to_date(46027.0), Some(ymd(2026, 1, 5)));
        assert_eq!(excel_serial_to_date(46027.75), Some(ymd(2026, 1, 5)));
        assert_eq!(excel_serial_to_date(0.0), None);
        assert_eq!(excel_serial_to_date(-3.0), None);
        assert_eq!(excel_serial_to_date(f64::NAN), None);
    }

    #[test]
    fn date_cells_of_every_kind() {
        let dt = ymd(2026, 1, 7).and_hms_opt(6, 0, 0).unwrap();
        assert_eq!(parse_date_cell(&Cell::DateTime(dt)), Some(ymd(2026, 1, 7)));
        assert_eq!(parse_date_cell(&Cell::Number(46027.0)), Some(ymd(2026, 1, 5)));
        assert_eq!(parse_date_cell(&text("46027")), None);
        assert_eq!(parse_date_cell(&Cell::Empty), None);
        assert_eq!(parse_date_cell(&Cell::Bool(false)), None);
    }

    #[test]
    fn drops_unparseable_rows_and_sorts_stably() {
        let map = ColumnMap::default();
        let date_col = map.position(Field::Date);
        let cf_col = map.position(Field::CfActual);
        let sheet = default_sheet(vec![
            vec![(date_col, text("2026-01-03")), (cf_col, Cell::Number(1.0))],
            vec![(date_col, text("Total")), (cf_col, Cell::Number(99.0))],
            vec![(date_col, text("2026-01-01")), (cf_col, Cell::Number(2.0))],
            vec![(date_col, text("2026-01-03")), (cf_col, Cell::Number(3.0))],
            vec![(cf_col, Cell::Number(4.0))],
        ]);

        let (table, stats) = normalize_dates(load_table(&sheet, &map, 1).unwrap());
        assert_eq!(stats, NormalizeStats { rows_read: 5, rows_dropped: 2 });
        assert_eq!(stats.rows_used(), 3);
        assert_eq!(table.dates(), vec![ymd(2026, 1, 1), ymd(2026, 1, 3), ymd(2026, 1, 3)]);
        assert_eq!(table.column(Field::CfActual), vec![Some(2.0), Some(1.0), Some(3.0)]);
    }

    #[test]
    fn header_rows_zero_keeps_first_row() {
        let map = ColumnMap::default();
        let mut sheet = default_sheet(vec![]);
        sheet.rows[0][map.position(Field::Date)] = text("2026-01-02");

        let (table, stats) = normalize_dates(load_table(&sheet, &map, 0).unwrap());
        assert_eq!(stats.rows_read, 1);
        assert_eq!(table.len(), 1);
    }
}
