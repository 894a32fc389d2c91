//! Spreadsheet reading.
//!
//! Produces a `Sheet`: the first worksheet as rows of detached `Cell`s, with
//! column positions relative to column A so that positional selection matches
//! the spreadsheet letters.
//!
//! - `.csv` is read with the `csv` crate (every cell is text)
//! - anything else goes through `calamine` (xlsx, xlsm, xlsb, xls, ods)

use std::path::Path;

use calamine::{Data, DataType, Reader, open_workbook_auto};
use tracing::debug;

use crate::domain::Cell;
use crate::error::AppError;

/// The first worksheet of a source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub rows: Vec<Vec<Cell>>,
    /// Widest row length (rows may be ragged).
    pub width: usize,
}

impl Sheet {
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self { rows, width }
    }

    /// Cell at `(row, col)`, `Empty` when out of bounds.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        const EMPTY: &Cell = &Cell::Empty;
        self.rows.get(row).and_then(|r| r.get(col)).unwrap_or(EMPTY)
    }
}

/// Read the first worksheet of `path`.
pub fn read_sheet(path: &Path) -> Result<Sheet, AppError> {
    if !path.exists() {
        return Err(AppError::schema(format!("Workbook not found: {}", path.display())));
    }

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        == Some(true);

    let sheet = if is_csv {
        read_csv_sheet(path)?
    } else {
        read_workbook_sheet(path)?
    };

    debug!(
        path = %path.display(),
        rows = sheet.rows.len(),
        width = sheet.width,
        "read source sheet"
    );
    Ok(sheet)
}

fn read_workbook_sheet(path: &Path) -> Result<Sheet, AppError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| AppError::schema(format!("Failed to open workbook '{}': {e}", path.display())))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let Some(first) = sheet_names.first() else {
        return Err(AppError::schema(format!("Workbook has no sheets: {}", path.display())));
    };

    let range = workbook
        .worksheet_range(first)
        .map_err(|e| AppError::schema(format!("Failed to read sheet '{first}': {e}")))?;

    // calamine trims leading empty columns; pad them back so indices stay
    // relative to column A.
    let col_offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);

    let rows = range
        .rows()
        .map(|row| {
            let mut cells = vec![Cell::Empty; col_offset];
            cells.extend(row.iter().map(cell_from_data));
            cells
        })
        .collect();

    Ok(Sheet::from_rows(rows))
}

fn read_csv_sheet(path: &Path) -> Result<Sheet, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| AppError::schema(format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| AppError::schema(format!("CSV parse error on line {}: {e}", idx + 1)))?;
        rows.push(record.iter().map(cell_from_text).collect());
    }

    Ok(Sheet::from_rows(rows))
}

fn cell_from_text(text: &str) -> Cell {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first cell.
    let text = text.trim().trim_start_matches('\u{feff}');
    if text.is_empty() {
        Cell::Empty
    } else {
        Cell::Text(text.to_string())
    }
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Float(v) => Cell::Number(*v),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) => cell_from_text(s),
        Data::DateTime(_) | Data::DateTimeIso(_) => data.as_datetime().map(Cell::DateTime).unwrap_or(Cell::Empty),
        _ => Cell::Empty,
    }
}
