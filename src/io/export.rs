//! Dashboard exports.
//!
//! - chart descriptions as JSON, the contract with an external charting layer
//! - the filtered table as CSV with canonical headers, easy to consume in spreadsheets

use std::fs;
use std::path::Path;

use crate::chart::DashboardOutput;
use crate::domain::{Field, Table};
use crate::error::AppError;

/// Serialize the dashboard to a JSON string.
pub fn dashboard_json(output: &DashboardOutput, compact: bool) -> Result<String, AppError> {
    let json = if compact {
        serde_json::to_string(output)
    } else {
        serde_json::to_string_pretty(output)
    };
    json.map_err(|e| AppError::runtime(format!("Failed to serialize dashboard JSON: {e}")))
}

pub fn write_dashboard_json(path: &Path, output: &DashboardOutput, compact: bool) -> Result<(), AppError> {
    let json = dashboard_json(output, compact)?;
    fs::write(path, json + "\n")
        .map_err(|e| AppError::runtime(format!("Failed to write dashboard JSON '{}': {e}", path.display())))
}

/// Write `table` as CSV: one column per canonical field, empty cells for absent values.
pub fn write_table_csv(path: &Path, table: &Table) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::runtime(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record(Field::ALL.iter().map(|f| f.name()))
        .map_err(|e| AppError::runtime(format!("Failed to write export CSV header: {e}")))?;

    for record in table {
        let row = Field::ALL.map(|field| record.text(field).unwrap_or_default());
        writer
            .write_record(&row)
            .map_err(|e| AppError::runtime(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::runtime(format!("Failed to flush export CSV: {e}")))
}
