use chrono::NaiveDate;

use crate::domain::{DateRange, Table};

/// Rows with `start <= date <= end`. An inverted range yields an empty table.
pub fn filter_range(table: &Table, range: DateRange) -> Table {
    let records = table.iter().filter(|r| range.contains(r.date)).cloned().collect();
    Table::new(records)
}

pub fn latest_date(table: &Table) -> Option<NaiveDate> {
    table.iter().map(|r| r.date).max()
}

/// Latest date as `DD MONTH YYYY` in upper case, or `N/A` for an empty table.
pub fn latest_date_label(table: &Table) -> String {
    match latest_date(table) {
        Some(date) => date.format("%d %B %Y").to_string().to_uppercase(),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Field, Record};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn table(days: &[u32]) -> Table {
        Table::new(days.iter().map(|d| Record::new(day(*d)).with(Field::CfActual, *d as f64)).collect())
    }

    #[test]
    fn keeps_only_rows_inside_inclusive_bounds() {
        let source = table(&[1, 2, 3, 4, 5, 6]);
        let range = DateRange::new(day(2), day(5));

        let out = filter_range(&source, range);
        assert_eq!(out.dates(), vec![day(2), day(3), day(4), day(5)]);
        assert!(out.iter().all(|r| range.start <= r.date && r.date <= range.end));
        assert!(out.iter().all(|r| source.records().contains(r)));
        assert_eq!(source.len(), 6);
    }

    #[test]
    fn filtering_is_idempotent() {
        let source = table(&[1, 3, 3, 9, 12]);
        let range = DateRange::new(day(3), day(10));
        let once = filter_range(&source, range);
        assert_eq!(filter_range(&once, range), once);
    }

    #[test]
    fn inverted_range_is_empty_not_an_error() {
        let out = filter_range(&table(&[1, 2, 3]), DateRange::new(day(3), day(1)));
        assert!(out.is_empty());
        assert_eq!(latest_date_label(&out), "N/A");
    }

    #[test]
    fn latest_date_label_is_upper_case_long_form() {
        assert_eq!(latest_date_label(&table(&[4, 31, 2])), "31 JANUARY 2026");
        assert_eq!(latest_date(&table(&[])), None);
    }
}
