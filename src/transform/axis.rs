use crate::domain::{AxisRange, Field, Padding, Table};

/// Y-axis bounds over every non-null value of `fields`, padded by a fraction of the spread.
///
/// - no values: `(0, 100)`
/// - zero spread: `(min * 0.7, max * 1.5)`
pub fn axis_range(table: &Table, fields: &[Field], padding: Padding) -> AxisRange {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for record in table {
        for value in fields.iter().filter_map(|f| record.value(*f)) {
            min = min.min(value);
            max = max.max(value);
        }
    }

    if !min.is_finite() || !max.is_finite() {
        return AxisRange { low: 0.0, high: 100.0 };
    }

    let spread = max - min;
    if spread == 0.0 {
        return AxisRange {
            low: min * 0.7,
            high: max * 1.5,
        };
    }

    AxisRange {
        low: min - spread * padding.bottom,
        high: max + spread * padding.top,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Record;
    use chrono::NaiveDate;

    fn table(rows: &[(Option<f64>, Option<f64>)]) -> Table {
        let records = rows
            .iter()
            .enumerate()
            .map(|(i, (a, p))| {
                let mut r = Record::new(NaiveDate::from_ymd_opt(2026, 1, i as u32 + 1).unwrap());
                r.set_value(Field::VinActual, *a);
                r.set_value(Field::VinPlan, *p);
                r
            })
            .collect();
        Table::new(records)
    }

    const FIELDS: [Field; 2] = [Field::VinActual, Field::VinPlan];

    #[test]
    fn empty_and_all_null_default_to_0_100() {
        let expected = AxisRange { low: 0.0, high: 100.0 };
        assert_eq!(axis_range(&Table::default(), &FIELDS, Padding::default()), expected);
        assert_eq!(axis_range(&table(&[(None, None), (None, None)]), &FIELDS, Padding::default()), expected);
    }

    #[test]
    fn constant_values_use_fixed_factors() {
        let t = table(&[(Some(5.0), None), (Some(5.0), Some(5.0))]);
        assert_eq!(axis_range(&t, &FIELDS, Padding::default()), AxisRange { low: 3.5, high: 7.5 });
    }

    #[test]
    fn pools_values_across_fields() {
        let t = table(&[(Some(10.0), Some(20.0)), (Some(30.0), None)]);
        let r = axis_range(&t, &FIELDS, Padding { top: 0.5, bottom: 0.25 });
        assert_eq!(r, AxisRange { low: 5.0, high: 40.0 });
    }

    #[test]
    fn padded_range_contains_the_data() {
        let t = table(&[(Some(-3.0), Some(4.5)), (Some(12.25), Some(0.0))]);
        for padding in [Padding::default(), Padding { top: 0.0, bottom: 0.0 }, Padding { top: 2.0, bottom: 1.0 }] {
            let r = axis_range(&t, &FIELDS, padding);
            assert!(r.low <= -3.0 && 12.25 <= r.high, "{r:?}");
        }
    }

    #[test]
    fn fields_outside_the_list_are_ignored() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let record = Record::new(day)
            .with(Field::VinActual, 1.0)
            .with(Field::VinPlan, 2.0)
            .with(Field::SaleActual, 1e6);
        let t = Table::new(vec![record]);
        let r = axis_range(&t, &FIELDS, Padding { top: 0.0, bottom: 0.0 });
        assert_eq!(r, AxisRange { low: 1.0, high: 2.0 });
    }
}
