//! Per-point annotation text.
//!
//! A series gets a label only at the positions its `LabelPolicy` selects;
//! every other position is the empty string so labels stay row-aligned.

use crate::domain::{Field, LabelPolicy, LabelSpec, Record, Table};

/// One label per row of `table` for `field`.
pub fn format_labels(table: &Table, field: Field, spec: &LabelSpec) -> Vec<String> {
    let n = table.len();
    let mut labels = vec![String::new(); n];
    if n == 0 {
        return labels;
    }

    let selected = match spec.policy {
        LabelPolicy::None => vec![],
        LabelPolicy::FirstAndLast => vec![0, n - 1],
        LabelPolicy::LastOnly => vec![n - 1],
    };

    let records = table.records();
    for idx in selected {
        labels[idx] = label_at(&records[idx], field, spec);
    }
    labels
}

fn label_at(record: &Record, field: Field, spec: &LabelSpec) -> String {
    let Some(value) = record.value(field) else {
        return String::new();
    };
    let number = format_value(value, spec);

    let prefix = spec.prefix.and_then(|p| record.text(p)).filter(|p| !p.is_empty());
    match prefix {
        Some(prefix) => format!("{prefix}: {number}"),
        None => number,
    }
}

/// Number text without any prefix.
pub fn format_value(value: f64, spec: &LabelSpec) -> String {
    if spec.integer {
        group_thousands(value.round_ties_even())
    } else {
        format!("{value:.prec$}", prec = spec.precision)
    }
}

/// Digits of an already rounded value, grouped by thousands.
fn group_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
