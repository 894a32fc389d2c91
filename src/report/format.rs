//! Formatted terminal output for `dcdash summary`.
//!
//! We keep formatting code in one place so:
//! - the transform code stays clean and testable
//! - output changes are localized (easy to snapshot in tests)

use crate::chart::{ChartSpec, DashboardOutput};
use crate::io::ingest::NormalizeStats;

/// Format the dashboard summary: header, range, latest-date banner and one block per chart.
pub fn format_summary(output: &DashboardOutput, stats: &NormalizeStats) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {} ===\n", output.title));
    out.push_str(&format!("Range: {}\n", output.range));
    out.push_str(&format!(
        "Rows: {} in range / {} loaded ({} read, {} without a usable date)\n",
        output.rows_in_range, output.rows_total, stats.rows_read, stats.rows_dropped
    ));
    out.push_str(&format!("Latest data: {}\n", output.latest_date));

    if let Some(message) = &output.message {
        out.push('\n');
        out.push_str(message);
        out.push('\n');
        return out;
    }

    for chart in &output.charts {
        out.push('\n');
        out.push_str(&format_chart(chart));
    }

    out
}

/// One chart block: title, y-range and the first/last label of each series.
pub fn format_chart(chart: &ChartSpec) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} | y=[{}, {}]\n",
        chart.title,
        fmt_axis(chart.y_range.low),
        fmt_axis(chart.y_range.high)
    ));

    out.push_str(format!("  {:<14} {:<7} {:>20} {:>20}\n", "series", "role", "first", "last").trim_end());
    out.push('\n');
    out.push_str(format!("  {:-<14} {:-<7} {:-<20} {:-<20}\n", "", "", "", "").trim_end());
    out.push('\n');

    for series in &chart.series {
        let role = format!("{:?}", series.role).to_lowercase();
        out.push_str(
            format!(
                "  {:<14} {:<7} {:>20} {:>20}\n",
                series.name,
                role,
                truncate(series.first_label().unwrap_or("-"), 20),
                truncate(series.last_label().unwrap_or("-"), 20),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn fmt_axis(v: f64) -> String {
    if v.abs() >= 1000.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.3}")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
