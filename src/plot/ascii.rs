//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - plan/target lines: `.`
//! - actual lines: `-`, with point markers `o`, `x`, `+` (one per actual series)

use crate::chart::{ChartSpec, DashboardOutput, SeriesSpec};
use crate::domain::SeriesRole;

const ACTUAL_MARKERS: [char; 3] = ['o', 'x', '+'];
const ACTUAL_LINE: char = '-';
const PLAN_LINE: char = '.';

/// Render every chart of a dashboard, separated by blank lines.
pub fn render_dashboard_plot(output: &DashboardOutput, width: usize, height: usize) -> String {
    if let Some(message) = &output.message {
        return format!("{message}\n");
    }
    let mut out = format!("Latest data: {}\n", output.latest_date);
    for chart in &output.charts {
        out.push('\n');
        out.push_str(&render_chart_plot(chart, width, height));
    }
    out
}

/// Render one chart on a `width` x `height` grid, with a header and a legend line.
pub fn render_chart_plot(chart: &ChartSpec, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let xs = day_offsets(chart);
    let (x_min, x_max) = x_range(&xs);
    let (y_min, y_max) = y_bounds(chart);

    let mut grid = vec![vec![' '; width]; height];

    // Plan lines first, then actual lines, so markers end up on top.
    for series in chart.series.iter().filter(|s| s.role == SeriesRole::Plan) {
        draw_series(&mut grid, &xs, series, x_min, x_max, y_min, y_max, PLAN_LINE);
    }
    for series in chart.series.iter().filter(|s| s.role == SeriesRole::Actual) {
        draw_series(&mut grid, &xs, series, x_min, x_max, y_min, y_max, ACTUAL_LINE);
    }

    let mut legend = Vec::new();
    let mut actual_idx = 0usize;
    for series in &chart.series {
        match series.role {
            SeriesRole::Actual => {
                let marker = ACTUAL_MARKERS[actual_idx % ACTUAL_MARKERS.len()];
                actual_idx += 1;
                for (&x, y) in xs.iter().zip(&series.y) {
                    let Some(y) = y else { continue };
                    let col = map_x(x, x_min, x_max, width);
                    let row = map_y(*y, y_min, y_max, height);
                    grid[row][col] = marker;
                }
                legend.push(format!("{marker} {}", series.name));
            }
            SeriesRole::Plan => legend.push(format!("{PLAN_LINE} {}", series.name)),
        }
    }

    let mut out = String::new();
    let x_label = match (chart.x.first(), chart.x.last()) {
        (Some(first), Some(last)) => format!("{first}, {last}"),
        _ => "-".to_string(),
    };
    out.push_str(&format!(
        "{} | x=[{x_label}] | y=[{:.2}, {:.2}]\n",
        chart.title, chart.y_range.low, chart.y_range.high
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out.push_str(&legend.join("  "));
    out.push('\n');

    out
}

/// Day offsets of each x value from the first date.
fn day_offsets(chart: &ChartSpec) -> Vec<f64> {
    let Some(first) = chart.x.first() else {
        return Vec::new();
    };
    chart.x.iter().map(|d| (*d - *first).num_days() as f64).collect()
}

fn x_range(xs: &[f64]) -> (f64, f64) {
    let min = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min.is_finite() && max.is_finite() && max > min {
        (min, max)
    } else if min.is_finite() {
        (min - 0.5, min + 0.5)
    } else {
        (0.0, 1.0)
    }
}

fn y_bounds(chart: &ChartSpec) -> (f64, f64) {
    let (low, high) = (chart.y_range.low, chart.y_range.high);
    if high > low { (low, high) } else { (high - 1.0, low + 1.0) }
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Connect consecutive non-null points; a null breaks the line.
#[allow(clippy::too_many_arguments)]
fn draw_series(
    grid: &mut [Vec<char>],
    xs: &[f64],
    series: &SeriesSpec,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    ch: char,
) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev: Option<(usize, usize)> = None;
    for (&x, y) in xs.iter().zip(&series.y) {
        let Some(y) = y else {
            prev = None;
            continue;
        };
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(*y, y_min, y_max, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, ch),
            None if grid[row][col] == ' ' => grid[row][col] = ch,
            None => {}
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish). Only blank cells are written.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
