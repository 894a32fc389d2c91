//! Plotters-powered dashboard chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.
//! Dates are plotted as day numbers (`num_days_from_ce`) so the axis stays numeric.

use chrono::{Datelike, NaiveDate};
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::chart::{ChartSpec, SeriesSpec};
use crate::domain::{Rgb, SeriesRole};

/// One drawable line: contiguous segments (split at absent values) plus its annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotLine {
    pub segments: Vec<Vec<(f64, f64)>>,
    /// Non-empty labels at their data point.
    pub labels: Vec<(f64, f64, String)>,
    pub color: (u8, u8, u8),
    pub markers: bool,
}

impl PlotLine {
    pub fn from_series(x: &[NaiveDate], series: &SeriesSpec) -> Self {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        let mut labels = Vec::new();

        for ((date, y), label) in x.iter().zip(&series.y).zip(&series.labels) {
            let xv = date_to_x(*date);
            match y {
                Some(y) => {
                    current.push((xv, *y));
                    if !label.is_empty() {
                        labels.push((xv, *y, label.clone()));
                    }
                }
                None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }

        let color = match Rgb::from_hex(&series.color) {
            Some(Rgb(r, g, b)) => (r, g, b),
            None if series.role == SeriesRole::Plan => (255, 0, 0),
            None => (255, 255, 255),
        };

        Self {
            segments,
            labels,
            color,
            markers: series.markers,
        }
    }
}

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct DashboardPlottersChart<'a> {
    pub lines: &'a [PlotLine],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub show_labels: bool,
    /// Formatting of tick labels.
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> DashboardPlottersChart<'a> {
    /// Bounds for `chart`: x spans the dates (padded by half a day), y is the chart's axis range.
    pub fn bounds(chart: &ChartSpec) -> ([f64; 2], [f64; 2]) {
        let xs: Vec<f64> = chart.x.iter().map(|d| date_to_x(*d)).collect();
        let x_min = xs.iter().copied().fold(f64::INFINITY, f64::min);
        let x_max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let x_bounds = if x_min.is_finite() && x_max.is_finite() {
            [x_min - 0.5, x_max + 0.5]
        } else {
            [0.0, 1.0]
        };

        let (low, high) = (chart.y_range.low, chart.y_range.high);
        let y_bounds = if high > low { [low, high] } else { [high - 1.0, low + 1.0] };
        (x_bounds, y_bounds)
    }
}

impl<'a> Widget for DashboardPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 6 {
            buf.set_string(area.x, area.y, "Chart area too small.", Style::default().fg(Color::Yellow));
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(4)
                .y_labels(4)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for line in self.lines {
                let (r, g, b) = line.color;
                let color = RGBColor(r, g, b);

                for segment in &line.segments {
                    chart.draw_series(LineSeries::new(segment.iter().copied(), &color))?;
                    // Circle radii are mis-scaled by the terminal backend; pixels stay crisp.
                    if line.markers {
                        chart.draw_series(segment.iter().map(|&(x, y)| Pixel::new((x, y), WHITE)))?;
                    }
                }

                if self.show_labels {
                    chart.draw_series(line.labels.iter().map(|(x, y, text)| {
                        Text::new(text.clone(), (*x, *y), ("sans-serif", 10).into_font().color(&color))
                    }))?;
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

pub fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Tick label for a day-number x value (`MM-DD`).
pub fn fmt_axis_date(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%m-%d").to_string())
        .unwrap_or_default()
}

pub fn fmt_axis_value(v: f64) -> String {
    if v.abs() >= 1000.0 {
        format!("{v:.0}")
    } else if v.abs() >= 10.0 {
        format!("{v:.1}")
    } else {
        format!("{v:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::assemble_chart;
    use crate::domain::{DashboardConfig, Field, MetricGroup, Record, Table};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    #[test]
    fn absent_values_split_segments() {
        let table = Table::new(vec![
            Record::new(day(1)).with(Field::CfActual, 1.0),
            Record::new(day(2)).with(Field::CfActual, 2.0),
            Record::new(day(3)),
            Record::new(day(4)).with(Field::CfActual, 4.0),
        ]);
        let config = DashboardConfig::default();
        let chart = assemble_chart(&table, config.group(MetricGroup::Cf).unwrap(), &config.layout);

        let line = PlotLine::from_series(&chart.x, &chart.series[0]);
        assert_eq!(line.segments.len(), 2);
        assert_eq!(line.segments[0].len(), 2);
        assert_eq!(line.color, (31, 119, 180));
        assert_eq!(line.labels.len(), 2);
        assert_eq!(line.labels[1].2, "4.000");

        let target = PlotLine::from_series(&chart.x, &chart.series[1]);
        assert!(target.segments.is_empty());
        assert_eq!(target.color, (214, 39, 40));
    }

    #[test]
    fn date_axis_round_trips_through_day_numbers() {
        assert_eq!(fmt_axis_date(date_to_x(day(17))), "01-17");
        assert_eq!(fmt_axis_value(1234.4), "1234");
        assert_eq!(fmt_axis_value(12.34), "12.3");
        assert_eq!(fmt_axis_value(0.456), "0.46");
    }

    #[test]
    fn bounds_pad_single_day() {
        let table = Table::new(vec![Record::new(day(5)).with(Field::CfActual, 5.0)]);
        let config = DashboardConfig::default();
        let chart = assemble_chart(&table, config.group(MetricGroup::Cf).unwrap(), &config.layout);
        let (x, y) = DashboardPlottersChart::bounds(&chart);
        assert_eq!(x[1] - x[0], 1.0);
        assert_eq!(y, [3.5, 7.5]);
    }
}
