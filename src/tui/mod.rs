//! Ratatui-based terminal dashboard.
//!
//! The TUI is the date-range control: it holds the loaded table, lets the user
//! edit the start/end dates, and re-runs the render cycle on every change. The
//! six charts are drawn with Plotters in a 3x2 grid, or one at a time.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{Days, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};
use tracing::debug;

use crate::app::pipeline::{self, LoadedTable};
use crate::chart::{ChartSpec, DashboardOutput};
use crate::domain::{DashboardConfig, DateRange, MetricGroup};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::{DashboardPlottersChart, PlotLine, fmt_axis_date, fmt_axis_value};

/// Where `e` / `x` write their exports.
const EXPORT_JSON: &str = "dashboard.json";
const EXPORT_CSV: &str = "dashboard.csv";

/// Start the TUI over an already loaded table.
pub fn run(source: PathBuf, config: DashboardConfig, loaded: LoadedTable, range: DateRange) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(source, config, loaded, range);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    source: PathBuf,
    config: DashboardConfig,
    loaded: LoadedTable,
    range: DateRange,
    /// Text of the start (0) and end (1) fields.
    inputs: [String; 2],
    selected_field: usize,
    editing: bool,
    /// Single chart shown full-size; `None` shows the grid.
    focus: Option<MetricGroup>,
    show_labels: bool,
    output: DashboardOutput,
    status: String,
}

impl App {
    fn new(source: PathBuf, config: DashboardConfig, loaded: LoadedTable, range: DateRange) -> Self {
        let output = pipeline::render(&loaded.table, range, &config);
        let status = format!("Loaded {} rows from {}", loaded.table.len(), source.display());
        Self {
            source,
            config,
            loaded,
            range,
            inputs: [range.start.to_string(), range.end.to_string()],
            selected_field: 0,
            editing: false,
            focus: None,
            show_labels: true,
            output,
            status,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing {
            self.handle_date_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::Down | KeyCode::Tab => {
                self.selected_field = 1 - self.selected_field;
            }
            KeyCode::Left => self.shift_selected(-1),
            KeyCode::Right => self.shift_selected(1),
            KeyCode::Enter => {
                self.editing = true;
                self.inputs[self.selected_field].clear();
                self.status = "Editing date (YYYY-MM-DD). Enter to apply, Esc to cancel.".to_string();
            }
            KeyCode::Char('0') => self.focus = None,
            KeyCode::Char(c @ '1'..='6') => {
                let idx = c as usize - '1' as usize;
                self.focus = MetricGroup::ALL.get(idx).copied();
            }
            KeyCode::Char('l') => {
                self.show_labels = !self.show_labels;
            }
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('e') => {
                let path = PathBuf::from(EXPORT_JSON);
                self.status = match crate::io::export::write_dashboard_json(&path, &self.output, false) {
                    Ok(()) => format!("Wrote {}", path.display()),
                    Err(err) => format!("Export failed: {err}"),
                };
            }
            KeyCode::Char('x') => {
                let path = PathBuf::from(EXPORT_CSV);
                let filtered = crate::transform::filter_range(&self.loaded.table, self.range);
                self.status = match crate::io::export::write_table_csv(&path, &filtered) {
                    Ok(()) => format!("Wrote {} rows to {}", filtered.len(), path.display()),
                    Err(err) => format!("Export failed: {err}"),
                };
            }
            _ => {}
        }

        false
    }

    fn handle_date_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing = false;
                self.sync_inputs();
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing = false;
                self.apply_date_input();
            }
            KeyCode::Backspace => {
                self.inputs[self.selected_field].pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '-' {
                    self.inputs[self.selected_field].push(c);
                }
            }
            _ => {}
        }
    }

    fn apply_date_input(&mut self) {
        let trimmed = self.inputs[self.selected_field].trim().to_string();
        match NaiveDate::parse_from_str(&trimmed, "%Y-%m-%d") {
            Ok(date) => {
                self.set_selected_date(date);
                self.status = format!("Range: {}", self.range);
            }
            Err(e) => {
                self.sync_inputs();
                self.status = format!("Invalid date '{trimmed}': {e}");
            }
        }
    }

    fn shift_selected(&mut self, delta: i64) {
        let current = if self.selected_field == 0 {
            self.range.start
        } else {
            self.range.end
        };
        let days = Days::new(delta.unsigned_abs());
        let next = if delta >= 0 {
            current.checked_add_days(days)
        } else {
            current.checked_sub_days(days)
        };
        if let Some(date) = next {
            self.set_selected_date(date);
            self.status = format!("Range: {}", self.range);
        }
    }

    fn set_selected_date(&mut self, date: NaiveDate) {
        if self.selected_field == 0 {
            self.range.start = date;
        } else {
            self.range.end = date;
        }
        self.sync_inputs();
        self.rerender();
    }

    fn sync_inputs(&mut self) {
        self.inputs = [self.range.start.to_string(), self.range.end.to_string()];
    }

    fn rerender(&mut self) {
        self.output = pipeline::render(&self.loaded.table, self.range, &self.config);
    }

    /// Re-read the workbook; on failure the previous table is kept.
    fn reload(&mut self) {
        match pipeline::load(&self.source, &self.config) {
            Ok(loaded) => {
                self.loaded = loaded;
                self.rerender();
                self.status = format!("Reloaded {} rows", self.loaded.table.len());
            }
            Err(err) => {
                debug!(error = %err, "reload failed");
                self.status = format!("Reload failed: {err}");
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(4),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_settings(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = vec![
            Line::from(vec![
                Span::styled(self.output.title.clone(), Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                Span::raw("  |  Latest data: "),
                Span::styled(self.output.latest_date.clone(), Style::default().fg(Color::White)),
            ]),
            Line::from(Span::styled(
                format!(
                    "range: {} | rows: {}/{} | dropped: {} | source: {}",
                    self.output.range,
                    self.output.rows_in_range,
                    self.output.rows_total,
                    self.loaded.stats.rows_dropped,
                    self.source.display(),
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        if let Some(message) = &self.output.message {
            let p = Paragraph::new(message.as_str())
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(p, area);
            return;
        }

        if let Some(group) = self.focus {
            if let Some(chart) = self.output.charts.iter().find(|c| c.id == group) {
                self.draw_chart(frame, area, chart);
            }
            return;
        }

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Ratio(1, 3); 3])
            .split(area);
        for (row_idx, row) in rows.iter().enumerate() {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Ratio(1, 2); 2])
                .split(*row);
            for (col_idx, cell) in cols.iter().enumerate() {
                if let Some(chart) = self.output.charts.get(row_idx * 2 + col_idx) {
                    self.draw_chart(frame, *cell, chart);
                }
            }
        }
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect, chart: &ChartSpec) {
        let block = Block::default().title(chart_title(chart)).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let lines: Vec<PlotLine> = chart.series.iter().map(|s| PlotLine::from_series(&chart.x, s)).collect();
        let (x_bounds, y_bounds) = DashboardPlottersChart::bounds(chart);
        let widget = DashboardPlottersChart {
            lines: &lines,
            x_bounds,
            y_bounds,
            show_labels: self.show_labels,
            fmt_x: fmt_axis_date,
            fmt_y: fmt_axis_value,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items = vec![
            ListItem::new(format!("Start: {}", self.inputs[0])),
            ListItem::new(format!("End:   {}", self.inputs[1])),
        ];

        let title = if self.editing { "Date range (editing)" } else { "Date range" };
        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ start/end  ←/→ ±1 day  Enter edit  1-6 chart  0 grid  l labels  r reload  e json  x csv  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Block title: chart title plus the last label of each series.
fn chart_title(chart: &ChartSpec) -> String {
    let last: Vec<&str> = chart.series.iter().filter_map(|s| s.last_label()).collect();
    if last.is_empty() {
        chart.title.clone()
    } else {
        format!("{} [{}]", chart.title, last.join(" / "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Field, Record, Table};
    use crate::io::ingest::NormalizeStats;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn app() -> App {
        let table = Table::new(vec![
            Record::new(day(2)).with(Field::CfActual, 10.0).with(Field::CfTarget, 11.0),
            Record::new(day(9)).with(Field::CfActual, 12.0).with(Field::CfTarget, 11.0),
        ]);
        let loaded = LoadedTable {
            stats: NormalizeStats { rows_read: 2, rows_dropped: 0 },
            table,
        };
        App::new(
            PathBuf::from("missing/Actual vs Plan.xlsx"),
            DashboardConfig::default(),
            loaded,
            DateRange::new(day(1), day(31)),
        )
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyCode::Char(c));
        }
    }

    #[test]
    fn editing_end_date_rerenders() {
        let mut app = app();
        assert_eq!(app.output.rows_in_range, 2);

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Enter);
        type_text(&mut app, "2026-01-05");
        app.handle_key(KeyCode::Enter);

        assert!(!app.editing);
        assert_eq!(app.range.end, day(5));
        assert_eq!(app.inputs[1], "2026-01-05");
        assert_eq!(app.output.rows_in_range, 1);
        assert_eq!(app.output.latest_date, "02 JANUARY 2026");
    }

    #[test]
    fn invalid_date_keeps_previous_range() {
        let mut app = app();
        app.handle_key(KeyCode::Enter);
        type_text(&mut app, "2026-13");
        app.handle_key(KeyCode::Enter);

        assert_eq!(app.range.start, day(1));
        assert_eq!(app.inputs[0], "2026-01-01");
        assert!(app.status.starts_with("Invalid date '2026-13'"));
    }

    #[test]
    fn arrows_shift_selected_date_and_can_empty_the_range() {
        let mut app = app();
        for _ in 0..9 {
            app.handle_key(KeyCode::Right);
        }
        assert_eq!(app.range.start, day(10));
        assert_eq!(app.output.rows_in_range, 0);
        assert!(app.output.message.is_some());
        assert!(app.output.charts.is_empty());

        app.handle_key(KeyCode::Left);
        assert_eq!(app.range.start, day(9));
        assert_eq!(app.output.rows_in_range, 1);
    }

    #[test]
    fn number_keys_focus_charts_and_q_quits() {
        let mut app = app();
        assert!(!app.handle_key(KeyCode::Char('3')));
        assert_eq!(app.focus, Some(MetricGroup::FsRawMaterial));
        app.handle_key(KeyCode::Char('0'));
        assert_eq!(app.focus, None);
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn failed_reload_keeps_current_table() {
        let mut app = app();
        app.handle_key(KeyCode::Char('r'));
        assert!(app.status.starts_with("Reload failed"));
        assert_eq!(app.loaded.table.len(), 2);
    }

    #[test]
    fn chart_title_lists_last_labels() {
        let app = app();
        assert_eq!(chart_title(&app.output.charts[0]), "1. CF Performance [12.000 / 11.000]");
        assert_eq!(chart_title(&app.output.charts[5]), "6. Ethanol Production");
    }

    #[test]
    fn chart_title_skips_series_with_null_last_row() {
        let mut app = app();
        app.loaded.table = Table::new(vec![
            Record::new(day(2)).with(Field::CfActual, 10.0).with(Field::CfTarget, 11.0),
            Record::new(day(9)).with(Field::CfTarget, 11.5),
        ]);
        app.rerender();
        assert_eq!(chart_title(&app.output.charts[0]), "1. CF Performance [11.500]");
    }
}
