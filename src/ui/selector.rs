//! Metric selection list.
//!
//! Lists the whole catalog with a checkbox per metric, its color swatch, how
//! many points it holds and its latest value.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::ui::common::format_count;

/// Render the selector table.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let dashboard = &app.dashboard;

    let header = Row::new(vec![
        Cell::from(""),
        Cell::from(""),
        Cell::from("Metric"),
        Cell::from("Pts"),
        Cell::from("Latest"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = dashboard
        .catalog()
        .iter()
        .map(|metric| {
            let checkbox = if dashboard.selection().contains(metric) { "[x]" } else { "[ ]" };
            let series = dashboard.store().get(metric);
            let points = series.map(|s| format_count(s.len() as u64)).unwrap_or_else(|| "-".to_string());
            let latest = series
                .and_then(|s| s.last())
                .map(|m| format!("{:.2}{}", m.value, m.unit))
                .unwrap_or_else(|| "-".to_string());
            let swatch = Span::styled(
                "■",
                Style::default().fg(app.theme.series_color(dashboard.color_of(metric))),
            );

            Row::new(vec![
                Cell::from(checkbox),
                Cell::from(swatch),
                Cell::from(metric.clone()),
                Cell::from(points),
                Cell::from(latest),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(10),
        Constraint::Length(6),
        Constraint::Length(12),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(" Metrics ")
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected);

    let mut state = TableState::default().with_selected(Some(app.cursor));
    frame.render_stateful_widget(table, area, &mut state);
}
