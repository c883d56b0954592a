//! Time-series chart and latest-value cards for the selected metrics.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_clock;
use crate::data::SeriesView;

/// Render value cards above the chart.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let views = app.dashboard.visible_series();

    let [cards_area, chart_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(5)]).areas(area);

    render_cards(frame, app, &views, cards_area);
    render_chart(frame, app, &views, chart_area);
}

fn render_cards(frame: &mut Frame, app: &App, views: &[SeriesView<'_>], area: Rect) {
    if views.is_empty() {
        return;
    }
    let constraints = vec![Constraint::Ratio(1, views.len() as u32); views.len()];
    let areas = Layout::horizontal(constraints).split(area);

    for (view, card_area) in views.iter().zip(areas.iter()) {
        let value = match view.latest() {
            Some(m) => format!("{:.2} {}", m.value, m.unit),
            None => "waiting…".to_string(),
        };
        let color = app.theme.series_color(view.color);
        let card = Paragraph::new(Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )))
        .block(
            Block::default()
                .title(format!(" {} ", view.metric))
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(color)),
        );
        frame.render_widget(card, *card_area);
    }
}

/// Bounds covering every point, padded so flat lines stay visible.
fn bounds(series: &[Vec<(f64, f64)>]) -> Option<([f64; 2], [f64; 2])> {
    let mut points = series.iter().flatten();
    let &(x0, y0) = points.next()?;
    let (mut x, mut y) = ([x0, x0], [y0, y0]);
    for &(px, py) in points {
        x = [x[0].min(px), x[1].max(px)];
        y = [y[0].min(py), y[1].max(py)];
    }
    if x[0] == x[1] {
        x = [x[0] - 1_000.0, x[1] + 1_000.0];
    }
    if y[0] == y[1] {
        y = [y[0] - 1.0, y[1] + 1.0];
    }
    Some((x, y))
}

fn render_chart(frame: &mut Frame, app: &App, views: &[SeriesView<'_>], area: Rect) {
    let block = Block::default()
        .title(" Measurements ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let series: Vec<Vec<(f64, f64)>> = views.iter().map(SeriesView::points).collect();
    let Some((x, y)) = bounds(&series) else {
        let hint = if views.is_empty() {
            "Select a metric to plot it"
        } else {
            "Waiting for live data"
        };
        frame.render_widget(
            Paragraph::new(hint).style(Style::default().add_modifier(Modifier::DIM)).block(block),
            area,
        );
        return;
    };

    let datasets: Vec<Dataset> = views
        .iter()
        .zip(series.iter())
        .map(|(view, points)| {
            let name = match view.unit {
                Some(unit) if !unit.is_empty() => format!("{} ({})", view.metric, unit),
                _ => view.metric.to_string(),
            };
            Dataset::default()
                .name(name)
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(app.theme.series_color(view.color)))
                .data(points)
        })
        .collect();

    let x_labels = vec![
        Span::raw(format_clock(x[0] as i64)),
        Span::raw(format_clock(((x[0] + x[1]) / 2.0) as i64)),
        Span::raw(format_clock(x[1] as i64)),
    ];
    let y_labels = vec![
        Span::raw(format!("{:.1}", y[0])),
        Span::raw(format!("{:.1}", (y[0] + y[1]) / 2.0)),
        Span::raw(format!("{:.1}", y[1])),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds(x)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds(y)
                .labels(y_labels),
        );

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_empty() {
        assert!(bounds(&[]).is_none());
        assert!(bounds(&[vec![]]).is_none());
    }

    #[test]
    fn test_bounds_cover_all_series() {
        let (x, y) = bounds(&[vec![(1000.0, 5.0)], vec![(3000.0, -1.0), (2000.0, 9.0)]]).unwrap();
        assert_eq!(x, [1000.0, 3000.0]);
        assert_eq!(y, [-1.0, 9.0]);
    }

    #[test]
    fn test_bounds_pad_single_point() {
        let (x, y) = bounds(&[vec![(1000.0, 5.0)]]).unwrap();
        assert_eq!(x, [0.0, 2000.0]);
        assert_eq!(y, [4.0, 6.0]);
    }
}
