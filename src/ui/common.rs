//! Common UI components shared across the screen.
//!
//! This module contains the header bar, status bar, the full-screen
//! loading/error panel and the help overlay.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::data::Phase;

/// Render the header bar with phase and feed counters.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let dashboard = &app.dashboard;
    let phase = dashboard.phase();
    let stats = dashboard.stats();

    let line = Line::from(vec![
        Span::styled(" ● ", app.theme.phase_style(phase)),
        Span::styled("METRICWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(phase.label(), app.theme.phase_style(phase)),
        Span::raw(" │ "),
        Span::styled(
            format!("{}", dashboard.selection().len()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("/{} shown │ ", dashboard.catalog().len())),
        Span::raw(format!(
            "{} pts │ +{} live",
            format_count(dashboard.store().total_measurements() as u64),
            format_count(stats.accepted),
        )),
        if stats.malformed > 0 {
            Span::styled(
                format!(" │ {} bad", format_count(stats.malformed)),
                Style::default().fg(app.theme.warning),
            )
        } else {
            Span::raw("")
        },
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Format a count for display (e.g., 1234 -> "1.2K", 1234567 -> "1.2M").
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Render the status bar at the bottom.
///
/// Shows: source, time since last event, available controls.
/// Also displays temporary status messages and errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(err) = app.source_error() {
        format!(" {} | Error: {} | q:quit", app.source_description(), err)
    } else {
        let updated = match app.last_event {
            Some(at) => format!("Updated {:.1}s ago", at.elapsed().as_secs_f64()),
            None => "Waiting for data".to_string(),
        };
        let controls = match app.dashboard.phase() {
            Phase::HydrationFailed(_) => "r:retry Space:show ?:help q:quit",
            Phase::CatalogUnavailable(_) => "q:quit",
            _ => "↑↓:move Space:show/hide e:export ?:help q:quit",
        };
        format!(" {} | {} | {}", app.source_description(), updated, controls)
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the full-area panel shown while loading or after a catalog failure.
pub fn render_phase_panel(frame: &mut Frame, app: &App, area: Rect) {
    let phase = app.dashboard.phase();
    let (title, body) = match phase {
        Phase::LoadingCatalog => (" Loading ", "Fetching metric catalog...".to_string()),
        Phase::Hydrating => (" Loading ", "Fetching recent history...".to_string()),
        Phase::CatalogUnavailable(err) => (
            " Catalog unavailable ",
            format!("{}\n\nThe dashboard cannot continue without a metric catalog.", err),
        ),
        Phase::HydrationFailed(err) => (" History unavailable ", format!("{}\n\nPress r to retry.", err)),
        Phase::Ready => return,
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(app.theme.phase_style(phase));

    let paragraph = Paragraph::new(body)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Metrics",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ↑/↓ j/k     Move cursor"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Space/Enter Show or hide metric"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  r         Retry history query"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 18u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
