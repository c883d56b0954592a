//! Terminal UI rendering using ratatui.
//!
//! ## Submodules
//!
//! - [`selector`]: catalog list with show/hide checkboxes
//! - [`chart`]: latest-value cards and the time-series chart
//! - [`common`]: shared components (header, status bar, loading panel, help overlay)
//! - [`theme`]: light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├────────────┬─────────────────────────┤
//! │ selector   │ chart::render           │
//! │            │  (cards + chart)        │
//! ├────────────┴─────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//! ```
//!
//! Until the catalog arrives, or if it fails, the body is replaced by
//! `common::render_phase_panel`. While history loads or after it fails, the
//! panel takes the chart's place next to the selector.

pub mod chart;
pub mod common;
pub mod selector;
pub mod theme;

use ratatui::{
    layout::{Constraint, Layout},
    Frame,
};

use crate::app::App;
use crate::data::Phase;

pub use theme::Theme;

/// Draw the whole screen.
pub fn draw(frame: &mut Frame, app: &App) {
    let [header, body, status] = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Min(8),    // Content
        Constraint::Length(1), // Status bar
    ])
    .areas(frame.area());

    common::render_header(frame, app, header);

    match app.dashboard.phase() {
        Phase::LoadingCatalog | Phase::CatalogUnavailable(_) => {
            common::render_phase_panel(frame, app, body);
        }
        // The catalog is known from here on, so the list stays visible and selectable.
        phase @ (Phase::Hydrating | Phase::Ready | Phase::HydrationFailed(_)) => {
            let [list, plot] =
                Layout::horizontal([Constraint::Percentage(30), Constraint::Percentage(70)])
                    .areas(body);
            selector::render(frame, app, list);
            if *phase == Phase::Ready {
                chart::render(frame, app, plot);
            } else {
                common::render_phase_panel(frame, app, plot);
            }
        }
    }

    common::render_status_bar(frame, app, status);

    if app.show_help {
        common::render_help(frame, app, frame.area());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Dashboard, Measurement, MetricHistory, SnapshotHydrator};
    use crate::source::ChannelSource;
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_draw_loading_then_live() {
        let (handle, source) = ChannelSource::create("test");
        let dashboard = Dashboard::with_hydrator(SnapshotHydrator::anchored_at(0));
        let mut app = App::new(Box::new(source), dashboard, Theme::dark());
        app.start();

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();
        assert!(buffer_text(&terminal).contains("Fetching metric catalog"));

        handle.respond_catalog(["cpu", "mem"]);
        handle.respond_history(vec![MetricHistory {
            metric: "cpu".into(),
            measurements: vec![Measurement::new("cpu", 1_000, 10.0, "%")],
        }]);
        app.reload_data().unwrap();
        app.toggle_at_cursor();

        terminal.draw(|f| draw(f, &app)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Metrics"));
        assert!(text.contains("10.00 %"));
    }

    #[test]
    fn test_draw_selector_while_history_loads() {
        let (handle, source) = ChannelSource::create("test");
        let dashboard = Dashboard::with_hydrator(SnapshotHydrator::anchored_at(0));
        let mut app = App::new(Box::new(source), dashboard, Theme::dark());
        app.start();
        handle.respond_catalog(["cpu", "mem"]);
        app.reload_data().unwrap();
        assert_eq!(app.dashboard.phase(), &Phase::Hydrating);

        app.toggle_at_cursor();

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Metrics"));
        assert!(text.contains("[x]"));
        assert!(text.contains("Fetching recent history"));
    }

    #[test]
    fn test_draw_catalog_failure() {
        let (handle, source) = ChannelSource::create("test");
        let mut app = App::new(Box::new(source), Dashboard::default(), Theme::light());
        app.start();
        handle.fail_catalog("service down");
        app.reload_data().unwrap();

        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();
        assert!(buffer_text(&terminal).contains("service down"));
    }
}
