//! Application state and navigation logic.

use std::time::{Duration, Instant};

use anyhow::Result;

use crate::data::{Dashboard, MetricId};
use crate::source::{ClientRequest, DataSource};
use crate::ui::Theme;

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,

    // Data source and the state it feeds
    source: Box<dyn DataSource>,
    pub dashboard: Dashboard,
    pub max_events_per_tick: usize,
    pub last_event: Option<Instant>,

    // Navigation state (index into the catalog)
    pub cursor: usize,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App reading from `source` into `dashboard`.
    pub fn new(source: Box<dyn DataSource>, dashboard: Dashboard, theme: Theme) -> Self {
        Self {
            running: true,
            show_help: false,
            source,
            dashboard,
            max_events_per_tick: 256,
            last_event: None,
            cursor: 0,
            theme,
            status_message: None,
        }
    }

    /// Issue the startup catalog query.
    pub fn start(&mut self) {
        if let Some(request) = self.dashboard.start() {
            self.send(request);
        }
    }

    fn send(&mut self, request: ClientRequest) {
        tracing::debug!(query = request.name(), source = self.source.description(), "sending query");
        self.source.request(request);
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Last transport-level error reported by the source.
    pub fn source_error(&self) -> Option<String> {
        self.source.error()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Drain delivered events into the dashboard, at most `max_events_per_tick`.
    ///
    /// Returns the number of events applied. Follow-up queries produced by
    /// the dashboard are sent immediately.
    pub fn reload_data(&mut self) -> Result<usize> {
        let mut applied = 0;
        while applied < self.max_events_per_tick {
            let Some(event) = self.source.poll() else {
                break;
            };
            applied += 1;
            if let Some(request) = self.dashboard.handle(event) {
                self.send(request);
            }
        }
        if applied > 0 {
            self.last_event = Some(Instant::now());
            self.clamp_cursor();
        }
        Ok(applied)
    }

    fn clamp_cursor(&mut self) {
        let len = self.dashboard.catalog().len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }

    /// The catalog metric under the cursor.
    pub fn metric_at_cursor(&self) -> Option<&MetricId> {
        self.dashboard.catalog().get(self.cursor)
    }

    /// Move the cursor down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move the cursor up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move the cursor down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.dashboard.catalog().len().saturating_sub(1);
        self.cursor = (self.cursor + n).min(max);
    }

    /// Move the cursor up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        self.cursor = self.cursor.saturating_sub(n);
    }

    /// Jump to the first metric.
    pub fn select_first(&mut self) {
        self.cursor = 0;
    }

    /// Jump to the last metric.
    pub fn select_last(&mut self) {
        self.cursor = self.dashboard.catalog().len().saturating_sub(1);
    }

    /// Toggle display of the metric under the cursor.
    pub fn toggle_at_cursor(&mut self) {
        let Some(metric) = self.metric_at_cursor().cloned() else {
            return;
        };
        if self.dashboard.toggle(&metric) {
            self.set_status_message(format!("Showing {}", metric));
        } else {
            self.set_status_message(format!("Hid {}", metric));
        }
    }

    /// Ask for the history snapshot again after a failure.
    pub fn retry_hydration(&mut self) {
        match self.dashboard.retry_hydration() {
            Some(request) => {
                self.send(request);
                self.set_status_message("Retrying history query".to_string());
            }
            None => self.set_status_message("Nothing to retry".to_string()),
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export current state to a file.
    pub fn export_state(&self, path: &std::path::Path) -> Result<()> {
        let json = self.dashboard.export_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
