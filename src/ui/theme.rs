//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::config::ThemeChoice;
use crate::data::{Phase, Rgb};

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for loading states.
    pub warning: Color,
    /// Color for failures.
    pub critical: Color,
    /// Color for the live state.
    pub healthy: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Fallback for metrics without an assigned color.
    pub series_fallback: Color,
    /// Style for header rows and titles.
    pub header: Style,
    /// Style for the row under the cursor.
    pub selected: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::Gray,
            series_fallback: Color::White,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::DarkGray,
            series_fallback: Color::Black,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Resolve a configured choice.
    pub fn from_choice(choice: ThemeChoice) -> Self {
        match choice {
            ThemeChoice::Auto => Self::auto_detect(),
            ThemeChoice::Dark => Self::dark(),
            ThemeChoice::Light => Self::light(),
        }
    }

    /// Get style for a dashboard phase
    pub fn phase_style(&self, phase: &Phase) -> Style {
        match phase {
            Phase::Ready => Style::default().fg(self.healthy),
            Phase::LoadingCatalog | Phase::Hydrating => Style::default().fg(self.warning),
            Phase::HydrationFailed(_) => Style::default().fg(self.critical),
            Phase::CatalogUnavailable(_) => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
        }
    }

    /// Terminal color for a metric's assigned color.
    pub fn series_color(&self, color: Option<Rgb>) -> Color {
        match color {
            Some(Rgb(r, g, b)) => Color::Rgb(r, g, b),
            None => self.series_fallback,
        }
    }
}
