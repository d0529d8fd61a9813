//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::Status;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for an UP connection.
    pub up: Color,
    /// Color for a DOWN connection and outage markers.
    pub down: Color,
    /// Color for UNKNOWN and unrecognised statuses.
    pub unknown: Color,
    /// Color of the latency line.
    pub latency: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            up: Color::Green,
            down: Color::Red,
            unknown: Color::Yellow,
            latency: Color::LightBlue,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            up: Color::Green,
            down: Color::Red,
            unknown: Color::Yellow,
            latency: Color::Blue,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
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

    /// Get style for a connection status
    pub fn status_style(&self, status: &Status) -> Style {
        match status {
            Status::Up => Style::default().fg(self.up),
            Status::Down => Style::default().fg(self.down).add_modifier(Modifier::BOLD),
            Status::Unknown | Status::Other(_) => Style::default().fg(self.unknown),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_style() {
        let theme = Theme::dark();
        assert_eq!(theme.status_style(&Status::Up).fg, Some(Color::Green));
        assert_eq!(theme.status_style(&Status::Down).fg, Some(Color::Red));
        assert_eq!(
            theme.status_style(&Status::Other("DEGRADED".to_string())).fg,
            Some(Color::Yellow)
        );
    }
}
