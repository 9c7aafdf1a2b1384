//! Color constants and auto-scaling helpers for the TUI.

use ratatui::style::Color;

use crate::panel::alert::Severity;
use crate::panel::status::PowerStatus;

/// Power history line color.
pub const POWER_COLOR: Color = Color::Cyan;
/// Threshold line color.
pub const THRESHOLD_COLOR: Color = Color::DarkGray;
/// Header bar foreground.
pub const HEADER_FG: Color = Color::White;
/// Header bar background.
pub const HEADER_BG: Color = Color::DarkGray;
/// Footer help text color.
pub const FOOTER_FG: Color = Color::DarkGray;
/// On-load marker color.
pub const LOAD_ON: Color = Color::Green;
/// Off-load marker color.
pub const LOAD_OFF: Color = Color::DarkGray;

/// Returns the display color for a power status.
pub fn status_color(status: PowerStatus) -> Color {
    match status {
        PowerStatus::Normal => Color::Green,
        PowerStatus::Warning => Color::Yellow,
        PowerStatus::Critical => Color::Red,
    }
}

/// Returns the display color for an alert severity.
pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::DarkGray,
        Severity::Warning => Color::Yellow,
        Severity::Alert => Color::LightYellow,
        Severity::Critical => Color::LightRed,
        Severity::Emergency => Color::Red,
    }
}

/// Computes Y-axis bounds from chart points and the threshold, with 10%
/// padding.
pub fn auto_bounds_y(points: &[(f64, f64)], threshold_w: u32) -> [f64; 2] {
    let threshold = f64::from(threshold_w);
    let mut min = threshold;
    let mut max = threshold;
    for &(_, y) in points {
        min = min.min(y);
        max = max.max(y);
    }
    if !min.is_finite() || !max.is_finite() {
        return [-1.0, 1.0];
    }
    let range = (max - min).max(0.1);
    let pad = range * 0.1;
    [(min - pad).max(0.0), max + pad]
}
