use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Horizontal bar scaled against the longest event on screen.
pub(crate) fn duration_bar(seconds: i64, longest: i64, width: usize) -> String {
    if width == 0 || longest <= 0 || seconds <= 0 {
        return String::new();
    }
    let filled = ((seconds as f64 / longest as f64) * width as f64).round() as usize;
    "█".repeat(filled.clamp(1, width))
}

/// `mm:ss` for a second count, keeping the sign of negative spans.
pub(crate) fn clock_span(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let abs = seconds.unsigned_abs();
    format!("{sign}{}:{:02}", abs / 60, abs % 60)
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}
