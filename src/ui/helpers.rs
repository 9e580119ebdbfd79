use std::error::Error;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::Resource;

use super::screens::Route;

/// Build the text of one record card. The selected card gets a marker and a
/// bold title.
pub(crate) fn card_lines<R: Resource>(record: &R, selected: bool) -> Vec<Line<'static>> {
    let title = if selected {
        format!("▶ {}", record.display_name())
    } else {
        record.display_name().to_string()
    };

    let mut lines = vec![Line::from(Span::styled(
        title,
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    lines.extend(record.card_details().into_iter().map(|detail| {
        Line::from(Span::styled(detail, Style::default().fg(Color::Gray)))
    }));
    lines
}

/// Navigation header with the active view highlighted.
pub(crate) fn header_line(active: Route) -> Line<'static> {
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let tab = |route: Route, label: &'static str| {
        if route == active {
            Span::styled(
                label,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            )
        } else {
            Span::raw(label)
        }
    };

    Line::from(vec![
        Span::styled(
            "Athlete & Event Manager",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("    "),
        Span::styled("[1]", key_style),
        Span::raw(" "),
        tab(Route::Athletes, "Athletes"),
        Span::raw("   "),
        Span::styled("[2]", key_style),
        Span::raw(" "),
        tab(Route::Events, "Events"),
    ])
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

/// Extract the most relevant message from an error and its sources: the
/// innermost cause, which for transport failures is the OS-level reason.
pub(crate) fn surface_error(err: &(dyn Error + 'static)) -> String {
    let mut cause = err;
    while let Some(source) = cause.source() {
        cause = source;
    }
    cause.to_string()
}

pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
