use ratatui::{
    prelude::Span,
    style::{Color, Modifier, Style},
};

use crate::constants::COLORS;

pub(super) fn category_tab_span(label: &str, active: bool) -> Span<'static> {
    let style = if active {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    Span::styled(label.to_string(), style)
}

pub(super) fn text_color_for_bg(bg_color: Color) -> Color {
    if let Color::Rgb(r, g, b) = bg_color {
        let brightness = (299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000;
        if brightness > 128 {
            Color::Black
        } else {
            Color::White
        }
    } else {
        Color::White
    }
}

/// Stable palette slot for a category, by its position in the sorted list.
pub(super) fn category_color(category: &str, categories: &[String]) -> Color {
    let index = categories
        .iter()
        .position(|c| c == category)
        .unwrap_or(0);
    COLORS[index % COLORS.len()]
}

pub(super) fn day_style(
    sticker_color: Option<Color>,
    is_outside_month: bool,
    is_today: bool,
    is_focused: bool,
) -> Style {
    let mut style = match sticker_color {
        Some(bg) => Style::default().bg(bg).fg(text_color_for_bg(bg)),
        None if is_outside_month => Style::default().fg(Color::DarkGray),
        None => Style::default().fg(Color::White),
    };
    if is_today {
        style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    }
    if is_focused {
        style = style.add_modifier(Modifier::REVERSED);
    }
    style
}
