use chrono::{Datelike, Duration, NaiveDate};

use crate::{calendar, constants::GRID, domain::MonthCursor};

pub fn wrap_prev_index(current: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else if current == 0 {
        len - 1
    } else {
        current - 1
    }
}

pub fn wrap_next_index(current: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else if current + 1 >= len {
        0
    } else {
        current + 1
    }
}

/// Steps through `None` (all categories) and then each index in turn.
pub fn cycle_optional_index(current: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match (current, forward) {
        (None, true) => Some(0),
        (None, false) => Some(len - 1),
        (Some(i), true) if i + 1 >= len => None,
        (Some(i), true) => Some(i + 1),
        (Some(0), false) => None,
        (Some(i), false) => Some(i - 1),
    }
}

/// Moves `focus` by `days`, refusing to leave the visible six-week grid.
pub fn step_in_month_grid(focus: NaiveDate, days: i64, cursor: MonthCursor) -> NaiveDate {
    let grid_start =
        cursor.first_day() - Duration::days(calendar::start_weekday(cursor) as i64);
    let grid_end = grid_start + Duration::days(GRID.cells() as i64 - 1);

    match focus.checked_add_signed(Duration::days(days)) {
        Some(next) if next >= grid_start && next <= grid_end => next,
        _ => focus,
    }
}

/// Moves `focus` by `days`, refusing to leave `year`.
pub fn step_in_year(focus: NaiveDate, days: i64, year: i32) -> NaiveDate {
    match focus.checked_add_signed(Duration::days(days)) {
        Some(next) if next.year() == year => next,
        _ => focus,
    }
}

pub fn truncate_label(label: &str, width: usize) -> String {
    if label.chars().count() <= width {
        return label.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = label.chars().take(width - 1).collect();
    out.push('…');
    out
}
