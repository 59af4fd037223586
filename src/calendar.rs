use chrono::{Datelike, Duration, NaiveDate};

use crate::{
    constants::GRID,
    domain::{DayKey, MonthCursor},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub key: DayKey,
    pub is_outside_month: bool,
}

impl DayCell {
    fn new(date: NaiveDate, is_outside_month: bool) -> Self {
        Self {
            date,
            key: DayKey::new(date),
            is_outside_month,
        }
    }

    pub fn is_today(&self, today: NaiveDate) -> bool {
        self.date == today
    }
}

/// Six weeks starting on the Sunday on or before the 1st.
#[derive(Clone, Debug)]
pub struct MonthGrid {
    pub cells: Vec<DayCell>,
}

impl MonthGrid {
    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.cells.chunks(GRID.days_per_week)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum YearCell {
    Placeholder,
    Day(DayCell),
}

/// Year-view month: leading blank padding, then only the in-month days.
#[derive(Clone, Debug)]
pub struct MiniMonth {
    pub month0: u32,
    pub cells: Vec<YearCell>,
}

pub fn days_in_month(cursor: MonthCursor) -> u32 {
    let first = cursor.first_day();
    let next = cursor.shifted(1).first_day();
    if next > first {
        (next - first).num_days() as u32
    } else {
        // December of the last supported year
        31
    }
}

pub fn start_weekday(cursor: MonthCursor) -> usize {
    cursor.first_day().weekday().num_days_from_sunday() as usize
}

pub fn build_month_grid(cursor: MonthCursor) -> MonthGrid {
    let first = cursor.first_day();
    let start = first - Duration::days(start_weekday(cursor) as i64);

    let cells = start
        .iter_days()
        .take(GRID.cells())
        .map(|date| DayCell::new(date, !cursor.contains(date)))
        .collect();

    MonthGrid { cells }
}

/// Years outside the supported range are clamped once, so all twelve months
/// always belong to the same year.
pub fn build_year_grid(year: i32) -> Vec<MiniMonth> {
    let year = year.clamp(GRID.min_year, GRID.max_year);
    (0..12)
        .map(|month0| {
            let cursor = MonthCursor::new(year, month0);
            let start = start_weekday(cursor);
            let days = days_in_month(cursor) as usize;

            let mut cells = vec![YearCell::Placeholder; start];
            cells.extend(
                cursor
                    .first_day()
                    .iter_days()
                    .take(days)
                    .map(|date| YearCell::Day(DayCell::new(date, false))),
            );

            MiniMonth { month0, cells }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::*;

    fn days_of(mini: &MiniMonth) -> Vec<DayCell> {
        mini.cells
            .iter()
            .filter_map(|cell| match cell {
                YearCell::Day(day) => Some(*day),
                YearCell::Placeholder => None,
            })
            .collect()
    }

    #[test]
    fn test_month_grid_shape_for_many_months() {
        for year in [1900, 1999, 2000, 2023, 2024, 2025, 2100] {
            for month0 in 0..12 {
                let cursor = MonthCursor::new(year, month0);
                let grid = build_month_grid(cursor);

                assert_eq!(grid.cells.len(), 42);
                assert_eq!(grid.cells[0].date.weekday(), Weekday::Sun);
                assert_eq!(grid.weeks().count(), 6);

                let first = grid
                    .cells
                    .iter()
                    .find(|c| c.date == cursor.first_day())
                    .expect("first of month is in the grid");
                assert!(!first.is_outside_month);

                let in_month = grid.cells.iter().filter(|c| !c.is_outside_month).count();
                assert_eq!(in_month as u32, days_in_month(cursor));
            }
        }
    }

    #[test]
    fn test_february_day_counts() {
        assert_eq!(days_in_month(MonthCursor::new(2024, 1)), 29);
        assert_eq!(days_in_month(MonthCursor::new(2023, 1)), 28);
        assert_eq!(days_in_month(MonthCursor::new(1900, 1)), 28);
        assert_eq!(days_in_month(MonthCursor::new(2000, 1)), 29);

        let grid = build_month_grid(MonthCursor::new(2024, 1));
        assert_eq!(
            grid.cells.iter().filter(|c| !c.is_outside_month).count(),
            29
        );
    }

    #[test]
    fn test_outside_cells_carry_adjacent_keys() {
        // March 2025 starts on a Saturday.
        let grid = build_month_grid(MonthCursor::new(2025, 2));
        assert_eq!(grid.cells[0].key.to_string(), "2025-02-23");
        assert!(grid.cells[0].is_outside_month);
        assert_eq!(grid.cells[6].key.to_string(), "2025-03-01");
        assert!(!grid.cells[6].is_outside_month);
        assert_eq!(grid.cells[41].key.to_string(), "2025-04-05");
        assert!(grid.cells[41].is_outside_month);
    }

    #[test]
    fn test_month_starting_on_sunday_has_no_leading_days() {
        // June 2025 starts on a Sunday.
        let grid = build_month_grid(MonthCursor::new(2025, 5));
        assert_eq!(grid.cells[0].key.to_string(), "2025-06-01");
        assert!(!grid.cells[0].is_outside_month);
    }

    #[test]
    fn test_year_grid_pads_without_outside_days() {
        let months = build_year_grid(2025);
        assert_eq!(months.len(), 12);

        let march = &months[2];
        assert_eq!(start_weekday(MonthCursor::new(2025, 2)), 6);
        assert!(
            march.cells[..6]
                .iter()
                .all(|c| matches!(c, YearCell::Placeholder))
        );
        assert_eq!(days_of(march).len(), 31);
        assert!(days_of(march).iter().all(|d| !d.is_outside_month));
        assert_eq!(march.cells.len(), 6 + 31);

        let feb = &months[1];
        assert_eq!(days_of(feb).len(), 28);
        assert_eq!(days_of(feb)[0].key.to_string(), "2025-02-01");
    }

    #[test]
    fn test_year_grid_clamps_out_of_range_years() {
        for (input, expected) in [(10_000, GRID.max_year), (0, GRID.min_year), (-5, GRID.min_year)] {
            let months = build_year_grid(input);
            for (month0, mini) in months.iter().enumerate() {
                let first = days_of(mini)[0].date;
                assert_eq!(first.year(), expected);
                assert_eq!(first.month0(), month0 as u32);
            }
        }

        let december = days_of(&build_year_grid(10_000)[11]);
        assert_eq!(december.len(), 31);
    }

    #[test]
    fn test_position_of_and_today() {
        let grid = build_month_grid(MonthCursor::new(2026, 9));
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let idx = grid
            .cells
            .iter()
            .position(|c| c.key == DayKey::new(today))
            .unwrap();
        assert!(grid.cells[idx].is_today(today));
        assert!(!grid.cells[0].is_today(today));
    }
}
