use std::{fmt, str::FromStr};

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{constants::GRID, error::DayKeyError};

/// A local calendar day, the sole identity used for placements.
///
/// Renders as `YYYY-MM-DD` with a zero-padded year so that the year and
/// month segments can be matched by prefix.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        DayKey(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(DayKey)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Zero-based month, matching the cursor's month field.
    pub fn month0(&self) -> u32 {
        self.0.month0()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn year_prefix(year: i32) -> String {
        format!("{:04}-", year)
    }

    pub fn month_prefix(year: i32, month0: u32) -> String {
        format!("{:04}-{:02}-", year, month0 + 1)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day()
        )
    }
}

impl FromStr for DayKey {
    type Err = DayKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || DayKeyError {
            input: s.to_string(),
        };

        let mut parts = s.split('-');
        let (Some(y), Some(m), Some(d), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(err());
        };

        let fixed_width = y.len() == 4 && m.len() == 2 && d.len() == 2;
        let all_digits = [y, m, d]
            .iter()
            .all(|part| part.bytes().all(|b| b.is_ascii_digit()));
        if !fixed_width || !all_digits {
            return Err(err());
        }

        let year: i32 = y.parse().map_err(|_| err())?;
        let month: u32 = m.parse().map_err(|_| err())?;
        let day: u32 = d.parse().map_err(|_| err())?;
        DayKey::from_ymd(year, month, day).ok_or_else(err)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Month,
    Year,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Month => ViewMode::Year,
            ViewMode::Year => ViewMode::Month,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Month => "month",
            ViewMode::Year => "year",
        }
    }
}

/// A (year, zero-based month) pair, always normalized.
///
/// Month arithmetic carries into the year. Years saturate at the supported
/// range so every in-range month has a valid first day.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MonthCursor {
    year: i32,
    month: u32,
}

impl MonthCursor {
    pub fn new(year: i32, month0: u32) -> Self {
        Self::normalized(year as i64, month0 as i64)
    }

    pub fn normalized(year: i64, month0: i64) -> Self {
        let total = year.saturating_mul(12).saturating_add(month0);
        let year = total.div_euclid(12);
        let month = total.rem_euclid(12) as u32;

        if year < GRID.min_year as i64 {
            Self {
                year: GRID.min_year,
                month: 0,
            }
        } else if year > GRID.max_year as i64 {
            Self {
                year: GRID.max_year,
                month: 11,
            }
        } else {
            Self {
                year: year as i32,
                month,
            }
        }
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month0())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month0(&self) -> u32 {
        self.month
    }

    pub fn shifted(&self, delta: i32) -> Self {
        Self::normalized(self.year as i64, self.month as i64 + delta as i64)
    }

    pub fn with_month(&self, month0: u32) -> Self {
        Self::new(self.year, month0.min(11))
    }

    pub fn with_year(&self, year: i32) -> Self {
        Self::new(year, self.month)
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month + 1, 1).unwrap_or_default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month0() == self.month
    }
}

pub trait Clock {
    fn today(&self) -> NaiveDate;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_key_formats_fixed_width() {
        let key = DayKey::from_ymd(2025, 3, 7).unwrap();
        assert_eq!(key.to_string(), "2025-03-07");

        let early = DayKey::from_ymd(987, 1, 2).unwrap();
        assert_eq!(early.to_string(), "0987-01-02");
    }

    #[test]
    fn test_day_key_parse_round_trip() {
        let key: DayKey = "2024-02-29".parse().unwrap();
        assert_eq!(key.year(), 2024);
        assert_eq!(key.month0(), 1);
        assert_eq!(key.day(), 29);
        assert_eq!(key.to_string(), "2024-02-29");
    }

    #[test]
    fn test_day_key_rejects_loose_input() {
        for input in [
            "2023-02-29",
            "2024-2-01",
            "24-02-01",
            "2024-02-01-01",
            "2024/02/01",
            "+024-02-01",
            "",
        ] {
            assert!(input.parse::<DayKey>().is_err(), "accepted {input}");
        }
    }

    #[test]
    fn test_day_key_prefixes() {
        assert_eq!(DayKey::year_prefix(2025), "2025-");
        assert_eq!(DayKey::month_prefix(2025, 0), "2025-01-");
        assert_eq!(DayKey::month_prefix(2025, 11), "2025-12-");
    }

    #[test]
    fn test_cursor_carries_into_year() {
        let dec = MonthCursor::new(2025, 11);
        assert_eq!(dec.shifted(1), MonthCursor::new(2026, 0));

        let jan = MonthCursor::new(2025, 0);
        assert_eq!(jan.shifted(-1), MonthCursor::new(2024, 11));

        assert_eq!(MonthCursor::normalized(2025, 14), MonthCursor::new(2026, 2));
        assert_eq!(MonthCursor::normalized(2025, -13), MonthCursor::new(2023, 11));
    }

    #[test]
    fn test_shift_is_its_own_inverse() {
        for year in [1999, 2000, 2024, 2025] {
            for month in 0..12 {
                let cursor = MonthCursor::new(year, month);
                assert_eq!(cursor.shifted(1).shifted(-1), cursor);
                assert_eq!(cursor.shifted(-1).shifted(1), cursor);
            }
        }
    }

    #[test]
    fn test_cursor_saturates_at_supported_range() {
        assert_eq!(
            MonthCursor::normalized(0, 5),
            MonthCursor::new(GRID.min_year, 0)
        );
        assert_eq!(
            MonthCursor::normalized(i64::MAX, 0),
            MonthCursor::new(GRID.max_year, 11)
        );
    }

    #[test]
    fn test_view_mode_toggle_and_serde() {
        assert_eq!(ViewMode::Month.toggled(), ViewMode::Year);
        assert_eq!(ViewMode::Year.toggled(), ViewMode::Month);
        assert_eq!(
            serde_json::to_string(&ViewMode::Year).unwrap(),
            "\"year\""
        );
    }

    #[test]
    fn test_fixed_clock() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(FixedClock(day).today(), day);
    }
}
