//! Calendar windowing: which dates a day/week/month view shows, how entries
//! land in cells, and how previous/next moves the reference date.

use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::view_models::CalendarEntry;

/// Sentinel for "no constraint" in the calendar's filter selectors.
pub const ALL: &str = "all";

const MONTH_CELLS: u64 = 42;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(format!("unknown view mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    fn sign(self) -> i32 {
        match self {
            Self::Prev => -1,
            Self::Next => 1,
        }
    }
}

/// Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_sunday()))
}

/// Seven consecutive days, Sunday first.
pub fn week_days(date: NaiveDate) -> Vec<NaiveDate> {
    week_start(date).iter_days().take(7).collect()
}

/// 42 consecutive days starting on the Sunday on or before the first of
/// `date`'s month.
pub fn month_grid(date: NaiveDate) -> Vec<NaiveDate> {
    let first = date.with_day(1).unwrap_or(date);
    week_start(first).iter_days().take(MONTH_CELLS as usize).collect()
}

pub fn cell_dates(date: NaiveDate, mode: ViewMode) -> Vec<NaiveDate> {
    match mode {
        ViewMode::Daily => vec![date],
        ViewMode::Weekly => week_days(date),
        ViewMode::Monthly => month_grid(date),
    }
}

/// Shift `date` by `months` calendar months, letting a day past the end of
/// the target month roll over into the next one (Jan 31 + 1 month is
/// Mar 3 in a common year).
pub fn add_months_overflowing(date: NaiveDate, months: i32) -> NaiveDate {
    let index = date.year() * 12 + date.month0() as i32 + months;
    let (year, month0) = (index.div_euclid(12), index.rem_euclid(12) as u32);

    NaiveDate::from_ymd_opt(year, month0 + 1, 1)
        .and_then(|first| first.checked_add_days(Days::new(u64::from(date.day0()))))
        .unwrap_or(date)
}

pub fn navigate(date: NaiveDate, mode: ViewMode, direction: Direction) -> NaiveDate {
    let step = |days: u64| match direction {
        Direction::Next => date.checked_add_days(Days::new(days)),
        Direction::Prev => date.checked_sub_days(Days::new(days)),
    };

    match mode {
        ViewMode::Daily => step(1).unwrap_or(date),
        ViewMode::Weekly => step(7).unwrap_or(date),
        ViewMode::Monthly => add_months_overflowing(date, direction.sign()),
    }
}

pub fn title(date: NaiveDate, mode: ViewMode) -> String {
    match mode {
        ViewMode::Daily => date.format("%A, %B %-d, %Y").to_string(),
        ViewMode::Weekly => {
            let days = week_days(date);
            let (first, last) = (days[0], days[6]);
            format!("{} - {}", first.format("%b %-d"), last.format("%b %-d, %Y"))
        }
        ViewMode::Monthly => date.format("%B %Y").to_string(),
    }
}

// -- Grid --

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub in_current_month: bool,
    pub is_today: bool,
    pub entries: Vec<CalendarEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarGrid {
    pub mode: ViewMode,
    pub reference: NaiveDate,
    pub title: String,
    pub cells: Vec<CalendarCell>,
}

/// Bucket `entries` into the cells of `mode`'s window around `reference`.
/// An entry lands in a cell when its ISO date string equals the cell's.
pub fn build_grid<'a, I>(reference: NaiveDate, mode: ViewMode, entries: I, today: NaiveDate) -> CalendarGrid
where
    I: IntoIterator<Item = &'a CalendarEntry>,
{
    let entries: Vec<&CalendarEntry> = entries.into_iter().collect();

    let cells = cell_dates(reference, mode)
        .into_iter()
        .map(|date| {
            let iso = date.format("%Y-%m-%d").to_string();
            CalendarCell {
                date,
                in_current_month: mode != ViewMode::Monthly
                    || (date.year() == reference.year() && date.month() == reference.month()),
                is_today: date == today,
                entries: entries
                    .iter()
                    .filter(|e| e.date == iso)
                    .map(|e| (*e).clone())
                    .collect(),
            }
        })
        .collect();

    CalendarGrid {
        mode,
        reference,
        title: title(reference, mode),
        cells,
    }
}

// -- Filters --

/// Sport and instructor-name selectors; [`ALL`] disables either one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarFilter {
    pub sport: String,
    pub instructor: String,
}

impl Default for CalendarFilter {
    fn default() -> Self {
        Self {
            sport: ALL.to_string(),
            instructor: ALL.to_string(),
        }
    }
}

impl CalendarFilter {
    pub fn matches(&self, entry: &CalendarEntry) -> bool {
        let sport = self.sport == ALL || entry.sport == self.sport;
        let instructor =
            self.instructor == ALL || entry.instructor.as_deref() == Some(self.instructor.as_str());
        sport && instructor
    }

    pub fn apply<'a>(&self, entries: &'a [CalendarEntry]) -> Vec<&'a CalendarEntry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }
}

/// Distinct sports in first-seen order.
pub fn unique_sports(entries: &[CalendarEntry]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for entry in entries {
        if !seen.contains(&entry.sport) {
            seen.push(entry.sport.clone());
        }
    }
    seen
}

/// Distinct instructor names in first-seen order; entries without one are
/// skipped.
pub fn unique_instructors(entries: &[CalendarEntry]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for name in entries.iter().filter_map(|e| e.instructor.as_ref()) {
        if !name.is_empty() && !seen.contains(name) {
            seen.push(name.clone());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn week_starts_on_sunday() {
        // 2025-01-22 is a Wednesday
        let days = week_days(d(2025, 1, 22));
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], d(2025, 1, 19));
        assert_eq!(days[6], d(2025, 1, 25));
        assert!(days.windows(2).all(|w| w[1] - w[0] == chrono::Duration::days(1)));

        // a Sunday is its own week start
        assert_eq!(week_days(d(2025, 1, 26))[0], d(2025, 1, 26));
    }

    #[test]
    fn month_grid_is_always_42_days() {
        let grid = month_grid(d(2026, 2, 10));
        assert_eq!(grid.len(), 42);
        assert_eq!(grid[0], d(2026, 2, 1));
        assert_eq!(grid[41], d(2026, 3, 14));

        let grid = month_grid(d(2025, 1, 31));
        assert_eq!(grid[0], d(2024, 12, 29));
        assert!(grid.contains(&d(2025, 1, 1)) && grid.contains(&d(2025, 1, 31)));
    }

    #[test]
    fn navigation_steps() {
        let start = d(2025, 1, 25);
        assert_eq!(navigate(start, ViewMode::Daily, Direction::Next), d(2025, 1, 26));
        assert_eq!(navigate(start, ViewMode::Weekly, Direction::Prev), d(2025, 1, 18));
        assert_eq!(navigate(start, ViewMode::Monthly, Direction::Next), d(2025, 2, 25));
        assert_eq!(navigate(d(2025, 1, 10), ViewMode::Monthly, Direction::Prev), d(2024, 12, 10));
    }

    #[test]
    fn month_navigation_overflows() {
        assert_eq!(navigate(d(2025, 1, 31), ViewMode::Monthly, Direction::Next), d(2025, 3, 3));
        assert_eq!(navigate(d(2024, 1, 31), ViewMode::Monthly, Direction::Next), d(2024, 3, 2));
        assert_eq!(navigate(d(2025, 3, 31), ViewMode::Monthly, Direction::Prev), d(2025, 3, 3));
    }

    #[test]
    fn next_then_prev_returns_for_day_and_week() {
        let start = d(2025, 12, 31);
        for mode in [ViewMode::Daily, ViewMode::Weekly] {
            let there = navigate(start, mode, Direction::Next);
            assert_eq!(navigate(there, mode, Direction::Prev), start);
        }
    }

    #[test]
    fn titles() {
        let date = d(2025, 1, 25);
        assert_eq!(title(date, ViewMode::Daily), "Saturday, January 25, 2025");
        assert_eq!(title(date, ViewMode::Weekly), "Jan 19 - Jan 25, 2025");
        assert_eq!(title(date, ViewMode::Monthly), "January 2025");
    }

    #[test]
    fn entries_land_in_matching_cells() {
        let entries = sample::calendar_entries();
        let grid = build_grid(d(2025, 1, 22), ViewMode::Weekly, &entries, d(2025, 1, 23));

        let count = |date: NaiveDate| {
            grid.cells.iter().find(|c| c.date == date).unwrap().entries.len()
        };
        assert_eq!(count(d(2025, 1, 22)), 2);
        assert_eq!(count(d(2025, 1, 23)), 2);
        assert_eq!(count(d(2025, 1, 24)), 1);
        assert_eq!(count(d(2025, 1, 19)), 0);
        assert!(grid.cells.iter().all(|c| c.in_current_month));
        assert_eq!(grid.cells.iter().filter(|c| c.is_today).count(), 1);
        assert_eq!(grid.title, "Jan 19 - Jan 25, 2025");
    }

    #[test]
    fn monthly_cells_flag_other_months() {
        let entries = sample::calendar_entries();
        let grid = build_grid(d(2026, 2, 1), ViewMode::Monthly, &entries, d(2026, 2, 1));
        assert_eq!(grid.cells.len(), 42);
        assert_eq!(grid.cells.iter().filter(|c| c.in_current_month).count(), 28);
        assert!(!grid.cells[41].in_current_month);
        assert!(grid.cells.iter().all(|c| c.entries.is_empty()));
    }

    #[test]
    fn filters_use_all_sentinel() {
        let entries = sample::calendar_entries();
        assert_eq!(CalendarFilter::default().apply(&entries).len(), 5);

        let padel = CalendarFilter {
            sport: "padel".into(),
            ..Default::default()
        };
        assert_eq!(padel.apply(&entries).len(), 1);

        let maria = CalendarFilter {
            instructor: "Maria Santos".into(),
            ..Default::default()
        };
        let hits = maria.apply(&entries);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].sport, "golf");
    }

    #[test]
    fn unique_lists_keep_first_seen_order() {
        let mut entries = sample::calendar_entries();
        entries.push(entries[0].clone());

        assert_eq!(
            unique_sports(&entries),
            vec!["tennis", "padel", "golf", "squash", "basketball"]
        );
        assert_eq!(
            unique_instructors(&entries),
            vec!["Carlos Rodriguez", "Maria Santos", "James Miller"]
        );
    }
}
