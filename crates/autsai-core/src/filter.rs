//! Booking filters and aggregates. Everything here is pure: "now" is a
//! parameter so callers pass the wall clock and tests pin an instant.

use chrono::{Datelike, Days, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::view_models::BookingDetails;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewWindow {
    #[default]
    Upcoming,
    Past,
    All,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    #[default]
    All,
    Today,
    Week,
    Month,
}

/// Filter bar state. Empty strings place no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingFilters {
    pub view: ViewWindow,
    pub sport: String,
    /// Facility id.
    pub facility: String,
    /// Instructor id.
    pub instructor: String,
    pub status: String,
    pub date_range: DateRange,
    pub search: String,
}

impl BookingFilters {
    pub fn matches(&self, details: &BookingDetails, now: NaiveDateTime) -> bool {
        let booking = &details.booking;
        let start = booking.start_time;

        let in_window = match self.view {
            ViewWindow::Upcoming => start >= now,
            ViewWindow::Past => start < now,
            ViewWindow::All => true,
        };

        in_window
            && in_range(self.date_range, start, now)
            && field_matches(&self.sport, &booking.sport)
            && field_matches(&self.facility, &booking.facility_id)
            && field_matches(
                &self.instructor,
                booking.instructor_id.as_deref().unwrap_or_default(),
            )
            && field_matches(&self.status, booking.status.as_str())
            && (self.search.is_empty()
                || searchable_text(details).contains(&self.search.to_lowercase()))
    }
}

fn field_matches(wanted: &str, actual: &str) -> bool {
    wanted.is_empty() || wanted == actual
}

fn in_range(range: DateRange, start: NaiveDateTime, now: NaiveDateTime) -> bool {
    let day = start.date();
    let today = now.date();
    match range {
        DateRange::All => true,
        DateRange::Today => day == today,
        DateRange::Week => {
            let week_start = today - Days::new(u64::from(today.weekday().num_days_from_sunday()));
            day >= week_start && day < week_start + Days::new(7)
        }
        DateRange::Month => day.year() == today.year() && day.month() == today.month(),
    }
}

/// Lowercased facility name, sport, participant names and instructor name.
pub fn searchable_text(details: &BookingDetails) -> String {
    let participants = details
        .participant_list
        .iter()
        .map(|p| p.participant_name.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "{} {} {} {}",
        details.facility_name,
        details.booking.sport,
        participants,
        details.instructor_name.as_deref().unwrap_or_default()
    )
    .to_lowercase()
}

/// Bookings passing every predicate, in load order.
pub fn filter_bookings<'a>(
    bookings: &'a [BookingDetails],
    filters: &BookingFilters,
    now: NaiveDateTime,
) -> Vec<&'a BookingDetails> {
    bookings.iter().filter(|b| filters.matches(b, now)).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BookingStats {
    pub total: usize,
    pub pending: usize,
    pub confirmed: usize,
    /// Sum of `price`, never `total_amount`.
    pub revenue: f64,
}

impl BookingStats {
    pub fn of<'a, I>(bookings: I) -> Self
    where
        I: IntoIterator<Item = &'a BookingDetails>,
    {
        use autsai_types::models::BookingStatus;

        bookings.into_iter().fold(Self::default(), |mut stats, b| {
            stats.total += 1;
            match b.booking.status {
                BookingStatus::Pending => stats.pending += 1,
                BookingStatus::Confirmed => stats.confirmed += 1,
                _ => {}
            }
            stats.revenue += b.booking.price;
            stats
        })
    }
}
