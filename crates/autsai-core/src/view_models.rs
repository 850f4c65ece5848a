//! Per-screen data shaping: joins computed at load time and the derived
//! records the screens render.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use autsai_types::models::{Booking, BookingParticipant, Facility, Instructor, Notification};
use autsai_types::notification::{NotificationPayload, sport_icon};

pub const UNKNOWN_FACILITY: &str = "Unknown Facility";

// -- Bookings --

/// A booking joined with its facility, instructor and participant records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub facility_name: String,
    pub facility_address: String,
    pub facility_city: String,
    pub instructor_name: Option<String>,
    pub participant_list: Vec<BookingParticipant>,
}

impl BookingDetails {
    pub fn join(
        booking: Booking,
        participants: &[BookingParticipant],
        facilities: &HashMap<&str, &Facility>,
        instructors: &HashMap<&str, &Instructor>,
    ) -> Self {
        let facility = facilities.get(booking.facility_id.as_str());
        let instructor_name = booking
            .instructor_id
            .as_deref()
            .and_then(|id| instructors.get(id))
            .map(|i| i.name.clone());
        let participant_list = participants
            .iter()
            .filter(|p| p.booking_id == booking.id)
            .cloned()
            .collect();

        Self {
            facility_name: facility
                .map(|f| f.name.clone())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| UNKNOWN_FACILITY.to_string()),
            facility_address: facility.map(|f| f.address.clone()).unwrap_or_default(),
            facility_city: facility.map(|f| f.city.clone()).unwrap_or_default(),
            instructor_name,
            participant_list,
            booking,
        }
    }

    /// Participant names, from the participant records when there are any
    /// and from the booking's free-text field otherwise.
    pub fn participant_names(&self) -> Vec<String> {
        if self.participant_list.is_empty() {
            parse_participants(&self.booking.participants)
        } else {
            self.participant_list
                .iter()
                .map(|p| p.participant_name.clone())
                .collect()
        }
    }

    pub fn location(&self) -> String {
        [self.facility_address.as_str(), self.facility_city.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Join every booking with its cross-references, preserving load order.
pub fn join_bookings(
    bookings: Vec<Booking>,
    participants: &[BookingParticipant],
    facilities: &[Facility],
    instructors: &[Instructor],
) -> Vec<BookingDetails> {
    let facilities: HashMap<&str, &Facility> =
        facilities.iter().map(|f| (f.id.as_str(), f)).collect();
    let instructors: HashMap<&str, &Instructor> =
        instructors.iter().map(|i| (i.id.as_str(), i)).collect();

    bookings
        .into_iter()
        .map(|b| BookingDetails::join(b, participants, &facilities, &instructors))
        .collect()
}

/// Names in a booking's `participants` text: a JSON array of names, or a
/// comma separated list.
pub fn parse_participants(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }
    if let Ok(names) = serde_json::from_str::<Vec<String>>(raw) {
        return names;
    }
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

// -- Calendar --

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEntry {
    pub id: String,
    /// ISO `YYYY-MM-DD`; cells match on this string.
    pub date: String,
    /// `HH:MM`, 24h.
    pub time: String,
    pub participants: Vec<String>,
    pub facility: String,
    pub location: String,
    pub sport: String,
    pub sport_icon: &'static str,
    pub equipment_included: bool,
    pub instructor: Option<String>,
    /// Minutes.
    pub duration: i64,
}

impl CalendarEntry {
    pub fn from_details(details: &BookingDetails) -> Self {
        let booking = &details.booking;
        Self {
            id: booking.id.clone(),
            date: booking.start_time.format("%Y-%m-%d").to_string(),
            time: booking.start_time.format("%H:%M").to_string(),
            participants: details.participant_names(),
            facility: details.facility_name.clone(),
            location: details.location(),
            sport: booking.sport.clone(),
            sport_icon: sport_icon(&booking.sport),
            equipment_included: booking.equipment_included,
            instructor: details.instructor_name.clone(),
            duration: (booking.end_time - booking.start_time).num_minutes().max(0),
        }
    }
}

// -- Notifications --

/// A notification with its payload decoded. Payloads that fail to parse
/// leave `details` empty rather than hiding the notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: Notification,
    pub details: Option<NotificationPayload>,
    pub change: Option<String>,
    pub sport_icon: Option<&'static str>,
    /// Relative age label, only set for the bell.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
}

impl NotificationView {
    pub fn new(notification: &Notification) -> Self {
        let details = notification.payload();
        let change = details
            .as_ref()
            .and_then(|d| d.change_summary(notification.kind));
        let icon = details.as_ref().map(|d| sport_icon(&d.sport));

        Self {
            notification: notification.clone(),
            details,
            change,
            sport_icon: icon,
            received: None,
        }
    }

    pub fn with_age(mut self, now: NaiveDateTime) -> Self {
        self.received = Some(relative_time(self.notification.created_at, now));
        self
    }
}

/// `Just now`, `5m ago`, `2h ago`, `3d ago`.
pub fn relative_time(at: NaiveDateTime, now: NaiveDateTime) -> String {
    let minutes = (now - at).num_minutes();
    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        format!("{}h ago", minutes / 60)
    } else {
        format!("{}d ago", minutes / 1440)
    }
}

pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.is_read).count()
}
