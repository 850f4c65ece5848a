use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::codec::{embedded, flag, timestamp};

// -- Bookings --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Canceled,
    Rescheduled,
    Completed,
    NoShow,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::Canceled,
        Self::Rescheduled,
        Self::Completed,
        Self::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Canceled => "canceled",
            Self::Rescheduled => "rescheduled",
            Self::Completed => "completed",
            Self::NoShow => "no-show",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown booking status '{}'", s))
    }
}

/// A court/lesson booking as written by the consumer booking app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub facility_id: String,
    #[serde(default)]
    pub instructor_id: Option<String>,
    pub sport: String,
    /// Free text; either a JSON array of names or a comma separated list.
    #[serde(default)]
    pub participants: String,
    #[serde(with = "timestamp")]
    pub start_time: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub end_time: NaiveDateTime,
    pub status: BookingStatus,
    #[serde(with = "flag", default)]
    pub equipment_included: bool,
    #[serde(default)]
    pub payment_status: String,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub notes: Option<String>,
    /// Partner-only, never shown to the customer.
    #[serde(default)]
    pub internal_notes: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingParticipant {
    pub id: String,
    pub booking_id: String,
    pub participant_name: String,
    #[serde(default)]
    pub participant_email: Option<String>,
    #[serde(default)]
    pub participant_phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instructor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
}

// -- Facilities --

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub google_maps_link: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub website: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacilitySport {
    pub id: String,
    #[serde(default)]
    pub facility_id: String,
    pub sport_name: String,
    #[serde(default)]
    pub sport_icon: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price_with_equipment: f64,
    #[serde(default)]
    pub price_without_equipment: f64,
    #[serde(with = "flag", default)]
    pub equipment_included: bool,
    /// JSON array text, e.g. `["Padel rackets", "Balls"]`.
    #[serde(default)]
    pub equipment_list: String,
    #[serde(default)]
    pub surface_type: String,
    #[serde(default)]
    pub indoor_outdoor: String,
    #[serde(default)]
    pub lighting: String,
    #[serde(default)]
    pub court_count: u32,
    #[serde(default)]
    pub max_players: u32,
}

impl FacilitySport {
    /// Equipment names; text that isn't a JSON array is treated as a comma
    /// separated list.
    pub fn equipment_items(&self) -> Vec<String> {
        let text = self.equipment_list.trim();
        if text.is_empty() {
            return Vec::new();
        }
        serde_json::from_str::<Vec<String>>(text).unwrap_or_else(|_| {
            text.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacilityAmenity {
    pub id: String,
    #[serde(default)]
    pub facility_id: String,
    pub amenity_name: String,
    #[serde(default)]
    pub amenity_icon: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "flag", default)]
    pub is_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityPhoto {
    pub id: String,
    pub facility_id: String,
    pub photo_url: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub sport_type: String,
    #[serde(with = "flag", default)]
    pub is_primary: bool,
}

// -- Notifications --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewBooking,
    Rescheduled,
    Canceled,
    InstructorAssigned,
    EquipmentChanged,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub booking_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    #[serde(default)]
    pub message: String,
    /// Serialized [`crate::notification::NotificationPayload`].
    #[serde(default)]
    pub data: String,
    #[serde(with = "flag", default)]
    pub is_read: bool,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub id: String,
    pub user_id: String,
    #[serde(with = "flag", default)]
    pub email_enabled: bool,
    #[serde(with = "flag", default)]
    pub sms_enabled: bool,
    #[serde(with = "flag", default)]
    pub push_enabled: bool,
    #[serde(with = "flag", default)]
    pub new_booking_enabled: bool,
    #[serde(with = "flag", default)]
    pub rescheduled_enabled: bool,
    #[serde(with = "flag", default)]
    pub canceled_enabled: bool,
    #[serde(with = "flag", default)]
    pub instructor_assigned_enabled: bool,
    #[serde(with = "flag", default)]
    pub equipment_changed_enabled: bool,
}

impl NotificationSettings {
    pub const KEYS: [&'static str; 8] = [
        "email_enabled",
        "sms_enabled",
        "push_enabled",
        "new_booking_enabled",
        "rescheduled_enabled",
        "canceled_enabled",
        "instructor_assigned_enabled",
        "equipment_changed_enabled",
    ];

    /// Mutable handle on a toggle by its stored key.
    pub fn toggle_mut(&mut self, key: &str) -> Option<&mut bool> {
        match key {
            "email_enabled" => Some(&mut self.email_enabled),
            "sms_enabled" => Some(&mut self.sms_enabled),
            "push_enabled" => Some(&mut self.push_enabled),
            "new_booking_enabled" => Some(&mut self.new_booking_enabled),
            "rescheduled_enabled" => Some(&mut self.rescheduled_enabled),
            "canceled_enabled" => Some(&mut self.canceled_enabled),
            "instructor_assigned_enabled" => Some(&mut self.instructor_assigned_enabled),
            "equipment_changed_enabled" => Some(&mut self.equipment_changed_enabled),
            _ => None,
        }
    }
}

// -- Profile --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerProfile {
    pub id: String,
    pub user_id: String,
    pub full_name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub profile_photo_url: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub preferred_language: Option<String>,
    #[serde(default)]
    pub notification_preferences: Option<String>,
    #[serde(with = "flag", default)]
    pub booking_auto_accept: bool,
    #[serde(default)]
    pub cancellation_policy: Option<String>,
    #[serde(default)]
    pub cancellation_penalty: Option<f64>,
    #[serde(with = "flag", default)]
    pub terms_accepted: bool,
    #[serde(default)]
    pub terms_accepted_at: Option<String>,
    #[serde(with = "flag", default)]
    pub account_deletion_requested: bool,
    #[serde(default)]
    pub account_deletion_requested_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHours {
    pub open: String,
    pub close: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityProfile {
    pub id: String,
    pub user_id: String,
    pub facility_name: String,
    #[serde(default)]
    pub legal_business_name: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub google_maps_link: Option<String>,
    /// Stored as JSON text.
    #[serde(deserialize_with = "embedded::deserialize", default)]
    pub sports_offered: Vec<String>,
    /// Weekday name to opening hours; stored as JSON text.
    #[serde(deserialize_with = "embedded::deserialize", default)]
    pub operating_hours: BTreeMap<String, OpeningHours>,
    #[serde(default)]
    pub club_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutInfo {
    pub id: String,
    pub user_id: String,
    pub account_holder_name: String,
    pub bank_account_number: String,
    #[serde(default)]
    pub swift_bic_code: String,
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub billing_email: String,
    #[serde(default)]
    pub vat_tax_id: Option<String>,
    #[serde(default)]
    pub payout_frequency: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_from_stored_document() {
        let raw = serde_json::json!({
            "id": "booking_1",
            "user_id": "user_1",
            "facility_id": "facility_1",
            "instructor_id": null,
            "sport": "padel",
            "participants": "Maria Rodriguez, Carlos Silva",
            "start_time": "2025-01-25T10:00:00",
            "end_time": "2025-01-25T11:30:00",
            "status": "no-show",
            "equipment_included": "1",
            "payment_status": "paid",
            "total_amount": 45,
            "price": 45,
            "created_at": "2025-01-20T09:00:00Z",
            "updated_at": "2025-01-20T09:00:00Z"
        });

        let booking: Booking = serde_json::from_value(raw).unwrap();
        assert_eq!(booking.status, BookingStatus::NoShow);
        assert!(booking.equipment_included);
        assert!(booking.instructor_id.is_none());
        assert!(booking.internal_notes.is_none());

        let written = serde_json::to_value(&booking).unwrap();
        assert_eq!(written["equipment_included"], 1);
        assert_eq!(written["status"], "no-show");
        assert_eq!(written["start_time"], "2025-01-25T10:00:00");
    }

    #[test]
    fn unknown_notification_type_is_kept() {
        let kind: NotificationKind = serde_json::from_str("\"payment_received\"").unwrap();
        assert_eq!(kind, NotificationKind::Other);
    }

    #[test]
    fn equipment_list_parsing() {
        let mut sport = FacilitySport {
            equipment_list: r#"["Padel rackets", "Balls"]"#.into(),
            ..Default::default()
        };
        assert_eq!(sport.equipment_items(), vec!["Padel rackets", "Balls"]);

        sport.equipment_list = "Rackets, Balls,".into();
        assert_eq!(sport.equipment_items(), vec!["Rackets", "Balls"]);
    }

    #[test]
    fn status_from_str() {
        assert_eq!("no-show".parse::<BookingStatus>(), Ok(BookingStatus::NoShow));
        assert!("cancelled".parse::<BookingStatus>().is_err());
    }
}
