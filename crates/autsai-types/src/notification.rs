use serde::{Deserialize, Serialize};

use crate::models::{Notification, NotificationKind};

/// Booking snapshot embedded in a notification's `data` field.
///
/// Change notifications also carry the value that was replaced
/// (`old_date`/`old_time` for reschedules, `old_instructor`, `old_equipment`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    #[serde(default)]
    pub sport: String,
    #[serde(default)]
    pub facility: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub equipment: String,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_instructor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_equipment: Option<String>,
}

impl NotificationPayload {
    /// `"None"` is what the booking app writes when no instructor is set.
    pub fn instructor(&self) -> Option<&str> {
        match self.instructor.as_str() {
            "" | "None" => None,
            name => Some(name),
        }
    }

    /// Human readable description of what changed, for change notifications.
    pub fn change_summary(&self, kind: NotificationKind) -> Option<String> {
        match kind {
            NotificationKind::Rescheduled => self.old_date.as_ref().map(|date| {
                format!(
                    "Changed from: {} at {}",
                    date,
                    self.old_time.as_deref().unwrap_or_default()
                )
            }),
            NotificationKind::InstructorAssigned => self
                .old_instructor
                .as_ref()
                .map(|name| format!("Previous instructor: {}", name)),
            NotificationKind::EquipmentChanged => self
                .old_equipment
                .as_ref()
                .map(|equipment| format!("Changed from: {}", equipment)),
            _ => None,
        }
    }
}

impl Notification {
    /// Decode the embedded payload; `None` when the text isn't valid JSON.
    pub fn payload(&self) -> Option<NotificationPayload> {
        serde_json::from_str(&self.data).ok()
    }
}

/// Emoji shown next to a sport name. Notification payloads capitalise sport
/// names while bookings use lowercase tags, so matching is case-insensitive.
pub fn sport_icon(sport: &str) -> &'static str {
    match sport.to_ascii_lowercase().as_str() {
        "padel" => "🏓",
        "tennis" => "🎾",
        "squash" => "🏸",
        "golf" => "⛳",
        "basketball" => "🏀",
        "football" => "⚽",
        "volleyball" => "🏐",
        "badminton" => "🏸",
        "swimming" => "🏊",
        "fitness" => "💪",
        "yoga" => "🧘",
        _ => "🏃",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reschedule_summary() {
        let payload: NotificationPayload = serde_json::from_str(
            r#"{"sport": "Tennis", "facility": "Tennis Court B", "location": "456 Tennis Club Rd",
                "participants": ["Mike Johnson", "Sarah Wilson"], "equipment": "Not Included",
                "instructor": "Maria Garcia", "date": "2024-01-26", "time": "16:00",
                "old_date": "2024-01-25", "old_time": "15:00"}"#,
        )
        .unwrap();

        assert_eq!(
            payload.change_summary(NotificationKind::Rescheduled).as_deref(),
            Some("Changed from: 2024-01-25 at 15:00")
        );
        assert_eq!(payload.change_summary(NotificationKind::NewBooking), None);
    }

    #[test]
    fn none_instructor_is_absent() {
        let payload = NotificationPayload {
            instructor: "None".into(),
            ..Default::default()
        };
        assert_eq!(payload.instructor(), None);
    }

    #[test]
    fn icons_ignore_case() {
        assert_eq!(sport_icon("Padel"), sport_icon("padel"));
        assert_eq!(sport_icon("curling"), "🏃");
    }
}
