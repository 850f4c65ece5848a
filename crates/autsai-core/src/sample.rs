//! Fixed datasets each screen falls back to when the gateway can't be
//! reached, so the back office stays demonstrable offline.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate, NaiveDateTime};

use autsai_types::codec::timestamp;
use autsai_types::models::{
    Booking, BookingParticipant, BookingStatus, Facility, FacilityAmenity, FacilityProfile,
    FacilitySport, Instructor, Notification, NotificationKind, NotificationSettings, OpeningHours,
    PartnerProfile, PayoutInfo,
};

use crate::view_models::{BookingDetails, CalendarEntry};

fn at(raw: &str) -> NaiveDateTime {
    timestamp::parse(raw).unwrap_or_default()
}

fn participant(id: &str, booking_id: &str, name: &str, email: &str) -> BookingParticipant {
    BookingParticipant {
        id: id.into(),
        booking_id: booking_id.into(),
        participant_name: name.into(),
        participant_email: Some(email.into()),
        participant_phone: None,
    }
}

// -- Booking management --

pub fn bookings() -> Vec<BookingDetails> {
    vec![
        BookingDetails {
            booking: Booking {
                id: "booking_1".into(),
                user_id: "user_1".into(),
                facility_id: "facility_1".into(),
                instructor_id: Some("instructor_1".into()),
                sport: "padel".into(),
                participants: "Maria Rodriguez, Carlos Silva".into(),
                start_time: at("2025-01-25T10:00:00"),
                end_time: at("2025-01-25T11:30:00"),
                status: BookingStatus::Confirmed,
                equipment_included: true,
                payment_status: "paid".into(),
                total_amount: 45.0,
                price: 45.0,
                notes: Some("First time playing together".into()),
                internal_notes: Some("Regular customers, prefer Court A".into()),
                created_at: at("2025-01-20T09:00:00"),
                updated_at: at("2025-01-20T09:00:00"),
            },
            facility_name: "Elite Sports Center".into(),
            facility_address: "123 Sports Ave".into(),
            facility_city: "Madrid".into(),
            instructor_name: Some("Carlos Rodriguez".into()),
            participant_list: vec![
                participant("part_1", "booking_1", "Maria Rodriguez", "maria@email.com"),
                participant("part_2", "booking_1", "Carlos Silva", "carlos@email.com"),
            ],
        },
        BookingDetails {
            booking: Booking {
                id: "booking_2".into(),
                user_id: "user_2".into(),
                facility_id: "facility_2".into(),
                instructor_id: None,
                sport: "tennis".into(),
                participants: "Ana Garcia, Luis Martinez".into(),
                start_time: at("2025-01-26T14:00:00"),
                end_time: at("2025-01-26T15:00:00"),
                status: BookingStatus::Pending,
                equipment_included: false,
                payment_status: "pending".into(),
                total_amount: 35.0,
                price: 35.0,
                notes: Some("Need confirmation for court availability".into()),
                internal_notes: None,
                created_at: at("2025-01-21T10:00:00"),
                updated_at: at("2025-01-21T10:00:00"),
            },
            facility_name: "Tennis Club Pro".into(),
            facility_address: "456 Tennis Rd".into(),
            facility_city: "Barcelona".into(),
            instructor_name: None,
            participant_list: vec![
                participant("part_3", "booking_2", "Ana Garcia", "ana@email.com"),
                participant("part_4", "booking_2", "Luis Martinez", "luis@email.com"),
            ],
        },
    ]
}

pub fn booking_facilities() -> Vec<Facility> {
    vec![
        Facility {
            id: "facility_1".into(),
            name: "Elite Sports Center".into(),
            address: "123 Sports Ave".into(),
            city: "Madrid".into(),
            ..Default::default()
        },
        Facility {
            id: "facility_2".into(),
            name: "Tennis Club Pro".into(),
            address: "456 Tennis Rd".into(),
            city: "Barcelona".into(),
            ..Default::default()
        },
    ]
}

pub fn instructors() -> Vec<Instructor> {
    vec![
        Instructor {
            id: "instructor_1".into(),
            name: "Carlos Rodriguez".into(),
            email: "carlos@instructor.com".into(),
        },
        Instructor {
            id: "instructor_2".into(),
            name: "Maria Lopez".into(),
            email: "maria@instructor.com".into(),
        },
    ]
}

// -- Calendar --

#[allow(clippy::too_many_arguments)]
fn entry(
    id: &str,
    date: &str,
    time: &str,
    participants: &[&str],
    facility: &str,
    location: &str,
    sport: &str,
    equipment_included: bool,
    instructor: Option<&str>,
    duration: i64,
) -> CalendarEntry {
    CalendarEntry {
        id: id.into(),
        date: date.into(),
        time: time.into(),
        participants: participants.iter().map(|p| p.to_string()).collect(),
        facility: facility.into(),
        location: location.into(),
        sport: sport.into(),
        sport_icon: autsai_types::notification::sport_icon(sport),
        equipment_included,
        instructor: instructor.map(str::to_string),
        duration,
    }
}

pub fn calendar_entries() -> Vec<CalendarEntry> {
    vec![
        entry(
            "1",
            "2025-01-22",
            "09:00",
            &["Sarah Johnson", "Mike Chen"],
            "Court A",
            "123 Sports Center, Downtown",
            "tennis",
            true,
            Some("Carlos Rodriguez"),
            60,
        ),
        entry(
            "2",
            "2025-01-22",
            "14:30",
            &["Emma Wilson", "David Park", "Lisa Brown"],
            "Padel Court 1",
            "456 Athletic Club, Midtown",
            "padel",
            false,
            None,
            90,
        ),
        entry(
            "3",
            "2025-01-23",
            "11:00",
            &["John Smith", "Alex Turner"],
            "Golf Course - Hole 1",
            "789 Golf Resort, Suburbs",
            "golf",
            true,
            Some("Maria Santos"),
            120,
        ),
        entry(
            "4",
            "2025-01-23",
            "16:00",
            &["Rachel Green", "Tom Wilson"],
            "Squash Court B",
            "123 Sports Center, Downtown",
            "squash",
            false,
            None,
            45,
        ),
        entry(
            "5",
            "2025-01-24",
            "10:30",
            &["Kevin Lee", "Sophie Davis"],
            "Basketball Court 1",
            "321 Community Center, Eastside",
            "basketball",
            true,
            Some("James Miller"),
            60,
        ),
    ]
}

// -- Dashboard --

/// The dashboard's demo bookings sit on `today` and the day after, so the
/// "today" figures have something to count.
pub fn dashboard_bookings(today: NaiveDate) -> Vec<BookingDetails> {
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
    let slot = |day: NaiveDate, h: u32, minutes: i64| {
        let start = day.and_hms_opt(h, 0, 0).unwrap_or_default();
        (start, start + chrono::Duration::minutes(minutes))
    };

    let rows = [
        ("dash_1", "Tennis Court A", "Sarah Johnson", "tennis", "John Smith", slot(today, 10, 60), BookingStatus::Confirmed, 40.0),
        ("dash_2", "Padel Court 1", "Mike Rodriguez", "padel", "Team Alpha", slot(today, 14, 90), BookingStatus::Pending, 80.0),
        ("dash_3", "Gym Studio", "Lisa Chen", "fitness", "Fitness Group", slot(tomorrow, 18, 60), BookingStatus::Confirmed, 120.0),
    ];

    rows.into_iter()
        .map(|(id, facility, instructor, sport, client, (start, end), status, price)| {
            let participant_list = vec![BookingParticipant {
                id: format!("{}_p1", id),
                booking_id: id.into(),
                participant_name: client.into(),
                participant_email: None,
                participant_phone: None,
            }];

            BookingDetails {
                booking: Booking {
                    id: id.into(),
                    user_id: "user_1".into(),
                    facility_id: format!("{}_facility", id),
                    instructor_id: Some(format!("{}_instructor", id)),
                    sport: sport.into(),
                    participants: client.into(),
                    start_time: start,
                    end_time: end,
                    status,
                    equipment_included: false,
                    payment_status: "paid".into(),
                    total_amount: price,
                    price,
                    notes: None,
                    internal_notes: None,
                    created_at: start,
                    updated_at: start,
                },
                facility_name: facility.into(),
                facility_address: String::new(),
                facility_city: String::new(),
                instructor_name: Some(instructor.into()),
                participant_list,
            }
        })
        .collect()
}

// -- Facility editor --

pub fn facility() -> Facility {
    Facility {
        id: "fac_001".into(),
        user_id: "user_001".into(),
        name: "Elite Sports Complex Madrid".into(),
        description: "Premier multi-sport facility in the heart of Madrid offering world-class courts and training facilities.".into(),
        address: "Calle de Alcalá 123".into(),
        city: "Madrid".into(),
        country: "Spain".into(),
        google_maps_link: "https://maps.google.com/?q=Calle+de+Alcalá+123+Madrid".into(),
        phone: "+34 91 123 4567".into(),
        email: "info@elitesports.es".into(),
        website: "www.elitesports.es".into(),
    }
}

pub fn facility_sports(facility_id: &str) -> Vec<FacilitySport> {
    vec![FacilitySport {
        id: "spt_001".into(),
        facility_id: facility_id.into(),
        sport_name: "Padel".into(),
        sport_icon: "🏓".into(),
        description: "Professional padel courts with premium glass walls and artificial turf surface.".into(),
        price_with_equipment: 45.0,
        price_without_equipment: 35.0,
        equipment_included: true,
        equipment_list: r#"["Padel rackets", "Balls", "Court shoes"]"#.into(),
        surface_type: "Artificial Turf".into(),
        indoor_outdoor: "Indoor".into(),
        lighting: "LED Professional".into(),
        court_count: 4,
        max_players: 4,
    }]
}

pub fn facility_amenities(facility_id: &str) -> Vec<FacilityAmenity> {
    vec![FacilityAmenity {
        id: "amn_001".into(),
        facility_id: facility_id.into(),
        amenity_name: "Parking".into(),
        amenity_icon: "🅿️".into(),
        description: "Free parking for 50 cars".into(),
        is_available: true,
    }]
}

// -- Notifications --

fn notification(
    id: &str,
    booking_id: &str,
    kind: NotificationKind,
    title: &str,
    message: &str,
    data: &str,
    created_at: &str,
) -> Notification {
    Notification {
        id: id.into(),
        user_id: "user123".into(),
        booking_id: booking_id.into(),
        kind,
        title: title.into(),
        message: message.into(),
        data: data.into(),
        is_read: false,
        created_at: at(created_at),
    }
}

pub fn notifications() -> Vec<Notification> {
    vec![
        notification(
            "notif_001",
            "book_001",
            NotificationKind::NewBooking,
            "New Booking Received",
            "A new padel session has been booked for Court A",
            r#"{"sport": "Padel", "facility": "Court A", "location": "123 Sports Center Ave", "participants": ["John Doe", "Jane Smith"], "equipment": "Included", "instructor": "Carlos Rodriguez", "date": "2024-01-25", "time": "14:00"}"#,
            "2024-01-24T10:30:00Z",
        ),
        notification(
            "notif_002",
            "book_002",
            NotificationKind::Rescheduled,
            "Booking Rescheduled",
            "Tennis session has been rescheduled to a new time",
            r#"{"sport": "Tennis", "facility": "Tennis Court B", "location": "456 Tennis Club Rd", "participants": ["Mike Johnson", "Sarah Wilson"], "equipment": "Not Included", "instructor": "Maria Garcia", "date": "2024-01-26", "time": "16:00", "old_date": "2024-01-25", "old_time": "15:00"}"#,
            "2024-01-24T09:15:00Z",
        ),
        notification(
            "notif_003",
            "book_003",
            NotificationKind::Canceled,
            "Booking Canceled",
            "Golf lesson has been canceled by the participants",
            r#"{"sport": "Golf", "facility": "Golf Course", "location": "789 Golf Club Dr", "participants": ["Alex Brown", "Lisa Davis"], "equipment": "Included", "instructor": "Tom Anderson", "date": "2024-01-27", "time": "10:00"}"#,
            "2024-01-24T08:45:00Z",
        ),
        notification(
            "notif_004",
            "book_004",
            NotificationKind::InstructorAssigned,
            "Instructor Assigned",
            "New instructor assigned to squash session",
            r#"{"sport": "Squash", "facility": "Squash Court 1", "location": "321 Squash Center", "participants": ["David Lee", "Emma Taylor"], "equipment": "Not Included", "instructor": "Pedro Martinez", "date": "2024-01-28", "time": "18:00", "old_instructor": "None"}"#,
            "2024-01-24T07:20:00Z",
        ),
    ]
}

/// The bell's preview shows the three most recent samples.
pub fn bell_notifications() -> Vec<Notification> {
    notifications().into_iter().take(3).collect()
}

pub fn notification_settings() -> NotificationSettings {
    NotificationSettings {
        id: "settings_001".into(),
        user_id: "user123".into(),
        email_enabled: true,
        sms_enabled: false,
        push_enabled: true,
        new_booking_enabled: true,
        rescheduled_enabled: true,
        canceled_enabled: true,
        instructor_assigned_enabled: true,
        equipment_changed_enabled: true,
    }
}

// -- Profile --

pub fn partner_profile() -> PartnerProfile {
    PartnerProfile {
        id: "profile_1".into(),
        user_id: "user_1".into(),
        full_name: "Carlos Rodriguez".into(),
        role: "Owner".into(),
        profile_photo_url: Some(String::new()),
        email: "carlos@sportsclub.com".into(),
        phone_number: "+34 612 345 678".into(),
        preferred_language: Some("English".into()),
        notification_preferences: Some("Both".into()),
        booking_auto_accept: false,
        cancellation_policy: Some("24h".into()),
        cancellation_penalty: Some(25.0),
        terms_accepted: true,
        terms_accepted_at: Some("2024-01-15T10:30:00Z".into()),
        account_deletion_requested: false,
        account_deletion_requested_at: None,
    }
}

pub fn facility_profile() -> FacilityProfile {
    let hours = |open: &str, close: &str| OpeningHours {
        open: open.into(),
        close: close.into(),
    };
    let mut operating_hours = BTreeMap::new();
    for day in ["monday", "tuesday", "wednesday", "thursday", "friday"] {
        operating_hours.insert(day.to_string(), hours("07:00", "23:00"));
    }
    for day in ["saturday", "sunday"] {
        operating_hours.insert(day.to_string(), hours("08:00", "22:00"));
    }

    FacilityProfile {
        id: "facility_1".into(),
        user_id: "user_1".into(),
        facility_name: "Elite Sports Center".into(),
        legal_business_name: Some("Elite Sports Center S.L.".into()),
        address: "Calle del Deporte 123, Madrid, Spain".into(),
        google_maps_link: Some("https://maps.google.com/?q=Calle+del+Deporte+123+Madrid+Spain".into()),
        sports_offered: ["padel", "tennis", "squash", "fitness"].map(String::from).to_vec(),
        operating_hours,
        club_description: "Premier sports facility offering world-class courts and professional instruction for padel, tennis, and squash. Modern facilities with top-tier equipment and experienced coaches.".into(),
    }
}

pub fn payout_info() -> PayoutInfo {
    PayoutInfo {
        id: "payout_1".into(),
        user_id: "user_1".into(),
        account_holder_name: "Carlos Rodriguez".into(),
        bank_account_number: "****1234".into(),
        swift_bic_code: "BBVAESMM".into(),
        bank_name: "BBVA España".into(),
        billing_email: "billing@sportsclub.com".into(),
        vat_tax_id: Some("ESB12345678".into()),
        payout_frequency: "Monthly".into(),
    }
}
