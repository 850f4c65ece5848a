use std::fmt;

/// Named document collections in the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Bookings,
    BookingParticipants,
    Instructors,
    Facilities,
    FacilitySports,
    FacilityAmenities,
    FacilityPhotos,
    Notifications,
    NotificationSettings,
    PartnerProfiles,
    FacilityProfiles,
    PayoutInformation,
}

/// How a record is tied to the partner that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// `user_id` names the partner.
    Partner,
    /// Owned through the parent record referenced by `field`.
    Parent { collection: Collection, field: &'static str },
    /// Catalog readable by every partner.
    Shared,
}

impl Collection {
    pub fn owner(&self) -> Owner {
        match self {
            Self::Bookings
            | Self::Facilities
            | Self::Notifications
            | Self::NotificationSettings
            | Self::PartnerProfiles
            | Self::FacilityProfiles
            | Self::PayoutInformation => Owner::Partner,
            Self::BookingParticipants => Owner::Parent {
                collection: Self::Bookings,
                field: "booking_id",
            },
            Self::FacilitySports | Self::FacilityAmenities | Self::FacilityPhotos => Owner::Parent {
                collection: Self::Facilities,
                field: "facility_id",
            },
            Self::Instructors => Owner::Shared,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bookings => "bookings",
            Self::BookingParticipants => "booking_participants",
            Self::Instructors => "instructors",
            Self::Facilities => "facilities",
            Self::FacilitySports => "facility_sports",
            Self::FacilityAmenities => "facility_amenities",
            Self::FacilityPhotos => "facility_photos",
            Self::Notifications => "notifications",
            Self::NotificationSettings => "notification_settings",
            Self::PartnerProfiles => "partner_profiles",
            Self::FacilityProfiles => "facility_profiles",
            Self::PayoutInformation => "payout_information",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
