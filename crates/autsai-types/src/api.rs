use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::BookingStatus;

// -- JWT Claims --

/// JWT claims shared by the REST middleware and the session registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
}

/// The signed-in partner as the gateway reports it from `auth.me()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
}

impl From<&Claims> for User {
    fn from(claims: &Claims) -> Self {
        Self {
            id: claims.sub.to_string(),
            email: claims.email.clone(),
        }
    }
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub email: String,
    pub token: String,
}

// -- Shell --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwitchTabRequest {
    pub tab: String,
}

// -- Bookings --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InternalNotesRequest {
    pub internal_notes: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssignInstructorRequest {
    pub instructor_id: String,
}

// -- Facilities --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AmenityAvailabilityRequest {
    pub is_available: bool,
}

// -- Notifications --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingToggleRequest {
    pub key: String,
    pub enabled: bool,
}

/// Result of a write issued through a screen: whether the remote write went
/// through, and the screen's view afterwards.
#[derive(Debug, Serialize)]
pub struct MutationResponse<V> {
    pub applied: bool,
    pub view: V,
}
