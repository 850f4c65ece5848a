//! HTTP surface of the partner back office. Every protected route resolves
//! the caller's [`session::Session`] and drives one of its screen
//! controllers.

pub mod auth;
pub mod bookings;
pub mod calendar;
pub mod dashboard;
pub mod facilities;
pub mod files;
pub mod middleware;
pub mod notifications;
pub mod profile;
pub mod session;
pub mod shell;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware as layers,
    routing::{get, post, put},
};
use chrono::NaiveDate;
use serde_json::{Value, json};
use tracing::{debug, warn};

use autsai_core::ScreenError;
use autsai_core::screens::local_now;

use crate::auth::AppState;
use crate::middleware::require_auth;

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/files/{*path}", get(files::download_file))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .route("/shell", get(shell::get_shell))
        .route("/shell/tab", put(shell::switch_tab))
        .route("/dashboard", get(dashboard::get_dashboard))
        .route("/calendar", get(calendar::get_calendar))
        .route("/calendar/navigate", get(calendar::navigate))
        .route("/bookings", get(bookings::get_bookings))
        .route("/bookings/{id}/status", put(bookings::update_status))
        .route("/bookings/{id}/internal-notes", put(bookings::update_internal_notes))
        .route("/bookings/{id}/instructor", put(bookings::assign_instructor))
        .route("/facilities", get(facilities::get_facilities).post(facilities::save_facility))
        .route("/facilities/{id}/sports", post(facilities::save_sport))
        .route("/facilities/{id}/amenities", post(facilities::save_amenity))
        .route(
            "/facilities/{id}/amenities/{amenity_id}/availability",
            put(facilities::toggle_amenity),
        )
        .route(
            "/facilities/{id}/photos",
            post(facilities::upload_photo).layer(DefaultBodyLimit::max(facilities::MAX_PHOTO_SIZE)),
        )
        .route("/notifications", get(notifications::get_notifications))
        .route("/notifications/{id}/read", put(notifications::mark_as_read))
        .route("/notifications/read-all", post(notifications::mark_all_as_read))
        .route("/notifications/settings", put(notifications::update_setting))
        .route("/notifications/bell", get(notifications::get_bell))
        .route("/notifications/bell/{id}/read", put(notifications::mark_bell_read))
        .route("/profile", get(profile::get_profile))
        .route("/profile/deletion-request", post(profile::request_deletion))
        .route("/profile/{section}", put(profile::save_section))
        .layer(layers::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) fn today() -> NaiveDate {
    local_now().date()
}

/// Status for a mutation rejected before any write went out.
pub(crate) fn reject(e: ScreenError) -> StatusCode {
    debug!("Rejected: {}", e);
    match e {
        ScreenError::Gateway(_) => StatusCode::BAD_GATEWAY,
        ScreenError::NotFound(_) => StatusCode::NOT_FOUND,
        ScreenError::NotEditing(_) => StatusCode::CONFLICT,
        ScreenError::UnknownSetting(_) | ScreenError::Invalid(_) => StatusCode::BAD_REQUEST,
    }
}

/// Whether a mutation's write went through. A failed write is still a
/// successful request: the response reports `applied: false` with the
/// unchanged view.
pub(crate) fn applied<T>(result: Result<T, ScreenError>) -> Result<bool, StatusCode> {
    match result {
        Ok(_) => Ok(true),
        Err(ScreenError::Gateway(e)) => {
            warn!("Write not applied: {}", e);
            Ok(false)
        }
        Err(e) => Err(reject(e)),
    }
}

#[cfg(test)]
mod tests;
