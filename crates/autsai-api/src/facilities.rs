use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use autsai_core::screens::facilities::FacilityEditorView;
use autsai_core::shell::Tab;
use autsai_types::api::{AmenityAvailabilityRequest, Claims, MutationResponse};
use autsai_types::models::{Facility, FacilityAmenity, FacilitySport};

use crate::auth::AppState;
use crate::{applied, reject, today};

/// 10 MB upload limit for facility photos
pub const MAX_PHOTO_SIZE: usize = 10 * 1024 * 1024;

type FacilitiesResponse = Result<Json<MutationResponse<FacilityEditorView>>, StatusCode>;

#[derive(Debug, Default, Deserialize)]
pub struct FacilitiesQuery {
    pub selected: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PhotoQuery {
    pub file_name: String,
    pub sport_type: Option<String>,
}

pub async fn get_facilities(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<FacilitiesQuery>,
) -> Result<Json<FacilityEditorView>, StatusCode> {
    let session = state.sessions.open(&claims).await;
    let mut shell = session.shell.write().await;
    shell.mount(Tab::Facilities, today()).await;

    if let Some(id) = query.selected {
        shell.facilities.select_facility(&id).await.map_err(reject)?;
    }
    Ok(Json(shell.facilities.view()))
}

/// POST /facilities: create (ids starting `new_`) or update a facility.
pub async fn save_facility(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(facility): Json<Facility>,
) -> FacilitiesResponse {
    let session = state.sessions.open(&claims).await;
    let mut shell = session.shell.write().await;
    shell.ensure_mounted(Tab::Facilities, today()).await;

    let applied = applied(shell.facilities.save_facility(facility).await)?;
    Ok(Json(MutationResponse {
        applied,
        view: shell.facilities.view(),
    }))
}

pub async fn save_sport(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(sport): Json<FacilitySport>,
) -> FacilitiesResponse {
    let session = state.sessions.open(&claims).await;
    let mut shell = session.shell.write().await;
    shell.ensure_mounted(Tab::Facilities, today()).await;
    shell.facilities.select_facility(&id).await.map_err(reject)?;

    let applied = applied(shell.facilities.save_sport(sport).await)?;
    Ok(Json(MutationResponse {
        applied,
        view: shell.facilities.view(),
    }))
}

pub async fn save_amenity(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(amenity): Json<FacilityAmenity>,
) -> FacilitiesResponse {
    let session = state.sessions.open(&claims).await;
    let mut shell = session.shell.write().await;
    shell.ensure_mounted(Tab::Facilities, today()).await;
    shell.facilities.select_facility(&id).await.map_err(reject)?;

    let applied = applied(shell.facilities.save_amenity(amenity).await)?;
    Ok(Json(MutationResponse {
        applied,
        view: shell.facilities.view(),
    }))
}

pub async fn toggle_amenity(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, amenity_id)): Path<(String, String)>,
    Json(req): Json<AmenityAvailabilityRequest>,
) -> FacilitiesResponse {
    let session = state.sessions.open(&claims).await;
    let mut shell = session.shell.write().await;
    shell.ensure_mounted(Tab::Facilities, today()).await;
    shell.facilities.select_facility(&id).await.map_err(reject)?;

    let applied = applied(
        shell
            .facilities
            .toggle_amenity(&amenity_id, req.is_available)
            .await,
    )?;
    Ok(Json(MutationResponse {
        applied,
        view: shell.facilities.view(),
    }))
}

/// POST /facilities/{id}/photos: raw image bytes, named by the query.
pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Query(query): Query<PhotoQuery>,
    bytes: Bytes,
) -> FacilitiesResponse {
    if bytes.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    if bytes.len() > MAX_PHOTO_SIZE {
        return Err(StatusCode::PAYLOAD_TOO_LARGE);
    }

    let session = state.sessions.open(&claims).await;
    let mut shell = session.shell.write().await;
    shell.ensure_mounted(Tab::Facilities, today()).await;
    shell.facilities.select_facility(&id).await.map_err(reject)?;

    let applied = applied(
        shell
            .facilities
            .upload_photo(&query.file_name, bytes.to_vec(), query.sport_type.as_deref())
            .await,
    )?;
    Ok(Json(MutationResponse {
        applied,
        view: shell.facilities.view(),
    }))
}
