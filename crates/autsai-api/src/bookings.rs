use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use autsai_core::filter::BookingFilters;
use autsai_core::screens::bookings::BookingsView;
use autsai_core::screens::local_now;
use autsai_core::shell::Tab;
use autsai_types::api::{
    AssignInstructorRequest, Claims, InternalNotesRequest, MutationResponse, UpdateStatusRequest,
};

use crate::auth::AppState;
use crate::{applied, today};

type BookingsResponse = Result<Json<MutationResponse<BookingsView>>, StatusCode>;

pub async fn get_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(filters): Query<BookingFilters>,
) -> Json<BookingsView> {
    let session = state.sessions.open(&claims).await;
    let mut shell = session.shell.write().await;
    shell.mount(Tab::Bookings, today()).await;

    shell.bookings.filters = filters;
    Json(shell.bookings.view(local_now()))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> BookingsResponse {
    let session = state.sessions.open(&claims).await;
    let mut shell = session.shell.write().await;
    shell.ensure_mounted(Tab::Bookings, today()).await;

    let applied = applied(shell.bookings.update_status(&id, req.status).await)?;
    Ok(Json(MutationResponse {
        applied,
        view: shell.bookings.view(local_now()),
    }))
}

pub async fn update_internal_notes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<InternalNotesRequest>,
) -> BookingsResponse {
    let session = state.sessions.open(&claims).await;
    let mut shell = session.shell.write().await;
    shell.ensure_mounted(Tab::Bookings, today()).await;

    let applied = applied(
        shell
            .bookings
            .update_internal_notes(&id, &req.internal_notes)
            .await,
    )?;
    Ok(Json(MutationResponse {
        applied,
        view: shell.bookings.view(local_now()),
    }))
}

pub async fn assign_instructor(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<AssignInstructorRequest>,
) -> BookingsResponse {
    let session = state.sessions.open(&claims).await;
    let mut shell = session.shell.write().await;
    shell.ensure_mounted(Tab::Bookings, today()).await;

    let applied = applied(
        shell
            .bookings
            .assign_instructor(&id, &req.instructor_id)
            .await,
    )?;
    Ok(Json(MutationResponse {
        applied,
        view: shell.bookings.view(local_now()),
    }))
}
