use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use autsai_core::screens::bell::BellView;
use autsai_core::screens::local_now;
use autsai_core::screens::notifications::NotificationCenterView;
use autsai_core::shell::Tab;
use autsai_types::api::{Claims, MutationResponse, SettingToggleRequest};

use crate::auth::AppState;
use crate::{applied, today};

type CenterResponse = Result<Json<MutationResponse<NotificationCenterView>>, StatusCode>;

pub async fn get_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Json<NotificationCenterView> {
    let session = state.sessions.open(&claims).await;
    let mut shell = session.shell.write().await;
    shell.mount(Tab::Notifications, today()).await;
    Json(shell.notifications.view())
}

pub async fn mark_as_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> CenterResponse {
    let session = state.sessions.open(&claims).await;
    let mut shell = session.shell.write().await;
    shell.ensure_mounted(Tab::Notifications, today()).await;

    let applied = applied(shell.notifications.mark_as_read(&id).await)?;
    Ok(Json(MutationResponse {
        applied,
        view: shell.notifications.view(),
    }))
}

pub async fn mark_all_as_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> CenterResponse {
    let session = state.sessions.open(&claims).await;
    let mut shell = session.shell.write().await;
    shell.ensure_mounted(Tab::Notifications, today()).await;

    let applied = applied(shell.notifications.mark_all_as_read().await)?;
    Ok(Json(MutationResponse {
        applied,
        view: shell.notifications.view(),
    }))
}

pub async fn update_setting(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SettingToggleRequest>,
) -> CenterResponse {
    let session = state.sessions.open(&claims).await;
    let mut shell = session.shell.write().await;
    shell.ensure_mounted(Tab::Notifications, today()).await;

    let applied = applied(
        shell
            .notifications
            .update_setting(&req.key, req.enabled)
            .await,
    )?;
    Ok(Json(MutationResponse {
        applied,
        view: shell.notifications.view(),
    }))
}

/// GET /notifications/bell: the poller's latest snapshot, no reload.
pub async fn get_bell(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Json<BellView> {
    let session = state.sessions.open(&claims).await;
    let bell = session.bell();
    let view = bell.read().await.view(local_now());
    Json(view)
}

pub async fn mark_bell_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<MutationResponse<BellView>>, StatusCode> {
    let session = state.sessions.open(&claims).await;
    let bell = session.bell();
    let mut bell = bell.write().await;

    let applied = applied(bell.mark_as_read(&id).await)?;
    Ok(Json(MutationResponse {
        applied,
        view: bell.view(local_now()),
    }))
}
