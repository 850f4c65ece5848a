use axum::{Extension, Json, extract::State};

use autsai_core::screens::dashboard::DashboardView;
use autsai_core::shell::Tab;
use autsai_types::api::Claims;

use crate::auth::AppState;
use crate::today;

pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Json<DashboardView> {
    let session = state.sessions.open(&claims).await;
    let mut shell = session.shell.write().await;
    shell.mount(Tab::Dashboard, today()).await;
    Json(shell.dashboard.view())
}
