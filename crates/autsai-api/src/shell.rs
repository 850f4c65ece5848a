use axum::{Extension, Json, extract::State};

use autsai_core::shell::{ShellView, Tab};
use autsai_types::api::{Claims, SwitchTabRequest};

use crate::auth::AppState;
use crate::today;

pub async fn get_shell(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Json<ShellView> {
    let session = state.sessions.open(&claims).await;
    let view = session.shell.read().await.view();
    Json(view)
}

/// PUT /shell/tab: unknown tab ids fall back to the dashboard.
pub async fn switch_tab(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SwitchTabRequest>,
) -> Json<ShellView> {
    let session = state.sessions.open(&claims).await;
    let mut shell = session.shell.write().await;
    shell.switch_tab(Tab::resolve(&req.tab), today()).await;
    Json(shell.view())
}
