use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use autsai_core::screens::local_now;
use autsai_core::screens::profile::{ProfileSection, ProfileView};
use autsai_core::shell::Tab;
use autsai_types::api::{Claims, MutationResponse};

use crate::auth::AppState;
use crate::{applied, reject, today};

type ProfileResponse = Result<Json<MutationResponse<ProfileView>>, StatusCode>;

#[derive(Debug, Default, Deserialize)]
pub struct ProfileQuery {
    pub section: Option<String>,
    #[serde(default)]
    pub reveal_bank: bool,
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ProfileQuery>,
) -> Result<Json<ProfileView>, StatusCode> {
    let section = query
        .section
        .as_deref()
        .map(str::parse::<ProfileSection>)
        .transpose()
        .map_err(reject)?;

    let session = state.sessions.open(&claims).await;
    let mut shell = session.shell.write().await;
    shell.mount(Tab::Profile, today()).await;

    let profile = &mut shell.profile;
    if let Some(section) = section {
        profile.set_section(section);
    }
    profile.reveal_bank_details(query.reveal_bank);
    Ok(Json(profile.view()))
}

/// PUT /profile/{section}: open a draft for the section, apply the posted
/// fields and save. Accepting the terms is stamped with the server clock.
pub async fn save_section(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(section): Path<String>,
    Json(fields): Json<Map<String, Value>>,
) -> ProfileResponse {
    let section: ProfileSection = section.parse().map_err(reject)?;

    let session = state.sessions.open(&claims).await;
    let mut shell = session.shell.write().await;
    shell.ensure_mounted(Tab::Profile, today()).await;

    let profile = &mut shell.profile;
    profile.set_section(section);
    profile.begin_edit().map_err(reject)?;

    let terms = fields.get("terms_accepted").and_then(Value::as_bool);
    let mut rest = fields;
    rest.remove("terms_accepted");
    rest.remove("terms_accepted_at");

    if let Err(e) = profile.edit_patch(&rest) {
        profile.cancel_edit();
        return Err(reject(e));
    }
    if let Some(accepted) = terms {
        if let Err(e) = profile.accept_terms(accepted, local_now()) {
            profile.cancel_edit();
            return Err(reject(e));
        }
    }

    let result = profile.save().await;
    if result.is_err() {
        profile.cancel_edit();
    }
    let applied = applied(result)?;
    Ok(Json(MutationResponse {
        applied,
        view: profile.view(),
    }))
}

pub async fn request_deletion(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ProfileResponse {
    let session = state.sessions.open(&claims).await;
    let mut shell = session.shell.write().await;
    shell.ensure_mounted(Tab::Profile, today()).await;

    let applied = applied(shell.profile.request_account_deletion(local_now()).await)?;
    Ok(Json(MutationResponse {
        applied,
        view: shell.profile.view(),
    }))
}
