use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::warn;

use crate::auth::AppState;

/// GET /files/{*path}: serve an uploaded object. Public, since the URLs end
/// up in image tags.
pub async fn download_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    if state.storage.object_path(&path).is_err() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let bytes = state.storage.read(&path).await.map_err(|e| {
        warn!("Failed to read object {}: {}", path, e);
        StatusCode::NOT_FOUND
    })?;

    Ok(([(header::CONTENT_TYPE, content_type(&path))], bytes))
}

fn content_type(path: &str) -> &'static str {
    let extension = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
