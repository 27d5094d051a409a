//! Settings handlers.

use crate::api::AppState;
use crate::error::Result;
use crate::settings::{AppSettings, validate_download_path};
use axum::{Json, extract::State, response::IntoResponse};

/// GET /settings - Current front-end settings
#[utoipa::path(
    get,
    path = "/settings",
    tag = "settings",
    responses(
        (status = 200, description = "Saved settings, or defaults when none are saved", body = AppSettings)
    )
)]
pub async fn get_settings(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.downloader.settings().load().await)
}

/// PUT /settings - Replace settings
#[utoipa::path(
    put,
    path = "/settings",
    tag = "settings",
    request_body = AppSettings,
    responses(
        (status = 200, description = "Settings saved", body = AppSettings),
        (status = 400, description = "Download path is not a usable directory", body = crate::error::ApiError)
    )
)]
pub async fn replace_settings(
    State(state): State<AppState>,
    Json(settings): Json<AppSettings>,
) -> Result<Json<AppSettings>> {
    validate_download_path(&settings.download_path).await?;
    state.downloader.settings().save(&settings).await?;
    Ok(Json(settings))
}

/// POST /settings/reset - Restore default settings
#[utoipa::path(
    post,
    path = "/settings/reset",
    tag = "settings",
    responses(
        (status = 200, description = "Defaults saved", body = AppSettings),
        (status = 500, description = "Settings file could not be written", body = crate::error::ApiError)
    )
)]
pub async fn reset_settings(State(state): State<AppState>) -> Result<Json<AppSettings>> {
    let settings = state.downloader.settings().reset().await?;
    Ok(Json(settings))
}
