//! Resolution and transfer handlers.

use super::{ResolveRequest, StartDownloadRequest, StartDownloadResponse};
use crate::api::AppState;
use crate::error::Result;
use crate::types::TransferId;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

/// POST /resolve - Resolve a marketplace URL
#[utoipa::path(
    post,
    path = "/resolve",
    tag = "downloads",
    request_body = ResolveRequest,
    responses(
        (status = 200, description = "Package details for the latest version", body = crate::types::ExtensionDetails),
        (status = 400, description = "URL is not a marketplace item URL", body = crate::error::ApiError),
        (status = 404, description = "Extension not found", body = crate::error::ApiError),
        (status = 502, description = "Marketplace page could not be read", body = crate::error::ApiError)
    )
)]
pub async fn resolve_url(
    State(state): State<AppState>,
    Json(request): Json<ResolveRequest>,
) -> Result<impl IntoResponse> {
    let details = state.downloader.resolve(&request.url).await?;
    Ok((StatusCode::OK, Json(details)))
}

/// GET /downloads - List running transfers
#[utoipa::path(
    get,
    path = "/downloads",
    tag = "downloads",
    responses(
        (status = 200, description = "Transfers currently in flight", body = Vec<crate::types::TransferInfo>)
    )
)]
pub async fn list_downloads(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.downloader.active_transfers().await)
}

/// POST /downloads - Resolve a URL and start downloading it
///
/// Returns as soon as the transfer is running; follow `/events` for progress.
#[utoipa::path(
    post,
    path = "/downloads",
    tag = "downloads",
    request_body = StartDownloadRequest,
    responses(
        (status = 202, description = "Transfer started", body = StartDownloadResponse),
        (status = 400, description = "URL is not a marketplace item URL", body = crate::error::ApiError),
        (status = 404, description = "Extension not found", body = crate::error::ApiError),
        (status = 503, description = "Shutting down", body = crate::error::ApiError)
    )
)]
pub async fn start_download(
    State(state): State<AppState>,
    Json(request): Json<StartDownloadRequest>,
) -> Result<impl IntoResponse> {
    let details = state.downloader.resolve(&request.url).await?;
    let job = state
        .downloader
        .download(&details, request.download_path)
        .await?;

    tracing::info!(id = %job.id(), item = %details.item_name, "download started via API");

    Ok((
        StatusCode::ACCEPTED,
        Json(StartDownloadResponse {
            id: job.id(),
            details,
        }),
    ))
}

/// DELETE /downloads/:id - Cancel a running transfer
#[utoipa::path(
    delete,
    path = "/downloads/{id}",
    tag = "downloads",
    params(
        ("id" = u64, Path, description = "Transfer ID")
    ),
    responses(
        (status = 204, description = "Transfer cancelled"),
        (status = 404, description = "No running transfer with this ID", body = crate::error::ApiError)
    )
)]
pub async fn cancel_download(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode> {
    state.downloader.cancel(TransferId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
