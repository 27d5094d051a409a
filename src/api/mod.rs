//! REST API server module
//!
//! Exposes resolution, transfers and front-end settings over HTTP so that a
//! browser or desktop shell can drive the downloader.

use crate::{Config, Result, VsixDownloader};
use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Where Swagger UI fetches the OpenAPI document from
pub const SWAGGER_DOC_PATH: &str = "/api-docs/openapi.json";

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Resolution
/// - `POST /resolve` - Resolve a marketplace URL to package details
///
/// ## Transfers
/// - `GET /downloads` - List running transfers
/// - `POST /downloads` - Resolve a URL and start downloading it
/// - `DELETE /downloads/:id` - Cancel a running transfer
///
/// ## Settings
/// - `GET /settings` - Current front-end settings
/// - `PUT /settings` - Replace settings (download path is validated)
/// - `POST /settings/reset` - Restore defaults
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
/// - `GET /events` - Server-sent events stream
pub fn create_router(downloader: Arc<VsixDownloader>, config: Arc<Config>) -> Router {
    let state = AppState::new(downloader, config.clone());

    let router = Router::new()
        .route("/resolve", post(routes::resolve_url))
        .route("/downloads", get(routes::list_downloads))
        .route("/downloads", post(routes::start_download))
        .route("/downloads/:id", delete(routes::cancel_download))
        .route("/settings", get(routes::get_settings).put(routes::replace_settings))
        .route("/settings/reset", post(routes::reset_settings))
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .route("/events", get(routes::event_stream));

    // Swagger UI registers its own copy of the document; `/openapi.json` is taken above
    let router = if config.server.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url(SWAGGER_DOC_PATH, ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state).layer(TraceLayer::new_for_http());

    if config.server.api.cors_enabled {
        let cors = build_cors_layer(&config.server.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` or an empty list allows any origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Runs until the listener fails or the task is aborted.
///
/// # Example
///
/// ```no_run
/// use vsix_dl::{Config, VsixDownloader};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let downloader = Arc::new(VsixDownloader::new((*config).clone())?);
///
/// vsix_dl::api::start_api_server(downloader, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(downloader: Arc<VsixDownloader>, config: Arc<Config>) -> Result<()> {
    let bind_address = config.server.api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(downloader, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(address = %bind_address, "API server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
