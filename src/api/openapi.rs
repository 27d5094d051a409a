//! OpenAPI documentation and schema generation

use utoipa::OpenApi;

/// OpenAPI documentation for the vsix-dl REST API
///
/// Served at `/openapi.json` and, when enabled, browsable under `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "vsix-dl REST API",
        version = "0.1.0",
        description = "Resolve VS Code Marketplace item URLs and download their latest .vsix packages",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:6790", description = "Local development server")
    ),
    paths(
        crate::api::routes::resolve_url,
        crate::api::routes::list_downloads,
        crate::api::routes::start_download,
        crate::api::routes::cancel_download,

        crate::api::routes::get_settings,
        crate::api::routes::replace_settings,
        crate::api::routes::reset_settings,

        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(
        schemas(
            crate::types::ExtensionIdentifier,
            crate::types::ExtensionDetails,
            crate::types::TransferId,
            crate::types::DownloadProgress,
            crate::types::DownloadResultBody,
            crate::types::TransferInfo,
            crate::types::Event,

            crate::settings::AppSettings,
            crate::settings::Theme,

            crate::config::Config,
            crate::config::MarketplaceConfig,
            crate::config::DownloadConfig,
            crate::config::ServerIntegrationConfig,
            crate::config::ApiConfig,

            crate::error::ApiError,
            crate::error::ErrorDetail,

            crate::api::routes::ResolveRequest,
            crate::api::routes::StartDownloadRequest,
            crate::api::routes::StartDownloadResponse,
        )
    ),
    tags(
        (name = "downloads", description = "Resolve marketplace URLs and manage transfers"),
        (name = "settings", description = "Front-end settings"),
        (name = "system", description = "Health, events and API documentation")
    )
)]
pub struct ApiDoc;
