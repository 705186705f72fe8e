//! REST API server module
//!
//! Serves the management UI at `/` and a JSON API under `/api` for listing,
//! uploading, downloading and deleting ZIM files.

use crate::{Config, Result, ZimManager};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the router with all route definitions
///
/// # Routes
///
/// ## UI
/// - `GET /` - Management page
///
/// ## Files
/// - `GET /api/zim` - List stored ZIM files
/// - `GET /api/zim/:filename/info` - Metadata for one file
/// - `DELETE /api/zim/:filename` - Delete a file
/// - `POST /api/zim/upload` - Multipart upload (`file` field)
///
/// ## Downloads
/// - `POST /api/zim/download` - Start downloading a URL
/// - `GET /api/download/:job_id/status` - Poll a download job
/// - `GET /api/downloads` - Every job since startup
///
/// ## System
/// - `GET /api/health` - Health check
/// - `GET /api/openapi.json` - OpenAPI specification
/// - `GET /api/events` - Server-sent events stream
/// - `GET /swagger-ui` - Interactive documentation (if enabled)
///
/// When an API key is configured every `/api` route requires a matching
/// `X-Api-Key` header. The UI page itself is always served.
pub fn create_router(manager: Arc<ZimManager>, config: Arc<Config>) -> Router {
    let state = AppState::new(manager, config.clone());

    let api = Router::new()
        // Files
        .route("/zim", get(routes::list_files))
        .route("/zim/:filename/info", get(routes::get_file_info))
        .route("/zim/:filename", delete(routes::delete_file))
        .route(
            "/zim/upload",
            // Size is enforced while streaming against storage.max_upload_size_bytes
            post(routes::upload_file).layer(DefaultBodyLimit::disable()),
        )
        // Downloads
        .route("/zim/download", post(routes::start_download))
        .route("/download/:job_id/status", get(routes::get_download_status))
        .route("/downloads", get(routes::list_downloads))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .route("/events", get(routes::event_stream));

    let api = if config.server.api.api_key.is_some() {
        api.layer(middleware::from_fn_with_state(
            config.server.api.api_key.clone(),
            auth::require_api_key,
        ))
    } else {
        api
    };

    let router = Router::new()
        .route("/", get(routes::index))
        .nest("/api", api);

    let router = if config.server.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state).layer(TraceLayer::new_for_http());

    if config.server.api.cors_enabled {
        router.layer(build_cors_layer(&config.server.api.cors_origins))
    } else {
        router
    }
}

/// Build a CORS layer for the configured origins ("*" or empty allows any)
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

/// Serve the API on the configured bind address until the manager shuts down
///
/// Stops accepting connections once [`ZimManager::shutdown`] cancels
/// transfers, then waits for open requests. Event streams close when the
/// shutdown event is sent.
///
/// # Example
///
/// ```no_run
/// use kiwix_manager::{Config, ZimManager};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let manager = Arc::new(ZimManager::new(Config::default()).await?);
/// let config = manager.get_config();
///
/// // Blocks until shutdown
/// kiwix_manager::api::start_api_server(manager, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(manager: Arc<ZimManager>, config: Arc<Config>) -> Result<()> {
    let bind_address = config.server.api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(manager.clone(), config);

    let listener = TcpListener::bind(bind_address).await.map_err(|e| {
        crate::error::Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to bind API server to {}: {}", bind_address, e),
        ))
    })?;

    tracing::info!(
        address = %listener.local_addr().unwrap_or(bind_address),
        "API server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { manager.shutdown_requested().await })
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
