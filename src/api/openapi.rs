//! OpenAPI documentation generated at compile time with utoipa

use utoipa::OpenApi;

/// OpenAPI documentation for the kiwix-manager REST API
///
/// Served at `/api/openapi.json`; Swagger UI at `/swagger-ui` when enabled.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "kiwix-manager REST API",
        version = "0.2.0",
        description = "Manage the ZIM files served by kiwix-serve: download from URLs, upload, list and delete",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8112", description = "Local server")
    ),
    paths(
        // Files
        crate::api::routes::list_files,
        crate::api::routes::get_file_info,
        crate::api::routes::delete_file,
        crate::api::routes::upload_file,

        // Downloads
        crate::api::routes::start_download,
        crate::api::routes::get_download_status,
        crate::api::routes::list_downloads,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        crate::types::JobId,
        crate::types::JobState,
        crate::types::JobStatus,
        crate::types::ZimFileInfo,
        crate::types::DownloadRequest,
        crate::types::DownloadStarted,
        crate::types::UploadResult,
        crate::types::Event,
        crate::api::routes::DeleteResponse,
        crate::api::routes::HealthResponse,
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "files", description = "ZIM files in storage - list, inspect, upload, delete"),
        (name = "downloads", description = "URL downloads - start and poll background jobs"),
        (name = "system", description = "Health, OpenAPI spec and the event stream"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds the `X-Api-Key` header scheme
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = &mut openapi.components {
            components.add_security_scheme(
                "api_key",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new("X-Api-Key"),
                    ),
                ),
            );
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_every_route() {
        let spec = ApiDoc::openapi();
        let paths: Vec<&str> = spec.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/api/zim",
            "/api/zim/{filename}/info",
            "/api/zim/{filename}",
            "/api/zim/upload",
            "/api/zim/download",
            "/api/download/{job_id}/status",
            "/api/downloads",
            "/api/health",
            "/api/openapi.json",
            "/api/events",
        ] {
            assert!(paths.contains(&expected), "missing path {}", expected);
        }
    }

    #[test]
    fn test_spec_info_and_tags() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "kiwix-manager REST API");

        let tags = spec.tags.unwrap();
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["files", "downloads", "system"]);
    }

    #[test]
    fn test_spec_has_security_scheme_and_schemas() {
        let components = ApiDoc::openapi().components.unwrap();
        assert!(components.security_schemes.contains_key("api_key"));
        assert!(components.schemas.contains_key("JobStatus"));
        assert!(components.schemas.contains_key("ApiError"));
    }

    #[test]
    fn test_spec_serializes_as_openapi_3() {
        let json = serde_json::to_value(ApiDoc::openapi()).unwrap();
        assert!(json["openapi"].as_str().unwrap().starts_with("3."));
    }
}
