//! URL download handlers: start a job, poll it, list all jobs.

use crate::api::AppState;
use crate::error::{ApiError, Error};
use crate::types::{DownloadRequest, DownloadStarted, JobId, JobStatus};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};

/// POST /api/zim/download - Start downloading a ZIM file from a URL
#[utoipa::path(
    post,
    path = "/api/zim/download",
    tag = "downloads",
    request_body = DownloadRequest,
    responses(
        (status = 200, description = "Download started", body = DownloadStarted),
        (status = 400, description = "Missing or invalid URL, or the file already exists", body = ApiError),
        (status = 503, description = "Shutting down", body = ApiError)
    )
)]
pub async fn start_download(
    State(state): State<AppState>,
    body: Result<Json<DownloadRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return ApiError::validation(rejection.body_text()).into_response(),
    };

    let Some(url) = request.url.filter(|u| !u.trim().is_empty()) else {
        return ApiError::validation("URL is required").into_response();
    };

    match state.manager.submit_download(&url).await {
        Ok(job) => Json(DownloadStarted {
            job_id: job.id,
            filename: job.target_filename,
            status: "started".to_string(),
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/download/:job_id/status - Status of one download job
#[utoipa::path(
    get,
    path = "/api/download/{job_id}/status",
    tag = "downloads",
    params(
        ("job_id" = String, Path, description = "Job id returned when the download was started")
    ),
    responses(
        (status = 200, description = "Job status", body = JobStatus),
        (status = 404, description = "Download job not found", body = ApiError)
    )
)]
pub async fn get_download_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobStatus>, Error> {
    state
        .manager
        .download_status(&JobId::from(job_id))
        .await
        .map(Json)
}

/// GET /api/downloads - Every job since startup, oldest first
#[utoipa::path(
    get,
    path = "/api/downloads",
    tag = "downloads",
    responses(
        (status = 200, description = "All download jobs", body = Vec<JobStatus>)
    )
)]
pub async fn list_downloads(State(state): State<AppState>) -> Json<Vec<JobStatus>> {
    Json(state.manager.list_jobs().await)
}
