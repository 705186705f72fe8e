//! Stored file handlers: list, info, delete, upload.

use super::DeleteResponse;
use crate::api::AppState;
use crate::error::Error;
use crate::types::{UploadResult, ZimFileInfo};
use axum::{
    Json,
    extract::{Multipart, Path, State},
    response::{IntoResponse, Response},
};

/// GET /api/zim - List stored ZIM files, newest first
#[utoipa::path(
    get,
    path = "/api/zim",
    tag = "files",
    responses(
        (status = 200, description = "Stored ZIM files", body = Vec<ZimFileInfo>),
        (status = 500, description = "Storage directory unreadable", body = crate::error::ApiError)
    )
)]
pub async fn list_files(State(state): State<AppState>) -> Response {
    match state.manager.list_files().await {
        Ok(files) => Json(files).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/zim/:filename/info - Metadata for one file
#[utoipa::path(
    get,
    path = "/api/zim/{filename}/info",
    tag = "files",
    params(
        ("filename" = String, Path, description = "File name in storage")
    ),
    responses(
        (status = 200, description = "File metadata", body = ZimFileInfo),
        (status = 400, description = "Invalid filename", body = crate::error::ApiError),
        (status = 404, description = "File not found", body = crate::error::ApiError)
    )
)]
pub async fn get_file_info(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<ZimFileInfo>, Error> {
    state.manager.file_info(&filename).await.map(Json)
}

/// DELETE /api/zim/:filename - Delete a stored file
#[utoipa::path(
    delete,
    path = "/api/zim/{filename}",
    tag = "files",
    params(
        ("filename" = String, Path, description = "File name in storage")
    ),
    responses(
        (status = 200, description = "File deleted", body = DeleteResponse),
        (status = 400, description = "Invalid filename", body = crate::error::ApiError),
        (status = 404, description = "File not found", body = crate::error::ApiError)
    )
)]
pub async fn delete_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<DeleteResponse>, Error> {
    state.manager.delete_file(&filename).await?;
    Ok(Json(DeleteResponse {
        message: format!("File {} deleted successfully", filename),
    }))
}

/// POST /api/zim/upload - Upload a ZIM file (multipart field `file`)
#[utoipa::path(
    post,
    path = "/api/zim/upload",
    tag = "files",
    request_body(content = String, content_type = "multipart/form-data", description = "ZIM file in the `file` field"),
    responses(
        (status = 200, description = "File stored", body = UploadResult),
        (status = 400, description = "Missing file, wrong extension, empty body or name taken", body = crate::error::ApiError),
        (status = 413, description = "File exceeds the configured upload limit", body = crate::error::ApiError)
    )
)]
pub async fn upload_file(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Error::InvalidUpload(format!("malformed multipart body: {}", e))
                    .into_response();
            }
        };

        if field.name() != Some("file") {
            continue;
        }

        let Some(filename) = field.file_name().map(str::to_string) else {
            return Error::InvalidUpload("the 'file' field has no filename".to_string())
                .into_response();
        };

        return match state.manager.upload(&filename, field).await {
            Ok(result) => Json(result).into_response(),
            Err(e) => e.into_response(),
        };
    }

    Error::InvalidUpload("no file provided in 'file' field".to_string()).into_response()
}
