use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::AppError;
use crate::core::extractor::ValidatedJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::files::dtos::{
    is_mime_type_allowed, sanitize_folder, DeleteFileByUrlDto, DeleteFileResponseDto,
    FileResponseDto, UploadFileDto, ALLOWED_MIME_TYPES, MAX_FILE_SIZE,
};
use crate::features::files::services::FileService;
use crate::shared::types::ApiResponse;

/// Upload an image
///
/// Accepts multipart/form-data with:
/// - `file`: The image to upload (required)
/// - `folder`: Target folder (optional, defaults to "uploads")
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "Image upload with optional folder",
    ),
    responses(
        (status = 201, description = "File uploaded successfully", body = ApiResponse<FileResponseDto>),
        (status = 400, description = "Missing file, unsupported type or file too large"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Forbidden - admin only")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_file(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<FileService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponseDto>>), AppError> {
    let mut file: Option<(Vec<u8>, String, String)> = None;
    let mut folder: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let file_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());

                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                file = Some((data.to_vec(), file_name, content_type));
            }
            "folder" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read folder field: {}", e))
                })?;
                folder = Some(text);
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let (data, file_name, content_type) =
        file.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;

    if data.is_empty() {
        return Err(AppError::BadRequest("File is empty".to_string()));
    }

    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::BadRequest(format!(
            "File too large. Maximum size is {} MB",
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }

    if !is_mime_type_allowed(&content_type) {
        return Err(AppError::BadRequest(format!(
            "File type '{}' is not allowed. Allowed types: {}",
            content_type,
            ALLOWED_MIME_TYPES.join(", ")
        )));
    }

    let folder = sanitize_folder(folder.as_deref());
    let response = service
        .upload_file(data, &file_name, &content_type, &folder, user.id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(response),
            Some("File uploaded successfully".to_string()),
            None,
        )),
    ))
}

/// Delete an uploaded file by its URL
#[utoipa::path(
    delete,
    path = "/api/upload",
    tag = "files",
    request_body = DeleteFileByUrlDto,
    responses(
        (status = 200, description = "File deleted successfully", body = ApiResponse<DeleteFileResponseDto>),
        (status = 400, description = "Invalid URL"),
        (status = 403, description = "Forbidden - admin only")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_file_by_url(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<FileService>>,
    ValidatedJson(dto): ValidatedJson<DeleteFileByUrlDto>,
) -> Result<Json<ApiResponse<DeleteFileResponseDto>>, AppError> {
    service.delete_by_url(&dto.url).await?;

    Ok(Json(ApiResponse::success(
        Some(DeleteFileResponseDto { deleted: true }),
        Some("File deleted successfully".to_string()),
        None,
    )))
}
