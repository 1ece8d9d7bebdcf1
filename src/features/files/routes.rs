use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::sync::Arc;

use crate::features::files::dtos::MAX_FILE_SIZE;
use crate::features::files::handlers::{delete_file_by_url, upload_file};
use crate::features::files::services::FileService;

pub fn routes(file_service: Arc<FileService>) -> Router {
    Router::new()
        .route(
            "/api/upload",
            // Body limit leaves room for multipart framing
            post(upload_file)
                .layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 1024 * 1024))
                .delete(delete_file_by_url),
        )
        .with_state(file_service)
}
