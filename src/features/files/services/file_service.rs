use sqlx::PgPool;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::dtos::{get_extension_from_content_type, FileResponseDto};
use crate::features::files::models::File;
use crate::modules::storage::MinIOClient;

const FILE_COLUMNS: &str = "id, file_key, original_filename, content_type, file_size, url, folder, uploaded_by, is_active, created_at, updated_at";

/// Service for media uploads
pub struct FileService {
    pool: PgPool,
    minio_client: Arc<MinIOClient>,
}

impl FileService {
    pub fn new(pool: PgPool, minio_client: Arc<MinIOClient>) -> Self {
        Self { pool, minio_client }
    }

    /// Store an image under `public/{folder}/` and record its metadata.
    ///
    /// `content_type` must already be one of the allowed image types.
    pub async fn upload_file(
        &self,
        data: Vec<u8>,
        original_filename: &str,
        content_type: &str,
        folder: &str,
        user_id: Uuid,
    ) -> Result<FileResponseDto> {
        let file_size = data.len() as i64;

        let extension = get_extension_from_content_type(content_type).ok_or_else(|| {
            AppError::BadRequest(format!("File type '{}' is not allowed", content_type))
        })?;
        let file_name = format!("{}.{}", Uuid::now_v7(), extension);

        let file_key = self.minio_client.public_key(folder, &file_name);
        self.minio_client
            .upload(&file_key, &data, content_type)
            .await?;

        debug!("File uploaded to MinIO: {}", file_key);

        let url = self.minio_client.public_url(&file_key);

        let query = format!(
            r#"
            INSERT INTO files (file_key, original_filename, content_type, file_size, url, folder, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            FILE_COLUMNS
        );

        let inserted = sqlx::query_as::<_, File>(&query)
            .bind(&file_key)
            .bind(original_filename)
            .bind(content_type)
            .bind(file_size)
            .bind(&url)
            .bind(folder)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await;

        // Without a metadata row the object would be unreachable for cleanup
        let minio_client = &self.minio_client;
        let key = file_key.as_str();
        let file = cleanup_on_error(inserted, move || async move {
            if let Err(e) = minio_client.delete(key).await {
                warn!("Failed to remove orphaned object {}: {}", key, e);
            }
        })
        .await
        .map_err(|e| {
            tracing::error!("Failed to save file metadata for {}: {:?}", file_key, e);
            AppError::Database(e)
        })?;

        info!(
            "File metadata saved: id={}, key={}, size={}",
            file.id, file.file_key, file.file_size
        );

        Ok(file.into())
    }

    /// Delete an uploaded object by its public URL.
    ///
    /// URLs outside this bucket are rejected. Objects uploaded before metadata
    /// was recorded are still removed from storage.
    pub async fn delete_by_url(&self, url: &str) -> Result<()> {
        let key = self.minio_client.key_from_url(url).ok_or_else(|| {
            AppError::BadRequest("URL does not point to an uploaded file".to_string())
        })?;

        self.minio_client.delete(&key).await?;
        debug!("File deleted from MinIO: {}", key);

        let result = sqlx::query(
            r#"
            UPDATE files
            SET is_active = FALSE, updated_at = NOW()
            WHERE file_key = $1 AND is_active = TRUE
            "#,
        )
        .bind(&key)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        info!(
            "File deleted: key={}, metadata_rows={}",
            key,
            result.rows_affected()
        );

        Ok(())
    }
}

/// Run `cleanup` when `result` is an error, then hand the result back unchanged
async fn cleanup_on_error<T, E, F, Fut>(
    result: std::result::Result<T, E>,
    cleanup: F,
) -> std::result::Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ()>,
{
    if result.is_err() {
        cleanup().await;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_failed_insert_triggers_object_cleanup() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        let saved: std::result::Result<i32, &str> = cleanup_on_error(Ok(7), move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .await;
        assert_eq!(saved, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let failed: std::result::Result<i32, &str> =
            cleanup_on_error(Err("insert failed"), move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        assert_eq!(failed, Err("insert failed"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
