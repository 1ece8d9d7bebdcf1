use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::files::models::File;
use crate::shared::slug::slugify;

/// Upload form, documented for Swagger UI only.
/// The handler reads the multipart body directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The image to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Target folder below the public prefix, e.g. "products" or "banners"
    #[schema(example = "products")]
    pub folder: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileResponseDto {
    pub id: Uuid,
    /// Public URL to store on products, categories and banners
    pub url: String,
    /// Object key in the bucket
    pub key: String,
    pub original_filename: String,
    pub content_type: String,
    pub file_size: i64,
    pub folder: String,
    pub created_at: DateTime<Utc>,
}

impl From<File> for FileResponseDto {
    fn from(f: File) -> Self {
        Self {
            id: f.id,
            url: f.url,
            key: f.file_key,
            original_filename: f.original_filename,
            content_type: f.content_type,
            file_size: f.file_size,
            folder: f.folder,
            created_at: f.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DeleteFileByUrlDto {
    /// The public URL returned by the upload
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteFileResponseDto {
    pub deleted: bool,
}

/// Image types accepted for catalog and home-page media
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
];

/// Maximum file size in bytes (10MB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

pub const DEFAULT_FOLDER: &str = "uploads";

pub fn is_mime_type_allowed(content_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&content_type)
}

pub fn get_extension_from_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/svg+xml" => Some("svg"),
        _ => None,
    }
}

/// Reduce a client-supplied folder to slug segments, e.g. "Home/Banners " -> "home/banners"
pub fn sanitize_folder(folder: Option<&str>) -> String {
    let cleaned = folder
        .unwrap_or_default()
        .split('/')
        .map(slugify)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if cleaned.is_empty() {
        DEFAULT_FOLDER.to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_types() {
        assert!(is_mime_type_allowed("image/svg+xml"));
        assert!(is_mime_type_allowed("image/webp"));
        assert!(!is_mime_type_allowed("application/pdf"));
        assert!(!is_mime_type_allowed("text/html"));
    }

    #[test]
    fn test_extensions() {
        assert_eq!(get_extension_from_content_type("image/jpeg"), Some("jpg"));
        assert_eq!(get_extension_from_content_type("image/svg+xml"), Some("svg"));
        assert_eq!(get_extension_from_content_type("video/mp4"), None);
    }

    #[test]
    fn test_sanitize_folder() {
        assert_eq!(sanitize_folder(None), "uploads");
        assert_eq!(sanitize_folder(Some("  ")), "uploads");
        assert_eq!(sanitize_folder(Some("Home/Banners ")), "home/banners");
        assert_eq!(sanitize_folder(Some("../../etc")), "etc");
    }
}
