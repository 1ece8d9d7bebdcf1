//! Object storage for catalog and merchandising media.
//!
//! Uploads go to a MinIO/S3-compatible bucket under a publicly readable
//! prefix, so every stored object has a stable public URL.

mod minio_client;

pub use minio_client::MinIOClient;
