use actix_multipart::form::{tempfile::TempFile, MultipartForm};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::errors::{AppError, FieldError};
use crate::media::paths::ArtifactPaths;
use crate::media::variants::DerivedSet;

// ───── Constants ──────────────────────────────────────────────────────
/// Business limit on the decoded upload body.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// ───── Upload Input ──────────────────────────────────────────────────

/// Multipart body of `POST /images`. The field is optional so a missing
/// file reaches the handler and gets the domain error instead of a
/// generic extractor message.
#[derive(Debug, MultipartForm)]
pub struct ImageUploadForm {
    pub image: Option<TempFile>,
}

/// Raw multipart upload, owned for the duration of one request.
#[derive(Debug)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
}

impl UploadedImage {
    /// Checks size and sniffed format, returning the canonical extension
    /// the artifact set will use. The client's declared content type and
    /// filename extension are ignored; only the magic bytes count.
    pub fn validate(&self) -> Result<&'static str, AppError> {
        if self.bytes.is_empty() {
            return Err(AppError::InvalidInput("No image provided".to_string()));
        }
        if self.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::ValidationError(vec![FieldError::new(
                "image",
                format!(
                    "Image must not exceed {} bytes",
                    MAX_UPLOAD_BYTES
                ),
            )]));
        }
        match infer::get(&self.bytes).map(|kind| kind.mime_type()) {
            Some("image/jpeg") => Ok("jpg"),
            Some("image/png") => Ok("png"),
            Some("image/gif") => Ok("gif"),
            Some("image/webp") => Ok("webp"),
            _ => Err(AppError::ValidationError(vec![FieldError::new(
                "image",
                "File must be a JPEG, PNG, GIF or WebP image",
            )])),
        }
    }
}

// ───── Database Models ───────────────────────────────────────────────

/// Manifest row: one persisted record per upload, listing every stored
/// member so deletion never has to guess sibling names.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ImageSetRow {
    pub id: Uuid,
    pub base: String,
    pub extension: String,
    pub primary_path: String,
    pub member_paths: Vec<String>,
    pub original_size: i64, // bytes
    pub optimized_size: i64, // bytes
    pub width: i32,
    pub height: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ImageSetInsert {
    pub base: String,
    pub extension: String,
    pub primary_path: String,
    pub member_paths: Vec<String>,
    pub original_size: i64,
    pub optimized_size: i64,
    pub width: i32,
    pub height: i32,
}

impl ImageSetInsert {
    pub fn from_artifacts(paths: &ArtifactPaths, set: &DerivedSet, original_size: usize) -> Self {
        ImageSetInsert {
            base: paths.base().to_string(),
            extension: paths.extension().to_string(),
            primary_path: paths.primary(),
            member_paths: paths.members(),
            original_size: original_size as i64,
            optimized_size: set.primary.len() as i64,
            width: set.width as i32,
            height: set.height as i32,
        }
    }
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Public URLs of the derived renditions.
#[derive(Debug, Serialize)]
pub struct ImageVariants {
    pub webp: String,
    pub thumbnail: String,
    pub medium: String,
}

#[derive(Debug, Serialize)]
pub struct ImageUploadResponse {
    pub message: String,
    pub path: String,
    pub url: String,
    pub original_size: u64,
    pub optimized_size: u64,
    pub compression_ratio: String,
    pub dimensions: ImageDimensions,
    pub variants: ImageVariants,
}

#[derive(Debug, Serialize)]
pub struct ImageDeletedResponse {
    pub message: String,
}

// ───── Input & Validation Requests ──────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct DeleteImageRequest {
    #[validate(length(min = 1, message = "Path is required"))]
    pub path: String,
}
