use futures::future::join_all;
use validator::Validate;

use crate::entities::image::{
    DeleteImageRequest, ImageDeletedResponse, ImageDimensions, ImageSetInsert,
    ImageUploadResponse, ImageVariants, UploadedImage,
};
use crate::errors::AppError;
use crate::media::paths::{generate_base_name, public_url, ArtifactPaths};
use crate::media::variants::{compression_ratio, derive_variants, format_ratio, DerivedSet};
use crate::repositories::image_set::ImageSetRepository;
use crate::storage::blob::BlobStorage;

// ───── Constants ──────────────────────────────────────────────────────
const MAX_BASE_NAME_ATTEMPTS: u32 = 5;

pub struct ImageHandler<B, R>
where
    B: BlobStorage,
    R: ImageSetRepository,
{
    pub storage: B,
    pub image_set_repo: R,
}

impl<B, R> ImageHandler<B, R>
where
    B: BlobStorage,
    R: ImageSetRepository,
{
    pub fn new(storage: B, image_set_repo: R) -> Self {
        ImageHandler {
            storage,
            image_set_repo,
        }
    }

    /// Runs the full upload pipeline: validate, derive every variant in
    /// memory, allocate a unique base name, commit all members to
    /// storage and record the manifest row. Nothing is left behind on
    /// failure.
    pub async fn upload_image(
        &self,
        upload: UploadedImage,
    ) -> Result<ImageUploadResponse, AppError> {
        let extension = upload.validate()?;
        let original_size = upload.bytes.len();

        let set = derive_variants(upload.bytes, extension).await?;
        let paths = self.unique_artifact_paths(extension).await?;

        self.commit_artifacts(&paths, &set).await?;

        let insert = ImageSetInsert::from_artifacts(&paths, &set, original_size);
        if let Err(e) = self.image_set_repo.create_image_set(&insert).await {
            // The set must not be observable without its manifest row.
            self.delete_members(&paths.members()).await;
            return Err(e);
        }

        let optimized_size = set.primary.len() as u64;
        let ratio = compression_ratio(original_size as u64, optimized_size);

        tracing::info!(
            path = %paths.primary(),
            original_size,
            optimized_size,
            "image uploaded"
        );

        Ok(ImageUploadResponse {
            message: "Image uploaded successfully".to_string(),
            path: paths.primary(),
            url: public_url(&paths.primary()),
            original_size: original_size as u64,
            optimized_size,
            compression_ratio: format_ratio(ratio),
            dimensions: ImageDimensions {
                width: set.width,
                height: set.height,
            },
            variants: ImageVariants {
                webp: public_url(&paths.webp()),
                thumbnail: public_url(&paths.thumbnail()),
                medium: public_url(&paths.medium()),
            },
        })
    }

    /// Deletes an artifact set by any of its member paths.
    ///
    /// The manifest is consulted first; when a row matches, exactly its
    /// recorded members are removed along with the row. Sets without a
    /// manifest row fall back to sibling reconstruction from the naming
    /// convention. Deletion is idempotent: missing members are skipped
    /// and a repeat call still succeeds.
    pub async fn delete_image(
        &self,
        request: DeleteImageRequest,
    ) -> Result<ImageDeletedResponse, AppError> {
        request.validate()?;
        let path = request.path.trim();

        let parsed = ArtifactPaths::parse(path)
            .ok_or_else(|| AppError::InvalidInput("Unrecognized image path".to_string()))?;

        if let Some(row) = self.image_set_repo.find_by_member_path(path).await? {
            self.delete_members(&row.member_paths).await;
            match self.image_set_repo.delete_image_set(&row.id).await {
                // A concurrent delete already removed the row.
                Ok(()) | Err(AppError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
            tracing::info!(path = %path, base = %row.base, "image set deleted");
        } else {
            self.delete_members(&parsed.members()).await;
            tracing::info!(path = %path, "unmanifested image set deleted by convention");
        }

        Ok(ImageDeletedResponse {
            message: "Image deleted successfully".to_string(),
        })
    }

    /// Picks a base name no existing manifest row or stored blob uses.
    /// The WebP member doubles as the cross-extension probe, so two
    /// uploads with different formats cannot share a base.
    async fn unique_artifact_paths(&self, extension: &str) -> Result<ArtifactPaths, AppError> {
        for _ in 0..MAX_BASE_NAME_ATTEMPTS {
            let paths = ArtifactPaths::new(generate_base_name(), extension);
            if self.image_set_repo.base_exists(paths.base()).await? {
                continue;
            }
            if self.storage.exists(&paths.primary()).await?
                || self.storage.exists(&paths.webp()).await?
            {
                continue;
            }
            return Ok(paths);
        }
        Err(AppError::InternalError(
            "Could not allocate a unique image name".to_string(),
        ))
    }

    /// Writes every member of the set; on the first failure the members
    /// written so far are removed before the error is returned.
    async fn commit_artifacts(
        &self,
        paths: &ArtifactPaths,
        set: &DerivedSet,
    ) -> Result<(), AppError> {
        let members: Vec<(String, &[u8])> = vec![
            (paths.primary(), set.primary.as_slice()),
            (paths.webp(), set.webp.as_slice()),
            (paths.thumbnail(), set.thumbnail.as_slice()),
            (paths.medium(), set.medium.as_slice()),
        ];

        let mut written: Vec<String> = Vec::new();
        for (key, data) in members {
            // For WebP uploads the primary and WebP member share a key.
            if written.contains(&key) {
                continue;
            }
            match self.storage.put(&key, data).await {
                Ok(()) => written.push(key),
                Err(e) => {
                    tracing::warn!(key = %key, "artifact write failed, rolling back: {}", e);
                    self.delete_members(&written).await;
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }

    /// Best-effort removal of a member list. Individual failures are
    /// logged and do not stop the rest of the set from being deleted.
    async fn delete_members(&self, keys: &[String]) {
        let deletions = keys.iter().map(|key| self.storage.delete(key));
        for (key, result) in keys.iter().zip(join_all(deletions).await) {
            if let Err(e) = result {
                tracing::warn!(key = %key, "Failed to delete artifact: {}", e);
            }
        }
    }
}
