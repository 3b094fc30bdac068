use std::io::Cursor;

use chrono::{DateTime, Duration, Utc};
use mockall::{mock, Sequence};
use tempfile::tempdir;
use uuid::Uuid;

use blog_backend::entities::image::{DeleteImageRequest, ImageSetInsert, ImageSetRow, UploadedImage};
use blog_backend::errors::AppError;
use blog_backend::media::paths::ArtifactPaths;
use blog_backend::media::variants::derive_variants_sync;
use blog_backend::repositories::image_set::ImageSetRepository;
use blog_backend::storage::blob::{BlobStorage, StorageError, StorageResult};
use blog_backend::storage::local::LocalStorage;
use blog_backend::use_cases::images::ImageHandler;

// === Mock doubles ===

mock! {
    pub ImageSetRepo {}

    #[async_trait::async_trait]
    impl ImageSetRepository for ImageSetRepo {
        async fn create_image_set(&self, set: &ImageSetInsert) -> Result<Uuid, AppError>;
        async fn find_by_member_path(&self, path: &str) -> Result<Option<ImageSetRow>, AppError>;
        async fn base_exists(&self, base: &str) -> Result<bool, AppError>;
        async fn delete_image_set(&self, id: &Uuid) -> Result<(), AppError>;
        async fn list_created_before(
            &self,
            cutoff: DateTime<Utc>,
            limit: i64,
        ) -> Result<Vec<ImageSetRow>, AppError>;
    }
}

/// Storage wrapper that fails writes for keys containing a marker,
/// standing in for a backend that dies mid-commit.
struct FailingStorage {
    inner: LocalStorage,
    fail_on: &'static str,
}

#[async_trait::async_trait]
impl BlobStorage for FailingStorage {
    async fn put(&self, key: &str, data: &[u8]) -> StorageResult<()> {
        if key.contains(self.fail_on) {
            return Err(StorageError::Io("simulated write failure".to_string()));
        }
        self.inner.put(key, data).await
    }

    async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.inner.read(key).await
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.inner.delete(key).await
    }
}

// === Fixture helpers ===

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    });
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn png_upload(width: u32, height: u32) -> UploadedImage {
    UploadedImage {
        bytes: png_bytes(width, height),
        file_name: Some("photo.png".to_string()),
    }
}

fn manifest_row(paths: &ArtifactPaths) -> ImageSetRow {
    ImageSetRow {
        id: Uuid::new_v4(),
        base: paths.base().to_string(),
        extension: paths.extension().to_string(),
        primary_path: paths.primary(),
        member_paths: paths.members(),
        original_size: 4096,
        optimized_size: 2048,
        width: 800,
        height: 600,
        created_at: Utc::now() - Duration::hours(2),
    }
}

async fn write_members(storage: &LocalStorage, paths: &ArtifactPaths) {
    for member in paths.members() {
        storage.put(&member, b"artifact bytes").await.unwrap();
    }
}

// === Upload tests ===

#[tokio::test]
async fn upload_stores_all_four_artifacts_with_shared_base() {
    let dir = tempdir().unwrap();
    let storage = LocalStorage::new(dir.path());

    let mut repo = MockImageSetRepo::new();
    repo.expect_base_exists().returning(|_| Ok(false));
    repo.expect_create_image_set()
        .withf(|insert: &ImageSetInsert| {
            insert.member_paths.len() == 4
                && insert.primary_path.ends_with(".png")
                && insert.width == 1200
                && insert.height == 675
        })
        .returning(|_| Ok(Uuid::new_v4()));

    let handler = ImageHandler::new(storage.clone(), repo);

    let upload = png_upload(1600, 900);
    let original_size = upload.bytes.len() as u64;

    let response = handler.upload_image(upload).await.unwrap();

    assert_eq!(response.message, "Image uploaded successfully");
    assert_eq!(response.original_size, original_size);
    assert_eq!(response.url, format!("/storage/{}", response.path));
    assert!(response.compression_ratio.ends_with('%'));
    assert_eq!(response.dimensions.width, 1200);
    assert_eq!(response.dimensions.height, 675);

    let paths = ArtifactPaths::parse(&response.path).expect("primary path parses");
    assert_eq!(paths.base().len(), 20);
    for member in paths.members() {
        assert!(storage.exists(&member).await.unwrap(), "missing {member}");
    }

    assert_eq!(response.variants.webp, format!("/storage/{}", paths.webp()));
    assert_eq!(
        response.variants.thumbnail,
        format!("/storage/{}", paths.thumbnail())
    );
    assert_eq!(
        response.variants.medium,
        format!("/storage/{}", paths.medium())
    );

    let stored_primary = storage.read(&response.path).await.unwrap();
    assert_eq!(stored_primary.len() as u64, response.optimized_size);
}

#[tokio::test]
async fn upload_webp_input_dedupes_primary_and_webp() {
    let dir = tempdir().unwrap();
    let storage = LocalStorage::new(dir.path());

    let mut repo = MockImageSetRepo::new();
    repo.expect_base_exists().returning(|_| Ok(false));
    repo.expect_create_image_set()
        .withf(|insert: &ImageSetInsert| {
            insert.extension == "webp" && insert.member_paths.len() == 3
        })
        .returning(|_| Ok(Uuid::new_v4()));

    let handler = ImageHandler::new(storage.clone(), repo);

    let webp_input = derive_variants_sync(&png_bytes(640, 480), "png").unwrap().webp;
    let response = handler
        .upload_image(UploadedImage {
            bytes: webp_input,
            file_name: Some("photo.webp".to_string()),
        })
        .await
        .unwrap();

    // Primary and WebP variant are the same object.
    assert_eq!(response.variants.webp, response.url);

    let paths = ArtifactPaths::parse(&response.path).unwrap();
    assert_eq!(paths.members().len(), 3);
    for member in paths.members() {
        assert!(storage.exists(&member).await.unwrap(), "missing {member}");
    }
}

#[tokio::test]
async fn upload_rejects_non_image_payload() {
    let dir = tempdir().unwrap();
    // No repository expectations: validation fails first.
    let handler = ImageHandler::new(LocalStorage::new(dir.path()), MockImageSetRepo::new());

    let result = handler
        .upload_image(UploadedImage {
            bytes: b"%PDF-1.4 definitely not an image".to_vec(),
            file_name: Some("report.pdf".to_string()),
        })
        .await;

    assert!(matches!(result, Err(AppError::ValidationError(_))));
}

#[tokio::test]
async fn upload_rolls_back_written_members_when_a_write_fails() {
    let dir = tempdir().unwrap();
    let inner = LocalStorage::new(dir.path());
    // Members commit in primary, webp, thumb, medium order; failing the
    // last write leaves three blobs to roll back.
    let storage = FailingStorage {
        inner: inner.clone(),
        fail_on: "_medium",
    };

    let mut repo = MockImageSetRepo::new();
    repo.expect_base_exists().returning(|_| Ok(false));

    let handler = ImageHandler::new(storage, repo);

    let result = handler.upload_image(png_upload(1600, 900)).await;
    assert!(matches!(result, Err(AppError::InternalError(_))));

    let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("images"))
        .map(|entries| entries.filter_map(|e| e.ok()).collect())
        .unwrap_or_default();
    assert!(leftovers.is_empty(), "leftover artifacts: {:?}", leftovers);
}

#[tokio::test]
async fn upload_removes_members_when_manifest_insert_fails() {
    let dir = tempdir().unwrap();
    let storage = LocalStorage::new(dir.path());

    let mut repo = MockImageSetRepo::new();
    repo.expect_base_exists().returning(|_| Ok(false));
    repo.expect_create_image_set()
        .returning(|_| Err(AppError::InternalError("insert failed".to_string())));

    let handler = ImageHandler::new(storage, repo);

    let result = handler.upload_image(png_upload(800, 600)).await;
    assert!(matches!(result, Err(AppError::InternalError(_))));

    let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("images"))
        .map(|entries| entries.filter_map(|e| e.ok()).collect())
        .unwrap_or_default();
    assert!(leftovers.is_empty(), "leftover artifacts: {:?}", leftovers);
}

#[tokio::test]
async fn upload_retries_base_names_until_one_is_free() {
    let dir = tempdir().unwrap();
    let storage = LocalStorage::new(dir.path());

    let mut repo = MockImageSetRepo::new();
    let mut seq = Sequence::new();
    repo.expect_base_exists()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(true));
    repo.expect_base_exists()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(false));
    repo.expect_create_image_set().returning(|_| Ok(Uuid::new_v4()));

    let handler = ImageHandler::new(storage, repo);

    let response = handler.upload_image(png_upload(320, 240)).await.unwrap();
    assert!(response.path.starts_with("images/"));
}

#[tokio::test]
async fn upload_gives_up_when_no_base_name_is_free() {
    let dir = tempdir().unwrap();
    let storage = LocalStorage::new(dir.path());

    let mut repo = MockImageSetRepo::new();
    repo.expect_base_exists().times(5).returning(|_| Ok(true));

    let handler = ImageHandler::new(storage, repo);

    let result = handler.upload_image(png_upload(320, 240)).await;
    assert!(matches!(result, Err(AppError::InternalError(_))));
}

// === Delete tests ===

#[tokio::test]
async fn delete_removes_exactly_the_manifested_members() {
    let dir = tempdir().unwrap();
    let storage = LocalStorage::new(dir.path());

    let paths = ArtifactPaths::new("abc123manifested0000", "jpg");
    write_members(&storage, &paths).await;
    storage.put("images/unrelated.jpg", b"keep me").await.unwrap();

    let row = manifest_row(&paths);
    let row_id = row.id;

    let mut repo = MockImageSetRepo::new();
    repo.expect_find_by_member_path()
        .withf(move |path: &str| path == "images/abc123manifested0000.jpg")
        .returning(move |_| Ok(Some(row.clone())));
    repo.expect_delete_image_set()
        .withf(move |id: &Uuid| *id == row_id)
        .times(1)
        .returning(|_| Ok(()));

    let handler = ImageHandler::new(storage.clone(), repo);

    let response = handler
        .delete_image(DeleteImageRequest {
            path: paths.primary(),
        })
        .await
        .unwrap();

    assert_eq!(response.message, "Image deleted successfully");
    for member in paths.members() {
        assert!(!storage.exists(&member).await.unwrap(), "leftover {member}");
    }
    assert!(storage.exists("images/unrelated.jpg").await.unwrap());
}

#[tokio::test]
async fn delete_falls_back_to_naming_convention_without_manifest() {
    let dir = tempdir().unwrap();
    let storage = LocalStorage::new(dir.path());

    let paths = ArtifactPaths::new("noManifestBase000000", "jpg");
    write_members(&storage, &paths).await;

    let mut repo = MockImageSetRepo::new();
    repo.expect_find_by_member_path().returning(|_| Ok(None));

    let handler = ImageHandler::new(storage.clone(), repo);

    handler
        .delete_image(DeleteImageRequest {
            path: paths.primary(),
        })
        .await
        .unwrap();

    for member in paths.members() {
        assert!(!storage.exists(&member).await.unwrap(), "leftover {member}");
    }
}

#[tokio::test]
async fn delete_by_variant_path_removes_the_whole_set() {
    let dir = tempdir().unwrap();
    let storage = LocalStorage::new(dir.path());

    let paths = ArtifactPaths::new("variantPathBase00000", "png");
    write_members(&storage, &paths).await;

    let mut repo = MockImageSetRepo::new();
    repo.expect_find_by_member_path().returning(|_| Ok(None));

    let handler = ImageHandler::new(storage.clone(), repo);

    // The caller hands over the thumbnail path, not the primary.
    handler
        .delete_image(DeleteImageRequest {
            path: paths.thumbnail(),
        })
        .await
        .unwrap();

    for member in paths.members() {
        assert!(!storage.exists(&member).await.unwrap(), "leftover {member}");
    }
}

#[tokio::test]
async fn delete_is_idempotent() {
    let dir = tempdir().unwrap();
    let storage = LocalStorage::new(dir.path());

    let mut repo = MockImageSetRepo::new();
    repo.expect_find_by_member_path().times(2).returning(|_| Ok(None));

    let handler = ImageHandler::new(storage, repo);

    let first = handler
        .delete_image(DeleteImageRequest {
            path: "images/longGoneBase00000000.jpg".to_string(),
        })
        .await
        .unwrap();
    let second = handler
        .delete_image(DeleteImageRequest {
            path: "images/longGoneBase00000000.jpg".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(first.message, second.message);
}

#[tokio::test]
async fn delete_rejects_malformed_paths() {
    let dir = tempdir().unwrap();
    // No repository expectations: bad paths never reach the manifest.
    let handler = ImageHandler::new(LocalStorage::new(dir.path()), MockImageSetRepo::new());

    let empty = handler
        .delete_image(DeleteImageRequest {
            path: String::new(),
        })
        .await;
    assert!(matches!(empty, Err(AppError::ValidationError(_))));

    for path in ["avatars/photo.jpg", "images/../secret.jpg", "images/noext"] {
        let result = handler
            .delete_image(DeleteImageRequest {
                path: path.to_string(),
            })
            .await;
        assert!(
            matches!(result, Err(AppError::InvalidInput(_))),
            "path: {path:?}"
        );
    }
}
