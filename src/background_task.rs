use chrono::{Duration as ChronoDuration, Utc};
use tokio::time::{interval, Duration};

use crate::errors::AppError;
use crate::repositories::image_set::ImageSetRepository;
use crate::repositories::sqlx_repo::SqlxImageSetRepo;
use crate::storage::blob::BlobStorage;
use crate::storage::local::LocalStorage;

const SWEEP_INTERVAL_SECS: u64 = 60 * 60 * 24;
/// Sets younger than this are left alone; an upload could still be
/// in flight.
const SWEEP_MIN_AGE_HOURS: i64 = 24;
const SWEEP_BATCH_LIMIT: i64 = 500;

/// Daily reconciliation of the image-set manifest against storage.
///
/// A crash between a set's member deletions and its manifest-row
/// deletion leaves a row pointing at a missing primary blob. Each tick
/// removes such rows along with whatever members still exist.
pub async fn start_orphan_sweep(repo: SqlxImageSetRepo, storage: LocalStorage) {
    let mut interval = interval(Duration::from_secs(SWEEP_INTERVAL_SECS));

    loop {
        interval.tick().await;

        match sweep_orphaned_sets(&repo, &storage).await {
            Ok(0) => tracing::debug!("Orphan sweep found nothing to do"),
            Ok(count) => tracing::info!("Orphan sweep removed {} stale image sets", count),
            Err(e) => tracing::error!("Orphan sweep failed: {}", e),
        }
    }
}

/// One sweep pass over a bounded batch of old manifest rows. Returns
/// how many orphaned sets were removed.
pub async fn sweep_orphaned_sets<R, B>(repo: &R, storage: &B) -> Result<u64, AppError>
where
    R: ImageSetRepository,
    B: BlobStorage,
{
    let cutoff = Utc::now() - ChronoDuration::hours(SWEEP_MIN_AGE_HOURS);
    let candidates = repo.list_created_before(cutoff, SWEEP_BATCH_LIMIT).await?;

    let mut removed = 0u64;
    for set in candidates {
        // Unreadable storage counts as present; never reap on doubt.
        if storage.exists(&set.primary_path).await.unwrap_or(true) {
            continue;
        }

        for member in &set.member_paths {
            if let Err(e) = storage.delete(member).await {
                tracing::warn!(key = %member, "Sweep could not delete member: {}", e);
            }
        }

        match repo.delete_image_set(&set.id).await {
            Ok(()) => removed += 1,
            // Raced with an explicit delete; the row is gone either way.
            Err(AppError::NotFound(_)) => {}
            Err(e) => {
                tracing::warn!(base = %set.base, "Sweep could not delete manifest row: {}", e)
            }
        }
    }

    Ok(removed)
}
