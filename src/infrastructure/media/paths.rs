//! Naming and path conventions for uploaded images and their variants.
//!
//! Every upload is assigned a random base name; the optimized original and
//! all derived variants share that base so any one path identifies the
//! whole set.

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

// ───── Constants ─────────────────────────────
/// Directory under the storage root holding all image artifacts.
pub const IMAGES_DIR: &str = "images";
/// Length of the random base name assigned to each upload.
pub const BASE_NAME_LEN: usize = 20;

const THUMB_SUFFIX: &str = "_thumb";
const MEDIUM_SUFFIX: &str = "_medium";

/// Generates a random alphanumeric base name for a new upload.
pub fn generate_base_name() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(BASE_NAME_LEN)
        .map(char::from)
        .collect()
}

/// Maps a storage key to the URL it is served under.
pub fn public_url(key: &str) -> String {
    format!("/storage/{}", key)
}

/// Storage keys for one image upload: the optimized original plus its
/// WebP, thumbnail and medium variants, all derived from one base name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    base: String,
    extension: String,
}

impl ArtifactPaths {
    pub fn new(base: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            extension: extension.into(),
        }
    }

    /// Resolves any member path back to its artifact set.
    ///
    /// Accepts the primary path as well as variant paths: a trailing
    /// `_thumb` or `_medium` on the stem is stripped, so deleting by a
    /// variant path targets the same set as deleting by the primary.
    /// Returns `None` for paths outside the images directory, nested
    /// paths, or paths without a stem and extension.
    pub fn parse(path: &str) -> Option<Self> {
        let name = path.strip_prefix(IMAGES_DIR)?.strip_prefix('/')?;
        if name.contains('/') || name.contains("..") {
            return None;
        }
        let (stem, extension) = name.rsplit_once('.')?;
        if stem.is_empty() || extension.is_empty() {
            return None;
        }
        let base = stem
            .strip_suffix(THUMB_SUFFIX)
            .or_else(|| stem.strip_suffix(MEDIUM_SUFFIX))
            .unwrap_or(stem);
        Some(Self::new(base, extension.to_lowercase()))
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Key of the optimized original, e.g. `images/aB3x...9Z.jpg`.
    pub fn primary(&self) -> String {
        format!("{}/{}.{}", IMAGES_DIR, self.base, self.extension)
    }

    pub fn webp(&self) -> String {
        format!("{}/{}.webp", IMAGES_DIR, self.base)
    }

    pub fn thumbnail(&self) -> String {
        format!(
            "{}/{}{}.{}",
            IMAGES_DIR, self.base, THUMB_SUFFIX, self.extension
        )
    }

    pub fn medium(&self) -> String {
        format!(
            "{}/{}{}.{}",
            IMAGES_DIR, self.base, MEDIUM_SUFFIX, self.extension
        )
    }

    /// All distinct keys in the set. For WebP uploads the primary and the
    /// WebP variant are the same key, so it appears once.
    pub fn members(&self) -> Vec<String> {
        let mut keys = vec![
            self.primary(),
            self.webp(),
            self.thumbnail(),
            self.medium(),
        ];
        keys.dedup();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_names_are_alphanumeric_and_sized() {
        let name = generate_base_name();
        assert_eq!(name.len(), BASE_NAME_LEN);
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn members_cover_all_variants() {
        let paths = ArtifactPaths::new("abc123", "jpg");
        assert_eq!(paths.primary(), "images/abc123.jpg");
        assert_eq!(paths.webp(), "images/abc123.webp");
        assert_eq!(paths.thumbnail(), "images/abc123_thumb.jpg");
        assert_eq!(paths.medium(), "images/abc123_medium.jpg");
        assert_eq!(paths.members().len(), 4);
    }

    #[test]
    fn webp_primary_collapses_into_one_key() {
        let paths = ArtifactPaths::new("abc123", "webp");
        let members = paths.members();
        assert_eq!(members[0], "images/abc123.webp");
        assert_eq!(members.len(), 3);
    }

    #[test]
    fn parse_accepts_primary_path() {
        let paths = ArtifactPaths::parse("images/abc123.jpg").unwrap();
        assert_eq!(paths.base(), "abc123");
        assert_eq!(paths.extension(), "jpg");
    }

    #[test]
    fn parse_resolves_variant_paths_to_the_same_set() {
        let primary = ArtifactPaths::parse("images/abc123.jpg").unwrap();
        let thumb = ArtifactPaths::parse("images/abc123_thumb.jpg").unwrap();
        let medium = ArtifactPaths::parse("images/abc123_medium.jpg").unwrap();
        assert_eq!(primary, thumb);
        assert_eq!(primary, medium);
    }

    #[test]
    fn parse_rejects_foreign_and_malformed_paths() {
        assert!(ArtifactPaths::parse("avatars/abc123.jpg").is_none());
        assert!(ArtifactPaths::parse("images/sub/abc123.jpg").is_none());
        assert!(ArtifactPaths::parse("images/../secret.jpg").is_none());
        assert!(ArtifactPaths::parse("images/noextension").is_none());
        assert!(ArtifactPaths::parse("images/.jpg").is_none());
        assert!(ArtifactPaths::parse("").is_none());
    }

    #[test]
    fn parse_normalizes_extension_case() {
        let paths = ArtifactPaths::parse("images/abc123.JPG").unwrap();
        assert_eq!(paths.extension(), "jpg");
    }
}
