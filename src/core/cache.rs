//! Local file cache for provider downloads.
//!
//! The cache is deliberately simple: a download is cached when its target file
//! exists. Interrupted pipelines resume by re-running the same retrieve call;
//! periods already on disk are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::utils::error::Result;

#[derive(Debug, Clone)]
pub struct DownloadCache {
    dir: PathBuf,
}

impl DownloadCache {
    /// Open (creating if needed) a cache rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn target(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.target(file_name).exists()
    }
}

/// Cache file name for a whole-request download: scope plus a short hash of
/// the canonical request parameters.
pub fn request_cache_key(scope: &str, params: &Value, ext: &str) -> String {
    let canonical = params.to_string();
    let digest = md5::compute(canonical.as_bytes());
    let hash = format!("{:x}", digest);
    format!("{}_{}.{}", scope, &hash[..10], ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn cache_key_is_stable_and_parameter_sensitive() {
        let a = json!({"variable": ["2m_temperature"], "year": ["2024"]});
        let b = json!({"variable": ["2m_temperature"], "year": ["2025"]});
        let key_a = request_cache_key("era5_land_monthly", &a, "nc");
        let key_a2 = request_cache_key("era5_land_monthly", &a, "nc");
        let key_b = request_cache_key("era5_land_monthly", &b, "nc");
        assert_eq!(key_a, key_a2);
        assert_ne!(key_a, key_b);
        assert!(key_a.starts_with("era5_land_monthly_"));
        assert!(key_a.ends_with(".nc"));
    }

    #[test]
    fn open_creates_directory_and_tracks_files() {
        let tmp = TempDir::new().unwrap();
        let cache = DownloadCache::open(tmp.path().join("downloads")).unwrap();
        assert!(cache.dir().exists());
        assert!(!cache.contains("a.nc"));
        std::fs::write(cache.target("a.nc"), b"data").unwrap();
        assert!(cache.contains("a.nc"));
    }
}
