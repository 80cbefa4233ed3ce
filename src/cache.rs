//! Placeholder cache for incremental manifest builds.
//!
//! Decoding a full-size JPEG just to shrink it to ten pixels is the bulk of
//! a manifest build. This module lets the builder skip both the probe and the
//! placeholder step when neither the source image nor the placeholder
//! parameters changed since the last run.
//!
//! ## Cache keys
//!
//! Lookups are by `"{source_hash}:{params_hash}"`:
//!
//! - **`source_hash`**: SHA-256 of the source file contents. Content-based
//!   rather than mtime-based so it survives `git checkout` and re-downloads.
//!   Renaming a file keeps its cache entry.
//! - **`params_hash`**: SHA-256 of the placeholder bound and format. Changing
//!   `placeholder.max_edge` invalidates every entry.
//!
//! ## Storage
//!
//! `.folio-cache.json`, written next to the output manifest. A missing,
//! corrupt or outdated file loads as an empty cache; the build never fails
//! because of it.
//!
//! Pass `--no-cache` to `folio manifest` to start from an empty cache.

use crate::imaging::PlaceholderFormat;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the cache file within the manifest's directory.
pub const CACHE_FILENAME: &str = ".folio-cache.json";

/// Bump to invalidate all existing caches when the format or key
/// computation changes.
const CACHE_VERSION: u32 = 1;

/// What the builder would otherwise compute for one source image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CachedPlaceholder {
    pub width: u32,
    pub height: u32,
    #[serde(rename = "blurDataURL")]
    pub blur_data_url: String,
}

/// On-disk placeholder cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceholderCache {
    pub version: u32,
    /// `"{source_hash}:{params_hash}"` → cached result.
    pub entries: HashMap<String, CachedPlaceholder>,
}

fn content_key(source_hash: &str, params_hash: &str) -> String {
    format!("{source_hash}:{params_hash}")
}

impl PlaceholderCache {
    /// Create an empty cache (used for `--no-cache` or first build).
    pub fn empty() -> Self {
        Self {
            version: CACHE_VERSION,
            entries: HashMap::new(),
        }
    }

    /// Load from `dir`. Returns an empty cache if the file doesn't exist or
    /// can't be parsed (version mismatch, corruption).
    pub fn load(dir: &Path) -> Self {
        let content = match std::fs::read_to_string(cache_path(dir)) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        match serde_json::from_str::<Self>(&content) {
            Ok(cache) if cache.version == CACHE_VERSION => cache,
            _ => Self::empty(),
        }
    }

    /// Save to `dir`.
    pub fn save(&self, dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(cache_path(dir), json)
    }

    pub fn get(&self, source_hash: &str, params_hash: &str) -> Option<&CachedPlaceholder> {
        self.entries.get(&content_key(source_hash, params_hash))
    }

    pub fn insert(&mut self, source_hash: &str, params_hash: &str, entry: CachedPlaceholder) {
        self.entries
            .insert(content_key(source_hash, params_hash), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// SHA-256 hash of the placeholder parameters.
pub fn hash_placeholder_params(max_edge: u32, format: PlaceholderFormat) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"placeholder\0");
    hasher.update(max_edge.to_le_bytes());
    hasher.update(format.mime_subtype().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Summary of cache performance for a build run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} decoded ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} decoded", self.misses)
        }
    }
}

/// Resolve the cache file path for a directory.
pub fn cache_path(dir: &Path) -> PathBuf {
    dir.join(CACHE_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sample() -> CachedPlaceholder {
        CachedPlaceholder {
            width: 4000,
            height: 3000,
            blur_data_url: "data:image/png;base64,AAAA".into(),
        }
    }

    #[test]
    fn empty_cache_has_no_entries() {
        let c = PlaceholderCache::empty();
        assert_eq!(c.version, CACHE_VERSION);
        assert!(c.is_empty());
    }

    #[test]
    fn get_hit_and_misses() {
        let mut c = PlaceholderCache::empty();
        c.insert("src123", "prm456", sample());

        assert_eq!(c.get("src123", "prm456"), Some(&sample()));
        assert_eq!(c.get("other", "prm456"), None);
        assert_eq!(c.get("src123", "other"), None);
    }

    #[test]
    fn insert_same_key_replaces() {
        let mut c = PlaceholderCache::empty();
        c.insert("s", "p", sample());
        let mut updated = sample();
        updated.width = 1;
        c.insert("s", "p", updated.clone());

        assert_eq!(c.len(), 1);
        assert_eq!(c.get("s", "p"), Some(&updated));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let mut c = PlaceholderCache::empty();
        c.insert("s1", "p1", sample());
        c.insert("s2", "p2", sample());

        c.save(tmp.path()).unwrap();
        let loaded = PlaceholderCache::load(tmp.path());

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("s1", "p1"), Some(&sample()));
    }

    #[test]
    fn saved_file_uses_manifest_key_name() {
        let tmp = TempDir::new().unwrap();
        let mut c = PlaceholderCache::empty();
        c.insert("s", "p", sample());
        c.save(tmp.path()).unwrap();

        let raw = fs::read_to_string(cache_path(tmp.path())).unwrap();
        assert!(raw.contains("\"blurDataURL\""));
    }

    #[test]
    fn load_missing_file_returns_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(PlaceholderCache::load(tmp.path()).is_empty());
    }

    #[test]
    fn load_corrupt_json_returns_empty() {
        let tmp = TempDir::new().unwrap();
        fs::write(cache_path(tmp.path()), "not json").unwrap();
        assert!(PlaceholderCache::load(tmp.path()).is_empty());
    }

    #[test]
    fn load_wrong_version_returns_empty() {
        let tmp = TempDir::new().unwrap();
        let json = format!(
            r#"{{"version": {}, "entries": {{"a:b": {{"width":1,"height":1,"blurDataURL":"x"}}}}}}"#,
            CACHE_VERSION + 1
        );
        fs::write(cache_path(tmp.path()), json).unwrap();
        assert!(PlaceholderCache::load(tmp.path()).is_empty());
    }

    #[test]
    fn hash_file_deterministic_and_content_sensitive() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.bin");

        fs::write(&path, b"version 1").unwrap();
        let h1 = hash_file(&path).unwrap();
        assert_eq!(h1, hash_file(&path).unwrap());
        assert_eq!(h1.len(), 64);

        fs::write(&path, b"version 2").unwrap();
        assert_ne!(h1, hash_file(&path).unwrap());
    }

    #[test]
    fn hash_placeholder_params_varies_with_edge() {
        assert_eq!(
            hash_placeholder_params(10, PlaceholderFormat::Png),
            hash_placeholder_params(10, PlaceholderFormat::Png)
        );
        assert_ne!(
            hash_placeholder_params(10, PlaceholderFormat::Png),
            hash_placeholder_params(16, PlaceholderFormat::Png)
        );
    }

    #[test]
    fn cache_stats_display() {
        let mut s = CacheStats::default();
        s.miss();
        s.miss();
        assert_eq!(s.to_string(), "2 decoded");
        s.hit();
        assert_eq!(s.to_string(), "1 cached, 2 decoded (3 total)");
    }
}
