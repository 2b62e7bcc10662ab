//! Byte cache keyed by canonical image-URL strings.
//!
//! The [`ImageCache`] trait is the seam the resolver consumes: `lookup` never
//! writes, `store` only runs after a successful fetch. Two implementations:
//!
//! - [`DiskCache`] — survives restarts. A JSON manifest maps URL keys to
//!   payload files named by the SHA-256 of the key, so arbitrary URLs never
//!   meet the filesystem's ideas about valid file names. A hit requires both
//!   a manifest entry and the payload file still being on disk.
//! - [`MemoryCache`] — a plain in-process map; the default for tests and for
//!   hosts that do their own persistence.
//!
//! Writes are atomic per key: payloads land in a temp file first and are
//! renamed into place, so concurrent writers may race (last completed write
//! wins) but can never interleave bytes.
//!
//! The manifest loads as empty when missing, unparseable, or written by a
//! different format version — a stale cache degrades to a cold one.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Name of the manifest file within the cache directory.
const MANIFEST_FILENAME: &str = "manifest.json";

/// Version of the cache layout. Bump to invalidate existing caches when the
/// entry format or file naming changes.
const MANIFEST_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("manifest error: {0}")]
    Manifest(String),
}

/// Raw-byte cache consumed by the resolver.
pub trait ImageCache: Send + Sync {
    /// Fetch the stored bytes for a key, if present. Never writes.
    fn lookup(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Persist bytes under a key, replacing any previous entry.
    fn store(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError>;
}

// =============================================================================
// MemoryCache
// =============================================================================

/// In-process byte cache. Cheap, unbounded, gone on drop.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }
}

impl ImageCache for MemoryCache {
    fn lookup(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn store(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

// =============================================================================
// DiskCache
// =============================================================================

/// A single cached payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct CacheEntry {
    /// Payload file name within the cache directory (SHA-256 of the key).
    file: String,
    /// Payload size, for `stats` reporting without touching the files.
    len: u64,
}

/// On-disk manifest mapping URL keys to payload files.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheManifest {
    version: u32,
    entries: HashMap<String, CacheEntry>,
}

impl CacheManifest {
    fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
        }
    }

    /// Load from the cache directory. Returns an empty manifest if the file
    /// doesn't exist or can't be parsed (version mismatch, corruption).
    fn load(dir: &Path) -> Self {
        let content = match std::fs::read_to_string(dir.join(MANIFEST_FILENAME)) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(_) => return Self::empty(),
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest
    }

    fn save(&self, dir: &Path) -> Result<(), CacheError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            CacheError::Manifest(format!("could not serialize manifest: {e}"))
        })?;
        std::fs::write(dir.join(MANIFEST_FILENAME), json)?;
        Ok(())
    }
}

/// Persistent byte cache rooted at a directory.
pub struct DiskCache {
    dir: PathBuf,
    manifest: Mutex<CacheManifest>,
    tmp_counter: AtomicU64,
}

impl DiskCache {
    /// Open (or cold-start) a cache at `dir`. The directory is created on the
    /// first `store`, so opening a cache never touches the filesystem.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let manifest = Mutex::new(CacheManifest::load(&dir));
        Self {
            dir,
            manifest,
            tmp_counter: AtomicU64::new(0),
        }
    }

    /// Number of manifest entries. Files deleted behind the manifest's back
    /// still count here; they surface as misses on lookup.
    pub fn len(&self) -> usize {
        self.manifest.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total payload bytes according to the manifest.
    pub fn total_bytes(&self) -> u64 {
        self.manifest
            .lock()
            .unwrap()
            .entries
            .values()
            .map(|e| e.len)
            .sum()
    }

    /// Keys currently in the manifest, unordered.
    pub fn keys(&self) -> Vec<String> {
        self.manifest.lock().unwrap().entries.keys().cloned().collect()
    }

    fn payload_file(key: &str) -> String {
        let digest = Sha256::digest(key.as_bytes());
        format!("{digest:x}.img")
    }
}

impl ImageCache for DiskCache {
    fn lookup(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let file = {
            let manifest = self.manifest.lock().unwrap();
            match manifest.entries.get(key) {
                Some(entry) => entry.file.clone(),
                None => return Ok(None),
            }
        };
        match std::fs::read(self.dir.join(&file)) {
            Ok(bytes) => Ok(Some(bytes)),
            // Payload pruned externally: a miss, not an error.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir)?;

        let file = Self::payload_file(key);
        // Unique temp name per writer; rename makes the swap atomic per key.
        let tmp = self.dir.join(format!(
            "{file}.tmp.{}.{}",
            std::process::id(),
            self.tmp_counter.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::write(&tmp, bytes)?;
        if let Err(e) = std::fs::rename(&tmp, self.dir.join(&file)) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }

        let mut manifest = self.manifest.lock().unwrap();
        manifest.entries.insert(
            key.to_string(),
            CacheEntry {
                file,
                len: bytes.len() as u64,
            },
        );
        manifest.save(&self.dir)
    }
}
