//! JSON persistence for the render cache.
//!
//! A damaged cache file must never fail a build: anything unreadable is
//! logged and treated as a miss.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

use crate::domain::pages::DocumentId;

use super::store::{CacheEntry, RenderCache};

/// Bumped whenever the on-disk shape of an entry changes.
pub const CACHE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to access cache file `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode cache: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CacheError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Serialize)]
struct CacheDocument<'a> {
    format_version: u32,
    entries: &'a BTreeMap<DocumentId, CacheEntry>,
}

#[derive(Deserialize)]
struct RawCacheDocument {
    format_version: u32,
    #[serde(default)]
    entries: BTreeMap<String, Value>,
}

/// Location of the persisted cache.
#[derive(Debug, Clone)]
pub struct CacheFile {
    path: PathBuf,
}

impl CacheFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cache, salvaging every well-formed entry.
    pub async fn load(&self) -> RenderCache {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(
                    target = "cache::persist",
                    path = %self.path.display(),
                    "no cache file yet"
                );
                return RenderCache::new();
            }
            Err(err) => {
                warn!(
                    target = "cache::persist",
                    path = %self.path.display(),
                    error = %err,
                    "cache file unreadable; starting empty"
                );
                return RenderCache::new();
            }
        };

        decode(&bytes, &self.path)
    }

    /// Write the cache through a temporary sibling file and rename it into
    /// place, so a crash never leaves a truncated cache behind.
    pub async fn save(&self, cache: &RenderCache) -> Result<(), CacheError> {
        let document = CacheDocument {
            format_version: CACHE_FORMAT_VERSION,
            entries: cache.entries(),
        };
        let encoded = serde_json::to_vec_pretty(&document)?;

        if let Some(parent) = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| CacheError::io(parent, err))?;
        }

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, encoded)
            .await
            .map_err(|err| CacheError::io(&tmp_path, err))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|err| CacheError::io(&self.path, err))?;
        Ok(())
    }

    /// Delete the cache file. Returns whether a file was removed.
    pub async fn clear(&self) -> Result<bool, CacheError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(CacheError::io(&self.path, err)),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn decode(bytes: &[u8], path: &Path) -> RenderCache {
    let raw: RawCacheDocument = match serde_json::from_slice(bytes) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(
                target = "cache::persist",
                path = %path.display(),
                error = %err,
                "cache file is malformed; starting empty"
            );
            return RenderCache::new();
        }
    };

    if raw.format_version != CACHE_FORMAT_VERSION {
        warn!(
            target = "cache::persist",
            path = %path.display(),
            found = raw.format_version,
            expected = CACHE_FORMAT_VERSION,
            "cache format version mismatch; starting empty"
        );
        return RenderCache::new();
    }

    let mut entries = BTreeMap::new();
    for (key, value) in raw.entries {
        match serde_json::from_value::<CacheEntry>(value) {
            Ok(entry) if entry.page.document_id.as_str() == key => {
                entries.insert(entry.page.document_id.clone(), entry);
            }
            Ok(_) => warn!(
                target = "cache::persist",
                document = %key,
                "cache entry keyed under a different document; dropping"
            ),
            Err(err) => warn!(
                target = "cache::persist",
                document = %key,
                error = %err,
                "malformed cache entry; dropping"
            ),
        }
    }

    RenderCache::from_entries(entries)
}
