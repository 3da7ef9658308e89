//! Persistent chunk classification cache
//!
//! One JSON file per transcript, a flat map from `"{start}_{end}"` to the raw
//! classifier payload. Entries are never recomputed once present, even if the
//! transcript changed since; the key only encodes chunk boundaries.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::info;

use super::votes::ChunkResponse;
use crate::models::ChunkRange;
use crate::ChatLensError;
use crate::Result;

/// Cache file path for a transcript: `{transcript}{suffix}`
pub fn cache_path_for(transcript: &Path, suffix: &str) -> PathBuf {
    let mut name = transcript.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// In-memory view of a cache file
#[derive(Debug, Clone)]
pub struct ChunkCache {
    path: PathBuf,
    entries: BTreeMap<String, ChunkResponse>,
    dirty: bool,
}

impl ChunkCache {
    /// Load the cache at `path`, starting empty when the file does not exist
    ///
    /// An unreadable or malformed file is an error; it is never silently
    /// replaced.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| {
                ChatLensError::CacheError(format!("failed to read {}: {e}", path.display()))
            })?;
            let entries: BTreeMap<String, ChunkResponse> = serde_json::from_str(&content)
                .map_err(|e| {
                    ChatLensError::CacheError(format!("malformed cache {}: {e}", path.display()))
                })?;
            info!("Loaded cache with {} entries from {}", entries.len(), path.display());
            entries
        } else {
            info!("No existing cache found at {}", path.display());
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries,
            dirty: false,
        })
    }

    /// Cache that lives only in memory until [`ChunkCache::persist`] is called
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
            dirty: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, range: ChunkRange) -> Option<&ChunkResponse> {
        self.entries.get(&range.cache_key())
    }

    pub fn contains(&self, range: ChunkRange) -> bool {
        self.entries.contains_key(&range.cache_key())
    }

    /// Store a fresh result; an existing entry for the same key is kept
    pub fn insert(&mut self, range: ChunkRange, response: ChunkResponse) -> bool {
        let key = range.cache_key();
        if self.entries.contains_key(&key) {
            debug!(key = %key, "Cache entry already present, keeping it");
            return false;
        }
        self.entries.insert(key, response);
        self.dirty = true;
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write every entry back to disk
    ///
    /// The file is written to a temporary sibling and renamed into place so
    /// an interrupted write never leaves a truncated cache behind.
    pub fn persist(&mut self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let cache_error = |e: std::io::Error| {
            ChatLensError::CacheError(format!("failed to write {}: {e}", self.path.display()))
        };

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(cache_error)?;
        let json = serde_json::to_vec(&self.entries)?;
        tmp.write_all(&json).map_err(cache_error)?;
        tmp.flush().map_err(cache_error)?;
        tmp.persist(&self.path)
            .map_err(|e| cache_error(e.error))?;

        self.dirty = false;
        info!(
            "Updated cache file {} with {} entries",
            self.path.display(),
            self.entries.len()
        );
        Ok(())
    }
}
