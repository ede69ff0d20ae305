//! JSON snapshot of the section registry.
//!
//! Layout, keyed by section:
//!
//! ```json
//! { "icebreakers": { "title": "...", "url": "...", "questions": [[412, "..."], ...] } }
//! ```
//!
//! The file is derived data. Losing it only costs a network refresh.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

use crate::store::{Entry, SectionRegistry};

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cache encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CacheError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

// Title and url are written for humans reading the file; only the
// questions are read back.
#[derive(Debug, Deserialize)]
struct CachedSection {
    questions: Vec<Entry>,
}

#[derive(Serialize)]
struct CachedSectionRef<'a> {
    title: &'a str,
    url: &'a str,
    questions: &'a [Entry],
}

/// Serializes the registry as a map in configuration order.
struct Snapshot<'a>(&'a SectionRegistry);

impl Serialize for Snapshot<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for section in self.0.iter() {
            map.serialize_entry(
                &section.key,
                &CachedSectionRef {
                    title: &section.title,
                    url: &section.url,
                    questions: section.entries(),
                },
            )?;
        }
        map.end()
    }
}

/// The on-disk cache file.
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

    /// Write the registry, creating parent directories as needed.
    ///
    /// The document goes to a sibling temp file first and is renamed into
    /// place, so readers never see a half-written cache.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub async fn save(&self, registry: &SectionRegistry) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| CacheError::io(parent, e))?;
        }

        let document = serde_json::to_vec_pretty(&Snapshot(registry))?;
        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, &document)
            .await
            .map_err(|e| CacheError::io(&tmp_path, e))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| CacheError::io(&self.path, e))?;

        info!(
            sections = registry.len(),
            questions = registry.question_count(),
            bytes = document.len(),
            "saved question cache"
        );
        Ok(())
    }

    /// Fill registry entries from the cache file.
    ///
    /// Returns `false` without touching the registry when the file is missing
    /// or cannot be decoded. On success, sections present in the file are
    /// updated, unknown keys are ignored and absent sections keep their
    /// current entries. Titles and URLs always come from configuration.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub async fn load(&self, registry: &mut SectionRegistry) -> bool {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("no question cache yet");
                return false;
            }
            Err(e) => {
                warn!(error = %e, "failed to read question cache");
                return false;
            }
        };

        // Decode everything before applying anything.
        let document: HashMap<String, CachedSection> = match serde_json::from_slice(&raw) {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, "question cache is corrupt, ignoring it");
                return false;
            }
        };

        let mut applied = 0;
        for (key, cached) in document {
            if registry.set_entries(&key, cached.questions) {
                applied += 1;
            } else {
                debug!(key = %key, "ignoring unknown section in cache");
            }
        }

        info!(
            sections = applied,
            questions = registry.question_count(),
            "loaded question cache"
        );
        true
    }

    /// Delete the cache file. Returns whether there was one.
    pub async fn remove(&self) -> Result<bool, CacheError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                info!(path = %self.path.display(), "removed question cache");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::io(&self.path, e)),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
