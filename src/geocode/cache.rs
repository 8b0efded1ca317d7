// src/geocode/cache.rs
//! Durable query → result map, one JSON object on disk:
//! `{"title:Springfield": {"lat": 39.8, "lng": -89.6}, "geocode:Nowhere": null, ...}`.
//!
//! A key that is present was attempted; `null` means it was attempted and failed.
//! Absence means "never asked". Writes go to a sibling temp file that is then
//! renamed over the target, so an interrupted run leaves the previous file intact.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::file::ensure_directory;
use crate::model::{Coord, GeocodeResult};

/// Which capability produced an entry. Keys carry this as a prefix so a negative
/// answer from one source never masks a different source asked the same text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeySpace {
    Title,
    Search,
    Geocode,
}

impl KeySpace {
    fn prefix(self) -> &'static str {
        match self {
            KeySpace::Title => "title:",
            KeySpace::Search => "search:",
            KeySpace::Geocode => "geocode:",
        }
    }

    pub fn key(self, query: &str) -> String {
        join!(self.prefix(), query)
    }
}

#[derive(Debug)]
pub struct GeocodeCache {
    path: Option<PathBuf>,
    entries: BTreeMap<String, Option<Coord>>,
    pending: usize,
    flush_every: usize,
}

impl GeocodeCache {
    /// A cache that never touches disk. Tests and dry runs.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: BTreeMap::new(),
            pending: 0,
            flush_every: usize::MAX,
        }
    }

    /// Load `path` if it exists, else start empty. A file that exists but does
    /// not parse is an error; silently starting over would re-query everything.
    pub fn open(path: &Path, flush_every: usize) -> Result<Self> {
        let entries = if path.exists() {
            let text = fs::read_to_string(path).map_err(|e| Error::store(path, e))?;
            if text.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&text).map_err(|e| Error::CacheFormat {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?
            }
        } else {
            BTreeMap::new()
        };

        info!(path = %path.display(), entries = entries.len(), "opened geocode cache");
        Ok(Self {
            path: Some(path.to_path_buf()),
            entries,
            pending: 0,
            flush_every: flush_every.max(1),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Unsaved writes since the last flush.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// `None` = never attempted.
    pub fn get(&self, key: &str) -> Option<GeocodeResult> {
        self.entries.get(key).map(|c| GeocodeResult::from(*c))
    }

    /// Remember an outcome. Every `flush_every` writes the file is rewritten.
    pub fn record(&mut self, key: &str, result: GeocodeResult) -> Result<()> {
        debug!(key, resolved = result.is_resolved(), "cache write");
        self.entries.insert(s!(key), result.coord());
        self.pending += 1;
        if self.pending >= self.flush_every {
            self.flush()?;
        }
        Ok(())
    }

    /// Persist everything recorded so far. No-op when nothing changed.
    pub fn flush(&mut self) -> Result<()> {
        let Some(path) = self.path.clone() else {
            self.pending = 0;
            return Ok(());
        };
        if self.pending == 0 {
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_directory(parent).map_err(|e| Error::store(parent, e))?;
            }
        }

        let tmp = tmp_path(&path);
        {
            let file = fs::File::create(&tmp).map_err(|e| Error::store(&tmp, e))?;
            let mut out = BufWriter::new(file);
            serde_json::to_writer(&mut out, &self.entries).map_err(|e| Error::store(&tmp, e.into()))?;
            out.flush().map_err(|e| Error::store(&tmp, e))?;
        }
        fs::rename(&tmp, &path).map_err(|e| Error::store(&path, e))?;

        info!(path = %path.display(), entries = self.entries.len(), "cache saved");
        self.pending = 0;
        Ok(())
    }
}

impl Drop for GeocodeCache {
    fn drop(&mut self) {
        if self.pending > 0 {
            if let Err(e) = self.flush() {
                error!(error = %e, "could not save geocode cache on exit");
            }
        }
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
