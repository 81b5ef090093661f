//! Change cache and debounce policy
//!
//! Process-wide mapping from file name to its last-known content and the
//! time it was last processed. Owned by the dispatcher; the single source of
//! truth for diffing and for the modification cooldown.

use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::info;

use crate::content::read_lines_or_empty;
use crate::error::WatchpostResult;

/// Last-known state of a tracked file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Captured line sequence; `None` marks a binary file
    pub lines: Option<Vec<String>>,
    /// When the file was last processed (seeded or notified)
    pub last_seen: SystemTime,
}

/// In-memory cache of tracked file content, keyed by file name
#[derive(Debug, Default)]
pub struct ContentCache {
    entries: HashMap<String, FileRecord>,
}

impl ContentCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the record for a file name
    pub fn get(&self, name: &str) -> Option<&FileRecord> {
        self.entries.get(name)
    }

    /// Insert or replace the record for a file name
    pub fn insert(&mut self, name: &str, record: FileRecord) {
        self.entries.insert(name.to_string(), record);
    }

    /// Drop the record for a file name, if present
    pub fn remove(&mut self, name: &str) {
        self.entries.remove(name);
    }

    /// Number of tracked files
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Seed the cache from the regular files already in `directory`.
    ///
    /// Skips the process's own log artifact by name so the watcher never
    /// tracks its own output. Returns the number of files seeded.
    pub fn initialize(&mut self, directory: &Path, log_file: &str) -> WatchpostResult<usize> {
        let now = SystemTime::now();
        let mut count = 0;

        for entry in std::fs::read_dir(directory)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name == log_file {
                continue;
            }

            let lines = read_lines_or_empty(&entry.path());
            self.insert(
                &name,
                FileRecord {
                    lines,
                    last_seen: now,
                },
            );
            count += 1;
        }

        info!(
            "Initialized content for {} files in {}",
            count,
            directory.display()
        );
        Ok(count)
    }

    /// Debounce policy: should a modification of `name` at `now` be
    /// processed?
    ///
    /// Files the cache has never seen fall back to the epoch baseline and
    /// always pass. Within the cooldown window (or under clock skew) the
    /// modification is suppressed.
    pub fn should_notify(&self, name: &str, now: SystemTime, threshold: Duration) -> bool {
        let last_seen = self
            .get(name)
            .map(|r| r.last_seen)
            .unwrap_or(UNIX_EPOCH);
        match now.duration_since(last_seen) {
            Ok(elapsed) => elapsed > threshold,
            Err(_) => false,
        }
    }
}
