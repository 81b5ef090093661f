//! Event dispatcher: classify, compare, debounce, diff, notify, cache
//!
//! One `ChangeEvent` is processed to completion before the next; the cache
//! is mutated only here. Per-event failures are caught at the dispatch
//! boundary so a single bad event never stalls the watch loop.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::Utc;
use tracing::{debug, error, info};

use crate::cache::{ContentCache, FileRecord};
use crate::content::read_lines_or_empty;
use crate::diff;
use crate::error::WatchpostResult;
use crate::mailer::{Mailer, NoticeKind, Notification};

/// Default modification cooldown
pub const DEFAULT_THRESHOLD: Duration = Duration::from_secs(5);

/// Kind of raw filesystem change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
}

impl ChangeKind {
    fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Created => "created",
            ChangeKind::Modified => "modified",
            ChangeKind::Deleted => "deleted",
        }
    }
}

/// A single filesystem event as delivered by the watch service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub path: PathBuf,
    pub is_directory: bool,
}

/// Routes filesystem events through the notification pipeline.
///
/// Holds the content cache exclusively; no other component mutates it.
pub struct Dispatcher<M: Mailer> {
    directory: PathBuf,
    log_file: String,
    threshold: Duration,
    cache: ContentCache,
    mailer: M,
}

impl<M: Mailer> Dispatcher<M> {
    pub fn new(
        directory: impl Into<PathBuf>,
        log_file: impl Into<String>,
        threshold: Duration,
        mailer: M,
    ) -> Self {
        Self {
            directory: directory.into(),
            log_file: log_file.into(),
            threshold,
            cache: ContentCache::new(),
            mailer,
        }
    }

    /// Seed the cache from the files already present in the watched
    /// directory, so the first real modification has a baseline to diff
    /// against. Returns the number of files seeded.
    pub fn initialize(&mut self) -> WatchpostResult<usize> {
        let directory = self.directory.clone();
        self.cache.initialize(&directory, &self.log_file)
    }

    /// Read access to the cache, mainly for assertions in tests
    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    /// Process one event at the current wall-clock time
    pub fn dispatch(&mut self, event: &ChangeEvent) {
        self.dispatch_at(event, SystemTime::now());
    }

    /// Process one event at an explicit time (injectable for debounce tests)
    pub fn dispatch_at(&mut self, event: &ChangeEvent, now: SystemTime) {
        if event.is_directory {
            debug!("ignoring directory event for {}", event.path.display());
            return;
        }
        let Some(name) = file_name(&event.path) else {
            return;
        };
        if name == self.log_file {
            debug!("ignoring event for own log artifact {}", name);
            return;
        }

        let result = match event.kind {
            ChangeKind::Created => self.handle_created(&name, &event.path, now),
            ChangeKind::Modified => self.handle_modified(&name, &event.path, now),
            ChangeKind::Deleted => self.handle_deleted(&name),
        };

        if let Err(e) = result {
            error!(
                "failed to process {} event for {}: {}",
                event.kind.as_str(),
                name,
                e
            );
        }
    }

    fn handle_created(&mut self, name: &str, path: &Path, now: SystemTime) -> WatchpostResult<()> {
        info!("New file created: {}", name);

        let lines = read_lines_or_empty(path);
        let body = match &lines {
            None => format!("A new binary file '{}' has been created.", name),
            Some(_) => format!("A new text file '{}' has been created.", name),
        };
        self.cache.insert(
            name,
            FileRecord {
                lines,
                last_seen: now,
            },
        );

        self.send(Notification::new(NoticeKind::Created, name, stamp(body)));
        Ok(())
    }

    fn handle_modified(&mut self, name: &str, path: &Path, now: SystemTime) -> WatchpostResult<()> {
        if !self.cache.should_notify(name, now, self.threshold) {
            // Deliberately no cache update here: content written during the
            // cooldown is diffed against the pre-cooldown baseline once the
            // window elapses.
            info!("File {} modified again within threshold, skipping", name);
            return Ok(());
        }

        match read_lines_or_empty(path) {
            None => {
                info!("Binary file {} was modified", name);
                self.cache.insert(
                    name,
                    FileRecord {
                        lines: None,
                        last_seen: now,
                    },
                );
                self.send(Notification::new(
                    NoticeKind::BinaryModified,
                    name,
                    stamp(format!("{} was modified (binary file, no diff).", name)),
                ));
            }
            Some(new_lines) => {
                let old_lines = self.cache.get(name).and_then(|r| r.lines.clone());
                let diff_text = diff::unified(name, old_lines.as_deref(), &new_lines);
                info!("Changes in {}:\n{}", name, diff_text);

                self.cache.insert(
                    name,
                    FileRecord {
                        lines: Some(new_lines),
                        last_seen: now,
                    },
                );
                self.send(Notification::new(
                    NoticeKind::Modified,
                    name,
                    stamp(format!("Changes in {}:\n\n{}", name, diff_text)),
                ));
            }
        }
        Ok(())
    }

    fn handle_deleted(&mut self, name: &str) -> WatchpostResult<()> {
        info!("File deleted: {}", name);
        self.send(Notification::new(
            NoticeKind::Deleted,
            name,
            stamp(format!("The file {} has been deleted.", name)),
        ));
        self.cache.remove(name);
        Ok(())
    }

    /// Deliver a notification; failures are logged and dropped so cache
    /// state never depends on delivery success.
    fn send(&self, notice: Notification) {
        if let Err(e) = self.mailer.send(&notice) {
            error!("Failed to send email '{}': {}", notice.subject(), e);
        }
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().to_string())
}

/// Append the detection timestamp to a notification body
fn stamp(body: String) -> String {
    format!(
        "{}\n\nDetected at: {}",
        body,
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )
}
