//! Outer watch loop over the notify watch service
//!
//! The watcher callback translates raw notify events into `ChangeEvent`s and
//! feeds them through an mpsc channel to a single consumer, which dispatches
//! each event to completion before taking the next. Ordering per path is
//! whatever the watch service delivers; nothing here reorders events.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::Duration;

use notify::event::{CreateKind, RemoveKind};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, warn};

use crate::dispatch::{ChangeEvent, ChangeKind, Dispatcher};
use crate::error::WatchpostResult;
use crate::mailer::Mailer;

/// Poll interval for the shutdown flag while waiting on events
const RECV_TIMEOUT: Duration = Duration::from_millis(50);

/// Watch a single directory (non-recursive) until `running` goes false.
///
/// Seeds the dispatcher's cache first so modifications observed later have a
/// baseline to diff against.
pub fn run<M: Mailer>(
    mut dispatcher: Dispatcher<M>,
    directory: &Path,
    running: Arc<AtomicBool>,
) -> WatchpostResult<()> {
    dispatcher.initialize()?;

    let (tx, rx) = channel::<ChangeEvent>();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                if let Some(kind) = change_kind(&event.kind) {
                    let raw_kind = event.kind;
                    for path in event.paths {
                        let is_directory = is_directory_event(&raw_kind, &path);
                        let _ = tx.send(ChangeEvent {
                            kind,
                            path,
                            is_directory,
                        });
                    }
                }
            }
            Err(e) => warn!("watch service error: {}", e),
        },
        Config::default(),
    )?;

    watcher.watch(directory, RecursiveMode::NonRecursive)?;
    info!("Started monitoring {}", directory.display());

    while running.load(Ordering::SeqCst) {
        // Non-blocking with timeout, so shutdown stays responsive
        if let Ok(event) = rx.recv_timeout(RECV_TIMEOUT) {
            dispatcher.dispatch(&event);
        }
    }

    info!("Stopped monitoring {}", directory.display());
    Ok(())
}

/// Map a raw notify event kind to the closed set of change kinds.
/// Access and metadata-only event kinds are dropped.
fn change_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Modify(_) => Some(ChangeKind::Modified),
        EventKind::Remove(_) => Some(ChangeKind::Deleted),
        _ => None,
    }
}

/// Directory-ness of an event, from the kind hint when the path is gone
fn is_directory_event(kind: &EventKind, path: &Path) -> bool {
    match kind {
        EventKind::Create(CreateKind::Folder) | EventKind::Remove(RemoveKind::Folder) => true,
        _ => path.is_dir(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::DEFAULT_THRESHOLD;
    use crate::mailer::MemoryMailer;
    use notify::event::{AccessKind, ModifyKind};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn create_modify_remove_map_to_change_kinds() {
        assert_eq!(
            change_kind(&EventKind::Create(CreateKind::File)),
            Some(ChangeKind::Created)
        );
        assert_eq!(
            change_kind(&EventKind::Modify(ModifyKind::Any)),
            Some(ChangeKind::Modified)
        );
        assert_eq!(
            change_kind(&EventKind::Remove(RemoveKind::File)),
            Some(ChangeKind::Deleted)
        );
    }

    #[test]
    fn access_and_other_events_are_dropped() {
        assert_eq!(change_kind(&EventKind::Access(AccessKind::Any)), None);
        assert_eq!(change_kind(&EventKind::Any), None);
        assert_eq!(change_kind(&EventKind::Other), None);
    }

    #[test]
    fn folder_kind_hints_mark_directory_events() {
        let dir = tempdir().unwrap();
        let gone = dir.path().join("removed_subdir");

        assert!(is_directory_event(
            &EventKind::Remove(RemoveKind::Folder),
            &gone
        ));
        assert!(is_directory_event(
            &EventKind::Create(CreateKind::Folder),
            &gone
        ));
        assert!(!is_directory_event(
            &EventKind::Remove(RemoveKind::File),
            &gone
        ));
    }

    #[test]
    fn existing_directory_is_detected_by_stat() {
        let dir = tempdir().unwrap();
        let subdir = dir.path().join("sub");
        fs::create_dir(&subdir).unwrap();

        assert!(is_directory_event(
            &EventKind::Modify(ModifyKind::Any),
            &subdir
        ));
    }

    #[test]
    fn run_seeds_cache_and_stops_on_flag() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "hello\n").unwrap();

        let mailer = MemoryMailer::new();
        let dispatcher = Dispatcher::new(
            dir.path().to_path_buf(),
            "file_monitor.log",
            DEFAULT_THRESHOLD,
            mailer.clone(),
        );

        // Flag already false: run seeds the baseline and returns
        let running = Arc::new(AtomicBool::new(false));
        run(dispatcher, dir.path(), running).unwrap();

        // Seeding alone never notifies
        assert!(mailer.sent().is_empty());
    }

    #[test]
    fn run_on_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");

        let dispatcher = Dispatcher::new(
            missing.clone(),
            "file_monitor.log",
            DEFAULT_THRESHOLD,
            MemoryMailer::new(),
        );

        let running = Arc::new(AtomicBool::new(false));
        assert!(run(dispatcher, &missing, running).is_err());
    }
}
