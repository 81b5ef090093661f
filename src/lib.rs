//! Watchpost - directory change notifier
//!
//! Watches a single directory for file creation, modification and deletion
//! and emails a human-readable notification for each, including a unified
//! diff for text-file changes. Content state lives in an in-memory cache; a
//! per-file cooldown coalesces the bursts of modify events most watch
//! backends emit for one logical save.

pub mod cache;
pub mod config;
pub mod content;
pub mod diff;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod mailer;
pub mod watch;

// Re-exports for convenience
pub use cache::{ContentCache, FileRecord};
pub use config::MailConfig;
pub use content::FileContent;
pub use dispatch::{ChangeEvent, ChangeKind, Dispatcher, DEFAULT_THRESHOLD};
pub use error::{WatchpostError, WatchpostResult};
pub use mailer::{LogMailer, Mailer, MemoryMailer, NoticeKind, Notification, SmtpMailer};
