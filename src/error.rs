//! Error types for watchpost
//!
//! Uses `thiserror` for library errors; expected failures (unreadable files,
//! malformed JSON, transport rejections) are values, not panics.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for watchpost operations
pub type WatchpostResult<T> = Result<T, WatchpostError>;

/// Main error type for watchpost operations
#[derive(Error, Debug)]
pub enum WatchpostError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON file could not be parsed
    #[error("invalid JSON in {file}: {message}")]
    InvalidJson { file: PathBuf, message: String },

    /// Watched directory does not exist or is not a directory
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Required environment variable is not set
    #[error("missing required environment variable '{var}'")]
    MissingEnv { var: String },

    /// Filesystem watch service error
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),

    /// Sender or recipient address could not be parsed
    #[error("invalid mail address: {0}")]
    MailAddress(#[from] lettre::address::AddressError),

    /// Mail message could not be built
    #[error("mail message error: {0}")]
    MailMessage(#[from] lettre::error::Error),

    /// SMTP delivery failure
    #[error("mail transport error: {0}")]
    MailTransport(#[from] lettre::transport::smtp::Error),
}
