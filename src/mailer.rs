//! Notification building and mail delivery
//!
//! The `Mailer` trait is the delivery seam: production uses the SMTP
//! transport, `--dry-run` logs instead of sending, and tests record
//! notifications in memory.

use std::sync::{Arc, Mutex};

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

use crate::config::MailConfig;
use crate::error::WatchpostResult;

/// Kind of change a notification reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Created,
    Modified,
    BinaryModified,
    Deleted,
}

/// A single notification, produced and consumed within one dispatch cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NoticeKind,
    pub file_name: String,
    pub body: String,
}

impl Notification {
    pub fn new(kind: NoticeKind, file_name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind,
            file_name: file_name.into(),
            body: body.into(),
        }
    }

    /// Subject line for the outgoing message
    pub fn subject(&self) -> String {
        match self.kind {
            NoticeKind::Created => format!("File Created: {}", self.file_name),
            NoticeKind::Modified => format!("File Modified: {}", self.file_name),
            NoticeKind::BinaryModified => format!("Binary File Modified: {}", self.file_name),
            NoticeKind::Deleted => format!("File Deleted: {}", self.file_name),
        }
    }
}

/// Delivery seam for notifications
pub trait Mailer {
    /// Deliver a single notification synchronously
    fn send(&self, notice: &Notification) -> WatchpostResult<()>;
}

impl<M: Mailer + ?Sized> Mailer for Box<M> {
    fn send(&self, notice: &Notification) -> WatchpostResult<()> {
        (**self).send(notice)
    }
}

/// SMTP delivery over an authenticated STARTTLS channel
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    /// Build a transport from the environment-backed mail configuration
    pub fn new(config: &MailConfig) -> WatchpostResult<Self> {
        let transport = SmtpTransport::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.sender.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: config.sender.parse()?,
            to: config.receiver.parse()?,
        })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, notice: &Notification) -> WatchpostResult<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(notice.subject())
            .body(notice.body.clone())?;

        self.transport.send(&message)?;
        info!("Email sent: {}", notice.subject());
        Ok(())
    }
}

/// Dry-run sink: logs notifications instead of delivering them
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, notice: &Notification) -> WatchpostResult<()> {
        info!(
            "dry-run notification: {}\n{}",
            notice.subject(),
            notice.body
        );
        Ok(())
    }
}

/// Recording sink for tests
///
/// Clones share the same underlying buffer, so a test can keep one handle
/// and hand another to the dispatcher.
#[derive(Debug, Clone, Default)]
pub struct MemoryMailer {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything sent so far
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Mailer for MemoryMailer {
    fn send(&self, notice: &Notification) -> WatchpostResult<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notice.clone());
        }
        Ok(())
    }
}
