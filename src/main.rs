//! Watchpost CLI - directory change notifier
//!
//! Usage: watchpost [DIRECTORY]
//!
//! Watches a single directory (non-recursive) and emails a notification for
//! every file created, modified or deleted, with a unified diff for text
//! changes. Mail credentials come from the environment (`.env` supported).

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use watchpost::config::MailConfig;
use watchpost::dispatch::Dispatcher;
use watchpost::error::WatchpostError;
use watchpost::logging;
use watchpost::mailer::{LogMailer, Mailer, SmtpMailer};
use watchpost::watch;

/// Watchpost - email notifications for directory changes
#[derive(Parser, Debug)]
#[command(name = "watchpost")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory to watch (non-recursive)
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// Cooldown in seconds between notifications for the same file
    #[arg(long, default_value_t = 5)]
    threshold: u64,

    /// Log file name, written inside the watched directory
    #[arg(long, default_value = logging::DEFAULT_LOG_FILE)]
    log_file: String,

    /// Log notifications instead of sending email
    #[arg(long)]
    dry_run: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env before touching the mail configuration
    dotenvy::dotenv().ok();

    if !cli.directory.is_dir() {
        return Err(WatchpostError::DirectoryNotFound {
            path: cli.directory.clone(),
        }
        .into());
    }

    logging::init(&cli.directory.join(&cli.log_file), cli.verbose)?;

    let mailer: Box<dyn Mailer> = if cli.dry_run {
        Box::new(LogMailer)
    } else {
        Box::new(SmtpMailer::new(&MailConfig::from_env()?)?)
    };

    let dispatcher = Dispatcher::new(
        cli.directory.clone(),
        cli.log_file,
        Duration::from_secs(cli.threshold),
        mailer,
    );

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = running.clone();
    ctrlc::set_handler(move || {
        handler_flag.store(false, Ordering::SeqCst);
    })?;

    watch::run(dispatcher, &cli.directory, running)?;
    Ok(())
}
