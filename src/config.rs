//! Mail configuration from the environment
//!
//! Credentials and addresses are supplied out of band via environment
//! variables (a `.env` file is loaded by the binary before this runs):
//!
//! - `email_sender`   - From address, also the SMTP login user (required)
//! - `email_password` - SMTP password or app password (required)
//! - `email_receiver` - To address (required)
//! - `smtp_host`      - relay host (default `smtp.gmail.com`)
//! - `smtp_port`      - submission port (default 587)

use tracing::warn;

use crate::error::{WatchpostError, WatchpostResult};

/// Default SMTP relay host
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Default SMTP submission port (STARTTLS)
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Mail transport configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub sender: String,
    pub password: String,
    pub receiver: String,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl MailConfig {
    /// Load from process environment variables
    pub fn from_env() -> WatchpostResult<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load through an explicit lookup function (injectable for tests)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> WatchpostResult<Self> {
        let required = |var: &str| {
            lookup(var)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| WatchpostError::MissingEnv {
                    var: var.to_string(),
                })
        };

        let smtp_port = match lookup("smtp_port") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(
                    "invalid smtp_port value '{}', falling back to {}",
                    raw, DEFAULT_SMTP_PORT
                );
                DEFAULT_SMTP_PORT
            }),
            None => DEFAULT_SMTP_PORT,
        };

        Ok(Self {
            sender: required("email_sender")?,
            password: required("email_password")?,
            receiver: required("email_receiver")?,
            smtp_host: lookup("smtp_host").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            smtp_port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn loads_required_with_defaults() {
        let vars = env(&[
            ("email_sender", "alerts@example.com"),
            ("email_password", "secret"),
            ("email_receiver", "ops@example.com"),
        ]);

        let config = MailConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.sender, "alerts@example.com");
        assert_eq!(config.smtp_host, DEFAULT_SMTP_HOST);
        assert_eq!(config.smtp_port, DEFAULT_SMTP_PORT);
    }

    #[test]
    fn missing_required_variable_is_typed_error() {
        let vars = env(&[("email_sender", "alerts@example.com")]);

        let err = MailConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(
            err,
            WatchpostError::MissingEnv { ref var } if var == "email_password"
        ));
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let vars = env(&[
            ("email_sender", ""),
            ("email_password", "secret"),
            ("email_receiver", "ops@example.com"),
        ]);

        let err = MailConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(
            err,
            WatchpostError::MissingEnv { ref var } if var == "email_sender"
        ));
    }

    #[test]
    fn overrides_host_and_port() {
        let vars = env(&[
            ("email_sender", "a@example.com"),
            ("email_password", "secret"),
            ("email_receiver", "b@example.com"),
            ("smtp_host", "mail.internal"),
            ("smtp_port", "2525"),
        ]);

        let config = MailConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.smtp_host, "mail.internal");
        assert_eq!(config.smtp_port, 2525);
    }

    #[test]
    fn invalid_port_falls_back_to_default() {
        let vars = env(&[
            ("email_sender", "a@example.com"),
            ("email_password", "secret"),
            ("email_receiver", "b@example.com"),
            ("smtp_port", "not-a-port"),
        ]);

        let config = MailConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.smtp_port, DEFAULT_SMTP_PORT);
    }
}
