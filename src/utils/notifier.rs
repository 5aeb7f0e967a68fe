//! Notification sink for account credentials.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Failed to send welcome email: {0}")]
    DeliveryFailed(String),
}

/// Delivers a freshly issued temporary password to a student.
///
/// Enrollment and batch import call this inside their transaction and treat
/// an error as fatal for the whole unit of work.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_welcome(
        &self,
        recipient: &str,
        name: &str,
        roll_no: &str,
        temp_password: &str,
    ) -> Result<(), NotifyError>;
}

#[cfg(any(test, feature = "test-utils"))]
pub use doubles::{FailingNotifier, RecordingNotifier, SentWelcome};

#[cfg(any(test, feature = "test-utils"))]
mod doubles {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SentWelcome {
        pub recipient: String,
        pub name: String,
        pub roll_no: String,
        pub temp_password: String,
    }

    /// Records every welcome message instead of sending it.
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        sent: Mutex<Vec<SentWelcome>>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn sent(&self) -> Vec<SentWelcome> {
            self.sent.lock().map(|s| s.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_welcome(
            &self,
            recipient: &str,
            name: &str,
            roll_no: &str,
            temp_password: &str,
        ) -> Result<(), NotifyError> {
            let mut sent = self
                .sent
                .lock()
                .map_err(|e| NotifyError::DeliveryFailed(e.to_string()))?;
            sent.push(SentWelcome {
                recipient: recipient.to_string(),
                name: name.to_string(),
                roll_no: roll_no.to_string(),
                temp_password: temp_password.to_string(),
            });
            Ok(())
        }
    }

    /// Rejects every message, optionally after letting the first few through.
    #[derive(Debug, Default)]
    pub struct FailingNotifier {
        allow: usize,
        attempts: Mutex<usize>,
    }

    impl FailingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn after(allow: usize) -> Self {
            Self {
                allow,
                attempts: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send_welcome(
            &self,
            _recipient: &str,
            _name: &str,
            _roll_no: &str,
            _temp_password: &str,
        ) -> Result<(), NotifyError> {
            let mut attempts = self
                .attempts
                .lock()
                .map_err(|e| NotifyError::DeliveryFailed(e.to_string()))?;
            *attempts += 1;
            if *attempts > self.allow {
                return Err(NotifyError::DeliveryFailed("SMTP unavailable".to_string()));
            }
            Ok(())
        }
    }
}
