//! Notification surface.
//!
//! The engine emits one-shot `(message, severity)` pairs. Displaying them and
//! dismissing them is the UI's business.

use std::sync::{Arc, Mutex, PoisonError};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    #[default]
    Info,
    Success,
    Error,
}

impl Severity {
    /// Name used in toast CSS classes and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// A single message for the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    #[must_use]
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Success)
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Error)
    }
}

/// Receiver of notifications.
pub trait Notifier {
    fn notify(&self, notification: Notification);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}

/// Sends notifications to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Error => tracing::warn!(
                severity = notification.severity.as_str(),
                "{}",
                notification.message
            ),
            Severity::Info | Severity::Success => tracing::info!(
                severity = notification.severity.as_str(),
                "{}",
                notification.message
            ),
        }
    }
}

/// Keeps every notification in memory.
///
/// Clones share the same buffer, so one handle can be given to a component
/// while another is used to inspect what was emitted.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    inner: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything emitted so far, oldest first.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the buffer.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.inner.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_shares_buffer() {
        let recorder = RecordingNotifier::new();
        let handle = recorder.clone();

        handle.notify(Notification::success("added"));
        handle.notify(Notification::error("failed"));

        let seen = recorder.notifications();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].severity, Severity::Success);
        assert_eq!(seen[1].message, "failed");

        assert_eq!(recorder.take().len(), 2);
        assert!(recorder.notifications().is_empty());
    }

    #[test]
    fn test_severity_names() {
        assert_eq!(Severity::Info.as_str(), "info");
        assert_eq!(Severity::Success.as_str(), "success");
        assert_eq!(Severity::Error.as_str(), "error");
    }
}
