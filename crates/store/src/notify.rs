use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// A user-facing notification emitted by engine operations.
///
/// `code` is a stable machine-readable identifier; `message` is free text for
/// display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub severity: Severity,
    pub code: String,
    pub message: String,
}

impl Notification {
    pub fn success(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Sink for notifications. The engine never blocks on the sink.
pub trait Notifier {
    fn notify(&self, notification: Notification);
}

/// Collects notifications in memory; used by tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    buffer: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return everything recorded so far.
    pub fn take(&self) -> Vec<Notification> {
        match self.buffer.lock() {
            Ok(mut buffer) => std::mem::take(&mut *buffer),
            Err(_) => Vec::new(),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.push(notification);
        }
    }
}

/// Forwards notifications to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Success => {
                tracing::info!(code = %notification.code, "{}", notification.message);
            }
            Severity::Warning => {
                tracing::warn!(code = %notification.code, "{}", notification.message);
            }
            Severity::Error => {
                tracing::error!(code = %notification.code, "{}", notification.message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_notifier_drains_on_take() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notification::warning("w1", "first"));
        notifier.notify(Notification::error("e1", "second"));

        let recorded = notifier.take();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].severity, Severity::Warning);
        assert_eq!(recorded[1].code, "e1");
        assert!(notifier.take().is_empty());
    }
}
