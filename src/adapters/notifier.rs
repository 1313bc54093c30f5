use crate::domain::ports::Notifier;
use std::sync::{Mutex, PoisonError};

/// Prints alerts to stderr and mirrors them into the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn alert(&self, message: &str) {
        tracing::warn!("🔔 alert: {}", message);
        eprintln!("🔔 {}", message);
    }
}

/// Keeps every alert in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        tracing::debug!("alert recorded: {}", message);
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.alert("first");
        notifier.alert("second");
        assert_eq!(notifier.alerts(), vec!["first", "second"]);
    }

    #[test]
    fn test_console_notifier_is_a_shared_port() {
        let notifier: std::sync::Arc<dyn Notifier> = std::sync::Arc::new(ConsoleNotifier);
        let clone = notifier.clone();
        notifier.alert("Please fill in all required fields.");
        clone.alert("Something went wrong. Please try calling us directly.");
        assert_eq!(std::sync::Arc::strong_count(&notifier), 2);
    }
}
