// src/formatting.rs

use crate::core::Notification;

/// A trait for rendering a notification as a single line of text.
pub trait TextFormatter: Send + Sync {
    fn format(&self, notification: &Notification) -> String;
}

/// A plain, human-readable formatter: who notified whom about what.
pub struct PlainTextFormatter;

impl TextFormatter for PlainTextFormatter {
    fn format(&self, notification: &Notification) -> String {
        let origin = match &notification.sender {
            Some(sender) => format!("{} -> {}", sender, notification.receiver),
            None => notification.receiver.to_string(),
        };

        let target_part = notification
            .target
            .as_ref()
            .map(|target| format!(" (target: {})", target))
            .unwrap_or_default();

        format!("{} about {}{}", origin, notification.notifiable, target_part)
    }
}
