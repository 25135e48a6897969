//! # Notifications
//!
//! The core never renders UI. It describes what the cashier should be told
//! as `Notification` values; a notification sink displays and auto-dismisses
//! them.
//!
//! ```text
//! scan_image()
//!   ├── info    "Scanning barcode..."
//!   └── success "Product found: Paracetamol 500mg"
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// How prominently a notification should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Danger,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationLevel::Info => write!(f, "info"),
            NotificationLevel::Success => write!(f, "success"),
            NotificationLevel::Warning => write!(f, "warning"),
            NotificationLevel::Danger => write!(f, "danger"),
        }
    }
}

/// A single user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Notification {
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Danger, message)
    }

    /// True for the levels that end an operation badly.
    pub fn is_failure(&self) -> bool {
        matches!(self.level, NotificationLevel::Warning | NotificationLevel::Danger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_serializes_lowercase() {
        let n = Notification::danger("Insufficient stock");
        let json = serde_json::to_string(&n).unwrap();
        assert_eq!(json, r#"{"level":"danger","message":"Insufficient stock"}"#);
    }

    #[test]
    fn test_is_failure() {
        assert!(!Notification::info("Scanning...").is_failure());
        assert!(!Notification::success("Done").is_failure());
        assert!(Notification::warning("Stock exceeded").is_failure());
        assert!(Notification::danger("Network error").is_failure());
    }
}
