//! # Counter Error Type
//!
//! One error type for everything the cashier can be told went wrong.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Counter                            │
//! │                                                                         │
//! │  ValidationError ──► CoreError ──┐                                      │
//! │                                  ├──► ClientError ──┐                   │
//! │  reqwest / JSON failure ─────────┘                  │                   │
//! │                                                     ├──► CounterError   │
//! │  image / decoder failure ──────────► DecodeError ───┤        │          │
//! │  counter.toml / PHARMA_* ──────────► ConfigError ───┘        │          │
//! │                                                              ▼          │
//! │                                          exactly one Notification       │
//! │                                          {level, message}               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is fatal to the session. The only state change an error
//! forces is the reset after a failed lookup, and that is done by the
//! controller, not here.

use pharma_client::{ClientError, ConfigError, DecodeError};
use pharma_core::{CoreError, Notification, NotificationLevel, ValidationError};
use serde::Serialize;

/// An error on its way to the notification sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct CounterError {
    /// Machine-readable category
    pub code: ErrorCode,

    /// Human-readable message for display
    pub message: String,
}

/// Error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Catalog miss on lookup
    NotFound,

    /// Quantity above stock (caught before sending)
    InsufficientStock,

    /// The server declined the request
    RemoteRejected,

    /// Network or response parsing failure
    Transport,

    /// Bad input from the cashier
    ValidationError,

    /// Operation needs a selected product
    NoProductSelected,

    /// Image could not be used or decoded
    ImageError,

    /// Same kind of request already in flight
    Busy,

    /// Configuration problem
    Config,
}

impl CounterError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CounterError {
            code,
            message: message.into(),
        }
    }

    /// A request of the same kind is still in flight.
    pub fn busy(operation: &str) -> Self {
        CounterError::new(ErrorCode::Busy, format!("{} already in progress", operation))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CounterError::new(ErrorCode::ValidationError, message)
    }

    /// Appends what the cashier can do next, e.g. `"(scan again to retry)"`.
    pub fn with_hint(mut self, hint: &str) -> Self {
        self.message = format!("{} ({})", self.message, hint);
        self
    }

    /// How loudly the cashier should be told.
    pub fn level(&self) -> NotificationLevel {
        match self.code {
            ErrorCode::RemoteRejected | ErrorCode::Transport | ErrorCode::Config => {
                NotificationLevel::Danger
            }
            ErrorCode::NotFound
            | ErrorCode::InsufficientStock
            | ErrorCode::ValidationError
            | ErrorCode::NoProductSelected
            | ErrorCode::ImageError
            | ErrorCode::Busy => NotificationLevel::Warning,
        }
    }

    pub fn to_notification(&self) -> Notification {
        Notification::new(self.level(), self.message.clone())
    }
}

impl From<CounterError> for Notification {
    fn from(err: CounterError) -> Self {
        Notification::new(err.level(), err.message)
    }
}

/// Converts session errors to counter errors.
impl From<CoreError> for CounterError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NoProductSelected => {
                CounterError::new(ErrorCode::NoProductSelected, "Please scan a product first")
            }
            CoreError::InsufficientStock {
                available,
                requested,
                ..
            } => CounterError::new(
                ErrorCode::InsufficientStock,
                format!(
                    "Insufficient stock: only {} available, {} requested",
                    available, requested
                ),
            ),
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ValidationError> for CounterError {
    fn from(err: ValidationError) -> Self {
        CounterError::validation(err.to_string())
    }
}

/// Converts API errors to counter errors.
impl From<ClientError> for CounterError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotFound { barcode } => CounterError::new(
                ErrorCode::NotFound,
                format!("Product not found for barcode {}", barcode),
            ),
            ClientError::InsufficientStock {
                available,
                requested,
            } => CounterError::new(
                ErrorCode::InsufficientStock,
                format!(
                    "Insufficient stock: only {} available, {} requested",
                    available, requested
                ),
            ),
            ClientError::RemoteRejected(reason) => {
                CounterError::new(ErrorCode::RemoteRejected, reason)
            }
            // raw transport text is shown as-is
            ClientError::Transport(text) => {
                CounterError::new(ErrorCode::Transport, format!("Network error: {}", text))
            }
            ClientError::Core(e) => e.into(),
        }
    }
}

impl From<DecodeError> for CounterError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Client(e) => e.into(),
            DecodeError::Decoder(_) => CounterError::new(ErrorCode::Transport, err.to_string()),
            other => CounterError::new(ErrorCode::ImageError, other.to_string()),
        }
    }
}

impl From<ConfigError> for CounterError {
    fn from(err: ConfigError) -> Self {
        CounterError::new(ErrorCode::Config, err.to_string())
    }
}

/// Result type for controller operations.
pub type CounterResult<T> = Result<T, CounterError>;
