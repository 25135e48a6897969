//! # Client Errors
//!
//! Error types for everything that leaves the process: the pharmacy API,
//! barcode decoding, and configuration loading.
//!
//! ## Error Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       pharma-client errors                              │
//! │                                                                         │
//! │  ClientError                                                           │
//! │  ├── NotFound           catalog has no product for the barcode         │
//! │  ├── InsufficientStock  caught locally, no request sent                │
//! │  ├── RemoteRejected     server said {"status": "error", message}       │
//! │  ├── Transport          connect / timeout / HTTP status / bad JSON     │
//! │  └── Core / Validation  bad input before any request                   │
//! │                                                                         │
//! │  DecodeError            image unreadable, too large, not an image      │
//! │  ConfigError            counter.toml / PHARMA_* problems               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these are fatal. The counter app turns each one into exactly
//! one notification.

use pharma_core::{CoreError, ValidationError};
use thiserror::Error;

// =============================================================================
// Client Error
// =============================================================================

/// Errors from the pharmacy API adapters.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The catalog has no product with this barcode.
    #[error("Product not found for barcode {barcode}")]
    NotFound { barcode: String },

    /// Quantity exceeds stock; detected before any network call.
    #[error("Insufficient stock: only {available} available, {requested} requested")]
    InsufficientStock { available: i64, requested: i64 },

    /// The server processed the request and declined it.
    #[error("{0}")]
    RemoteRejected(String),

    /// Network, HTTP status or response parsing failure.
    #[error("Network error: {0}")]
    Transport(String),

    /// Session or input rule violation.
    #[error(transparent)]
    Core(CoreError),
}

impl ClientError {
    /// Returns true if repeating the same request might succeed.
    ///
    /// ## Retryable Errors
    /// - Transport failures (server down, timeout)
    ///
    /// ## Non-Retryable Errors
    /// - NotFound, InsufficientStock, RemoteRejected, Core
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }

    /// Builds a transport error from any displayable failure.
    pub fn transport(err: impl std::fmt::Display) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl From<CoreError> for ClientError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InsufficientStock {
                available,
                requested,
                ..
            } => ClientError::InsufficientStock {
                available,
                requested,
            },
            other => ClientError::Core(other),
        }
    }
}

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        ClientError::Core(CoreError::Validation(err))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Transport("request timed out".to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

/// Result type for API operations.
pub type ClientResult<T> = Result<T, ClientError>;

// =============================================================================
// Decode Error
// =============================================================================

/// Errors acquiring or decoding a barcode image.
///
/// "No barcode in the picture" is not an error: decoders return `Ok(None)`.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Image file is empty")]
    EmptyImage,

    #[error("Image is too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },

    #[error("{file_name} is not a supported image (PNG, JPEG, GIF, BMP, WEBP, TIFF)")]
    UnsupportedFormat { file_name: String },

    #[error("Could not read image: {0}")]
    Io(#[from] std::io::Error),

    /// The decoding service failed (not "no barcode").
    #[error("Barcode decoding failed: {0}")]
    Decoder(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl DecodeError {
    pub fn is_retryable(&self) -> bool {
        match self {
            DecodeError::Client(err) => err.is_retryable(),
            DecodeError::Decoder(_) => true,
            _ => false,
        }
    }
}

/// Result type for image/decoder operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

// =============================================================================
// Config Error
// =============================================================================

/// Errors loading or validating `counter.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Unit Tests
// =============================================================================
