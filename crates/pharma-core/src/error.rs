//! # Error Types
//!
//! Domain-specific error types for pharma-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pharma-core errors (this file)                                        │
//! │  ├── CoreError        - Sale session rule violations                   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  pharma-client errors (separate crate)                                 │
//! │  ├── ClientError      - Catalog / sales API failures                   │
//! │  └── DecodeError      - Barcode image acquisition / decoding           │
//! │                                                                         │
//! │  counter app errors                                                    │
//! │  └── CounterError     - What the cashier sees (one notification)       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → CounterError        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Sale session rule violations.
///
/// Every variant maps to exactly one user-facing message at the UI
/// boundary; none of them is fatal to the session.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An operation needs a selected product but the session is empty.
    #[error("No product selected")]
    NoProductSelected,

    /// Requested quantity is more than the product has in stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Quantity: 12, stock: 10
    ///      │
    ///      ▼
    /// submit_sale()
    ///      │
    ///      ▼
    /// InsufficientStock { barcode: "8901", available: 10, requested: 12 }
    ///      │
    ///      ▼
    /// No request is sent. UI shows: "Only 10 in stock"
    /// ```
    #[error("Insufficient stock for {barcode}: available {available}, requested {requested}")]
    InsufficientStock {
        barcode: String,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input or a catalog payload doesn't meet
/// requirements. Used for early validation before session logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., malformed decimal, control characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
