//! # Validation Module
//!
//! Input validation for the sales counter.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Counter controller                                           │
//! │  ├── Barcode text from scanner / manual entry                          │
//! │  └── Chat message text                                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE + SaleSession                                    │
//! │  ├── Catalog payload sanity (price, stock)                             │
//! │  └── Quantity vs. stock before commit                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Pharmacy server                                              │
//! │  └── Authoritative stock check on /api/record-sale                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Product;
use crate::{MAX_BARCODE_LEN, MAX_QUANTITY, MIN_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a decoded or typed barcode and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 100 characters (catalog column width)
/// - No control characters (scanners sometimes append `\r`, which trimming removes)
///
/// ## Example
/// ```rust
/// use pharma_core::validation::validate_barcode;
///
/// assert_eq!(validate_barcode(" 8901030865278\r\n").unwrap(), "8901030865278");
/// assert!(validate_barcode("   ").is_err());
/// ```
pub fn validate_barcode(barcode: &str) -> ValidationResult<String> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if barcode.chars().count() > MAX_BARCODE_LEN {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: MAX_BARCODE_LEN,
        });
    }

    if barcode.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must not contain control characters".to_string(),
        });
    }

    Ok(barcode.to_string())
}

/// Validates a chat message and returns it trimmed.
pub fn validate_chat_message(message: &str) -> ValidationResult<String> {
    let message = message.trim();

    if message.is_empty() {
        return Err(ValidationError::Required {
            field: "message".to_string(),
        });
    }

    Ok(message.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale quantity.
///
/// ## Rules
/// - Must be at least 1
/// - At most [`MAX_QUANTITY`]; stock is checked separately before commit
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if !(MIN_QUANTITY..=MAX_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: MIN_QUANTITY,
            max: MAX_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price. Zero is allowed (free samples).
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a stock count.
pub fn validate_stock_quantity(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "stock_quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Payload Validators
// =============================================================================

/// Checks a catalog product before it is allowed into a sale session.
///
/// ## Rules
/// - Name must not be empty
/// - Price must not be negative
/// - Stock must not be negative
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    if product.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    validate_price(product.price)?;
    validate_stock_quantity(product.stock_quantity)?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
