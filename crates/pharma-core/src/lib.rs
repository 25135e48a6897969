//! # pharma-core: Sale Session Logic for the SmartPharma Counter
//!
//! Everything the counter decides on its own lives here, as pure code with
//! no network, file or clock access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     SmartPharma Counter Architecture                    │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 counter app (terminal front end)                │   │
//! │  │    scan ──► quantity +/- ──► submit ──► transaction log        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pharma-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  session  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │SaleSession│  │   rules   │  │   │
//! │  │   │SaleRecord │  │  decimal  │  │ SaleTotals│  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               pharma-client (HTTP + barcode decoding)           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Wire types (Product, SaleRecord, SalesStats, Alert, ...)
//! - [`money`] - Integer-cent money and the decimal wire adapter
//! - [`session`] - The sale session state machine
//! - [`notification`] - User-facing notification values
//! - [`validation`] - Input checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use pharma_core::{Money, Product, SaleSession};
//!
//! let product = Product {
//!     id: 7,
//!     name: "Paracetamol 500mg".into(),
//!     barcode: "8901030865278".into(),
//!     category: None,
//!     price: Money::parse_decimal("5.00").unwrap(),
//!     stock_quantity: 10,
//!     expiry_date: None,
//!     mfg_date: None,
//!     packaging_type: None,
//!     eco_score: None,
//! };
//!
//! let mut session = SaleSession::new();
//! session.select_product(product, "8901030865278").unwrap();
//! session.increase_quantity();
//!
//! let record = session.prepare_sale().unwrap();
//! assert_eq!(record.amount, Money::from_cents(1000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod notification;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use notification::{Notification, NotificationLevel};
pub use session::{QuantityChange, SaleSession, SaleTotals, Selection};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Longest barcode accepted (the catalog column is `VARCHAR(100)`).
pub const MAX_BARCODE_LEN: usize = 100;

/// Smallest quantity a session can hold.
pub const MIN_QUANTITY: i64 = 1;

/// Largest quantity a session can hold. Keeps `price × quantity` and
/// `stock - quantity` far from `i64` limits.
pub const MAX_QUANTITY: i64 = 100_000;

/// A selected product expiring within this many days triggers a warning.
///
/// Matches the server's critical alert window.
pub const DEFAULT_EXPIRY_WARNING_DAYS: i64 = 4;
