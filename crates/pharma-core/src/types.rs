//! # Domain Types
//!
//! Wire-compatible domain types for the sales counter.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   SaleRecord    │   │   SalesStats    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  barcode        │   │  transactions   │       │
//! │  │  barcode        │   │  quantity       │   │  revenue        │       │
//! │  │  price          │   │  amount         │   │  units          │       │
//! │  │  stock_quantity │   │  product_id     │   └─────────────────┘       │
//! │  │  expiry_date    │   └─────────────────┘                              │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Alert       │   │   ChatReply     │   │ DecodedSymbol   │       │
//! │  │  severity       │   │  response       │   │  value          │       │
//! │  │  product        │   │  timestamp      │   │  format         │       │
//! │  │  message        │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Products are remote-sourced and immutable for the lifetime of a
//! session. The server of record owns all durable state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{self, Money};

// =============================================================================
// Product
// =============================================================================

/// A catalog product as returned by `GET /api/product-by-barcode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Catalog identifier.
    pub id: i64,

    /// Display name shown to the cashier.
    pub name: String,

    /// Barcode (EAN-13, UPC-A, etc.).
    #[serde(default)]
    pub barcode: String,

    /// Category such as "Antibiotic" or "Analgesic".
    #[serde(default)]
    pub category: Option<String>,

    /// Unit price.
    #[serde(with = "money::decimal")]
    #[ts(as = "f64")]
    pub price: Money,

    /// Units currently on the shelf.
    #[serde(default)]
    pub stock_quantity: i64,

    /// Expiry date (`YYYY-MM-DD`).
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,

    /// Manufacturing date (`YYYY-MM-DD`).
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub mfg_date: Option<NaiveDate>,

    /// Packaging material (blister, bottle, ...).
    #[serde(default)]
    pub packaging_type: Option<String>,

    /// Packaging sustainability score (0-10).
    #[serde(default)]
    pub eco_score: Option<f64>,
}

impl Product {
    /// Whole days from `today` until expiry. Negative once expired.
    pub fn days_until_expiry(&self, today: NaiveDate) -> Option<i64> {
        self.expiry_date
            .map(|expiry| expiry.signed_duration_since(today).num_days())
    }

    /// True if the expiry date is before `today`.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.days_until_expiry(today).is_some_and(|days| days < 0)
    }

    /// True if the product expires within `days` days of `today`
    /// (already-expired products included).
    pub fn expires_within(&self, today: NaiveDate, days: i64) -> bool {
        self.days_until_expiry(today).is_some_and(|left| left <= days)
    }

    /// Checks if `quantity` units can be sold from current stock.
    pub fn can_sell(&self, quantity: i64) -> bool {
        quantity >= 1 && quantity <= self.stock_quantity
    }
}

// =============================================================================
// Sale Record
// =============================================================================

/// A finalized sale, constructed once per commit and then discarded.
///
/// This is the exact body of `POST /api/record-sale`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRecord {
    pub barcode: String,
    pub quantity: i64,
    /// `quantity × unit price`
    #[serde(with = "money::decimal")]
    #[ts(as = "f64")]
    pub amount: Money,
    pub product_id: i64,
}

// =============================================================================
// Sales Statistics
// =============================================================================

/// Aggregate sales figures from `GET /api/sales-stats`.
///
/// Always re-fetched from the server, never computed locally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesStats {
    #[serde(default)]
    pub total_transactions: i64,
    #[serde(default, with = "money::decimal")]
    #[ts(as = "f64")]
    pub total_revenue: Money,
    #[serde(default)]
    pub total_units: i64,
}

// =============================================================================
// Alerts
// =============================================================================

/// Alert severity, ordered most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Critical,
    High,
    Warning,
    /// Anything the server sends that we don't recognize.
    #[serde(other)]
    Info,
}

/// An expiry or stock alert from `GET /api/alerts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Alert {
    #[serde(default)]
    pub alert_id: Option<i64>,
    /// `expiry` or `stock`
    #[serde(default, rename = "type")]
    pub alert_type: Option<String>,
    pub severity: AlertSeverity,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub message: String,
}

/// Sorts alerts most urgent first, keeping server order within a severity.
pub fn sort_alerts(alerts: &mut [Alert]) {
    alerts.sort_by_key(|alert| alert.severity);
}

// =============================================================================
// Chat
// =============================================================================

/// Assistant answer from `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

// =============================================================================
// Decoded Barcode
// =============================================================================

/// The decoded value of a barcode image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DecodedSymbol {
    /// The symbol text, e.g. `"8901030865278"`.
    pub value: String,
    /// Symbology reported by the decoder (`EAN13`, `CODE128`, ...).
    #[serde(default)]
    pub format: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
