//! # Wire Protocol
//!
//! JSON bodies exchanged with the pharmacy server.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET  /api/product-by-barcode?barcode=…  → {status, data?, message?}   │
//! │  POST /api/record-sale   SaleRecord      → {status, transaction_id?,   │
//! │                                             message?}                   │
//! │  GET  /api/sales-stats                   → {status, total_transactions,│
//! │                                             total_revenue, total_units}│
//! │  GET  /api/alerts                        → {status, alerts: […]}       │
//! │  POST /api/chat          {message}       → {status, response,          │
//! │                                             timestamp}                  │
//! │  POST /api/upload        multipart file  → {status, barcode?, format?, │
//! │                                             message?}                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every response carries `status: "success" | "error"`; errors come with
//! a human-readable `message`, usually alongside a non-2xx HTTP status.

use pharma_core::money;
use pharma_core::{Alert, ChatReply, DecodedSymbol, Money, Product, SalesStats};
use serde::{Deserialize, Serialize};

/// Endpoint paths, relative to the configured base URL.
pub mod paths {
    pub const PRODUCT_BY_BARCODE: &str = "api/product-by-barcode";
    pub const RECORD_SALE: &str = "api/record-sale";
    pub const SALES_STATS: &str = "api/sales-stats";
    pub const ALERTS: &str = "api/alerts";
    pub const CHAT: &str = "api/chat";
    pub const UPLOAD: &str = "api/upload";
}

/// Message the server returns when an image holds no barcode.
pub const NO_BARCODE_MESSAGE: &str = "No barcode detected";

// =============================================================================
// Envelope Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Error,
}

impl ApiStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ApiStatus::Success)
    }
}

// =============================================================================
// Responses
// =============================================================================

/// `{status, data?, message?}` - the product lookup envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub status: ApiStatus,
    /// Absent on errors.
    pub data: Option<T>,
    pub message: Option<String>,
}

pub type ProductResponse = DataEnvelope<Product>;

/// Reply to `POST /api/record-sale`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSaleResponse {
    pub status: ApiStatus,
    #[serde(default)]
    pub transaction_id: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Reply to `GET /api/sales-stats`. Figures sit next to `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesStatsResponse {
    pub status: ApiStatus,
    #[serde(default)]
    pub total_transactions: i64,
    #[serde(default, with = "money::decimal")]
    pub total_revenue: Money,
    #[serde(default)]
    pub total_units: i64,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<SalesStatsResponse> for SalesStats {
    fn from(response: SalesStatsResponse) -> Self {
        SalesStats {
            total_transactions: response.total_transactions,
            total_revenue: response.total_revenue,
            total_units: response.total_units,
        }
    }
}

/// Reply to `GET /api/alerts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsResponse {
    pub status: ApiStatus,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

/// Reply to `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub status: ApiStatus,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatResponse {
    pub fn into_reply(self) -> Option<ChatReply> {
        let timestamp = self.timestamp;
        self.response.map(|response| ChatReply {
            response,
            timestamp,
        })
    }
}

/// Reply to `POST /api/upload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub status: ApiStatus,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl UploadResponse {
    /// True when the server looked at the image and found nothing.
    pub fn is_no_barcode(&self) -> bool {
        !self.status.is_success()
            && self
                .message
                .as_deref()
                .is_some_and(|m| m.eq_ignore_ascii_case(NO_BARCODE_MESSAGE))
    }

    /// The decoded symbol, if the server returned a non-blank one.
    pub fn symbol(&self) -> Option<DecodedSymbol> {
        if !self.status.is_success() {
            return None;
        }
        self.barcode
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| DecodedSymbol {
                value: value.to_string(),
                format: self.format.clone(),
            })
    }
}

/// What the server said about a recorded sale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleReceipt {
    pub transaction_id: Option<i64>,
    pub message: Option<String>,
}
