//! # Sinks
//!
//! The two outward-facing collaborators of the controller.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SaleController                                   │
//! │                                                                         │
//! │     notify(Notification)                 render_*(view model)           │
//! │            │                                     │                      │
//! │            ▼                                     ▼                      │
//! │  ┌────────────────────┐              ┌─────────────────────────────┐   │
//! │  │  NotificationSink  │              │      PresentationSink       │   │
//! │  │  toasts, auto-     │              │  product panel, totals,     │   │
//! │  │  dismissed by the  │              │  transaction log, stats,    │   │
//! │  │  implementation    │              │  alerts, chat               │   │
//! │  └────────────────────┘              └─────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both receive plain values. The controller never manages display
//! lifetime.

use pharma_core::{
    Alert, ChatReply, Money, Notification, Product, SaleSession, SaleTotals, SalesStats,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::state::TransactionLogEntry;

// =============================================================================
// Sink Traits
// =============================================================================

/// Displays user notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Renders view models.
pub trait PresentationSink: Send + Sync {
    /// Product panel and totals. Called after every session change.
    fn render_sale(&self, view: &SaleView);

    /// Transaction log, newest first.
    fn render_transactions(&self, entries: &[TransactionLogEntry]);

    fn render_stats(&self, stats: &SalesStats);

    /// Alerts, most urgent first.
    fn render_alerts(&self, alerts: &[Alert]);

    fn render_chat(&self, question: &str, reply: &ChatReply);
}

// =============================================================================
// View Models
// =============================================================================

/// Product fields shown while a product is selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub barcode: String,
    pub category: Option<String>,
    #[ts(as = "i64")]
    pub unit_price: Money,
    pub stock_quantity: i64,
    /// `YYYY-MM-DD`
    pub expiry_date: Option<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        ProductView {
            id: product.id,
            name: product.name.clone(),
            barcode: product.barcode.clone(),
            category: product.category.clone(),
            unit_price: product.price,
            stock_quantity: product.stock_quantity,
            expiry_date: product.expiry_date.map(|d| d.format("%Y-%m-%d").to_string()),
        }
    }
}

/// Everything the sale panel shows. Empty session means empty view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleView {
    pub product: Option<ProductView>,
    /// The barcode as scanned.
    pub barcode: Option<String>,
    pub totals: Option<SaleTotals>,
    /// Set when quantity exceeds stock.
    pub over_stock_warning: Option<String>,
}

impl SaleView {
    pub fn from_session(session: &SaleSession) -> Self {
        let totals = session.compute_totals();
        SaleView {
            product: session.product().map(ProductView::from),
            barcode: session.barcode().map(str::to_string),
            totals,
            over_stock_warning: totals.and_then(|t| t.over_stock_warning()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.product.is_none()
    }
}
