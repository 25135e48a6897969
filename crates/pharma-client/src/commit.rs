//! # Sale Commit Client
//!
//! Finalizes a sale against the server of record.
//!
//! ## Commit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleSession ──► prepare_sale()                                         │
//! │                    │                                                    │
//! │                    ├── Empty            ──► Err(Core(NoProductSelected))│
//! │                    ├── qty > stock      ──► Err(InsufficientStock)      │
//! │                    │                        (no request sent)           │
//! │                    ▼                                                    │
//! │               SaleRecord ──► POST /api/record-sale                      │
//! │                                 │                                       │
//! │                                 ├── success ──► Ok(CommittedSale)       │
//! │                                 ├── error   ──► Err(RemoteRejected)     │
//! │                                 └── network ──► Err(Transport)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The session is only read here. Resetting it after success is the
//! caller's job, and a failure leaves it untouched for a retry.

use std::sync::Arc;

use pharma_core::{SaleRecord, SaleSession};
use tracing::{debug, info};

use crate::api::PharmacyApi;
use crate::error::ClientResult;
use crate::protocol::SaleReceipt;

/// A sale the server accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedSale {
    pub record: SaleRecord,
    pub product_name: String,
    pub receipt: SaleReceipt,
}

#[derive(Clone)]
pub struct CommitClient {
    api: Arc<dyn PharmacyApi>,
}

impl CommitClient {
    pub fn new(api: Arc<dyn PharmacyApi>) -> Self {
        Self { api }
    }

    /// Validates the session and submits its sale.
    pub async fn commit(&self, session: &SaleSession) -> ClientResult<CommittedSale> {
        let record = session.prepare_sale()?;
        let product_name = session
            .product()
            .map(|product| product.name.clone())
            .unwrap_or_default();

        debug!(
            barcode = %record.barcode,
            quantity = record.quantity,
            amount = %record.amount,
            "Submitting sale"
        );
        let receipt = self.api.record_sale(&record).await?;
        info!(
            transaction_id = ?receipt.transaction_id,
            product = %product_name,
            quantity = record.quantity,
            amount = %record.amount,
            "Sale recorded"
        );

        Ok(CommittedSale {
            record,
            product_name,
            receipt,
        })
    }
}

impl std::fmt::Debug for CommitClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitClient").finish_non_exhaustive()
    }
}
