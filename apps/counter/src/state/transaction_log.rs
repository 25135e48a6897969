//! # Transaction Log
//!
//! The on-screen list of sales committed from this counter.
//!
//! Local display only: the pharmacy server is the record of truth, and
//! the log is gone when the app exits.
//!
//! ```text
//! push(entry) ──► [newest, ..., oldest]   capacity 50
//!                                  └──► evicted when full
//! ```

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use pharma_client::CommittedSale;
use pharma_core::Money;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// One committed sale as shown in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransactionLogEntry {
    /// Local row identity
    #[ts(type = "string")]
    pub entry_id: Uuid,

    pub product_name: String,

    pub barcode: String,

    pub quantity: i64,

    /// `quantity × unit price` as submitted
    #[ts(as = "i64")]
    pub amount: Money,

    /// Server transaction id, when the server returned one
    pub transaction_id: Option<i64>,

    #[ts(type = "string")]
    pub recorded_at: DateTime<Utc>,
}

impl TransactionLogEntry {
    pub fn from_committed(sale: &CommittedSale, recorded_at: DateTime<Utc>) -> Self {
        TransactionLogEntry {
            entry_id: Uuid::new_v4(),
            product_name: sale.product_name.clone(),
            barcode: sale.record.barcode.clone(),
            quantity: sale.record.quantity,
            amount: sale.record.amount,
            transaction_id: sale.receipt.transaction_id,
            recorded_at,
        }
    }
}

/// Bounded log of recent sales, newest first.
#[derive(Debug, Clone)]
pub struct TransactionLog {
    entries: VecDeque<TransactionLogEntry>,
    capacity: usize,
}

impl TransactionLog {
    /// Creates an empty log. A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    /// Adds a row at the top, evicting the oldest when full.
    pub fn push(&mut self, entry: TransactionLogEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(entry);
    }

    /// Rows, newest first.
    pub fn entries(&self) -> Vec<TransactionLogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&TransactionLogEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Sum of all amounts currently in the log.
    pub fn total(&self) -> Money {
        self.entries
            .iter()
            .fold(Money::zero(), |sum, entry| sum + entry.amount)
    }
}

impl Default for TransactionLog {
    fn default() -> Self {
        Self::new(50)
    }
}
