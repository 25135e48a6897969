//! # State Module
//!
//! State owned by the sales counter controller.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Counter State                                        │
//! │                                                                         │
//! │  ┌──────────────────────────┐     ┌──────────────────────────────┐     │
//! │  │      SessionState        │     │      TransactionLog          │     │
//! │  │                          │     │                              │     │
//! │  │  Arc<Mutex<SaleSession>> │     │  last N committed sales      │     │
//! │  │  single writer: the      │     │  newest first, bounded       │     │
//! │  │  controller handler      │     │                              │     │
//! │  └──────────────────────────┘     └──────────────────────────────┘     │
//! │                                                                         │
//! │  Locks are never held across an `.await`.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod session;
pub mod transaction_log;

pub use session::SessionState;
pub use transaction_log::{TransactionLog, TransactionLogEntry};
