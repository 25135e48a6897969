//! # Sale Session
//!
//! The client-side working state for one in-progress sale, from scan to
//! commit or reset.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Sale Session States                                  │
//! │                                                                         │
//! │               select_product()                                         │
//! │  ┌──────────┐ ───────────────────────► ┌───────────────────────────┐   │
//! │  │  Empty   │                          │     ProductSelected       │   │
//! │  │          │ ◄─────────────────────── │  product + barcode + qty  │   │
//! │  └──────────┘  reset() / commit ok     └─────────────┬─────────────┘   │
//! │                                           ▲          │                  │
//! │                                           └──────────┘                  │
//! │                               increase / decrease / set_quantity       │
//! │                               select_product() (replacement)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Product and barcode live in the same enum variant, so one can never be
//! present without the other. There is no "committing" state: commit is a
//! single transition gated on [`SaleSession::prepare_sale`].

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Product, SaleRecord};
use crate::validation::{validate_barcode, validate_product, validate_quantity};
use crate::MIN_QUANTITY;

// =============================================================================
// Selection
// =============================================================================

/// The product currently being sold.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    product: Product,
    barcode: String,
    quantity: i64,
}

impl Selection {
    pub fn product(&self) -> &Product {
        &self.product
    }

    /// The scanned barcode (may differ in formatting from `product.barcode`).
    pub fn barcode(&self) -> &str {
        &self.barcode
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    fn totals(&self) -> SaleTotals {
        let stock = self.product.stock_quantity;
        SaleTotals {
            quantity: self.quantity,
            unit_price: self.product.price,
            total: self.product.price.multiply_quantity(self.quantity),
            remaining_after_sale: stock.saturating_sub(self.quantity),
            over_stock: self.quantity > stock,
        }
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Figures shown under the selected product.
///
/// A pure function of the session; recomputed after every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleTotals {
    pub quantity: i64,
    #[ts(as = "i64")]
    pub unit_price: Money,
    /// `quantity × unit_price`
    #[ts(as = "i64")]
    pub total: Money,
    /// `stock_quantity - quantity`; negative only when `over_stock`.
    pub remaining_after_sale: i64,
    /// The quantity exceeds stock (only reachable through `set_quantity`).
    pub over_stock: bool,
}

impl SaleTotals {
    /// Warning text for the over-stock condition, if any.
    pub fn over_stock_warning(&self) -> Option<String> {
        self.over_stock.then(|| {
            format!(
                "Quantity exceeds stock by {} unit(s)",
                -self.remaining_after_sale
            )
        })
    }
}

// =============================================================================
// Quantity Outcome
// =============================================================================

/// Result of a quantity +/- intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// Quantity moved to the new value.
    Changed { quantity: i64 },
    /// Already at stock; quantity unchanged.
    StockLimitReached { stock: i64 },
    /// Already at 1; quantity unchanged.
    AtMinimum,
    /// Session is empty; nothing to adjust.
    NoProductSelected,
}

impl QuantityChange {
    pub fn is_changed(&self) -> bool {
        matches!(self, QuantityChange::Changed { .. })
    }
}

// =============================================================================
// Sale Session
// =============================================================================

/// Single active sale session, owned by the counter controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SaleSession {
    /// No product selected.
    #[default]
    Empty,
    /// A product is selected with `quantity >= 1`.
    ProductSelected(Selection),
}

impl SaleSession {
    /// Creates an empty session (page load).
    pub fn new() -> Self {
        SaleSession::Empty
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, SaleSession::Empty)
    }

    pub fn selection(&self) -> Option<&Selection> {
        match self {
            SaleSession::Empty => None,
            SaleSession::ProductSelected(selection) => Some(selection),
        }
    }

    pub fn product(&self) -> Option<&Product> {
        self.selection().map(Selection::product)
    }

    pub fn barcode(&self) -> Option<&str> {
        self.selection().map(Selection::barcode)
    }

    pub fn quantity(&self) -> Option<i64> {
        self.selection().map(Selection::quantity)
    }

    /// Selects a product after a successful lookup. Quantity resets to 1.
    ///
    /// Replacing an existing selection is allowed: scanning a second
    /// barcode mid-edit discards the first product and its quantity.
    pub fn select_product(&mut self, product: Product, barcode: &str) -> CoreResult<()> {
        let barcode = validate_barcode(barcode)?;
        validate_product(&product)?;

        if let SaleSession::ProductSelected(previous) = self {
            debug!(
                previous_barcode = %previous.barcode,
                previous_quantity = previous.quantity,
                barcode = %barcode,
                "Replacing selected product"
            );
        }

        debug!(product_id = product.id, barcode = %barcode, stock = product.stock_quantity, "Product selected");
        *self = SaleSession::ProductSelected(Selection {
            product,
            barcode,
            quantity: MIN_QUANTITY,
        });
        Ok(())
    }

    /// Adds one unit, unless that would exceed stock.
    pub fn increase_quantity(&mut self) -> QuantityChange {
        match self {
            SaleSession::Empty => QuantityChange::NoProductSelected,
            SaleSession::ProductSelected(selection) => {
                let stock = selection.product.stock_quantity;
                if selection.quantity < stock {
                    selection.quantity += 1;
                    QuantityChange::Changed {
                        quantity: selection.quantity,
                    }
                } else {
                    QuantityChange::StockLimitReached { stock }
                }
            }
        }
    }

    /// Removes one unit; the floor is 1.
    pub fn decrease_quantity(&mut self) -> QuantityChange {
        match self {
            SaleSession::Empty => QuantityChange::NoProductSelected,
            SaleSession::ProductSelected(selection) => {
                if selection.quantity > MIN_QUANTITY {
                    selection.quantity -= 1;
                    QuantityChange::Changed {
                        quantity: selection.quantity,
                    }
                } else {
                    QuantityChange::AtMinimum
                }
            }
        }
    }

    /// Manual quantity override (typed into the quantity field).
    ///
    /// Any value `>= 1` is accepted, including more than stock; the excess
    /// shows up as [`SaleTotals::over_stock`] and blocks commit.
    pub fn set_quantity(&mut self, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;
        match self {
            SaleSession::Empty => Err(CoreError::NoProductSelected),
            SaleSession::ProductSelected(selection) => {
                selection.quantity = quantity;
                Ok(())
            }
        }
    }

    /// Current totals, or `None` when no product is selected.
    pub fn compute_totals(&self) -> Option<SaleTotals> {
        self.selection().map(Selection::totals)
    }

    /// Builds the record to submit, checking stock first.
    ///
    /// ## Preconditions
    /// - A product is selected
    /// - `quantity <= stock_quantity`
    ///
    /// Failing either means no request should be sent at all.
    pub fn prepare_sale(&self) -> CoreResult<SaleRecord> {
        let selection = self.selection().ok_or(CoreError::NoProductSelected)?;
        let product = &selection.product;

        if !product.can_sell(selection.quantity) {
            return Err(CoreError::InsufficientStock {
                barcode: selection.barcode.clone(),
                available: product.stock_quantity,
                requested: selection.quantity,
            });
        }

        Ok(SaleRecord {
            barcode: selection.barcode.clone(),
            quantity: selection.quantity,
            amount: product.price.multiply_quantity(selection.quantity),
            product_id: product.id,
        })
    }

    /// Returns to `Empty` unconditionally.
    pub fn reset(&mut self) {
        *self = SaleSession::Empty;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
