//! # Product Lookup Client
//!
//! Maps a decoded symbol to a catalog product.
//!
//! ```text
//! "  8901030865278\r\n"
//!        │ validate_barcode (trim, length, control chars)
//!        ▼
//! GET /api/product-by-barcode?barcode=8901030865278
//!        │
//!        ├── Ok(Product)                ──► caller selects it
//!        ├── Err(NotFound)              ──► caller resets the session
//!        └── Err(Transport)             ──► caller resets the session
//! ```
//!
//! A blank barcode is rejected before any request goes out.

use std::sync::Arc;

use pharma_core::validation::validate_barcode;
use pharma_core::Product;
use tracing::{debug, info};

use crate::api::PharmacyApi;
use crate::error::ClientResult;

/// A product found for a scanned barcode.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupHit {
    /// The normalized barcode that was queried.
    pub barcode: String,
    pub product: Product,
}

#[derive(Clone)]
pub struct LookupClient {
    api: Arc<dyn PharmacyApi>,
}

impl LookupClient {
    pub fn new(api: Arc<dyn PharmacyApi>) -> Self {
        Self { api }
    }

    /// Looks up a product by barcode.
    pub async fn lookup(&self, barcode: &str) -> ClientResult<LookupHit> {
        let barcode = validate_barcode(barcode)?;
        debug!(barcode = %barcode, "Looking up product");

        let product = self.api.product_by_barcode(&barcode).await?;
        info!(barcode = %barcode, product_id = product.id, name = %product.name, "Product found");

        Ok(LookupHit { barcode, product })
    }
}

impl std::fmt::Debug for LookupClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupClient").finish_non_exhaustive()
    }
}
