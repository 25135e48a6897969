//! # Pharmacy API Seam
//!
//! The one trait every remote call goes through. The counter holds an
//! `Arc<dyn PharmacyApi>`; production code plugs in
//! [`HttpPharmacyApi`](crate::http::HttpPharmacyApi), tests plug in
//! in-memory fakes that count calls.

use async_trait::async_trait;
use pharma_core::{Alert, ChatReply, Product, SaleRecord, SalesStats};

use crate::error::ClientResult;
use crate::image::ImageUpload;
use crate::protocol::{SaleReceipt, UploadResponse};

/// Operations the pharmacy server exposes to the counter.
#[async_trait]
pub trait PharmacyApi: Send + Sync {
    /// `GET /api/product-by-barcode`. A miss is `ClientError::NotFound`.
    async fn product_by_barcode(&self, barcode: &str) -> ClientResult<Product>;

    /// `POST /api/record-sale`. A declined sale is `ClientError::RemoteRejected`.
    async fn record_sale(&self, record: &SaleRecord) -> ClientResult<SaleReceipt>;

    /// `GET /api/sales-stats`.
    async fn sales_stats(&self) -> ClientResult<SalesStats>;

    /// `GET /api/alerts`, in server order.
    async fn alerts(&self) -> ClientResult<Vec<Alert>>;

    /// `POST /api/chat`.
    async fn chat(&self, message: &str) -> ClientResult<ChatReply>;

    /// `POST /api/upload`. Returns the raw reply; "no barcode" is a
    /// normal `status: error` reply, not an `Err`.
    async fn decode_upload(&self, image: &ImageUpload) -> ClientResult<UploadResponse>;
}
