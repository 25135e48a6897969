//! # Test Doubles
//!
//! In-memory stand-ins for the pharmacy server and the barcode decoder.
//! They count every call so "no request was sent" can be asserted
//! directly. Enabled for this crate's tests and, through the `testing`
//! feature, for downstream crates' tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use pharma_core::{Alert, ChatReply, DecodedSymbol, Money, Product, SaleRecord, SalesStats};
use tokio::sync::Semaphore;

use crate::api::PharmacyApi;
use crate::decoder::BarcodeDecoder;
use crate::error::{ClientError, ClientResult, DecodeError, DecodeResult};
use crate::image::ImageUpload;
use crate::protocol::{ApiStatus, SaleReceipt, UploadResponse, NO_BARCODE_MESSAGE};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A product with the given barcode, price and stock.
pub fn sample_product(barcode: &str, price_cents: i64, stock: i64) -> Product {
    Product {
        id: 1,
        name: format!("Test product {}", barcode),
        barcode: barcode.to_string(),
        category: Some("Analgesic".to_string()),
        price: Money::from_cents(price_cents),
        stock_quantity: stock,
        expiry_date: None,
        mfg_date: None,
        packaging_type: None,
        eco_score: None,
    }
}

// =============================================================================
// Fake Pharmacy API
// =============================================================================

/// Behaves like the pharmacy server: accepted sales reduce stock and
/// update the statistics.
#[derive(Default)]
pub struct FakeApi {
    products: Mutex<HashMap<String, Product>>,
    recorded: Mutex<Vec<SaleRecord>>,
    stats: Mutex<SalesStats>,
    alerts: Mutex<Vec<Alert>>,
    upload_reply: Mutex<Option<UploadResponse>>,
    sale_rejection: Mutex<Option<String>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    offline: AtomicBool,
    stats_offline: AtomicBool,
    next_transaction_id: AtomicI64,
    lookup_calls: AtomicUsize,
    sale_calls: AtomicUsize,
    stats_calls: AtomicUsize,
    alerts_calls: AtomicUsize,
    chat_calls: AtomicUsize,
    upload_calls: AtomicUsize,
}

impl FakeApi {
    pub fn with_product(barcode: &str, price_cents: i64, stock: i64) -> Self {
        let api = Self::default();
        api.add_product(sample_product(barcode, price_cents, stock));
        api
    }

    pub fn add_product(&self, product: Product) {
        lock(&self.products).insert(product.barcode.clone(), product);
    }

    /// Every request fails with a transport error while set.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Only `sales_stats` fails while set.
    pub fn set_stats_offline(&self, offline: bool) {
        self.stats_offline.store(offline, Ordering::SeqCst);
    }

    /// Sales are declined with this message from now on.
    pub fn reject_sales(&self, message: &str) {
        *lock(&self.sale_rejection) = Some(message.to_string());
    }

    pub fn set_stats(&self, stats: SalesStats) {
        *lock(&self.stats) = stats;
    }

    pub fn set_alerts(&self, alerts: Vec<Alert>) {
        *lock(&self.alerts) = alerts;
    }

    pub fn set_upload_reply(&self, reply: UploadResponse) {
        *lock(&self.upload_reply) = Some(reply);
    }

    /// Holds lookups and sales until [`FakeApi::release`] is called.
    pub fn hold_requests(&self) {
        *lock(&self.gate) = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self) {
        if let Some(gate) = lock(&self.gate).take() {
            gate.add_permits(Semaphore::MAX_PERMITS);
        }
    }

    pub fn recorded_sales(&self) -> Vec<SaleRecord> {
        lock(&self.recorded).clone()
    }

    pub fn stock_of(&self, barcode: &str) -> Option<i64> {
        lock(&self.products).get(barcode).map(|p| p.stock_quantity)
    }

    pub fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }

    pub fn sale_calls(&self) -> usize {
        self.sale_calls.load(Ordering::SeqCst)
    }

    pub fn stats_calls(&self) -> usize {
        self.stats_calls.load(Ordering::SeqCst)
    }

    pub fn alerts_calls(&self) -> usize {
        self.alerts_calls.load(Ordering::SeqCst)
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    async fn pass_gate(&self) {
        let gate = lock(&self.gate).clone();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await;
        }
    }

    fn check_online(&self) -> ClientResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(ClientError::Transport("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PharmacyApi for FakeApi {
    async fn product_by_barcode(&self, barcode: &str) -> ClientResult<Product> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        self.check_online()?;

        lock(&self.products)
            .get(barcode)
            .cloned()
            .ok_or_else(|| ClientError::NotFound {
                barcode: barcode.to_string(),
            })
    }

    async fn record_sale(&self, record: &SaleRecord) -> ClientResult<SaleReceipt> {
        self.sale_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        self.check_online()?;

        if let Some(message) = lock(&self.sale_rejection).clone() {
            return Err(ClientError::RemoteRejected(message));
        }

        if let Some(product) = lock(&self.products).get_mut(&record.barcode) {
            if product.stock_quantity < record.quantity {
                return Err(ClientError::RemoteRejected("Insufficient stock".to_string()));
            }
            product.stock_quantity -= record.quantity;
        }

        {
            let mut stats = lock(&self.stats);
            stats.total_transactions += 1;
            stats.total_revenue += record.amount;
            stats.total_units += record.quantity;
        }
        lock(&self.recorded).push(record.clone());

        Ok(SaleReceipt {
            transaction_id: Some(self.next_transaction_id.fetch_add(1, Ordering::SeqCst) + 1),
            message: Some("Sale recorded successfully".to_string()),
        })
    }

    async fn sales_stats(&self) -> ClientResult<SalesStats> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        if self.stats_offline.load(Ordering::SeqCst) {
            return Err(ClientError::Transport("request timed out".to_string()));
        }
        Ok(lock(&self.stats).clone())
    }

    async fn alerts(&self) -> ClientResult<Vec<Alert>> {
        self.alerts_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(lock(&self.alerts).clone())
    }

    async fn chat(&self, message: &str) -> ClientResult<ChatReply> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(ChatReply {
            response: format!("You asked: {}", message),
            timestamp: None,
        })
    }

    async fn decode_upload(&self, _image: &ImageUpload) -> ClientResult<UploadResponse> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(lock(&self.upload_reply).clone().unwrap_or(UploadResponse {
            status: ApiStatus::Error,
            barcode: None,
            format: None,
            message: Some(NO_BARCODE_MESSAGE.to_string()),
        }))
    }
}

// =============================================================================
// Fake Decoder
// =============================================================================

/// Returns a fixed outcome for every image.
#[derive(Default)]
pub struct FakeDecoder {
    symbol: Mutex<Option<String>>,
    failure: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl FakeDecoder {
    /// Decodes every image to `value`.
    pub fn returning(value: &str) -> Self {
        let decoder = Self::default();
        *lock(&decoder.symbol) = Some(value.to_string());
        decoder
    }

    /// Finds no barcode in any image.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fails every decode with `message`.
    pub fn failing(message: &str) -> Self {
        let decoder = Self::default();
        *lock(&decoder.failure) = Some(message.to_string());
        decoder
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BarcodeDecoder for FakeDecoder {
    async fn decode(&self, _image: &ImageUpload) -> DecodeResult<Option<DecodedSymbol>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = lock(&self.failure).clone() {
            return Err(DecodeError::Decoder(message));
        }
        Ok(lock(&self.symbol).clone().map(|value| DecodedSymbol {
            value,
            format: Some("EAN13".to_string()),
        }))
    }
}
