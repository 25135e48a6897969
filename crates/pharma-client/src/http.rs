//! # HTTP Pharmacy API
//!
//! [`PharmacyApi`] over reqwest, talking JSON to the pharmacy server.
//!
//! ## Response Handling
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  send() fails (refused, DNS, timeout)  ──► ClientError::Transport       │
//! │  404 on product lookup                 ──► ClientError::NotFound        │
//! │  lookup body, status = "error"         ──► ClientError::Transport       │
//! │  other body, status = "error"          ──► ClientError::RemoteRejected  │
//! │  body parses, status = "success"       ──► Ok(payload)                  │
//! │  body does not parse                   ──► ClientError::Transport       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The server sends structured `{status: "error", message}` bodies with
//! 4xx/5xx codes, so bodies are parsed regardless of the HTTP status.

use async_trait::async_trait;
use pharma_core::{Alert, ChatReply, Product, SaleRecord, SalesStats};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::PharmacyApi;
use crate::config::{ApiSettings, CounterConfig};
use crate::error::{ClientError, ClientResult};
use crate::image::ImageUpload;
use crate::protocol::{
    paths, AlertsResponse, ApiStatus, ChatRequest, ChatResponse, ProductResponse,
    RecordSaleResponse, SaleReceipt, SalesStatsResponse, UploadResponse,
};

/// Reqwest-backed pharmacy API client.
///
/// ```ignore
/// let api = HttpPharmacyApi::from_config(&CounterConfig::load(None)?)?;
/// let product = api.product_by_barcode("8901030865278").await?;
/// ```
#[derive(Debug, Clone)]
pub struct HttpPharmacyApi {
    client: Client,
    base_url: String,
}

impl HttpPharmacyApi {
    pub fn new(settings: &ApiSettings) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &CounterConfig) -> ClientResult<Self> {
        Self::new(&config.api)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Reads the body as `T`, whatever the HTTP status.
    async fn read_body<T: DeserializeOwned>(response: Response) -> ClientResult<(StatusCode, T)> {
        let status = response.status();
        let text = response.text().await?;

        match serde_json::from_str::<T>(&text) {
            Ok(body) => Ok((status, body)),
            Err(e) if status.is_success() => Err(ClientError::Transport(format!(
                "Invalid response from server: {}",
                e
            ))),
            Err(_) => Err(ClientError::Transport(format!("Server returned HTTP {}", status))),
        }
    }

    fn rejected(status: StatusCode, message: Option<String>) -> ClientError {
        ClientError::RemoteRejected(
            message.unwrap_or_else(|| format!("Request failed with HTTP {}", status)),
        )
    }
}

fn log_failure(operation: &'static str) -> impl Fn(&ClientError) {
    move |err| warn!(operation, error = %err, "Pharmacy API call failed")
}

// =============================================================================
// Requests
// =============================================================================

impl HttpPharmacyApi {
    async fn fetch_product(&self, barcode: &str) -> ClientResult<Product> {
        let response = self
            .client
            .get(self.url(paths::PRODUCT_BY_BARCODE))
            .query(&[("barcode", barcode)])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                barcode: barcode.to_string(),
            });
        }

        let (status, envelope) = Self::read_body::<ProductResponse>(response).await?;
        match (envelope.status, envelope.data) {
            (ApiStatus::Success, Some(product)) => Ok(product),
            (ApiStatus::Success, None) => Err(ClientError::Transport(
                "Server returned no product data".to_string(),
            )),
            // a lookup is either a miss (404 above) or a failed request
            (ApiStatus::Error, _) => Err(ClientError::Transport(
                envelope
                    .message
                    .unwrap_or_else(|| format!("Lookup failed with HTTP {}", status)),
            )),
        }
    }

    async fn post_sale(&self, record: &SaleRecord) -> ClientResult<SaleReceipt> {
        let response = self
            .client
            .post(self.url(paths::RECORD_SALE))
            .json(record)
            .send()
            .await?;

        let (status, body) = Self::read_body::<RecordSaleResponse>(response).await?;
        if body.status.is_success() {
            Ok(SaleReceipt {
                transaction_id: body.transaction_id,
                message: body.message,
            })
        } else {
            Err(Self::rejected(status, body.message))
        }
    }

    async fn fetch_stats(&self) -> ClientResult<SalesStats> {
        let response = self.client.get(self.url(paths::SALES_STATS)).send().await?;
        let (status, body) = Self::read_body::<SalesStatsResponse>(response).await?;
        if body.status.is_success() {
            Ok(SalesStats::from(body))
        } else {
            Err(Self::rejected(status, body.message))
        }
    }

    async fn fetch_alerts(&self) -> ClientResult<Vec<Alert>> {
        let response = self.client.get(self.url(paths::ALERTS)).send().await?;
        let (status, body) = Self::read_body::<AlertsResponse>(response).await?;
        if body.status.is_success() {
            Ok(body.alerts)
        } else {
            Err(Self::rejected(status, body.message))
        }
    }

    async fn post_chat(&self, message: &str) -> ClientResult<ChatReply> {
        let response = self
            .client
            .post(self.url(paths::CHAT))
            .json(&ChatRequest { message })
            .send()
            .await?;

        let (status, body) = Self::read_body::<ChatResponse>(response).await?;
        if !body.status.is_success() {
            return Err(Self::rejected(status, body.message));
        }
        body.into_reply()
            .ok_or_else(|| ClientError::Transport("Server returned no chat response".to_string()))
    }

    async fn post_upload(&self, image: &ImageUpload) -> ClientResult<UploadResponse> {
        let part = reqwest::multipart::Part::bytes(image.bytes().to_vec())
            .file_name(image.file_name().to_string())
            .mime_str(image.content_type())?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.url(paths::UPLOAD))
            .multipart(form)
            .send()
            .await?;

        let (_, body) = Self::read_body::<UploadResponse>(response).await?;
        Ok(body)
    }
}

#[async_trait]
impl PharmacyApi for HttpPharmacyApi {
    async fn product_by_barcode(&self, barcode: &str) -> ClientResult<Product> {
        debug!(barcode, "GET product-by-barcode");
        self.fetch_product(barcode)
            .await
            .inspect_err(log_failure("product_by_barcode"))
    }

    async fn record_sale(&self, record: &SaleRecord) -> ClientResult<SaleReceipt> {
        debug!(
            barcode = %record.barcode,
            quantity = record.quantity,
            amount = %record.amount,
            "POST record-sale"
        );
        self.post_sale(record)
            .await
            .inspect_err(log_failure("record_sale"))
    }

    async fn sales_stats(&self) -> ClientResult<SalesStats> {
        debug!("GET sales-stats");
        self.fetch_stats()
            .await
            .inspect_err(log_failure("sales_stats"))
    }

    async fn alerts(&self) -> ClientResult<Vec<Alert>> {
        debug!("GET alerts");
        self.fetch_alerts()
            .await
            .inspect_err(log_failure("alerts"))
    }

    async fn chat(&self, message: &str) -> ClientResult<ChatReply> {
        debug!(length = message.len(), "POST chat");
        self.post_chat(message)
            .await
            .inspect_err(log_failure("chat"))
    }

    async fn decode_upload(&self, image: &ImageUpload) -> ClientResult<UploadResponse> {
        debug!(file_name = image.file_name(), size = image.len(), "POST upload");
        self.post_upload(image)
            .await
            .inspect_err(log_failure("decode_upload"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Multipart, Query};
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use pharma_core::Money;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    const PNG: [u8; 12] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    async fn product(Query(query): Query<HashMap<String, String>>) -> (AxumStatus, Json<Value>) {
        match query.get("barcode").map(String::as_str) {
            Some("8901030865278") => (
                AxumStatus::OK,
                Json(json!({
                    "status": "success",
                    "data": {
                        "id": 7,
                        "name": "Paracetamol 500mg",
                        "barcode": "8901030865278",
                        "category": "Analgesic",
                        "price": 12.99,
                        "stock_quantity": 10,
                        "expiry_date": "2027-01-31"
                    }
                })),
            ),
            Some("broken") => (
                AxumStatus::INTERNAL_SERVER_ERROR,
                Json(json!({"status": "error", "message": "database is locked"})),
            ),
            Some("refused") => (
                AxumStatus::OK,
                Json(json!({"status": "error", "message": "catalog offline"})),
            ),
            Some("hollow") => (AxumStatus::OK, Json(json!({"status": "success"}))),
            _ => (
                AxumStatus::NOT_FOUND,
                Json(json!({"status": "error", "message": "Product not found"})),
            ),
        }
    }

    async fn record_sale(Json(body): Json<Value>) -> (AxumStatus, Json<Value>) {
        if body["quantity"].as_i64().unwrap_or(0) > 10 {
            return (
                AxumStatus::BAD_REQUEST,
                Json(json!({"status": "error", "message": "Insufficient stock"})),
            );
        }
        (
            AxumStatus::OK,
            Json(json!({
                "status": "success",
                "transaction_id": 17,
                "message": format!("amount={}", body["amount"])
            })),
        )
    }

    async fn upload(mut multipart: Multipart) -> (AxumStatus, Json<Value>) {
        while let Ok(Some(field)) = multipart.next_field().await {
            if field.name() != Some("file") {
                continue;
            }
            let file_name = field.file_name().unwrap_or_default().to_string();
            return if file_name == "blank.png" {
                (
                    AxumStatus::BAD_REQUEST,
                    Json(json!({"status": "error", "message": "No barcode detected"})),
                )
            } else {
                (
                    AxumStatus::OK,
                    Json(json!({"status": "success", "barcode": "8901030865278", "format": "EAN13"})),
                )
            };
        }
        (
            AxumStatus::BAD_REQUEST,
            Json(json!({"status": "error", "message": "No file uploaded"})),
        )
    }

    fn pharmacy_stub() -> Router {
        Router::new()
            .route("/api/product-by-barcode", get(product))
            .route("/api/record-sale", post(record_sale))
            .route(
                "/api/sales-stats",
                get(|| async {
                    Json(json!({
                        "status": "success",
                        "total_transactions": 3,
                        "total_revenue": 15.5,
                        "total_units": 4
                    }))
                }),
            )
            .route(
                "/api/alerts",
                get(|| async {
                    Json(json!({
                        "status": "success",
                        "alerts": [{"severity": "critical", "product": "ORS", "message": "Expires in 1 days"}]
                    }))
                }),
            )
            .route(
                "/api/chat",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({
                        "status": "success",
                        "response": format!("echo: {}", body["message"].as_str().unwrap_or_default()),
                        "timestamp": "2026-10-16T10:00:00"
                    }))
                }),
            )
            .route("/api/upload", post(upload))
            .route(
                "/api/broken",
                get(|| async { (AxumStatus::BAD_GATEWAY, "<html>bad gateway</html>") }),
            )
    }

    async fn spawn_stub() -> HttpPharmacyApi {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, pharmacy_stub()).await.unwrap();
        });

        HttpPharmacyApi::new(&ApiSettings {
            base_url: format!("http://{}/", addr),
            request_timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_product_lookup() {
        let api = spawn_stub().await;

        let product = api.product_by_barcode("8901030865278").await.unwrap();
        assert_eq!(product.id, 7);
        assert_eq!(product.price, Money::from_cents(1299));
        assert_eq!(product.stock_quantity, 10);

        let missing = api.product_by_barcode("0000").await;
        assert!(matches!(missing, Err(ClientError::NotFound { barcode }) if barcode == "0000"));

        let broken = api.product_by_barcode("broken").await;
        assert!(matches!(broken, Err(ClientError::Transport(m)) if m == "database is locked"));
    }

    #[tokio::test]
    async fn test_lookup_error_body_with_ok_status() {
        let api = spawn_stub().await;

        let err = api.product_by_barcode("refused").await.unwrap_err();
        assert!(matches!(&err, ClientError::Transport(m) if m == "catalog offline"));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_lookup_success_without_data() {
        let api = spawn_stub().await;

        let err = api.product_by_barcode("hollow").await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(m) if m == "Server returned no product data"));
    }

    #[tokio::test]
    async fn test_record_sale() {
        let api = spawn_stub().await;
        let mut record = SaleRecord {
            barcode: "8901030865278".into(),
            quantity: 3,
            amount: Money::from_cents(3897),
            product_id: 7,
        };

        let receipt = api.record_sale(&record).await.unwrap();
        assert_eq!(receipt.transaction_id, Some(17));
        assert_eq!(receipt.message.as_deref(), Some("amount=38.97"));

        record.quantity = 11;
        let rejected = api.record_sale(&record).await;
        assert!(matches!(rejected, Err(ClientError::RemoteRejected(m)) if m == "Insufficient stock"));
    }

    #[tokio::test]
    async fn test_stats_alerts_chat() {
        let api = spawn_stub().await;

        let stats = api.sales_stats().await.unwrap();
        assert_eq!(stats.total_transactions, 3);
        assert_eq!(stats.total_revenue, Money::from_cents(1550));

        let alerts = api.alerts().await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].product, "ORS");

        let reply = api.chat("stock of ORS?").await.unwrap();
        assert_eq!(reply.response, "echo: stock of ORS?");
    }

    #[tokio::test]
    async fn test_decode_upload() {
        let api = spawn_stub().await;

        let image = ImageUpload::from_bytes("strip.png", PNG.to_vec()).unwrap();
        let reply = api.decode_upload(&image).await.unwrap();
        assert_eq!(reply.symbol().unwrap().value, "8901030865278");

        let blank = ImageUpload::from_bytes("blank.png", PNG.to_vec()).unwrap();
        let reply = api.decode_upload(&blank).await.unwrap();
        assert!(reply.is_no_barcode());
    }

    #[tokio::test]
    async fn test_non_json_error_is_transport() {
        let api = spawn_stub().await;
        let response = api.client.get(api.url("api/broken")).send().await.unwrap();

        let result = HttpPharmacyApi::read_body::<SalesStatsResponse>(response).await;
        match result {
            Err(ClientError::Transport(message)) => assert!(message.contains("502")),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_retryable_transport() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = HttpPharmacyApi::new(&ApiSettings {
            base_url: format!("http://{}", addr),
            request_timeout_secs: 2,
        })
        .unwrap();

        let err = api.sales_stats().await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
        assert!(err.is_retryable());
    }
}
