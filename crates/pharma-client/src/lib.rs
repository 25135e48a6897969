//! # pharma-client: Remote Adapters for the SmartPharma Counter
//!
//! Everything that crosses the process boundary on behalf of
//! [`pharma_core`]: catalog lookup, sale commit, statistics, alerts, chat,
//! barcode image acquisition and decoding, and the counter configuration.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ImageUpload ──► BarcodeDecoder ──► symbol ──► LookupClient ──► Product │
//! │  (image.rs)      (decoder.rs)                  (lookup.rs)              │
//! │                                                                         │
//! │  SaleSession ──► CommitClient ──► CommittedSale                         │
//! │  (pharma-core)   (commit.rs)                                            │
//! │                                                                         │
//! │            all remote calls go through PharmacyApi (api.rs)            │
//! │                 └── HttpPharmacyApi: reqwest + JSON (http.rs)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`api`] - The `PharmacyApi` trait
//! - [`http`] - reqwest implementation
//! - [`protocol`] - JSON envelopes and endpoint paths
//! - [`lookup`] / [`commit`] - Product Lookup and Sale Commit clients
//! - [`decoder`] / [`image`] - Barcode decoding and image acquisition
//! - [`config`] - `counter.toml` + `PHARMA_*` environment
//! - [`error`] - `ClientError`, `DecodeError`, `ConfigError`

pub mod api;
pub mod commit;
pub mod config;
pub mod decoder;
pub mod error;
pub mod http;
pub mod image;
pub mod lookup;
pub mod protocol;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use api::PharmacyApi;
pub use commit::{CommitClient, CommittedSale};
pub use config::{ApiSettings, CounterConfig, CounterSettings};
pub use decoder::{BarcodeDecoder, RemoteDecoder};
pub use error::{
    ClientError, ClientResult, ConfigError, ConfigResult, DecodeError, DecodeResult,
};
pub use http::HttpPharmacyApi;
pub use image::{ImageFormat, ImageUpload, MAX_IMAGE_BYTES};
pub use lookup::{LookupClient, LookupHit};
pub use protocol::SaleReceipt;
