//! # Barcode Decoding
//!
//! The decoder is an opaque collaborator: image in, zero or one symbol out.
//!
//! ```text
//! ImageUpload ──► BarcodeDecoder::decode()
//!                   ├── Ok(Some(symbol))  barcode found
//!                   ├── Ok(None)          readable image, no barcode
//!                   └── Err(DecodeError)  decoder unavailable / failed
//! ```
//!
//! [`RemoteDecoder`] delegates to the pharmacy server's `/api/upload`
//! endpoint. Other decoders (a local library, a hardware scanner bridge)
//! only need to implement the trait.

use std::sync::Arc;

use async_trait::async_trait;
use pharma_core::DecodedSymbol;
use tracing::debug;

use crate::api::PharmacyApi;
use crate::error::{DecodeError, DecodeResult};
use crate::image::ImageUpload;

#[async_trait]
pub trait BarcodeDecoder: Send + Sync {
    async fn decode(&self, image: &ImageUpload) -> DecodeResult<Option<DecodedSymbol>>;
}

/// Decodes by uploading the image to the pharmacy server.
#[derive(Clone)]
pub struct RemoteDecoder {
    api: Arc<dyn PharmacyApi>,
}

impl RemoteDecoder {
    pub fn new(api: Arc<dyn PharmacyApi>) -> Self {
        Self { api }
    }
}

impl std::fmt::Debug for RemoteDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteDecoder").finish_non_exhaustive()
    }
}

#[async_trait]
impl BarcodeDecoder for RemoteDecoder {
    async fn decode(&self, image: &ImageUpload) -> DecodeResult<Option<DecodedSymbol>> {
        let reply = self.api.decode_upload(image).await?;

        if let Some(symbol) = reply.symbol() {
            debug!(value = %symbol.value, format = ?symbol.format, "Barcode decoded");
            return Ok(Some(symbol));
        }
        if reply.is_no_barcode() {
            debug!(file_name = image.file_name(), "No barcode in image");
            return Ok(None);
        }
        if reply.status.is_success() {
            // success without a usable value
            return Ok(None);
        }

        Err(DecodeError::Decoder(
            reply
                .message
                .unwrap_or_else(|| "decoder returned an error".to_string()),
        ))
    }
}
