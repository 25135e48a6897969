//! # SmartPharma Counter Entry Point
//!
//! Setup lives in `lib.rs` so it can be tested.

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pharma_counter::run().await
}
