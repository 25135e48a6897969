//! # SmartPharma Counter
//!
//! The sales counter application: scan a medicine, set the quantity,
//! record the sale.
//!
//! ## Module Organization
//! ```text
//! pharma_counter/
//! ├── lib.rs          ◄─── You are here (wiring & run)
//! ├── controller.rs   ◄─── SaleController: user intents → session + API
//! ├── stats.rs        ◄─── Periodic sales-stats refresh
//! ├── console.rs      ◄─── Terminal commands and TerminalSink
//! ├── sink.rs         ◄─── Notification / presentation traits, view models
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── session.rs  ◄─── Shared sale session
//! │   └── transaction_log.rs ◄─── Recent committed sales
//! └── error.rs        ◄─── CounterError for everything user-facing
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (stderr)
//! 2. Load `counter.toml` and `PHARMA_*` overrides
//! 3. Build the HTTP API client and the remote barcode decoder
//! 4. Create the controller with terminal sinks
//! 5. Spawn the stats refresher
//! 6. Run the console until `quit`, then stop the refresher

pub mod console;
pub mod controller;
pub mod error;
pub mod sink;
pub mod state;
pub mod stats;

#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::sync::Arc;

use pharma_client::{CounterConfig, HttpPharmacyApi, PharmacyApi, RemoteDecoder};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use console::TerminalSink;
use controller::SaleController;
use stats::StatsRefresher;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "PHARMA_CONFIG";

/// Runs the counter until the cashier quits or stdin closes.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config_path = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
    let config = CounterConfig::load_or_default(config_path);
    info!(
        base_url = %config.api.base_url,
        refresh_secs = config.counter.stats_refresh_interval_secs,
        "Starting SmartPharma counter"
    );

    let api: Arc<dyn PharmacyApi> = Arc::new(HttpPharmacyApi::from_config(&config)?);
    let decoder = Arc::new(RemoteDecoder::new(api.clone()));
    let sink = Arc::new(TerminalSink);

    let controller = Arc::new(SaleController::new(
        api,
        decoder,
        sink.clone(),
        sink,
        &config.counter,
    ));

    let (refresher, refresher_handle) =
        StatsRefresher::spawn(controller.clone(), config.stats_refresh_interval());

    let result = console::run(controller).await;

    refresher_handle.shutdown().await;
    if let Err(e) = refresher.await {
        warn!(error = %e, "Stats refresher task failed");
    }

    info!("Counter closed");
    Ok(result?)
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=pharma=trace` - Show trace for pharma crates only
/// - Default: INFO, with debug for pharma crates
///
/// Output goes to stderr; stdout belongs to the console.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pharma=debug,reqwest=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
