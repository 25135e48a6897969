//! # Stats Refresher
//!
//! Keeps the sales statistics panel current while the counter is open.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         StatsRefresher                                  │
//! │                                                                         │
//! │   tick (immediately, then every 30s)                                   │
//! │      └──► GET /api/sales-stats ──► render_stats                         │
//! │                  └── failure: warn log, next tick tries again           │
//! │                                                                         │
//! │   handle.shutdown() ──► loop exits                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A commit also refreshes stats directly; the two never conflict because
//! both only read from the server and render.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::controller::SaleController;

/// Periodic stats poller.
pub struct StatsRefresher {
    controller: Arc<SaleController>,
    interval: Duration,
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for stopping the refresher.
#[derive(Clone)]
pub struct StatsRefresherHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl StatsRefresherHandle {
    /// Asks the loop to stop. A refresher that already stopped is fine.
    pub async fn shutdown(&self) {
        if self.shutdown_tx.send(()).await.is_err() {
            debug!("Stats refresher already stopped");
        }
    }
}

impl StatsRefresher {
    pub fn new(
        controller: Arc<SaleController>,
        interval: Duration,
    ) -> (Self, StatsRefresherHandle) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let refresher = StatsRefresher {
            controller,
            interval,
            shutdown_rx,
        };

        (refresher, StatsRefresherHandle { shutdown_tx })
    }

    /// Spawns the loop on the current runtime.
    pub fn spawn(
        controller: Arc<SaleController>,
        interval: Duration,
    ) -> (JoinHandle<()>, StatsRefresherHandle) {
        let (refresher, handle) = Self::new(controller, interval);
        (tokio::spawn(refresher.run()), handle)
    }

    /// Runs until shut down. The first refresh happens immediately.
    pub async fn run(mut self) {
        info!(interval_secs = self.interval.as_secs(), "Stats refresher starting");

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if self.controller.refresh_stats().await.is_some() {
                        debug!("Sales stats refreshed");
                    }
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Stats refresher shutting down");
                    break;
                }
            }
        }

        info!("Stats refresher stopped");
    }
}
