//! Background data-sync task.
//!
//! Polls the backend for the entity collections and the account standing,
//! feeding both into the coordinator. Transient backend failures trigger
//! automatic retry with exponential backoff; the backoff resets after a
//! stable run so a single hiccup hours later does not start from the
//! maximum delay.

use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bus::{AppEvent, SharedBus};
use crate::coordinator::SessionCoordinator;
use crate::providers::DataProvider;

/// Default poll interval in seconds
const DEFAULT_SYNC_INTERVAL_SECS: u64 = 15;

/// Get the poll interval from S24_SYNC_INTERVAL env var, or use default
fn get_sync_interval() -> Duration {
    std::env::var("S24_SYNC_INTERVAL")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS))
}

/// Retry configuration for the sync loop
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Initial delay between retry attempts
    pub initial_delay: Duration,
    /// Maximum delay (backoff caps at this value)
    pub max_delay: Duration,
    /// Minimum run time before resetting backoff on failure
    pub stable_run_threshold: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(60),
            stable_run_threshold: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    pub fn new(initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            initial_delay,
            max_delay,
            stable_run_threshold: Duration::from_secs(30),
        }
    }
}

/// Periodic refresh of collections + subscription standing.
pub struct SyncTask {
    data: Arc<dyn DataProvider>,
    coordinator: Arc<SessionCoordinator>,
    bus: SharedBus,
    shutdown: CancellationToken,
}

impl SyncTask {
    pub fn new(
        data: Arc<dyn DataProvider>,
        coordinator: Arc<SessionCoordinator>,
        bus: SharedBus,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            data,
            coordinator,
            bus,
            shutdown,
        }
    }

    /// Run the sync loop with automatic retry on error.
    ///
    /// When a cycle fails, waits with exponential backoff and retries.
    /// Exits cleanly on shutdown.
    pub async fn run_with_retry(self, config: RetryConfig) -> Result<()> {
        let mut delay = config.initial_delay;

        loop {
            if self.shutdown.is_cancelled() {
                info!("sync: shutdown before attempt");
                break;
            }

            let start = Instant::now();
            match self.run_once().await {
                Ok(()) => {
                    info!("sync: clean exit");
                    break;
                }
                Err(e) => {
                    let run_duration = start.elapsed();

                    if run_duration >= config.stable_run_threshold {
                        info!(
                            "sync: ran for {:?} before failure, resetting backoff",
                            run_duration
                        );
                        delay = config.initial_delay;
                    }

                    warn!("sync: error ({}), retrying in {:?}", e, delay);

                    tokio::select! {
                        _ = self.shutdown.cancelled() => {
                            info!("sync: shutdown during backoff");
                            break;
                        }
                        _ = tokio::time::sleep(delay) => {
                            delay = (delay * 2).min(config.max_delay);
                        }
                    }
                }
            }
        }

        info!("sync: stopped");
        Ok(())
    }

    /// One polling session. Returns `Ok` only on shutdown; any backend
    /// failure bubbles as `Err` so the retry loop takes over.
    async fn run_once(&self) -> Result<()> {
        let mut ticker = interval(get_sync_interval());

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    return Ok(());
                }
                _ = ticker.tick() => {
                    self.refresh().await?;
                }
            }
        }
    }

    async fn refresh(&self) -> Result<()> {
        let collections = match self.data.fetch_collections().await {
            Ok(collections) => collections,
            Err(e) => {
                // The engine stays navigable on a dead backend; report and
                // let the retry loop back off.
                self.bus.publish(AppEvent::BackendUnreachable {
                    error: e.to_string(),
                });
                return Err(e.into());
            }
        };

        debug!(
            units = collections.units.len(),
            appointments = collections.appointments.len(),
            "collections refreshed"
        );
        self.bus.publish(AppEvent::CollectionsRefreshed {
            units: collections.units.len(),
            appointments: collections.appointments.len(),
        });
        self.coordinator.apply_collections(collections).await;

        let status = self.data.subscription_status().await?;
        self.coordinator.update_subscription(status).await;
        Ok(())
    }
}
