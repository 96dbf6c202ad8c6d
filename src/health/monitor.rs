//! Background health monitoring.
//!
//! # Responsibilities
//! - Periodically probe the active URL
//! - Publish the cached health record through the resolver
//! - Answer health queries from cache while the record is fresh

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::time;

use crate::config::HealthConfig;
use crate::endpoint::resolver::EndpointResolver;
use crate::endpoint::state::HealthRecord;

/// Cached health status for diagnostic display.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub is_healthy: bool,
    /// Seconds since the epoch of the underlying observation.
    pub last_checked_at: u64,
    pub message: String,
    pub latency_ms: Option<u32>,
}

impl HealthStatus {
    fn from_record(record: &HealthRecord) -> Self {
        Self {
            is_healthy: record.healthy,
            last_checked_at: record.checked_at_unix(),
            message: record.message.clone(),
            latency_ms: record.latency_ms,
        }
    }
}

/// Periodic prober of the active backend URL.
pub struct HealthMonitor {
    resolver: Arc<EndpointResolver>,
    enabled: bool,
    interval: Duration,
    ttl: Duration,
    started: AtomicBool,
}

impl HealthMonitor {
    pub fn new(resolver: Arc<EndpointResolver>, config: &HealthConfig) -> Self {
        Self {
            resolver,
            enabled: config.enabled,
            interval: Duration::from_secs(config.interval_secs),
            ttl: Duration::from_secs(config.ttl_secs),
            started: AtomicBool::new(false),
        }
    }

    /// Start the background loop. Idempotent: only the first call spawns a
    /// task; later calls return `false`. The loop exits when the shutdown
    /// channel fires, so tests and process teardown can cancel it
    /// deterministically.
    pub fn spawn(self: &Arc<Self>, shutdown: broadcast::Receiver<()>) -> bool {
        if self.started.swap(true, Ordering::SeqCst) {
            return false;
        }
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            monitor.run(shutdown).await;
        });
        true
    }

    async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
        if !self.enabled {
            tracing::info!("Health monitor disabled");
            return;
        }

        tracing::info!(interval_secs = self.interval.as_secs(), "Health monitor starting");

        let mut ticker = time::interval(self.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let record = self.resolver.check_active().await;
                    tracing::debug!(
                        healthy = record.healthy,
                        latency_ms = record.latency_ms,
                        "Health tick"
                    );
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Cached health status. A healthy record younger than the TTL window
    /// is returned without a probe; anything else triggers one check now,
    /// so repeated queries have bounded network cost.
    pub async fn status(&self) -> HealthStatus {
        let record = self.resolver.state().health.clone();
        if record.healthy && record.is_fresh(self.ttl) {
            return HealthStatus::from_record(&record);
        }
        let refreshed = self.resolver.check_active().await;
        HealthStatus::from_record(&refreshed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_for_display() {
        let record = HealthRecord::observed(true, "reachable", Some(12), None);
        let status = HealthStatus::from_record(&record);
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["is_healthy"], true);
        assert_eq!(json["latency_ms"], 12);
        assert!(json["last_checked_at"].as_u64().unwrap() > 0);
    }
}
