//! Single bounded-time reachability check.
//!
//! # Responsibilities
//! - Issue one lightweight request against a candidate base URL
//! - Classify any response with status < 500 as reachable
//! - Classify network error, non-response, or timeout as unreachable
//!
//! The retry policy belongs to the caller; a probe never retries. The only
//! second request a probe may issue is the root-path fallback leg, taken
//! when the ping path itself fails at transport level or answers 5xx. Both
//! legs share one overall timeout.

use std::time::{Duration, Instant};

use tokio::time;
use url::Url;
use uuid::Uuid;

use crate::config::ProbeConfig;

/// Outcome of one probe.
#[derive(Debug, Clone)]
pub enum ProbeOutcome {
    Reachable { status: u16, latency_ms: u32 },
    Unreachable { reason: String },
}

impl ProbeOutcome {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ProbeOutcome::Reachable { .. })
    }
}

/// Reachability prober for candidate base URLs.
#[derive(Debug, Clone)]
pub struct EndpointProbe {
    client: reqwest::Client,
    ping_path: String,
    timeout: Duration,
}

impl EndpointProbe {
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            ping_path: config.ping_path.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Probe one base URL within the configured timeout.
    pub async fn probe(&self, base: &Url) -> ProbeOutcome {
        let started = Instant::now();
        match time::timeout(self.timeout, self.probe_legs(base)).await {
            Ok(ProbeOutcome::Reachable { status, .. }) => ProbeOutcome::Reachable {
                status,
                latency_ms: started.elapsed().as_millis() as u32,
            },
            Ok(unreachable) => unreachable,
            Err(_) => ProbeOutcome::Unreachable {
                reason: format!("probe of {} timed out after {:?}", base, self.timeout),
            },
        }
    }

    async fn probe_legs(&self, base: &Url) -> ProbeOutcome {
        let ping = match base.join(&self.ping_path) {
            Ok(url) => self.request(url).await,
            Err(e) => ProbeOutcome::Unreachable {
                reason: format!("cannot build ping URL from {}: {}", base, e),
            },
        };
        if ping.is_reachable() {
            return ping;
        }
        // Fallback leg: some backends serve no ping endpoint at all.
        let root = self.request(base.clone()).await;
        if root.is_reachable() {
            root
        } else {
            ping
        }
    }

    async fn request(&self, url: Url) -> ProbeOutcome {
        let result = self
            .client
            .get(url.clone())
            .header("user-agent", "survey-client-probe")
            .header("x-request-id", Uuid::new_v4().to_string())
            .send()
            .await;
        match result {
            Ok(response) => {
                let status = response.status();
                if status.as_u16() < 500 {
                    ProbeOutcome::Reachable {
                        status: status.as_u16(),
                        latency_ms: 0,
                    }
                } else {
                    ProbeOutcome::Unreachable {
                        reason: format!("{} answered {}", url, status),
                    }
                }
            }
            Err(e) => ProbeOutcome::Unreachable {
                reason: format!("{} unreachable: {}", url, e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_predicates() {
        let up = ProbeOutcome::Reachable {
            status: 200,
            latency_ms: 12,
        };
        assert!(up.is_reachable());

        let down = ProbeOutcome::Unreachable {
            reason: "connection refused".into(),
        };
        assert!(!down.is_reachable());
    }
}
