//! Backend address resolution.
//!
//! # Resolution order
//! ```text
//! resolve():
//!     1. probe last successful URL        → return on reachable
//!     2. probe current active URL         → return on reachable
//!     3. race a probe to every remaining candidate, first reachable wins
//!     4. sweep budget expired             → NetworkUnreachable
//! ```
//!
//! # Design Decisions
//! - The resolver is the single owner of `ConnectionState`; every write
//!   goes through one critical section
//! - The sweep races probes concurrently so discovery costs one probe
//!   round, not N sequential timeouts
//! - Late sweep results are discarded, never applied: only the winner
//!   slot inside one `resolve()` call can commit

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Mutex;
use tokio::time;
use url::Url;

use crate::config::ProbeConfig;
use crate::endpoint::probe::{EndpointProbe, ProbeOutcome};
use crate::endpoint::registry::CandidateRegistry;
use crate::endpoint::state::{ConnectionState, HealthRecord};
use crate::error::{ApiError, ApiResult};

/// Picks a working base URL from the candidate registry and owns the
/// canonical [`ConnectionState`].
pub struct EndpointResolver {
    registry: Arc<CandidateRegistry>,
    probe: EndpointProbe,
    state: ArcSwap<ConnectionState>,
    /// Serializes all ConnectionState writes.
    write_lock: Mutex<()>,
    sweep_budget: Duration,
}

impl EndpointResolver {
    /// The registry is never empty, so the first listed candidate seeds
    /// the initial active URL.
    pub fn new(registry: Arc<CandidateRegistry>, probe: EndpointProbe, config: &ProbeConfig) -> Self {
        let initial = registry.list()[0].clone();
        Self {
            registry,
            probe,
            state: ArcSwap::from_pointee(ConnectionState::initial(initial)),
            write_lock: Mutex::new(()),
            sweep_budget: Duration::from_secs(config.sweep_budget_secs),
        }
    }

    /// Current snapshot. Always internally consistent.
    pub fn state(&self) -> Arc<ConnectionState> {
        self.state.load_full()
    }

    /// The active URL when its health record is both healthy and fresher
    /// than `ttl`; callers fall back to [`resolve`](Self::resolve) otherwise.
    pub fn cached_healthy(&self, ttl: Duration) -> Option<Url> {
        let snapshot = self.state.load();
        if snapshot.health.healthy && snapshot.health.is_fresh(ttl) {
            Some(snapshot.active_url.clone())
        } else {
            None
        }
    }

    /// Find a reachable base URL.
    pub async fn resolve(&self) -> ApiResult<Url> {
        let snapshot = self.state();
        let mut tried = Vec::with_capacity(2);

        if let Some(last) = snapshot.last_successful.clone() {
            if let ProbeOutcome::Reachable { latency_ms, .. } = self.probe.probe(&last).await {
                self.commit_success(&last, latency_ms).await;
                return Ok(last);
            }
            tracing::debug!(url = %last, "Last successful URL no longer reachable");
            tried.push(last);
        }

        let active = snapshot.active_url.clone();
        if !tried.contains(&active) {
            if let ProbeOutcome::Reachable { latency_ms, .. } = self.probe.probe(&active).await {
                self.commit_success(&active, latency_ms).await;
                return Ok(active);
            }
            tracing::debug!(url = %active, "Active URL not reachable, sweeping candidates");
            tried.push(active);
        }

        let remaining: Vec<Url> = self
            .registry
            .list()
            .into_iter()
            .filter(|url| !tried.contains(url))
            .collect();

        match time::timeout(self.sweep_budget, self.sweep(remaining)).await {
            Ok(Some((url, latency_ms))) => {
                self.commit_success(&url, latency_ms).await;
                tracing::info!(url = %url, latency_ms, "Backend resolved");
                Ok(url)
            }
            Ok(None) => {
                let reason = "no candidate backend responded".to_string();
                self.commit_failure(&reason).await;
                Err(ApiError::NetworkUnreachable(reason))
            }
            Err(_) => {
                let reason = format!(
                    "no candidate backend responded within {:?}",
                    self.sweep_budget
                );
                self.commit_failure(&reason).await;
                Err(ApiError::NetworkUnreachable(reason))
            }
        }
    }

    /// Race one probe per candidate; the first reachable result wins and
    /// the unfinished probes are dropped. Draining stops at the winner, so
    /// a result arriving later can never be applied.
    async fn sweep(&self, candidates: Vec<Url>) -> Option<(Url, u32)> {
        if candidates.is_empty() {
            return None;
        }
        let probe = &self.probe;
        let mut probes: FuturesUnordered<_> = candidates
            .into_iter()
            .map(|url| async move {
                let outcome = probe.probe(&url).await;
                (url, outcome)
            })
            .collect();

        let mut winner = None;
        while let Some((url, outcome)) = probes.next().await {
            match outcome {
                ProbeOutcome::Reachable { latency_ms, .. } => {
                    winner = Some((url, latency_ms));
                    break;
                }
                ProbeOutcome::Unreachable { reason } => {
                    tracing::debug!(url = %url, reason = %reason, "Candidate probe failed");
                }
            }
        }
        winner
    }

    /// Probe the current active URL once and fold the observation into the
    /// connection state. Used by the health monitor.
    pub async fn check_active(&self) -> HealthRecord {
        let active = self.state().active_url.clone();
        match self.probe.probe(&active).await {
            ProbeOutcome::Reachable { latency_ms, .. } => {
                self.commit_success(&active, latency_ms).await;
            }
            ProbeOutcome::Unreachable { reason } => {
                tracing::warn!(url = %active, reason = %reason, "Health check failed");
                self.commit_failure(&reason).await;
            }
        }
        self.state().health.clone()
    }

    /// Report a request success observed outside the resolver.
    pub async fn report_success(&self, url: &Url, latency_ms: u32) {
        self.commit_success(url, latency_ms).await;
    }

    /// Report a connectivity failure observed outside the resolver.
    pub async fn report_failure(&self, message: &str) {
        self.commit_failure(message).await;
    }

    async fn commit_success(&self, url: &Url, latency_ms: u32) {
        let _guard = self.write_lock.lock().await;
        let previous = self.state.load();
        let health = HealthRecord::observed(true, "reachable", Some(latency_ms), Some(&previous.health));
        self.registry.remember(url);
        self.state.store(Arc::new(ConnectionState {
            active_url: url.clone(),
            last_successful: Some(url.clone()),
            health,
        }));
    }

    async fn commit_failure(&self, message: &str) {
        let _guard = self.write_lock.lock().await;
        let previous = self.state.load();
        let health = HealthRecord::observed(false, message, None, Some(&previous.health));
        self.state.store(Arc::new(ConnectionState {
            active_url: previous.active_url.clone(),
            last_successful: previous.last_successful.clone(),
            health,
        }));
    }
}

impl std::fmt::Debug for EndpointResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.load();
        f.debug_struct("EndpointResolver")
            .field("active_url", &state.active_url.as_str())
            .field("last_successful", &state.last_successful.as_ref().map(Url::as_str))
            .field("healthy", &state.health.healthy)
            .finish()
    }
}
