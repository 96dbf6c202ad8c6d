//! Connection state and health records.
//!
//! # Design Decisions
//! - One `ConnectionState` per process, owned by the resolver
//! - Published atomically via `ArcSwap`: readers always see a consistent
//!   snapshot, never a half-written one
//! - `checked_at` is monotonically non-decreasing across records

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use url::Url;

/// Result of the most recent health observation.
#[derive(Debug, Clone)]
pub struct HealthRecord {
    pub healthy: bool,
    pub checked_at: SystemTime,
    pub message: String,
    pub latency_ms: Option<u32>,
    checked_instant: Instant,
}

impl HealthRecord {
    /// The record used before any probe has run.
    pub fn unknown() -> Self {
        Self {
            healthy: false,
            checked_at: SystemTime::now(),
            message: "not yet checked".to_string(),
            latency_ms: None,
            checked_instant: Instant::now(),
        }
    }

    /// Build a record from a fresh observation. `previous` keeps
    /// `checked_at` monotonic even if the wall clock steps backwards.
    pub fn observed(
        healthy: bool,
        message: impl Into<String>,
        latency_ms: Option<u32>,
        previous: Option<&HealthRecord>,
    ) -> Self {
        let now = SystemTime::now();
        let checked_at = match previous {
            Some(prev) if prev.checked_at > now => prev.checked_at,
            _ => now,
        };
        Self {
            healthy,
            checked_at,
            message: message.into(),
            latency_ms,
            checked_instant: Instant::now(),
        }
    }

    /// Age of this observation.
    pub fn age(&self) -> Duration {
        self.checked_instant.elapsed()
    }

    /// True while the record is younger than the given TTL.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() <= ttl
    }

    /// Seconds since the epoch, for diagnostic display.
    pub fn checked_at_unix(&self) -> u64 {
        self.checked_at
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// The canonical connection snapshot.
#[derive(Debug, Clone)]
pub struct ConnectionState {
    /// The URL requests currently target.
    pub active_url: Url,
    /// The last URL a request actually succeeded against.
    pub last_successful: Option<Url>,
    /// Most recent health observation of `active_url`.
    pub health: HealthRecord,
}

impl ConnectionState {
    pub fn initial(active_url: Url) -> Self {
        Self {
            active_url,
            last_successful: None,
            health: HealthRecord::unknown(),
        }
    }
}
