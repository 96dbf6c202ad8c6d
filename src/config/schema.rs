//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the access
//! layer. All types derive Serde traits for deserialization from config
//! files, and every field has a default so a minimal config stays valid.

use serde::{Deserialize, Serialize};

/// Root configuration for the survey backend access layer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Candidate backend addresses, in declaration order.
    pub endpoints: Vec<EndpointConfig>,

    /// Reachability probe settings.
    pub probe: ProbeConfig,

    /// Background health monitoring settings.
    pub health: HealthConfig,

    /// Retry policy for transient failures.
    pub retries: RetryConfig,

    /// Per-attempt request timeouts.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// One candidate backend address.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointConfig {
    /// Base URL (e.g., "http://192.168.1.40:8080").
    pub url: String,

    /// Candidate priority (higher = probed earlier).
    #[serde(default)]
    pub priority: u32,
}

/// Reachability probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Per-probe timeout in seconds.
    pub timeout_secs: u64,

    /// Path probed for reachability. A root request is the fallback leg.
    pub ping_path: String,

    /// Overall budget for one candidate sweep in seconds.
    pub sweep_budget_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 3,
            ping_path: "/api/ping".to_string(),
            sweep_budget_secs: 10,
        }
    }
}

/// Background health monitoring configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Enable the periodic health monitor.
    pub enabled: bool,

    /// Seconds between background probes of the active URL.
    pub interval_secs: u64,

    /// Seconds a healthy record stays fresh for cached reads.
    pub ttl_secs: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 30,
            ttl_secs: 60,
        }
    }
}

/// Retry configuration for transient failures on a single variant.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum attempts per variant (first try included).
    pub max_attempts: u32,

    /// Fixed delay between attempts in milliseconds.
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 1000,
        }
    }
}

/// Per-attempt request timeouts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Default request timeout in seconds.
    pub request_secs: u64,

    /// Timeout for bulk list operations in seconds.
    pub bulk_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 15,
            bulk_secs: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
