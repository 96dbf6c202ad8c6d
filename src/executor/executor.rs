//! Fallback request execution.
//!
//! # State Machine (per call)
//! ```text
//! Resolving → Routing → TryVariant(i) ─ Success ───────────→ Done(payload)
//!                          │ NotFoundLike ──→ TryVariant(i+1)
//!                          │ Transient ─────→ RetrySame(i)   (idempotent,
//!                          │                                  budget left)
//!                          │ FatalClient │ Ambiguous ───────→ Done(failure)
//! Variants exhausted ─────────────────────────────────────→ Done(failure)
//! ```
//!
//! # Design Decisions
//! - The variant loop is strictly sequential. Racing guessed endpoints for
//!   the same non-idempotent write could apply it twice.
//! - 404/405 advances immediately and never consumes retry budget.
//! - A transport failure on a non-idempotent operation stops the whole
//!   call: the caller decides whether to issue a new explicit attempt.
//! - Retries use a fixed delay between attempts of the same variant.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::time;
use url::Url;
use uuid::Uuid;

use crate::config::{HealthConfig, RetryConfig};
use crate::endpoint::resolver::EndpointResolver;
use crate::error::{ApiError, ApiResult};
use crate::executor::operation::{LogicalOperation, Variant};
use crate::executor::outcome::{classify_response, classify_transport, AttemptOutcome};
use crate::routing::{route_for, RoleNamespace};

/// Executes one logical operation against its ordered variant list.
pub struct FallbackRequestExecutor {
    http: reqwest::Client,
    resolver: Arc<EndpointResolver>,
    max_attempts: u32,
    retry_delay: Duration,
    health_ttl: Duration,
}

impl FallbackRequestExecutor {
    pub fn new(
        resolver: Arc<EndpointResolver>,
        retries: &RetryConfig,
        health: &HealthConfig,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            resolver,
            max_attempts: retries.max_attempts.max(1),
            retry_delay: Duration::from_millis(retries.delay_ms),
            health_ttl: Duration::from_secs(health.ttl_secs),
        }
    }

    /// Execute `operation` and return its decoded payload.
    pub async fn execute(
        &self,
        operation: &LogicalOperation,
        role: RoleNamespace,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> ApiResult<Value> {
        // Resolving: reuse the cached state while it is healthy and fresh.
        let base = match self.resolver.cached_healthy(self.health_ttl) {
            Some(url) => url,
            None => self.resolver.resolve().await?,
        };

        // Routing: the role-namespaced primary goes first.
        let variants = variant_plan(operation, role);

        let mut last_transport: Option<(String, bool)> = None;

        for (index, variant) in variants.iter().enumerate() {
            let mut attempt = 0u32;
            loop {
                attempt += 1;
                let (outcome, latency_ms) = self
                    .attempt(&base, operation, variant, body, token)
                    .await;
                let outcome = outcome.for_idempotency(operation.idempotent);

                tracing::debug!(
                    operation = operation.name,
                    variant = index,
                    method = %variant.method,
                    path = %variant.path,
                    attempt,
                    outcome = outcome.label(),
                    latency_ms,
                    "Attempt finished"
                );

                match outcome {
                    AttemptOutcome::Success(payload) => {
                        self.resolver.report_success(&base, latency_ms).await;
                        return Ok(payload);
                    }
                    AttemptOutcome::NotFoundLike { status } => {
                        tracing::debug!(
                            operation = operation.name,
                            path = %variant.path,
                            status,
                            "Endpoint guess rejected, advancing"
                        );
                        break;
                    }
                    AttemptOutcome::FatalClient { status, message } => {
                        tracing::warn!(
                            operation = operation.name,
                            path = %variant.path,
                            status,
                            "Fatal client error, aborting"
                        );
                        return Err(ApiError::Client { status, message });
                    }
                    AttemptOutcome::Ambiguous { reason } => {
                        tracing::warn!(
                            operation = operation.name,
                            path = %variant.path,
                            reason = %reason,
                            "Write outcome unknown, refusing to retry"
                        );
                        return Err(ApiError::Ambiguous {
                            operation: operation.name.to_string(),
                            reason,
                        });
                    }
                    AttemptOutcome::Transient {
                        reason,
                        server_status,
                        timed_out,
                    } => {
                        if server_status.is_none() {
                            last_transport = Some((reason.clone(), timed_out));
                        }
                        // A 5xx acknowledges receipt: retrying a write the
                        // server already saw risks a duplicate effect.
                        if !operation.idempotent {
                            let status = server_status.unwrap_or(500);
                            return Err(ApiError::Server {
                                status,
                                message: reason,
                            });
                        }
                        if attempt >= self.max_attempts {
                            tracing::warn!(
                                operation = operation.name,
                                path = %variant.path,
                                attempts = attempt,
                                reason = %reason,
                                "Variant retry budget exhausted, advancing"
                            );
                            break;
                        }
                        time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        // Variants exhausted without a terminal outcome.
        match last_transport {
            Some((reason, timed_out)) => {
                self.resolver.report_failure(&reason).await;
                if timed_out {
                    Err(ApiError::Timeout(operation.attempt_timeout))
                } else {
                    Err(ApiError::NetworkUnreachable(reason))
                }
            }
            None => Err(ApiError::NotFound {
                operation: operation.name.to_string(),
            }),
        }
    }

    async fn attempt(
        &self,
        base: &Url,
        operation: &LogicalOperation,
        variant: &Variant,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> (AttemptOutcome, u32) {
        let url = match base.join(&variant.path) {
            Ok(url) => url,
            Err(e) => {
                return (
                    AttemptOutcome::Transient {
                        reason: format!("cannot build request URL for '{}': {}", variant.path, e),
                        server_status: None,
                        timed_out: false,
                    },
                    0,
                );
            }
        };

        let mut request = self
            .http
            .request(variant.method.clone(), url)
            .timeout(operation.attempt_timeout)
            .header("x-request-id", Uuid::new_v4().to_string());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let started = Instant::now();
        let outcome = match request.send().await {
            Ok(response) => classify_response(response).await,
            Err(e) => classify_transport(&e, operation.attempt_timeout),
        };
        (outcome, started.elapsed().as_millis() as u32)
    }
}

/// The ordered variant list for one call: the role-routed primary first,
/// then the declared variants, deduplicated.
fn variant_plan(operation: &LogicalOperation, role: RoleNamespace) -> Vec<Variant> {
    let first = &operation.variants[0];
    let primary = Variant::new(first.method.clone(), route_for(&first.path, role));

    let mut plan = vec![primary];
    for variant in &operation.variants {
        if !plan.contains(variant) {
            plan.push(variant.clone());
        }
    }
    plan
}
