//! Endpoint discovery tests against mock backends.

use std::sync::Arc;
use std::time::{Duration, Instant};

use url::Url;

use survey_client::config::{EndpointConfig, ProbeConfig};
use survey_client::endpoint::{CandidateRegistry, EndpointProbe, EndpointResolver};

mod common;
use common::{base_url, reserve_port, start_routed_backend, MockResponse};

fn probe_config() -> ProbeConfig {
    ProbeConfig {
        timeout_secs: 2,
        ping_path: "/api/ping".to_string(),
        sweep_budget_secs: 5,
    }
}

fn resolver_for(urls: &[String]) -> EndpointResolver {
    // Earlier entries get higher priority
    let endpoints: Vec<EndpointConfig> = urls
        .iter()
        .enumerate()
        .map(|(i, url)| EndpointConfig {
            url: url.clone(),
            priority: (urls.len() - i) as u32,
        })
        .collect();
    let registry = Arc::new(CandidateRegistry::from_config(&endpoints).unwrap());
    let config = probe_config();
    EndpointResolver::new(registry, EndpointProbe::new(&config), &config)
}

async fn ping_backend() -> std::net::SocketAddr {
    start_routed_backend(|_, path| {
        if path == "/api/ping" {
            MockResponse::Respond(200, "\"pong\"".to_string())
        } else {
            MockResponse::Respond(404, String::new())
        }
    })
    .await
}

#[tokio::test]
async fn test_resolve_picks_the_live_candidate() {
    let dead_a = reserve_port().await;
    let dead_b = reserve_port().await;
    let live = ping_backend().await;

    let resolver = resolver_for(&[base_url(dead_a), base_url(dead_b), base_url(live)]);

    let started = Instant::now();
    let resolved = resolver.resolve().await.expect("a candidate is live");
    assert_eq!(resolved.port(), Some(live.port()));
    // One concurrent probe round, not one timeout per dead candidate
    assert!(started.elapsed() < Duration::from_secs(4));

    let state = resolver.state();
    assert_eq!(state.active_url.port(), Some(live.port()));
    assert_eq!(
        state.last_successful.as_ref().and_then(Url::port),
        Some(live.port())
    );
    assert!(state.health.healthy);
}

#[tokio::test]
async fn test_resolve_fails_within_budget_when_all_down() {
    let dead_a = reserve_port().await;
    let dead_b = reserve_port().await;

    let resolver = resolver_for(&[base_url(dead_a), base_url(dead_b)]);

    let started = Instant::now();
    let result = resolver.resolve().await;
    assert!(result.is_err(), "nothing is listening");
    assert!(started.elapsed() < Duration::from_secs(6));
    assert!(!resolver.state().health.healthy);
}

#[tokio::test]
async fn test_last_successful_beats_static_priority() {
    let high_priority = ping_backend().await;
    let low_priority = ping_backend().await;

    let resolver = resolver_for(&[base_url(high_priority), base_url(low_priority)]);

    // A success observed against the low-priority backend makes it the
    // remembered URL, and resolution prefers it even though both are live.
    let low_url: Url = base_url(low_priority).parse().unwrap();
    resolver.report_success(&low_url, 5).await;

    let resolved = resolver.resolve().await.unwrap();
    assert_eq!(resolved.port(), Some(low_priority.port()));
}

#[tokio::test]
async fn test_probe_falls_back_to_root() {
    let backend = start_routed_backend(|_, path| match path {
        "/api/ping" => MockResponse::Respond(500, String::new()),
        "/" => MockResponse::Respond(200, "\"ok\"".to_string()),
        _ => MockResponse::Respond(404, String::new()),
    })
    .await;

    let probe = EndpointProbe::new(&probe_config());
    let url: Url = base_url(backend).parse().unwrap();
    assert!(probe.probe(&url).await.is_reachable());
}

#[tokio::test]
async fn test_probe_treats_404_ping_as_reachable() {
    // Any response below 500 proves something is serving HTTP there.
    let backend = start_routed_backend(|_, _| MockResponse::Respond(404, String::new())).await;

    let probe = EndpointProbe::new(&probe_config());
    let url: Url = base_url(backend).parse().unwrap();
    assert!(probe.probe(&url).await.is_reachable());
}
