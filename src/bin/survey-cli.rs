//! Diagnostics CLI for the survey backend access layer.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use survey_client::config::{load_config, validate_config, ClientConfig, EndpointConfig};
use survey_client::{MemoryCredentials, RequestClient, Shutdown};

#[derive(Parser)]
#[command(name = "survey-cli")]
#[command(about = "Diagnostics CLI for the survey backend access layer", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Candidate base URL (repeatable; overrides the config file list)
    #[arg(short, long)]
    url: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a reachable backend among the candidates
    Resolve,
    /// Show backend health status
    Health,
    /// Log in and print the session payload
    Login { username: String, password: String },
    /// List surveys visible to the stored role
    Surveys,
    /// List businesses
    Businesses,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "survey_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    if !cli.url.is_empty() {
        // Earlier flags get higher priority, matching declaration order.
        let count = cli.url.len() as u32;
        config.endpoints = cli
            .url
            .iter()
            .enumerate()
            .map(|(i, url)| EndpointConfig {
                url: url.clone(),
                priority: count - i as u32,
            })
            .collect();
    }
    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            eprintln!("config error: {}", error);
        }
        std::process::exit(2);
    }

    tracing::info!(
        candidates = config.endpoints.len(),
        probe_timeout_secs = config.probe.timeout_secs,
        "Configuration loaded"
    );

    let credentials = Arc::new(MemoryCredentials::new());
    let client = RequestClient::from_config(&config, credentials)?;

    let shutdown = Shutdown::new();
    client.monitor().spawn(shutdown.subscribe());

    let result = match cli.command {
        Commands::Resolve => {
            let url = client.resolver().resolve().await?;
            println!("{}", url);
            Ok(())
        }
        Commands::Health => {
            let status = client.monitor().status().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
        Commands::Login { username, password } => {
            client.login(&username, &password).await.map(print_payload)
        }
        Commands::Surveys => client.list_surveys().await.map(print_payload),
        Commands::Businesses => client.list_businesses().await.map(print_payload),
    };

    shutdown.trigger();
    result?;
    Ok(())
}

fn print_payload(payload: Value) {
    match serde_json::to_string_pretty(&payload) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", payload),
    }
}
