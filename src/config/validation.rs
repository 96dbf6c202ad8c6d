//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Candidate list is non-empty and every URL parses with http/https
//! - Value ranges (timeouts and intervals > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use url::Url;

use crate::config::schema::ClientConfig;

/// One semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The candidate list is empty.
    NoEndpoints,
    /// A candidate URL did not parse.
    InvalidUrl { url: String, reason: String },
    /// A candidate URL uses a scheme other than http/https.
    UnsupportedScheme { url: String, scheme: String },
    /// The probe ping path must be absolute.
    RelativePingPath { path: String },
    /// A duration field is zero.
    ZeroDuration { field: &'static str },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::NoEndpoints => {
                write!(f, "at least one endpoint candidate is required")
            }
            ValidationError::InvalidUrl { url, reason } => {
                write!(f, "invalid endpoint URL '{}': {}", url, reason)
            }
            ValidationError::UnsupportedScheme { url, scheme } => {
                write!(f, "endpoint URL '{}' uses unsupported scheme '{}'", url, scheme)
            }
            ValidationError::RelativePingPath { path } => {
                write!(f, "ping path '{}' must start with '/'", path)
            }
            ValidationError::ZeroDuration { field } => {
                write!(f, "'{}' must be greater than zero", field)
            }
        }
    }
}

/// Validate a deserialized configuration, collecting every problem.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.endpoints.is_empty() {
        errors.push(ValidationError::NoEndpoints);
    }

    for endpoint in &config.endpoints {
        match Url::parse(&endpoint.url) {
            Ok(url) => {
                let scheme = url.scheme();
                if scheme != "http" && scheme != "https" {
                    errors.push(ValidationError::UnsupportedScheme {
                        url: endpoint.url.clone(),
                        scheme: scheme.to_string(),
                    });
                }
            }
            Err(e) => errors.push(ValidationError::InvalidUrl {
                url: endpoint.url.clone(),
                reason: e.to_string(),
            }),
        }
    }

    if !config.probe.ping_path.starts_with('/') {
        errors.push(ValidationError::RelativePingPath {
            path: config.probe.ping_path.clone(),
        });
    }

    let durations: [(&'static str, u64); 6] = [
        ("probe.timeout_secs", config.probe.timeout_secs),
        ("probe.sweep_budget_secs", config.probe.sweep_budget_secs),
        ("health.interval_secs", config.health.interval_secs),
        ("health.ttl_secs", config.health.ttl_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("timeouts.bulk_secs", config.timeouts.bulk_secs),
    ];
    for (field, value) in durations {
        if value == 0 {
            errors.push(ValidationError::ZeroDuration { field });
        }
    }
    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::ZeroDuration {
            field: "retries.max_attempts",
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::EndpointConfig;

    fn valid_config() -> ClientConfig {
        ClientConfig {
            endpoints: vec![EndpointConfig {
                url: "http://192.168.1.40:8080".to_string(),
                priority: 0,
            }],
            ..ClientConfig::default()
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_empty_endpoints_rejected() {
        let config = ClientConfig::default();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::NoEndpoints));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid_config();
        config.endpoints.push(EndpointConfig {
            url: "ftp://files.local".to_string(),
            priority: 0,
        });
        config.endpoints.push(EndpointConfig {
            url: "not a url".to_string(),
            priority: 0,
        });
        config.probe.timeout_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| matches!(e, ValidationError::UnsupportedScheme { .. })));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidUrl { .. })));
        assert!(errors.contains(&ValidationError::ZeroDuration {
            field: "probe.timeout_secs"
        }));
    }

    #[test]
    fn test_relative_ping_path_rejected() {
        let mut config = valid_config();
        config.probe.ping_path = "api/ping".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::RelativePingPath { .. })));
    }
}
