//! Candidate registry.
//!
//! # Responsibilities
//! - Hold the ordered list of candidate base URLs
//! - Remember the last URL a request actually succeeded against
//! - Serve the probe order: last success first, then priority order
//!
//! Pure data holder; no I/O happens here.

use std::sync::RwLock;

use url::Url;

use crate::config::EndpointConfig;

/// One candidate backend address, immutable once constructed.
#[derive(Debug, Clone)]
pub struct EndpointCandidate {
    pub url: Url,
    pub priority: u32,
}

/// Ordered candidate list plus the last-known-good URL.
#[derive(Debug)]
pub struct CandidateRegistry {
    /// Candidates sorted by priority, highest first. Declaration order
    /// breaks ties.
    candidates: Vec<EndpointCandidate>,
    last_successful: RwLock<Option<Url>>,
}

impl CandidateRegistry {
    /// Build a registry from configuration. Entries that fail to parse are
    /// skipped with a warning; returns `None` when nothing usable remains,
    /// so a constructed registry is never empty.
    pub fn from_config(endpoints: &[EndpointConfig]) -> Option<Self> {
        let mut candidates = Vec::with_capacity(endpoints.len());
        for entry in endpoints {
            match Url::parse(&entry.url) {
                Ok(url) => candidates.push(EndpointCandidate {
                    url,
                    priority: entry.priority,
                }),
                Err(e) => {
                    tracing::warn!(url = %entry.url, error = %e, "Ignoring invalid candidate URL");
                }
            }
        }
        if candidates.is_empty() {
            return None;
        }
        candidates.sort_by(|a, b| b.priority.cmp(&a.priority));
        Some(Self {
            candidates,
            last_successful: RwLock::new(None),
        })
    }

    /// Candidate URLs in probe order: the last successful URL first when
    /// set, then the static candidates by priority, deduplicated.
    pub fn list(&self) -> Vec<Url> {
        let mut urls = Vec::with_capacity(self.candidates.len() + 1);
        if let Some(last) = self.last_successful() {
            urls.push(last);
        }
        for candidate in &self.candidates {
            if !urls.contains(&candidate.url) {
                urls.push(candidate.url.clone());
            }
        }
        urls
    }

    /// Promote a URL to last-known-good.
    pub fn remember(&self, url: &Url) {
        if let Ok(mut slot) = self.last_successful.write() {
            *slot = Some(url.clone());
        }
    }

    /// The last URL a request succeeded against, if any.
    pub fn last_successful(&self) -> Option<Url> {
        self.last_successful.read().ok().and_then(|slot| slot.clone())
    }

    /// Number of static candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str, priority: u32) -> EndpointConfig {
        EndpointConfig {
            url: url.to_string(),
            priority,
        }
    }

    #[test]
    fn test_priority_order() {
        let registry = CandidateRegistry::from_config(&[
            entry("http://low:8080", 1),
            entry("http://high:8080", 10),
            entry("http://mid:8080", 5),
        ])
        .unwrap();

        let urls: Vec<String> = registry.list().iter().map(|u| u.to_string()).collect();
        assert_eq!(urls, vec!["http://high:8080/", "http://mid:8080/", "http://low:8080/"]);
    }

    #[test]
    fn test_remember_prepends_and_dedupes() {
        let registry = CandidateRegistry::from_config(&[
            entry("http://a:8080", 10),
            entry("http://b:8080", 1),
        ])
        .unwrap();

        let b: Url = "http://b:8080".parse().unwrap();
        registry.remember(&b);

        let urls: Vec<String> = registry.list().iter().map(|u| u.to_string()).collect();
        assert_eq!(urls, vec!["http://b:8080/", "http://a:8080/"]);
        assert_eq!(registry.last_successful(), Some(b));
    }

    #[test]
    fn test_invalid_urls_skipped() {
        let registry =
            CandidateRegistry::from_config(&[entry("not a url", 0), entry("http://ok:8080", 0)])
                .unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_all_invalid_is_none() {
        assert!(CandidateRegistry::from_config(&[entry("not a url", 0)]).is_none());
        assert!(CandidateRegistry::from_config(&[]).is_none());
    }
}
