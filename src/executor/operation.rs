//! Logical operation definitions.
//!
//! A [`LogicalOperation`] is declared once at startup and validated for
//! well-formedness there; a malformed definition is a programmer error,
//! not a runtime condition. The definitions are read-only afterwards:
//! [`LogicalOperation::bind`] produces a per-call copy with path
//! parameters substituted instead of mutating the table.

use std::time::Duration;

use reqwest::Method;
use thiserror::Error;

/// One guessed (method, path) pairing for a logical operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub method: Method,
    pub path: String,
}

impl Variant {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

/// Errors in an operation definition (programmer error, caught at startup).
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("operation '{0}' declares no variants")]
    EmptyVariants(&'static str),

    #[error("operation '{name}' variant path '{path}' is not absolute")]
    RelativePath { name: &'static str, path: String },

    #[error("operation '{name}' variant path '{path}' has unbalanced parameter braces")]
    UnbalancedPlaceholder { name: &'static str, path: String },

    #[error("operation '{0}' has a zero attempt timeout")]
    ZeroTimeout(&'static str),

    #[error("operation '{name}' path '{path}' is missing a value for parameter '{param}'")]
    MissingParam {
        name: &'static str,
        path: String,
        param: String,
    },
}

/// A named application-level action with its ordered variant list.
#[derive(Debug, Clone)]
pub struct LogicalOperation {
    pub name: &'static str,
    pub idempotent: bool,
    pub variants: Vec<Variant>,
    pub attempt_timeout: Duration,
}

impl LogicalOperation {
    /// Build and validate a definition.
    pub fn new(
        name: &'static str,
        idempotent: bool,
        variants: Vec<Variant>,
        attempt_timeout: Duration,
    ) -> Result<Self, OperationError> {
        if variants.is_empty() {
            return Err(OperationError::EmptyVariants(name));
        }
        if attempt_timeout.is_zero() {
            return Err(OperationError::ZeroTimeout(name));
        }
        for variant in &variants {
            if !variant.path.starts_with('/') {
                return Err(OperationError::RelativePath {
                    name,
                    path: variant.path.clone(),
                });
            }
            if !balanced_placeholders(&variant.path) {
                return Err(OperationError::UnbalancedPlaceholder {
                    name,
                    path: variant.path.clone(),
                });
            }
        }
        Ok(Self {
            name,
            idempotent,
            variants,
            attempt_timeout,
        })
    }

    /// Substitute `{param}` placeholders in every variant path, producing
    /// the concrete operation for one call. Fails if any placeholder is
    /// left unbound.
    pub fn bind(&self, params: &[(&str, &str)]) -> Result<LogicalOperation, OperationError> {
        let mut bound = self.clone();
        for variant in &mut bound.variants {
            let mut path = variant.path.clone();
            for (key, value) in params {
                path = path.replace(&format!("{{{}}}", key), value);
            }
            if let Some(open) = path.find('{') {
                let tail = &path[open + 1..];
                let param = tail[..tail.find('}').unwrap_or(tail.len())].to_string();
                return Err(OperationError::MissingParam {
                    name: self.name,
                    path: variant.path.clone(),
                    param,
                });
            }
            variant.path = path;
        }
        Ok(bound)
    }
}

fn balanced_placeholders(path: &str) -> bool {
    let mut open = false;
    for c in path.chars() {
        match c {
            '{' if open => return false,
            '{' => open = true,
            '}' if !open => return false,
            '}' => open = false,
            _ => {}
        }
    }
    !open
}
