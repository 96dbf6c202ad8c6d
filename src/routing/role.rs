//! Role-namespaced path routing.
//!
//! # Responsibilities
//! - Map a generic resource path to its role-namespaced form
//! - Leave unknown or absent roles untouched
//!
//! # Design Decisions
//! - Pure, total function: never panics, never allocates on the identity path
//! - Static prefix substitution only, no regex
//! - Already-namespaced paths pass through unchanged (no double prefixing)

/// The role namespaces the backend exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleNamespace {
    Admin,
    Business,
    Customer,
    Default,
}

impl RoleNamespace {
    /// Map a stored role string to a namespace. Unknown strings fall back
    /// to [`RoleNamespace::Default`].
    pub fn from_role(role: &str) -> Self {
        match role.trim().to_ascii_lowercase().as_str() {
            "admin" => RoleNamespace::Admin,
            "business" => RoleNamespace::Business,
            "customer" => RoleNamespace::Customer,
            _ => RoleNamespace::Default,
        }
    }

    fn segment(self) -> Option<&'static str> {
        match self {
            RoleNamespace::Admin => Some("admin"),
            RoleNamespace::Business => Some("business"),
            RoleNamespace::Customer => Some("customer"),
            RoleNamespace::Default => None,
        }
    }
}

const NAMESPACE_SEGMENTS: [&str; 3] = ["admin/", "business/", "customer/"];

/// Compute the role-namespaced form of a generic `/api/...` path.
///
/// `/api/survey` becomes `/api/business/survey` for [`RoleNamespace::Business`];
/// the Default namespace and non-`/api` paths are returned unchanged.
pub fn route_for(path: &str, role: RoleNamespace) -> String {
    let Some(segment) = role.segment() else {
        return path.to_string();
    };
    let Some(rest) = path.strip_prefix("/api/") else {
        return path.to_string();
    };
    if NAMESPACE_SEGMENTS.iter().any(|ns| rest.starts_with(ns)) {
        return path.to_string();
    }
    format!("/api/{}/{}", segment, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_prefixing() {
        assert_eq!(
            route_for("/api/survey", RoleNamespace::Business),
            "/api/business/survey"
        );
        assert_eq!(
            route_for("/api/survey", RoleNamespace::Admin),
            "/api/admin/survey"
        );
        assert_eq!(
            route_for("/api/surveys", RoleNamespace::Customer),
            "/api/customer/surveys"
        );
    }

    #[test]
    fn test_default_role_is_identity() {
        assert_eq!(route_for("/api/survey", RoleNamespace::Default), "/api/survey");
    }

    #[test]
    fn test_unknown_role_maps_to_default() {
        assert_eq!(RoleNamespace::from_role("supervisor"), RoleNamespace::Default);
        assert_eq!(RoleNamespace::from_role(""), RoleNamespace::Default);
        assert_eq!(RoleNamespace::from_role(" BUSINESS "), RoleNamespace::Business);
    }

    #[test]
    fn test_non_api_paths_untouched() {
        assert_eq!(route_for("/health", RoleNamespace::Admin), "/health");
        assert_eq!(route_for("/api", RoleNamespace::Admin), "/api");
        assert_eq!(route_for("", RoleNamespace::Admin), "");
    }

    #[test]
    fn test_no_double_prefixing() {
        assert_eq!(
            route_for("/api/business/survey", RoleNamespace::Business),
            "/api/business/survey"
        );
        assert_eq!(
            route_for("/api/admin/survey", RoleNamespace::Business),
            "/api/admin/survey"
        );
    }

    #[test]
    fn test_deterministic() {
        for _ in 0..3 {
            assert_eq!(
                route_for("/api/feedback", RoleNamespace::Customer),
                "/api/customer/feedback"
            );
        }
    }
}
