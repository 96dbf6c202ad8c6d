//! Path routing subsystem.
//!
//! # Design Decisions
//! - Routing is a pure prefix substitution computed per call
//! - Deterministic: same path and role always produce the same result
//! - Wrong guesses are cheap; the executor's variant fallback absorbs a
//!   namespaced path the backend does not actually serve

pub mod role;

pub use role::{route_for, RoleNamespace};
