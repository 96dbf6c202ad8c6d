//! Health monitoring subsystem.
//!
//! # Data Flow
//! ```text
//! Periodic timer (monitor.rs)
//!     → resolver.check_active() (probe + state update)
//!     → cached HealthRecord
//!
//! status() query:
//!     healthy and fresh → cached record, no probe
//!     stale or unhealthy → one probe now, refreshed record
//! ```

pub mod monitor;

pub use monitor::{HealthMonitor, HealthStatus};
