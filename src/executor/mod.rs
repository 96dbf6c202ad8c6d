//! Request execution subsystem.
//!
//! # Data Flow
//! ```text
//! LogicalOperation (static table, validated at startup)
//!     → executor.rs (resolve base URL, role-route the primary variant)
//!     → sequential variant loop with per-variant retry
//!     → outcome.rs (classify each attempt)
//!     → payload or tagged ApiError
//! ```

pub mod executor;
pub mod operation;
pub mod outcome;

pub use executor::FallbackRequestExecutor;
pub use operation::{LogicalOperation, OperationError, Variant};
pub use outcome::AttemptOutcome;
