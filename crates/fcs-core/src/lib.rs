//! fcs-core: stable foundation for the flight control pipeline.
//!
//! Contains:
//! - units (uom SI angle/length types + unit tags used by configuration)
//! - numeric (roundoff comparison + finiteness check)
//! - ids (compact handles for property slots)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{FcsError, FcsResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
