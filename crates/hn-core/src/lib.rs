//! hn-core: stable foundation for hydronet.
//!
//! Contains:
//! - error (the four error kinds shared by parser, model and codec)
//! - ids (element kinds and the node/link id namespace)
//! - numeric (Real + token parsing + range checks)
//! - units (uom time quantities used by the `[TIMES]` section)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{FormatError, HnError, HnResult, RefKind, ReferenceError, ValidationError};
pub use ids::*;
pub use numeric::*;
pub use units::*;
