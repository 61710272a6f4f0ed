//! ic-core: shared foundation for the internal coupling tools.
//!
//! Contains:
//! - numeric (Real + float helpers)
//! - time (row time keys, date parsing, seconds conversion)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod time;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use time::*;
