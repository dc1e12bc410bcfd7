#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Dage core: 256-bit targets, block hashes, the chain index read by the
//! retargeting engine, and per-network consensus parameters.

pub mod chain;
pub mod constants;
pub mod params;
pub mod types;

pub use chain::*;
pub use constants::*;
pub use params::*;
pub use types::*;
