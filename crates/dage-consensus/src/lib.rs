#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Dage proof-of-work consensus rules.
//!
//! This crate is responsible for:
//! - compact difficulty target encoding/decoding (Bitcoin-style `bits`)
//! - proof-of-work validation against the target
//! - next-block target selection: a bootstrap window pinned to the
//!   proof-of-work limit, then Dark Gravity Wave every block
//!
//! It intentionally does **not** include header hashing, networking, or
//! chain-state storage. Everything here is a pure function of its inputs and
//! safe to call from any number of threads.

pub mod dgw;
pub mod difficulty;
pub mod error;
pub mod pow;
pub mod retarget;

pub use dgw::*;
pub use difficulty::*;
pub use error::*;
pub use pow::*;
pub use retarget::*;
