// Consensus-critical. Changes require a network upgrade + tests.
//! Protocol-wide constants for Dage.

use crate::types::Target;

/// Length in bytes of a 32-byte hash.
pub const HASH256_LEN: usize = 32;

/// First height retargeted by Dark Gravity Wave.
///
/// Blocks below this height are pinned to the proof-of-work limit
/// (instant-mine distribution window).
pub const BOOTSTRAP_END_HEIGHT: u64 = 55_555;

/// Number of past blocks averaged by Dark Gravity Wave.
pub const DGW_PAST_BLOCKS: u64 = 24;

/// Block time target in seconds (2.5 minutes).
pub const POW_TARGET_SPACING_SECS: i64 = 150;

/// Nominal retarget timespan in seconds (two weeks).
///
/// Carried for parity with the chain parameters; DGW derives its own
/// expected timespan from the window size and spacing.
pub const POW_TARGET_TIMESPAN_SECS: i64 = 14 * 24 * 60 * 60;

/// Easiest target on main, test, testnet4 and signet:
/// `00000fffffffffffffffffffffffffffffffffffffffffffffffffffffffffff`.
pub const MAIN_POW_LIMIT: Target = Target::from_words(u128::MAX >> 20, u128::MAX);

/// Easiest target on regtest:
/// `7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff`.
pub const REGTEST_POW_LIMIT: Target = Target::from_words(u128::MAX >> 1, u128::MAX);
