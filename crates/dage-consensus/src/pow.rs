// Consensus-critical. Changes require a network upgrade + tests.
//! Proof-of-work check.
//!
//! The PoW condition is:
//!     hash_as_u256 <= decode(bits)
//!
//! where the hash is read as a little-endian 256-bit integer and `decode`
//! rejects anything easier than the network's proof-of-work limit.

use crate::difficulty::{decode, hash_meets_target};
use crate::error::ConsensusError;
use dage_core::{ConsensusParams, Hash256};

/// Validate proof-of-work, reporting why it failed.
pub fn validate_proof_of_work(
    hash: &Hash256,
    bits: u32,
    params: &ConsensusParams,
) -> Result<(), ConsensusError> {
    let target = decode(bits, &params.pow_limit)?;
    if !hash_meets_target(&hash.to_target(), &target) {
        return Err(ConsensusError::InsufficientPoW);
    }
    Ok(())
}

/// True iff `bits` is a valid target for `params` and `hash` meets it.
pub fn check_proof_of_work(hash: &Hash256, bits: u32, params: &ConsensusParams) -> bool {
    validate_proof_of_work(hash, bits, params).is_ok()
}
