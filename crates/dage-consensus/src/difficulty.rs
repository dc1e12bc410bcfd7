// Consensus-critical. Changes require a network upgrade + tests.
//! Compact difficulty target codec.
//!
//! Headers carry the target in Bitcoin-style "compact" form:
//! `bits = (size << 24) | mantissa`, where `size` is the target's length in
//! bytes and the mantissa holds its top three bytes. Bit `0x0080_0000` is a
//! sign bit; consensus never accepts negative targets.
//!
//! - size <= 3: target = mantissa >> 8*(3-size)
//! - size  > 3: target = mantissa << 8*(size-3)
//!
//! Decoding and encoding are integer-only and reproduce the historical node
//! behavior bit for bit.

use crate::error::{ConsensusError, EncodingError};
use dage_core::Target;

const SIGN_BIT: u32 = 0x0080_0000;
const MANTISSA_MASK: u32 = 0x007f_ffff;

/// Expand compact `bits` into a full target without the ceiling check.
///
/// Rejects negative, overflowing, and zero encodings. Use [`decode`] for
/// anything a header claims; this is for bits already accepted on-chain.
pub fn expand_compact(bits: u32) -> Result<Target, ConsensusError> {
    let size = bits >> 24;
    let mut word = bits & MANTISSA_MASK;
    if size <= 3 {
        word >>= 8 * (3 - size);
    }

    // Sign and overflow only count when something survives the shift.
    if word != 0 && bits & SIGN_BIT != 0 {
        return Err(ConsensusError::encoding(bits, EncodingError::Negative));
    }
    if word != 0 && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32)) {
        return Err(ConsensusError::encoding(bits, EncodingError::Overflow));
    }
    if word == 0 {
        return Err(ConsensusError::encoding(bits, EncodingError::Zero));
    }

    if size <= 3 {
        return Ok(Target::from(word));
    }
    Target::from(word)
        .checked_shl(8 * (size - 3))
        .ok_or(ConsensusError::encoding(bits, EncodingError::Overflow))
}

/// Decode compact `bits` into a target no easier than `pow_limit`.
///
/// This is the single validation gate for header-supplied targets.
pub fn decode(bits: u32, pow_limit: &Target) -> Result<Target, ConsensusError> {
    let target = expand_compact(bits)?;
    if target > *pow_limit {
        return Err(ConsensusError::encoding(bits, EncodingError::AboveLimit));
    }
    Ok(target)
}

/// Encode a target into canonical compact `bits`.
///
/// Keeps the top three significant bytes; lower bits are truncated. When the
/// leading byte would set the sign bit the mantissa moves down a byte and the
/// size grows by one. Zero encodes to `0`.
pub fn encode(target: &Target) -> u32 {
    let mut size = (256 - target.leading_zeros() + 7) / 8;
    let mut compact = if size <= 3 {
        low_u32(target) << (8 * (3 - size))
    } else {
        low_u32(&(*target >> (8 * (size - 3))))
    };

    if compact & SIGN_BIT != 0 {
        compact >>= 8;
        size += 1;
    }
    compact | (size << 24)
}

fn low_u32(value: &Target) -> u32 {
    let b = value.to_le_bytes();
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

/// Compare a hash value with a target. Returns `true` if `hash <= target`.
pub fn hash_meets_target(hash: &Target, target: &Target) -> bool {
    hash <= target
}
