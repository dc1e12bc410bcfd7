//! Consensus error types.

use thiserror::Error;

/// Why a compact target failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// Sign bit set on a non-zero mantissa.
    #[error("negative target")]
    Negative,

    /// Exponent shifts the mantissa past 256 bits.
    #[error("target overflows 256 bits")]
    Overflow,

    /// Mantissa is zero or shifts out to zero.
    #[error("zero target")]
    Zero,

    /// Decoded value is easier than the network's proof-of-work limit.
    #[error("target above proof-of-work limit")]
    AboveLimit,
}

/// Errors returned by the proof-of-work and difficulty code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConsensusError {
    /// Invalid compact target encoding in `bits`.
    #[error("invalid compact target bits 0x{bits:08x}: {kind}")]
    InvalidEncoding {
        /// The rejected compact value.
        bits: u32,
        /// Which check it failed.
        kind: EncodingError,
    },

    /// Proof-of-work hash did not meet the required target.
    #[error("insufficient proof of work")]
    InsufficientPoW,
}

impl ConsensusError {
    pub(crate) const fn encoding(bits: u32, kind: EncodingError) -> Self {
        Self::InvalidEncoding { bits, kind }
    }
}
