// Consensus-critical. Changes require a network upgrade + tests.
//! Canonical value types shared by the chain index and the consensus rules.

use crate::constants::HASH256_LEN;
use core::fmt;
use core::str::FromStr;

/// Full-precision 256-bit unsigned proof-of-work target.
///
/// Arithmetic on this type panics on overflow in debug builds, so consensus
/// code uses the `checked_*` methods wherever a result can leave the range.
pub type Target = ethnum::U256;

/// Errors related to parsing, validation, or construction of core types.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Hex string had an unexpected byte length.
    #[error("invalid hex length: expected {expected} bytes, got {got} bytes")]
    InvalidHexLength {
        /// Expected number of bytes.
        expected: usize,
        /// Actual number of bytes provided.
        got: usize,
    },

    /// Hex decoding failed.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// A chain-index entry referenced a parent that is not in the index.
    #[error("unknown parent block {0}")]
    UnknownParent(BlockId),

    /// A chain-index entry's height is not its parent's height plus one.
    #[error("height mismatch: parent at {parent}, child claims {child}")]
    HeightMismatch {
        /// Height of the referenced parent.
        parent: u64,
        /// Height carried by the new entry.
        child: u64,
    },

    /// A second parentless (height 0) entry was inserted.
    #[error("chain index already has a genesis entry")]
    DuplicateGenesis,

    /// Consensus parameters violated a basic constraint.
    #[error("invalid consensus parameters: {0}")]
    InvalidParams(&'static str),

    /// The parameter file was not valid TOML or had unknown keys.
    #[error("invalid parameter file: {0}")]
    Config(#[from] toml::de::Error),
}

/// Parse 64 hex digits (big-endian, optional `0x`) into a [`Target`].
pub fn target_from_hex(s: &str) -> Result<Target, CoreError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(s)?;
    let arr: [u8; HASH256_LEN] =
        bytes
            .as_slice()
            .try_into()
            .map_err(|_| CoreError::InvalidHexLength {
                expected: HASH256_LEN,
                got: bytes.len(),
            })?;
    Ok(Target::from_be_bytes(arr))
}

/// Render a [`Target`] as 64 big-endian hex digits.
pub fn target_to_hex(target: &Target) -> String {
    hex::encode(target.to_be_bytes())
}

/// A 32-byte block hash in internal byte order (least significant byte first).
///
/// For proof-of-work the bytes are read as a little-endian 256-bit integer.
/// `Display`/`FromStr` use the conventional reversed (big-endian) hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash256(pub [u8; HASH256_LEN]);

impl Hash256 {
    /// Returns an all-zero hash.
    pub const fn zero() -> Self {
        Self([0u8; HASH256_LEN])
    }

    /// The hash interpreted as an unsigned 256-bit integer.
    pub fn to_target(&self) -> Target {
        Target::from_le_bytes(self.0)
    }

    /// The hash whose integer value is `value`.
    pub fn from_target(value: Target) -> Self {
        Self(value.to_le_bytes())
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({self})")
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&target_to_hex(&self.to_target()))
    }
}

impl FromStr for Hash256 {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        target_from_hex(s).map(Self::from_target)
    }
}

/// Handle of an entry in a [`ChainIndex`](crate::ChainIndex).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub usize);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
