//! Consensus parameters consumed by the proof-of-work rules.
//!
//! A [`ConsensusParams`] value is built once for the selected network and
//! shared read-only for the life of the process. Presets carry the values the
//! Dage networks launched with; a TOML file can start from a preset and
//! override individual fields.

use crate::constants::*;
use crate::types::{target_from_hex, CoreError, Target};
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Networks with built-in parameter presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Production network.
    #[default]
    Main,
    /// Public test network.
    Testnet,
    /// Second-generation test network.
    Testnet4,
    /// Signed-block test network.
    Signet,
    /// Local regression-test network.
    Regtest,
}

impl Network {
    /// Lowercase name, as used in parameter files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Network::Main => "main",
            Network::Testnet => "testnet",
            Network::Testnet4 => "testnet4",
            Network::Signet => "signet",
            Network::Regtest => "regtest",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" | "mainnet" => Ok(Network::Main),
            "test" | "testnet" => Ok(Network::Testnet),
            "testnet4" => Ok(Network::Testnet4),
            "signet" => Ok(Network::Signet),
            "regtest" => Ok(Network::Regtest),
            _ => Err(CoreError::InvalidParams("unknown network name")),
        }
    }
}

/// Proof-of-work parameters for one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsensusParams {
    /// Easiest (numerically largest) target ever accepted.
    pub pow_limit: Target,
    /// Intended seconds between blocks.
    pub pow_target_spacing: i64,
    /// Nominal retarget window in seconds.
    pub pow_target_timespan: i64,
    /// First next-block height retargeted by DGW; lower heights use `pow_limit`.
    pub bootstrap_end_height: u64,
}

impl ConsensusParams {
    /// Build and validate a parameter set.
    pub fn new(
        pow_limit: Target,
        pow_target_spacing: i64,
        pow_target_timespan: i64,
        bootstrap_end_height: u64,
    ) -> Result<Self, CoreError> {
        let params = Self {
            pow_limit,
            pow_target_spacing,
            pow_target_timespan,
            bootstrap_end_height,
        };
        params.validate()?;
        Ok(params)
    }

    /// Preset for a built-in network.
    pub fn for_network(network: Network) -> Self {
        let pow_limit = match network {
            Network::Regtest => REGTEST_POW_LIMIT,
            Network::Main | Network::Testnet | Network::Testnet4 | Network::Signet => {
                MAIN_POW_LIMIT
            }
        };
        Self {
            pow_limit,
            pow_target_spacing: POW_TARGET_SPACING_SECS,
            pow_target_timespan: POW_TARGET_TIMESPAN_SECS,
            bootstrap_end_height: BOOTSTRAP_END_HEIGHT,
        }
    }

    /// Parse a TOML parameter file.
    ///
    /// Every key is optional; missing ones come from the `network` preset
    /// (main when absent). Unknown keys are rejected.
    pub fn from_toml_str(s: &str) -> Result<Self, CoreError> {
        let raw: RawParams = toml::from_str(s)?;
        let mut params = Self::for_network(raw.network.unwrap_or_default());
        if let Some(limit) = raw.pow_limit.as_deref() {
            params.pow_limit = target_from_hex(limit)?;
        }
        if let Some(spacing) = raw.pow_target_spacing {
            params.pow_target_spacing = spacing;
        }
        if let Some(timespan) = raw.pow_target_timespan {
            params.pow_target_timespan = timespan;
        }
        if let Some(height) = raw.bootstrap_end_height {
            params.bootstrap_end_height = height;
        }
        params.validate()?;
        Ok(params)
    }

    /// Check basic constraints the retargeting math depends on.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.pow_limit == Target::ZERO {
            return Err(CoreError::InvalidParams("pow_limit must be non-zero"));
        }
        if self.pow_target_spacing <= 0 {
            return Err(CoreError::InvalidParams("pow_target_spacing must be positive"));
        }
        if self.pow_target_timespan <= 0 {
            return Err(CoreError::InvalidParams("pow_target_timespan must be positive"));
        }
        Ok(())
    }
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self::for_network(Network::Main)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawParams {
    network: Option<Network>,
    pow_limit: Option<String>,
    pow_target_spacing: Option<i64>,
    pow_target_timespan: Option<i64>,
    bootstrap_end_height: Option<u64>,
}
