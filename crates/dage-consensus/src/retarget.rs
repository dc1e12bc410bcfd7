// Consensus-critical. Changes require a network upgrade + tests.
//! Next-block work requirement.
//!
//! Selection is a pure function of the next block's height:
//!
//! - no parent (genesis): the proof-of-work limit;
//! - `height < bootstrap_end_height`: the proof-of-work limit, whatever the
//!   history looks like (instant-mine distribution window);
//! - otherwise: Dark Gravity Wave over the parent's ancestry.

use crate::dgw::dark_gravity_wave;
use crate::difficulty::encode;
use dage_core::{BlockIndex, ChainLookup, ConsensusParams};
use tracing::debug;

/// Which rule set computes the next target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetargetPhase {
    /// The block being built is genesis.
    Genesis,
    /// Difficulty pinned to the proof-of-work limit.
    Bootstrap,
    /// Dark Gravity Wave, retargeting every block.
    Rolling,
}

/// Phase for the child of `parent`.
pub fn retarget_phase(parent: Option<&BlockIndex>, params: &ConsensusParams) -> RetargetPhase {
    match parent {
        None => RetargetPhase::Genesis,
        Some(p) if p.height.saturating_add(1) < params.bootstrap_end_height => {
            RetargetPhase::Bootstrap
        }
        Some(_) => RetargetPhase::Rolling,
    }
}

/// Compact target the child of `parent` must satisfy.
pub fn next_work_required<C: ChainLookup>(
    chain: &C,
    parent: Option<&BlockIndex>,
    params: &ConsensusParams,
) -> u32 {
    let phase = retarget_phase(parent, params);
    let bits = match phase {
        RetargetPhase::Genesis | RetargetPhase::Bootstrap => encode(&params.pow_limit),
        RetargetPhase::Rolling => dark_gravity_wave(chain, parent, params),
    };
    debug!(
        height = parent.map_or(0, |p| p.height.saturating_add(1)),
        ?phase,
        bits = format_args!("{bits:#010x}"),
        "next work required"
    );
    bits
}

/// Whether a header may move difficulty from `old_bits` to `new_bits`.
///
/// Always `true`: DGW retargets every block and bounds each step itself, so
/// there is no separate continuity rule to apply.
// TODO: a bound derived from the DGW clamp (3x per window) would let
// headers-first sync reject wild `nBits` before the ancestry is known.
pub fn permitted_difficulty_transition(
    _params: &ConsensusParams,
    _height: u64,
    _old_bits: u32,
    _new_bits: u32,
) -> bool {
    true
}
