// Consensus-critical. Changes require a network upgrade + tests.
//! Dark Gravity Wave (v3) retargeting.
//!
//! Every block is retargeted from the last [`DGW_PAST_BLOCKS`] blocks:
//!
//! 1. walk back from the parent, newest first, skipping genesis;
//! 2. fold an incremental average of their targets,
//!    `avg_n = (avg_{n-1} * (n-1) + target_n) / n`;
//! 3. sum the gaps between consecutive timestamps in walk order;
//! 4. clamp that sum to `[expected/3, expected*3]` where
//!    `expected = blocks * spacing`;
//! 5. scale the average by `actual / expected` and cap at the PoW limit.
//!
//! The average is an order-dependent recurrence with floor division at every
//! step. It is not the arithmetic mean and must not be replaced by one: the
//! rounding differs and the result is part of consensus.
//!
//! Intermediate products are computed with `BigUint` so nothing can wrap.
//! Results are identical to 256-bit arithmetic as long as
//! `pow_limit * 3 * DGW_PAST_BLOCKS * pow_target_spacing` fits in 256 bits.
//! The main-net preset does; the regtest limit does not.

use crate::difficulty::{encode, expand_compact};
use crate::error::ConsensusError;
use dage_core::{BlockIndex, ChainLookup, ConsensusParams, Target, DGW_PAST_BLOCKS};
use num_bigint::BigUint;
use num_traits::Zero;
use tracing::{debug, warn};

/// Running state of the backward walk.
#[derive(Debug, Default)]
struct Window {
    average: BigUint,
    count: u64,
    last_time: Option<i64>,
    actual_timespan: i64,
}

impl Window {
    fn push(mut self, entry: &BlockIndex) -> Result<Self, ConsensusError> {
        let target = to_big(&expand_compact(entry.bits)?);
        self.count += 1;
        self.average = if self.count == 1 {
            target
        } else {
            (self.average * (self.count - 1) + target) / self.count
        };

        if let Some(prev) = self.last_time {
            self.actual_timespan = self
                .actual_timespan
                .saturating_add(prev.saturating_sub(entry.time));
        }
        self.last_time = Some(entry.time);
        Ok(self)
    }
}

/// Compact target for the child of `parent` under Dark Gravity Wave.
///
/// Falls back to the proof-of-work limit when fewer than
/// [`DGW_PAST_BLOCKS`] blocks sit above genesis. A chain index with broken
/// links yields a shorter window; an ancestor with undecodable bits yields the
/// limit. Both are logged and neither panics.
pub fn dark_gravity_wave<C: ChainLookup>(
    chain: &C,
    parent: Option<&BlockIndex>,
    params: &ConsensusParams,
) -> u32 {
    let limit_bits = encode(&params.pow_limit);
    let last = match parent {
        Some(last) if last.height >= DGW_PAST_BLOCKS => last,
        _ => return limit_bits,
    };

    let window = chain
        .ancestors(last)
        .take_while(|entry| entry.height > 0)
        .take(DGW_PAST_BLOCKS as usize)
        .try_fold(Window::default(), Window::push);
    let window = match window {
        Ok(window) => window,
        Err(err) => {
            warn!(height = last.height, %err, "undecodable bits in DGW window, using pow limit");
            return limit_bits;
        }
    };

    if window.count < DGW_PAST_BLOCKS {
        warn!(
            height = last.height,
            count = window.count,
            "short DGW window, chain index is missing ancestors"
        );
    }

    let expected = i64::try_from(window.count)
        .unwrap_or(i64::MAX)
        .saturating_mul(params.pow_target_spacing);
    if expected <= 0 {
        warn!(
            height = last.height,
            spacing = params.pow_target_spacing,
            "non-positive DGW expected timespan, using pow limit"
        );
        return limit_bits;
    }

    let mut actual = window.actual_timespan;
    if actual < expected / 3 {
        actual = expected / 3;
    }
    if actual > expected.saturating_mul(3) {
        actual = expected.saturating_mul(3);
    }

    let scaled = window.average * actual.unsigned_abs() / expected.unsigned_abs();
    let next = from_big(&scaled)
        .filter(|target| *target <= params.pow_limit)
        .unwrap_or(params.pow_limit);
    let bits = encode(&next);

    debug!(
        height = last.height.saturating_add(1),
        blocks = window.count,
        actual_timespan = actual,
        expected_timespan = expected,
        bits = format_args!("{bits:#010x}"),
        "DGW retarget"
    );
    bits
}

fn to_big(value: &Target) -> BigUint {
    BigUint::from_bytes_le(&value.to_le_bytes())
}

fn from_big(value: &BigUint) -> Option<Target> {
    if value.is_zero() {
        return Some(Target::ZERO);
    }
    let bytes = value.to_bytes_le();
    if bytes.len() > 32 {
        return None;
    }
    let mut arr = [0u8; 32];
    arr[..bytes.len()].copy_from_slice(&bytes);
    Some(Target::from_le_bytes(arr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dage_core::{BlockId, ChainIndex, Network};

    fn params() -> ConsensusParams {
        ConsensusParams {
            bootstrap_end_height: 0,
            ..ConsensusParams::for_network(Network::Regtest)
        }
    }

    /// Genesis plus one block per `(time_gap, bits)` pair, oldest first.
    fn build(blocks: &[(i64, u32)]) -> (ChainIndex, BlockId) {
        let mut chain = ChainIndex::new();
        let mut tip = chain
            .insert(BlockIndex::genesis(1_600_000_000, 0x207f_ffff))
            .unwrap();
        let mut time = 1_600_000_000;
        for &(gap, bits) in blocks {
            time += gap;
            tip = chain.push_child(tip, time, bits).unwrap();
        }
        (chain, tip)
    }

    #[test]
    fn big_conversion_roundtrip() {
        for t in [Target::ZERO, Target::ONE, Target::MAX, Target::from(0xdead_beefu32) << 100u32] {
            assert_eq!(from_big(&to_big(&t)), Some(t));
        }
        assert_eq!(from_big(&(to_big(&Target::MAX) + 1u32)), None);
    }

    #[test]
    fn too_short_history_uses_limit() {
        let p = params();
        let (chain, tip) = build(&[(150, 0x1d00_ffff); 23]);
        let parent = chain.get(tip).unwrap();
        assert_eq!(parent.height, 23);
        assert_eq!(dark_gravity_wave(&chain, Some(parent), &p), 0x207f_ffff);
        assert_eq!(dark_gravity_wave(&chain, None, &p), 0x207f_ffff);
        let genesis = chain.get(chain.genesis().unwrap()).unwrap();
        assert_eq!(dark_gravity_wave(&chain, Some(genesis), &p), 0x207f_ffff);
    }

    #[test]
    fn incremental_average_is_not_the_mean() {
        // Small raw targets so rounding in the recurrence is visible. The
        // window is the newest 24 blocks; gaps sum to exactly 24 * spacing,
        // so the scale factor is one and the result is the average itself.
        let values: Vec<u32> = (0..24u32).map(|i| 1_000 + (i * 37) % 11).collect();
        let mut blocks: Vec<(i64, u32)> = values
            .iter()
            .map(|&v| (150, encode(&Target::from(v))))
            .collect();
        // The oldest block's gap is outside the window; one in-window gap is
        // doubled to make 23 gaps add up to 24 spacings.
        blocks[1].0 = 300;
        let (chain, tip) = build(&blocks);

        let mut avg = 0u64;
        for (n, &v) in values.iter().rev().enumerate() {
            let n = n as u64 + 1;
            avg = if n == 1 { v as u64 } else { (avg * (n - 1) + v as u64) / n };
        }
        let mean = values.iter().map(|&v| v as u64).sum::<u64>() / values.len() as u64;
        assert_ne!(avg, mean);

        let bits = dark_gravity_wave(&chain, chain.get(tip), &params());
        assert_eq!(bits, encode(&Target::from(avg)));
    }

    #[test]
    fn scales_by_actual_over_expected() {
        let bits = 0x1b04_04cbu32;
        let t = expand_compact(bits).unwrap();
        // 23 in-window gaps of 200s: actual 4600, expected 3600.
        let (chain, tip) = build(&[(200, bits); 30]);
        let got = dark_gravity_wave(&chain, chain.get(tip), &params());
        assert_eq!(got, encode(&(t * Target::from(4_600u32) / Target::from(3_600u32))));
    }

    #[test]
    fn clamps_fast_blocks_to_a_third() {
        let bits = 0x1b04_04cbu32;
        let t = expand_compact(bits).unwrap();
        let (chain, tip) = build(&[(1, bits); 30]);
        let got = dark_gravity_wave(&chain, chain.get(tip), &params());
        assert_eq!(got, encode(&(t * Target::from(1_200u32) / Target::from(3_600u32))));
    }

    #[test]
    fn backwards_timestamps_clamp_low() {
        let bits = 0x1b04_04cbu32;
        let t = expand_compact(bits).unwrap();
        let (chain, tip) = build(&[(-10, bits); 30]);
        let got = dark_gravity_wave(&chain, chain.get(tip), &params());
        assert_eq!(got, encode(&(t / Target::from(3u32))));
    }

    #[test]
    fn scaled_average_never_exceeds_limit() {
        // Regtest limit is 2^255-1; three times an average near it does not
        // fit in 256 bits, and must still come back as the limit.
        let p = params();
        let (chain, tip) = build(&[(10_000, 0x207f_ffff); 30]);
        assert_eq!(dark_gravity_wave(&chain, chain.get(tip), &p), encode(&p.pow_limit));
    }

    #[test]
    fn undecodable_ancestor_uses_limit() {
        let mut blocks = vec![(150, 0x1b04_04cbu32); 30];
        blocks[20].1 = 0x0492_3456;
        let (chain, tip) = build(&blocks);
        assert_eq!(dark_gravity_wave(&chain, chain.get(tip), &params()), 0x207f_ffff);
    }
}
