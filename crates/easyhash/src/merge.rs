// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! State Merger: folds ordered partial states into a running state.
//!
//! # Algorithm
//!
//! For each partial state, in chunk order:
//! 1. XOR its words into the running words lane by lane
//! 2. Rotate lanes left by 9, 13, 17, 21
//! 3. Multiply lanes by PRIME1..PRIME4
//!
//! Then one cross-mixing pass (`a^=d; b^=a; c^=b; d^=c`).
//!
//! The fold is order-sensitive. It is not equivalent to mixing the same bytes
//! through the block loop, so a batch that goes through here yields a
//! different digest than the sequential path would.

use crate::constants::{PRIME1, PRIME2, PRIME3, PRIME4};
use crate::state::State;

const MERGE_ROTATIONS: [u32; 4] = [9, 13, 17, 21];
const MERGE_PRIMES: [u32; 4] = [PRIME1, PRIME2, PRIME3, PRIME4];

/// Merge `partials` (in chunk order) into `state`.
pub fn merge_states(state: State, partials: &[State]) -> State {
    let mut out = state;
    let lanes = out.words_mut();
    for partial in partials {
        let lane_params = MERGE_ROTATIONS.into_iter().zip(MERGE_PRIMES);
        for ((v, p), (rot, prime)) in lanes.iter_mut().zip(partial.words()).zip(lane_params) {
            *v = (*v ^ p).rotate_left(rot).wrapping_mul(prime);
        }
    }
    out.cross_mix();
    out
}
