// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Block Mixer: folds one 64-byte block into a [`State`].
//!
//! # Lane schedule
//!
//! ```text
//! word i (LE u32) -> lane i mod 4
//!   lane a: rotl 7,  * PRIME1 then * PRIME2
//!   lane b: rotl 11, * PRIME2 then * PRIME3
//!   lane c: rotl 13, * PRIME3 then * PRIME4
//!   lane d: rotl 17, * PRIME4 then * PRIME1
//! lane = rotl((lane + word) * m1, k) * m2        (mod 2^32)
//! ```
//!
//! After all sixteen words, one cross-mixing pass `a^=d; b^=a; c^=b; d^=c`.

use crate::constants::{BLOCK_SIZE, PRIME1, PRIME2, PRIME3, PRIME4, WORDS_PER_BLOCK};
use crate::state::State;

#[derive(Clone, Copy)]
struct Lane {
    rot: u32,
    m1: u32,
    m2: u32,
}

const LANES: [Lane; 4] = [
    Lane {
        rot: 7,
        m1: PRIME1,
        m2: PRIME2,
    },
    Lane {
        rot: 11,
        m1: PRIME2,
        m2: PRIME3,
    },
    Lane {
        rot: 13,
        m1: PRIME3,
        m2: PRIME4,
    },
    Lane {
        rot: 17,
        m1: PRIME4,
        m2: PRIME1,
    },
];

/// Mix one block into `state` and return the new state.
///
/// Pure: no shared state, safe to call from any thread.
#[inline]
pub fn mix_block(state: State, block: &[u8; BLOCK_SIZE]) -> State {
    let mut out = state;
    let lanes = out.words_mut();
    let (words, _) = block.as_chunks::<4>();
    debug_assert_eq!(words.len(), WORDS_PER_BLOCK);
    for (i, bytes) in words.iter().enumerate() {
        let word = u32::from_le_bytes(*bytes);
        let lane = LANES[i & 3];
        let v = &mut lanes[i & 3];
        *v = v
            .wrapping_add(word)
            .wrapping_mul(lane.m1)
            .rotate_left(lane.rot)
            .wrapping_mul(lane.m2);
    }
    out.cross_mix();
    out
}

/// Sequential block loop: mix every complete block of `data`, in order.
///
/// Trailing bytes past the last 64-byte boundary are not consumed; callers
/// keep them as the pending remainder.
#[inline]
pub fn mix_blocks(state: State, data: &[u8]) -> State {
    let (blocks, _tail) = data.as_chunks::<BLOCK_SIZE>();
    blocks.iter().fold(state, mix_block)
}
