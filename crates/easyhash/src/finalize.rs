// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Finalizer: padding, length folding, avalanche, serialization.

use crate::constants::{BLOCK_SIZE, DIGEST_LEN, PRIME2, PRIME3};
use crate::mixer::mix_blocks;
use crate::state::{Digest, State};

/// Number of pad bytes needed to bring `remainder_len` up to a block multiple.
///
/// Zero when already aligned. Each pad byte carries this count as its value.
#[inline]
pub const fn padding_len(remainder_len: usize) -> usize {
    (BLOCK_SIZE - remainder_len % BLOCK_SIZE) % BLOCK_SIZE
}

/// Pad `remainder` in place. The result is a positive multiple of
/// [`BLOCK_SIZE`] whenever `remainder` was non-empty.
pub(crate) fn pad_remainder(remainder: &mut Vec<u8>) {
    let pad = padding_len(remainder.len());
    // pad < BLOCK_SIZE, so it always fits in a byte.
    let pad_byte = u8::try_from(pad).unwrap_or(u8::MAX);
    remainder.resize(remainder.len() + pad, pad_byte);
}

/// Avalanche one word: `w ^= w>>15; w *= P2; w ^= w>>13; w *= P3; w ^= w>>16`.
#[inline]
pub const fn avalanche(mut w: u32) -> u32 {
    w ^= w >> 15;
    w = w.wrapping_mul(PRIME2);
    w ^= w >> 13;
    w = w.wrapping_mul(PRIME3);
    w ^= w >> 16;
    w
}

/// Produce the digest for `state` with pending `remainder` after
/// `total_len` bytes.
///
/// Takes everything by value or shared reference: the caller's engine is
/// never touched.
#[allow(clippy::cast_possible_truncation)] // low/high halves of the length
pub fn finalize(state: State, remainder: &[u8], total_len: u64) -> Digest {
    let mut state = state;
    if !remainder.is_empty() {
        let mut padded = remainder.to_vec();
        pad_remainder(&mut padded);
        debug_assert!(!padded.is_empty() && padded.len() % BLOCK_SIZE == 0);
        state = mix_blocks(state, &padded);
    }

    let words = state.words_mut();
    words[0] ^= total_len as u32;
    words[1] ^= (total_len >> 32) as u32;

    let mut out = [0u8; DIGEST_LEN];
    for (dst, w) in out.chunks_exact_mut(4).zip(state.words()) {
        dst.copy_from_slice(&avalanche(w).to_le_bytes());
    }
    Digest(out)
}
