// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Chunk Hasher and chunk partitioning for the parallel path.
//!
//! # Partition rule
//!
//! ```text
//! chunk_count = min(max_workers, max(1, data_len / chunk_size), data_len / 64)
//! piece       = floor(data_len / chunk_count / 64) * 64
//! chunk i     = [i * piece, min((i + 1) * piece, data_len))
//! ```
//!
//! Chunks are cut at a fixed `piece` stride, so whatever the rounding leaves
//! over becomes extra chunks of its own: a batch may yield more than
//! `chunk_count` chunks. The partition is a pure function of
//! `(data_len, chunk_size, max_workers)`: it never depends on which executor
//! runs the chunks or on how many threads that executor owns.

use std::ops::Range;

use crate::constants::BLOCK_SIZE;
use crate::mixer::mix_blocks;
use crate::state::State;

/// Hash one block-aligned span starting from the initialization vector.
///
/// Reads nothing but `chunk`, so any number of invocations may run
/// concurrently. A trailing partial block, if any, is ignored.
#[inline]
pub fn hash_chunk(chunk: &[u8]) -> State {
    debug_assert_eq!(chunk.len() % BLOCK_SIZE, 0, "chunk must be block-aligned");
    mix_blocks(State::IV, chunk)
}

/// Target chunk count for a batch of `data_len` bytes.
///
/// Sets the stride in [`plan_chunks`] and decides whether a batch fans out
/// at all (it must exceed 1). Returns 0 when `data_len` holds no complete
/// block.
pub fn chunk_count(data_len: usize, chunk_size: usize, max_workers: usize) -> usize {
    let by_size = data_len.checked_div(chunk_size).unwrap_or(0).max(1);
    max_workers.min(by_size).min(data_len / BLOCK_SIZE)
}

/// Contiguous, ordered chunk ranges covering `0..data_len`.
///
/// Every range but the last is exactly one stride long; the last is shorter
/// when the stride does not divide `data_len`, and block-aligned iff
/// `data_len` is. Empty when `data_len` holds no complete block.
pub fn plan_chunks(data_len: usize, chunk_size: usize, max_workers: usize) -> Vec<Range<usize>> {
    let count = chunk_count(data_len, chunk_size, max_workers);
    if count == 0 {
        return Vec::new();
    }
    // count <= data_len / BLOCK_SIZE, so piece >= BLOCK_SIZE.
    let piece = data_len / count / BLOCK_SIZE * BLOCK_SIZE;
    (0..data_len)
        .step_by(piece)
        .map(|start| start..(start + piece).min(data_len))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::mix_block;

    #[test]
    fn chunk_starts_from_iv_not_caller_state() {
        let data = [7u8; 2 * BLOCK_SIZE];
        let expected = mix_block(mix_block(State::IV, &[7u8; BLOCK_SIZE]), &[7u8; BLOCK_SIZE]);
        assert_eq!(hash_chunk(&data), expected);
        assert_eq!(hash_chunk(&[]), State::IV);
    }

    #[test]
    fn count_respects_workers_size_and_blocks() {
        // 1024 bytes, 256-byte target: four by size, capped by workers.
        assert_eq!(chunk_count(1024, 256, 8), 4);
        assert_eq!(chunk_count(1024, 256, 2), 2);
        // Below one target chunk still yields one chunk.
        assert_eq!(chunk_count(100, 256, 8), 1);
        // Never more chunks than blocks.
        assert_eq!(chunk_count(128, 64, 8), 2);
        assert_eq!(chunk_count(63, 64, 8), 0);
    }

    #[test]
    fn plan_even_split() {
        let plan = plan_chunks(1024, 256, 4);
        assert_eq!(plan, vec![0..256, 256..512, 512..768, 768..1024]);
    }

    #[test]
    fn plan_rounding_leftover_is_its_own_chunk() {
        // 704 bytes / 2 chunks = 352 -> 320-byte stride; 64 bytes left over.
        let plan = plan_chunks(704, 256, 4);
        assert_eq!(plan, vec![0..320, 320..640, 640..704]);
        // 1024 / 3 = 341 -> 320-byte stride; a fourth chunk of 64 bytes.
        let plan = plan_chunks(1024, 256, 3);
        assert_eq!(plan, vec![0..320, 320..640, 640..960, 960..1024]);
        // 5 blocks / 3 chunks -> 1-block stride; five chunks in total.
        assert_eq!(plan_chunks(320, 64, 3).len(), 5);
    }

    #[test]
    fn plan_aligned_total_gives_aligned_chunks() {
        for len in (1..=40).map(|blocks| blocks * BLOCK_SIZE) {
            for workers in 1..=9 {
                let plan = plan_chunks(len, 128, workers);
                let count = chunk_count(len, 128, workers);
                assert!(plan.len() >= count);
                assert!(plan.iter().all(|r| r.len() % BLOCK_SIZE == 0));
                let stride = plan[0].len();
                assert!(plan[..plan.len() - 1].iter().all(|r| r.len() == stride));
            }
        }
    }

    #[test]
    fn plan_unaligned_total_leaves_only_last_unaligned() {
        let plan = plan_chunks(1000, 256, 8);
        assert_eq!(plan, vec![0..320, 320..640, 640..960, 960..1000]);
    }

    #[test]
    fn plan_is_contiguous() {
        for len in [64usize, 65, 640, 4096, 10_000, 1 << 20] {
            for workers in 1..=9 {
                let plan = plan_chunks(len, 512, workers);
                let mut cursor = 0;
                for r in &plan {
                    assert_eq!(r.start, cursor);
                    assert!(!r.is_empty());
                    cursor = r.end;
                }
                assert_eq!(cursor, len, "len={len} workers={workers}");
            }
        }
    }

    #[test]
    fn plan_empty_without_a_block() {
        assert!(plan_chunks(0, 64, 4).is_empty());
        assert!(plan_chunks(63, 64, 4).is_empty());
    }
}
