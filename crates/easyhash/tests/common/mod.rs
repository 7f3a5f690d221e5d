// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]

use easyhash::{ChunkExecutor, HashError, HasherConfig, State};

/// `len` bytes of `i % 251`, so no two nearby blocks repeat.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| u8::try_from(i % 251).unwrap_or(0))
        .collect()
}

/// 16 full blocks plus a 10-byte tail.
pub fn fixture() -> Vec<u8> {
    pattern(64 * 16 + 10)
}

/// Parallel config small enough for fixtures to reach the fan-out.
pub fn small_parallel(max_workers: usize) -> HasherConfig {
    HasherConfig::default()
        .with_chunk_size(256)
        .with_min_size_for_parallel(512)
        .with_max_workers(max_workers)
}

pub const FIXTURE_SEQUENTIAL: &str = "254d420467ffdd7a0eaf1c6ba0d57743";
pub const FIXTURE_CHUNK256_W4: &str = "b842380e587fc73927851b4a467f0f9f";
pub const FIXTURE_CHUNK256_W2: &str = "3c1b2df80c27cc1f705e27b7d106d2bd";

/// Executor whose every batch fails at chunk 0.
pub struct FailingExecutor;

impl ChunkExecutor for FailingExecutor {
    fn execute(&self, _chunks: &[&[u8]]) -> Result<Vec<State>, HashError> {
        Err(HashError::ChunkTaskFailed { index: 0 })
    }
}

/// Executor that behaves like a pool that could not be built.
pub struct UnavailableExecutor;

impl ChunkExecutor for UnavailableExecutor {
    fn execute(&self, _chunks: &[&[u8]]) -> Result<Vec<State>, HashError> {
        Err(HashError::PoolUnavailable("no threads for you".into()))
    }
}

/// Executor that drops the last partial state.
pub struct ShortExecutor;

impl ChunkExecutor for ShortExecutor {
    fn execute(&self, chunks: &[&[u8]]) -> Result<Vec<State>, HashError> {
        let mut partials: Vec<State> = chunks.iter().map(|c| easyhash::chunk::hash_chunk(c)).collect();
        partials.pop();
        Ok(partials)
    }
}
