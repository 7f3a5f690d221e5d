// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error type for hashing operations.
//!
//! Feeding non-byte input is rejected at compile time (`update` takes `&[u8]`,
//! the one-shot helpers take `impl AsRef<[u8]>`), so there is no runtime
//! variant for it.

use thiserror::Error;

/// Errors surfaced by the engine, the worker pool, and the I/O adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HashError {
    /// A configuration value is outside its accepted range.
    #[error("[EASYHASH_CONFIG] invalid `{field}`: {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable constraint that was violated.
        reason: &'static str,
    },
    /// The process-wide worker pool could not be created.
    ///
    /// The engine is unchanged; disabling the parallel path and retrying
    /// hashes the same bytes sequentially.
    #[error("[EASYHASH_POOL] worker pool unavailable: {0}")]
    PoolUnavailable(String),
    /// A dispatched chunk task failed. The owning `update` had no effect.
    #[error("[EASYHASH_CHUNK_TASK] chunk task {index} failed")]
    ChunkTaskFailed {
        /// Position of the failed chunk in the batch.
        index: usize,
    },
    /// A digest string was not 32 lowercase or uppercase hex characters.
    #[error("[EASYHASH_HEX] invalid digest hex: {0}")]
    InvalidHex(String),
    /// Reading input failed.
    #[error("[EASYHASH_IO] {0}")]
    Io(#[from] std::io::Error),
}

impl From<HashError> for std::io::Error {
    fn from(err: HashError) -> Self {
        match err {
            HashError::Io(inner) => inner,
            other => Self::other(other),
        }
    }
}
