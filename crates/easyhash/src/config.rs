// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Engine configuration.
//!
//! With the `serde` feature, a partial JSON document overrides only the fields
//! it names; everything else keeps its default.

use crate::constants::{
    default_max_workers, BLOCK_SIZE, DEFAULT_CHUNK_SIZE, DEFAULT_MIN_SIZE_FOR_PARALLEL,
};
use crate::error::HashError;

/// Knobs controlling when and how the parallel path runs.
///
/// Changing any of these may change digests of inputs that reach the
/// parallel path (see the crate docs).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HasherConfig {
    /// Enable the chunked parallel path.
    pub parallel: bool,
    /// Target bytes per chunk.
    pub chunk_size: usize,
    /// Buffered bytes at which the parallel path engages.
    pub min_size_for_parallel: usize,
    /// Maximum number of chunks per batch.
    pub max_workers: usize,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
            min_size_for_parallel: DEFAULT_MIN_SIZE_FOR_PARALLEL,
            max_workers: default_max_workers(),
        }
    }
}

impl HasherConfig {
    /// Defaults with the parallel path disabled.
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    /// Set whether the parallel path may run.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the target chunk size in bytes.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the parallel-path threshold in bytes.
    pub fn with_min_size_for_parallel(mut self, min_size: usize) -> Self {
        self.min_size_for_parallel = min_size;
        self
    }

    /// Set the maximum chunk count per batch.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Check every field against its accepted range.
    pub fn validate(&self) -> Result<(), HashError> {
        if self.chunk_size < BLOCK_SIZE {
            return Err(HashError::InvalidConfig {
                field: "chunk_size",
                reason: "must be at least one 64-byte block",
            });
        }
        if self.min_size_for_parallel == 0 {
            return Err(HashError::InvalidConfig {
                field: "min_size_for_parallel",
                reason: "must be non-zero",
            });
        }
        if self.max_workers == 0 {
            return Err(HashError::InvalidConfig {
                field: "max_workers",
                reason: "must be non-zero",
            });
        }
        Ok(())
    }
}
