// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Algorithm constants and configuration defaults.
//!
//! Everything in this module is part of the digest definition: changing any
//! constant changes every digest ever produced.

/// Size of one Mixer block in bytes.
pub const BLOCK_SIZE: usize = 64;

/// Size of a finished digest in bytes (128 bits).
pub const DIGEST_LEN: usize = 16;

/// Number of little-endian `u32` words in one block.
pub(crate) const WORDS_PER_BLOCK: usize = BLOCK_SIZE / 4;

/// First multiplicative constant (lane `a`).
pub const PRIME1: u32 = 0x9E3779B1;
/// Second multiplicative constant (lane `b`).
pub const PRIME2: u32 = 0x85EBCA77;
/// Third multiplicative constant (lane `c`).
pub const PRIME3: u32 = 0xC2B2AE3D;
/// Fourth multiplicative constant (lane `d`).
pub const PRIME4: u32 = 0x27D4EB2F;

/// Initialization vector: the state every engine and every chunk starts from.
pub const IV: [u32; 4] = [0x6A09E667, 0xBB67AE85, 0x3C6EF372, 0xA54FF53A];

/// Default target size of one parallel chunk (8 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Default buffered size at which the parallel path engages (16 MiB).
pub const DEFAULT_MIN_SIZE_FOR_PARALLEL: usize = 16 * 1024 * 1024;

/// Upper bound applied to the detected parallelism when picking a worker count.
pub const DEFAULT_MAX_WORKERS_CAP: usize = 8;

const _: () = assert!(BLOCK_SIZE % 4 == 0, "blocks must hold whole u32 words");
const _: () = assert!(DIGEST_LEN == 4 * 4, "digest is four u32 words");

/// Default worker count: `min(available_parallelism, 8)`, never below 1.
///
/// Falls back to a single worker when the platform cannot report its
/// parallelism.
pub fn default_max_workers() -> usize {
    std::thread::available_parallelism()
        .map_or(1, std::num::NonZeroUsize::get)
        .clamp(1, DEFAULT_MAX_WORKERS_CAP)
}
