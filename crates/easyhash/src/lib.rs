// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! easyhash: non-cryptographic 128-bit streaming digest.
//!
//! Input is consumed in 64-byte blocks by a four-lane mixer over a 4×u32
//! state. Large buffers may instead be split into block-aligned chunks that are
//! hashed independently from the initialization vector and folded back into
//! the running state by an order-sensitive merge.
//!
//! ```
//! let mut h = easyhash::Hasher::new();
//! h.update(b"Hello").unwrap();
//! h.update(b" World").unwrap();
//! assert_eq!(h.digest(), easyhash::hash("Hello World"));
//! ```
//!
//! # Path dependence
//!
//! The parallel path does not reproduce the sequential digest. Once a buffer
//! reaches `min_size_for_parallel`, the digest depends on the
//! [`HasherConfig`] and on how the input was split across
//! [`Hasher::update`] calls. It does not depend on which [`ChunkExecutor`]
//! runs the chunks or on its thread count. [`hash`] and [`hash_hex`] always
//! use [`HasherConfig::sequential`], so their output is the same on every
//! machine.
//!
//! This is not a cryptographic hash.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::module_name_repetitions
)]

/// Chunk Hasher and parallel-batch partitioning.
pub mod chunk;
mod config;
/// Algorithm constants and configuration defaults.
pub mod constants;
mod engine;
mod error;
/// Task-submission seam for the parallel path.
pub mod exec;
/// Padding, length folding, and avalanche.
pub mod finalize;
/// `std::io` adapters.
pub mod io;
/// State Merger.
pub mod merge;
/// Block Mixer.
pub mod mixer;
/// Process-wide worker pool.
pub mod pool;
mod state;

pub use config::HasherConfig;
pub use constants::{BLOCK_SIZE, DIGEST_LEN};
pub use engine::Hasher;
pub use error::HashError;
pub use exec::{ChunkExecutor, PoolExecutor, ScopedThreadExecutor, SequentialExecutor};
pub use io::{hash_reader, HashingReader};
pub use state::{Digest, State};

/// One-shot digest of `data` on the sequential path.
///
/// Text hashes as its UTF-8 bytes: `hash("abc") == hash(b"abc")`.
pub fn hash(data: impl AsRef<[u8]>) -> Digest {
    let mut hasher = Hasher::from_sequential();
    hasher.absorb(data.as_ref());
    hasher.finish()
}

/// Lowercase hex of [`hash`], 32 characters.
pub fn hash_hex(data: impl AsRef<[u8]>) -> String {
    hash(data).to_hex()
}

/// One-shot digest of `data` under `config`.
///
/// With `config.parallel` and an input of at least
/// `config.min_size_for_parallel` bytes, the batch runs on the process-wide
/// pool.
pub fn hash_with(data: impl AsRef<[u8]>, config: HasherConfig) -> Result<Digest, HashError> {
    Ok(Hasher::with_data(config, data)?.finish())
}
