// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Streaming Engine.
//!
//! Holds the running [`State`], the pending sub-block remainder, and the total
//! byte count. Each [`Hasher::update`] drains complete blocks either through
//! the Mixer (sequential path) or through chunked fan-out plus the State
//! Merger (parallel path).
//!
//! # Path selection
//!
//! ```text
//! pending = buffer ++ data
//! if !parallel || pending.len() < min_size_for_parallel -> sequential
//! else
//!     batch = pending[..floor(len / 64) * 64]
//!     if batch.len() < min_size_for_parallel or chunk_count <= 1 -> sequential
//!     else -> hash chunks from IV, merge partials in chunk order
//! ```
//!
//! # Single writer
//!
//! `update` takes `&mut self`; `digest` takes `&self` and works on a clone.
//! Concurrent use of one `Hasher` is ruled out by the borrow checker.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::chunk::{chunk_count, plan_chunks};
use crate::config::HasherConfig;
use crate::constants::BLOCK_SIZE;
use crate::error::HashError;
use crate::exec::{ChunkExecutor, PoolExecutor};
use crate::finalize::finalize;
use crate::merge::merge_states;
use crate::mixer::{mix_block, mix_blocks};
use crate::state::{Digest, State};

#[derive(Clone)]
enum ExecutorSlot {
    /// Process-wide pool not yet acquired by this engine.
    Unacquired,
    /// Handle on the process-wide pool.
    Pooled(Arc<PoolExecutor>),
    /// Caller-supplied executor; never replaced by the engine.
    Custom(Arc<dyn ChunkExecutor>),
}

/// Incremental 128-bit hasher.
///
/// `Clone` is the deep copy: state, pending bytes, and counter are
/// duplicated; the executor handle is shared.
#[derive(Clone)]
pub struct Hasher {
    state: State,
    buffer: Vec<u8>,
    total_len: u64,
    config: HasherConfig,
    executor: ExecutorSlot,
}

impl Hasher {
    /// Hasher with the default configuration.
    pub fn new() -> Self {
        Self::from_valid_config(HasherConfig::default())
    }

    /// Hasher with `config`, rejected if out of range.
    pub fn with_config(config: HasherConfig) -> Result<Self, HashError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    /// Hasher with `config` that has already absorbed `data`.
    pub fn with_data(config: HasherConfig, data: impl AsRef<[u8]>) -> Result<Self, HashError> {
        let mut hasher = Self::with_config(config)?;
        hasher.update(data.as_ref())?;
        Ok(hasher)
    }

    fn from_valid_config(config: HasherConfig) -> Self {
        Self {
            state: State::IV,
            buffer: Vec::with_capacity(BLOCK_SIZE),
            total_len: 0,
            config,
            executor: ExecutorSlot::Unacquired,
        }
    }

    /// Run parallel batches on `executor` instead of the process-wide pool.
    pub fn with_executor(mut self, executor: Arc<dyn ChunkExecutor>) -> Self {
        self.executor = ExecutorSlot::Custom(executor);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &HasherConfig {
        &self.config
    }

    /// Enable or disable the parallel path for subsequent updates.
    ///
    /// Disabling it is the retry route after [`HashError::PoolUnavailable`].
    pub fn set_parallel(&mut self, parallel: bool) {
        self.config.parallel = parallel;
    }

    /// Total bytes absorbed so far.
    pub fn len(&self) -> u64 {
        self.total_len
    }

    /// Whether no bytes have been absorbed.
    pub fn is_empty(&self) -> bool {
        self.total_len == 0
    }

    /// Bytes waiting for a complete block (always `< 64` between calls).
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Absorb `data`.
    ///
    /// On error nothing changes: state, pending bytes and byte count are as
    /// they were before the call.
    pub fn update(&mut self, data: &[u8]) -> Result<(), HashError> {
        if data.is_empty() {
            return Ok(());
        }
        let pending_len = self.buffer.len() + data.len();
        if self.config.parallel && pending_len >= self.config.min_size_for_parallel {
            self.absorb_parallel(data)?;
            self.total_len = self.total_len.wrapping_add(data.len() as u64);
        } else {
            self.absorb(data);
        }
        debug_assert!(self.buffer.len() < BLOCK_SIZE);
        Ok(())
    }

    /// Sequential-only hasher for the one-shot helpers.
    pub(crate) fn from_sequential() -> Self {
        Self::from_valid_config(HasherConfig::sequential())
    }

    /// Append through the sequential block loop. Cannot fail.
    pub(crate) fn absorb(&mut self, data: &[u8]) {
        self.absorb_sequential(data);
        self.total_len = self.total_len.wrapping_add(data.len() as u64);
    }

    fn absorb_sequential(&mut self, mut data: &[u8]) {
        if !self.buffer.is_empty() {
            let take = (BLOCK_SIZE - self.buffer.len()).min(data.len());
            self.buffer.extend_from_slice(&data[..take]);
            data = &data[take..];
            let Ok(block) = <&[u8; BLOCK_SIZE]>::try_from(self.buffer.as_slice()) else {
                // Still short of a block: everything fit in the buffer.
                return;
            };
            self.state = mix_block(self.state, block);
            self.buffer.clear();
        }
        let complete = data.len() / BLOCK_SIZE * BLOCK_SIZE;
        self.state = mix_blocks(self.state, &data[..complete]);
        self.buffer.extend_from_slice(&data[complete..]);
    }

    fn absorb_parallel(&mut self, data: &[u8]) -> Result<(), HashError> {
        let pending: Cow<'_, [u8]> = if self.buffer.is_empty() {
            Cow::Borrowed(data)
        } else {
            let mut joined = Vec::with_capacity(self.buffer.len() + data.len());
            joined.extend_from_slice(&self.buffer);
            joined.extend_from_slice(data);
            Cow::Owned(joined)
        };
        let complete = pending.len() / BLOCK_SIZE * BLOCK_SIZE;
        let (batch, remainder) = pending.split_at(complete);

        let state = self.process_batch(batch)?;

        self.state = state;
        self.buffer.clear();
        self.buffer.extend_from_slice(remainder);
        Ok(())
    }

    /// Compute the state after `batch` (block-aligned) without committing it.
    fn process_batch(&mut self, batch: &[u8]) -> Result<State, HashError> {
        if batch.len() < self.config.min_size_for_parallel {
            debug!(bytes = batch.len(), "aligned batch below parallel threshold");
            return Ok(mix_blocks(self.state, batch));
        }
        let (chunk_size, max_workers) = (self.config.chunk_size, self.config.max_workers);
        if chunk_count(batch.len(), chunk_size, max_workers) <= 1 {
            debug!(bytes = batch.len(), "single chunk, mixing sequentially");
            return Ok(mix_blocks(self.state, batch));
        }
        debug_assert_eq!(batch.len() % BLOCK_SIZE, 0);
        let dispatch: Vec<&[u8]> = plan_chunks(batch.len(), chunk_size, max_workers)
            .into_iter()
            .map(|range| &batch[range])
            .collect();

        let executor = self.executor()?;
        debug!(chunks = dispatch.len(), bytes = batch.len(), "dispatching parallel batch");
        let partials = executor.execute(&dispatch).inspect_err(|err| {
            warn!(%err, chunks = dispatch.len(), "parallel batch failed; hasher unchanged");
        })?;
        if partials.len() != dispatch.len() {
            return Err(HashError::ChunkTaskFailed {
                index: partials.len(),
            });
        }
        Ok(merge_states(self.state, &partials))
    }

    fn executor(&mut self) -> Result<Arc<dyn ChunkExecutor>, HashError> {
        match &self.executor {
            ExecutorSlot::Pooled(pooled) => Ok(Arc::clone(pooled) as Arc<dyn ChunkExecutor>),
            ExecutorSlot::Custom(custom) => Ok(Arc::clone(custom)),
            ExecutorSlot::Unacquired => {
                let pooled = Arc::new(PoolExecutor::acquire(self.config.max_workers)?);
                debug!(threads = pooled.threads(), "hasher acquired worker pool");
                self.executor = ExecutorSlot::Pooled(Arc::clone(&pooled));
                Ok(pooled)
            }
        }
    }

    /// Digest of everything absorbed so far. Does not modify `self`.
    pub fn digest(&self) -> Digest {
        self.clone().finish()
    }

    /// Lowercase hex of [`Hasher::digest`], 32 characters.
    pub fn hex_digest(&self) -> String {
        self.digest().to_hex()
    }

    /// Consume the hasher and produce its digest.
    pub fn finish(self) -> Digest {
        finalize(self.state, &self.buffer, self.total_len)
    }

    /// Return to the initial state, keeping configuration and executor.
    pub fn reset(&mut self) {
        self.state = State::IV;
        self.buffer.clear();
        self.total_len = 0;
    }

    /// Drop this hasher's handle on the process-wide pool.
    ///
    /// A later parallel batch re-acquires it. Custom executors are kept.
    pub fn shutdown(&mut self) {
        if matches!(self.executor, ExecutorSlot::Pooled(_)) {
            debug!("hasher released worker pool handle");
            self.executor = ExecutorSlot::Unacquired;
        }
    }

    /// Whether this hasher currently holds an executor handle.
    pub fn holds_executor(&self) -> bool {
        !matches!(self.executor, ExecutorSlot::Unacquired)
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Hasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hasher")
            .field("state", &self.state)
            .field("buffered", &self.buffer.len())
            .field("total_len", &self.total_len)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl std::io::Write for Hasher {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::exec::SequentialExecutor;

    fn small_parallel() -> HasherConfig {
        HasherConfig::default()
            .with_chunk_size(256)
            .with_min_size_for_parallel(512)
            .with_max_workers(4)
    }

    #[test]
    fn fresh_hasher_invariants() {
        let h = Hasher::new();
        assert!(h.is_empty());
        assert_eq!(h.buffered(), 0);
        assert!(!h.holds_executor());
        assert_eq!(h.hex_digest(), "6fccf8e8744f39fdc19ef46f49b8d42c");
    }

    #[test]
    fn buffer_stays_below_one_block() {
        let mut h = Hasher::with_config(HasherConfig::sequential()).unwrap();
        for n in [1usize, 63, 64, 65, 127, 200, 1] {
            h.update(&vec![0x5A; n]).unwrap();
            assert!(h.buffered() < BLOCK_SIZE);
        }
        assert_eq!(h.len(), 521);
        assert_eq!(h.buffered(), 521 % BLOCK_SIZE);
    }

    #[test]
    fn digest_does_not_mutate() {
        let mut h = Hasher::with_config(HasherConfig::sequential()).unwrap();
        h.update(b"hello").unwrap();
        let first = h.digest();
        assert_eq!(h.digest(), first);
        assert_eq!(h.len(), 5);
        assert_eq!(h.buffered(), 5);
        h.update(b" world!").unwrap();
        assert_eq!(h.hex_digest(), "376aaefb93a92c9edb413b90af53aadd");
    }

    #[test]
    fn clone_is_independent() {
        let mut a = Hasher::with_config(HasherConfig::sequential()).unwrap();
        a.update(b"shared prefix").unwrap();
        let mut b = a.clone();
        b.update(b" and more").unwrap();
        assert_ne!(a.digest(), b.digest());
        assert_eq!(a.len(), 13);
    }

    #[test]
    fn reset_returns_to_initial_digest() {
        let mut h = Hasher::with_config(HasherConfig::sequential()).unwrap();
        h.update(&[1u8; 300]).unwrap();
        h.reset();
        assert_eq!(h.digest(), Hasher::new().digest());
    }

    #[test]
    fn empty_update_is_noop() {
        let mut h = Hasher::new();
        h.update(&[]).unwrap();
        assert!(h.is_empty());
    }

    #[test]
    fn parallel_batch_golden() {
        let data: Vec<u8> = (0..64 * 16 + 10u32)
            .map(|i| u8::try_from(i % 251).unwrap())
            .collect();
        let mut h = Hasher::with_config(small_parallel())
            .unwrap()
            .with_executor(Arc::new(SequentialExecutor));
        h.update(&data).unwrap();
        assert_eq!(h.buffered(), 10);
        assert_eq!(h.hex_digest(), "b842380e587fc73927851b4a467f0f9f");
    }

    #[test]
    fn custom_executor_survives_shutdown() {
        let mut h = Hasher::new().with_executor(Arc::new(SequentialExecutor));
        h.shutdown();
        assert!(h.holds_executor());
    }

    #[test]
    fn write_impl_feeds_update() {
        use std::io::Write;
        let mut h = Hasher::with_config(HasherConfig::sequential()).unwrap();
        h.write_all(b"hello world!").unwrap();
        h.flush().unwrap();
        assert_eq!(h.hex_digest(), "376aaefb93a92c9edb413b90af53aadd");
    }
}
