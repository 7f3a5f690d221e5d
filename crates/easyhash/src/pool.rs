// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Process-wide worker pool.
//!
//! One `rayon` thread pool per process, built lazily by the first
//! [`acquire`] and shared by every engine. It carries no hashing state, only
//! scheduling. [`release`] drops the process-wide handle; engines still
//! holding a handle keep the threads alive until they drop it, and the next
//! [`acquire`] builds a fresh pool.
//!
//! The first caller's worker count sizes the pool. Later callers with a
//! different count share it; their batches are still split per their own
//! `max_workers`, so digests are unaffected.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::error::HashError;

static POOL: Mutex<Option<Arc<ThreadPool>>> = Mutex::new(None);

fn slot() -> MutexGuard<'static, Option<Arc<ThreadPool>>> {
    // Poison is ignored: the slot only ever holds a whole `Option<Arc<_>>`.
    POOL.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Get the process-wide pool, building it with `workers` threads if absent.
pub fn acquire(workers: usize) -> Result<Arc<ThreadPool>, HashError> {
    let mut slot = slot();
    if let Some(pool) = slot.as_ref() {
        return Ok(Arc::clone(pool));
    }
    let threads = workers.max(1);
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("easyhash-worker-{i}"))
        .build()
        .map_err(|e| HashError::PoolUnavailable(e.to_string()))?;
    debug!(threads, "built process-wide worker pool");
    let pool = Arc::new(pool);
    *slot = Some(Arc::clone(&pool));
    Ok(pool)
}

/// Drop the process-wide handle. Returns `true` if a pool was active.
pub fn release() -> bool {
    let released = slot().take().is_some();
    if released {
        debug!("released process-wide worker pool");
    }
    released
}

/// Whether a process-wide pool is currently held.
pub fn is_active() -> bool {
    slot().is_some()
}
