// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Chunk executors: the task-submission seam of the parallel path.
//!
//! The engine only needs "run the Chunk Hasher over N independent spans and
//! hand back the results in span order". [`ChunkExecutor`] is that capability.
//!
//! # Ordering
//!
//! Tasks may finish in any order. Every executor writes each result into the
//! slot of its input index, so the returned `Vec` is always in chunk order,
//! which the order-sensitive State Merger depends on.
//!
//! # Failure
//!
//! A panicking task is caught and reported as
//! [`HashError::ChunkTaskFailed`] with the index of the first failed chunk.
//! No partial results are returned.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use rayon::ThreadPool;

use crate::chunk::hash_chunk;
use crate::error::HashError;
use crate::pool;
use crate::state::State;

/// Runs Chunk Hasher tasks and collects their partial states in input order.
pub trait ChunkExecutor: Send + Sync {
    /// Hash every span in `chunks`; `result[i]` belongs to `chunks[i]`.
    fn execute(&self, chunks: &[&[u8]]) -> Result<Vec<State>, HashError>;
}

fn run_task<F>(task: &F, index: usize, chunk: &[u8]) -> Result<State, HashError>
where
    F: Fn(&[u8]) -> State,
{
    catch_unwind(AssertUnwindSafe(|| task(chunk))).map_err(|_| HashError::ChunkTaskFailed { index })
}

/// Runs every task on the calling thread, in order.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialExecutor;

impl ChunkExecutor for SequentialExecutor {
    fn execute(&self, chunks: &[&[u8]]) -> Result<Vec<State>, HashError> {
        run_sequential(chunks, &hash_chunk)
    }
}

fn run_sequential<F>(chunks: &[&[u8]], task: &F) -> Result<Vec<State>, HashError>
where
    F: Fn(&[u8]) -> State,
{
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| run_task(task, i, chunk))
        .collect()
}

/// Spawns scoped threads per batch; workers claim chunks via an atomic
/// counter (work-stealing).
#[derive(Clone, Copy, Debug)]
pub struct ScopedThreadExecutor {
    workers: usize,
}

impl ScopedThreadExecutor {
    /// Executor with up to `workers` threads per batch (at least one).
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Thread count cap.
    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl ChunkExecutor for ScopedThreadExecutor {
    fn execute(&self, chunks: &[&[u8]]) -> Result<Vec<State>, HashError> {
        run_scoped(chunks, self.workers, &hash_chunk)
    }
}

fn run_scoped<F>(chunks: &[&[u8]], workers: usize, task: &F) -> Result<Vec<State>, HashError>
where
    F: Fn(&[u8]) -> State + Sync,
{
    // No point spawning more threads than there are chunks.
    let workers = workers.min(chunks.len());
    if workers <= 1 {
        return run_sequential(chunks, task);
    }

    let next = AtomicUsize::new(0);
    let per_worker: Vec<Vec<(usize, Result<State, HashError>)>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let next = &next;
                s.spawn(move || {
                    let mut done = Vec::new();
                    loop {
                        let i = next.fetch_add(1, Ordering::Relaxed);
                        let Some(chunk) = chunks.get(i) else {
                            break;
                        };
                        done.push((i, run_task(task, i, chunk)));
                    }
                    done
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(done) => done,
                Err(e) => std::panic::resume_unwind(e),
            })
            .collect()
    });

    let mut slots: Vec<Option<State>> = vec![None; chunks.len()];
    let mut first_failure: Option<usize> = None;
    for (i, result) in per_worker.into_iter().flatten() {
        match result {
            Ok(state) => slots[i] = Some(state),
            Err(_) => first_failure = Some(first_failure.map_or(i, |f| f.min(i))),
        }
    }
    if let Some(index) = first_failure {
        return Err(HashError::ChunkTaskFailed { index });
    }
    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| slot.ok_or(HashError::ChunkTaskFailed { index }))
        .collect()
}

/// Runs tasks on the process-wide `rayon` pool (see [`crate::pool`]).
#[derive(Clone, Debug)]
pub struct PoolExecutor {
    pool: Arc<ThreadPool>,
}

impl PoolExecutor {
    /// Executor backed by the process-wide pool, building it if needed.
    pub fn acquire(workers: usize) -> Result<Self, HashError> {
        Ok(Self {
            pool: pool::acquire(workers)?,
        })
    }

    /// Executor backed by a caller-owned pool.
    pub fn from_pool(pool: Arc<ThreadPool>) -> Self {
        Self { pool }
    }

    /// Worker threads in the backing pool.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl ChunkExecutor for PoolExecutor {
    fn execute(&self, chunks: &[&[u8]]) -> Result<Vec<State>, HashError> {
        run_pooled(&self.pool, chunks, &hash_chunk)
    }
}

fn run_pooled<F>(pool: &ThreadPool, chunks: &[&[u8]], task: &F) -> Result<Vec<State>, HashError>
where
    F: Fn(&[u8]) -> State + Sync,
{
    // Indexed parallel collect preserves input order.
    pool.install(|| {
        chunks
            .par_iter()
            .enumerate()
            .map(|(i, chunk)| run_task(task, i, chunk))
            .collect()
    })
}
