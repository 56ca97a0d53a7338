//! Shared worker pool for data-parallel frame stages.
//!
//! Every stage of the batch collector is a fork/join over contiguous ranges:
//! the calling thread dispatches the chunks, blocks until all of them have
//! completed and receives the per-chunk outputs in input order. There is no
//! cancellation, a dispatched stage always runs to completion.

use rayon::prelude::*;
use crate::error::{Error, Result};
use super::threaded_vector::ThreadedVector;

/// Work queue construction parameters.
#[derive(Debug, Clone)]
pub struct WorkQueueConfig {
    /// Number of worker threads. `None` uses the available parallelism.
    pub num_threads: Option<usize>,
    /// Prefix for worker thread names (`<prefix>-<index>`).
    pub thread_name: String,
}

impl Default for WorkQueueConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            thread_name: "galaxy3d-worker".to_string(),
        }
    }
}

/// Fixed-size worker pool backed by rayon.
pub struct WorkQueue {
    pool: rayon::ThreadPool,
    num_threads: usize,
}

impl WorkQueue {
    /// Create a worker pool.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `num_threads` is `Some(0)` and
    /// `InitializationFailed` if the threads cannot be spawned.
    pub fn new(config: &WorkQueueConfig) -> Result<Self> {
        let num_threads = match config.num_threads {
            Some(0) => {
                return Err(Error::InvalidConfiguration(
                    "WorkQueue needs at least one worker thread".to_string(),
                ));
            }
            Some(n) => n,
            None => std::thread::available_parallelism()
                .map(usize::from)
                .unwrap_or(1),
        };

        let name = config.thread_name.clone();
        let pool = rayon::ThreadPoolBuilder::new()
            .thread_name(move |i| format!("{}-{}", name, i))
            .num_threads(num_threads)
            .build()
            .map_err(|e| Error::InitializationFailed(format!("WorkQueue: {}", e)))?;

        Ok(Self { pool, num_threads })
    }

    /// Number of worker threads.
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Chunk length used to split `len` items with a minimum of
    /// `threshold` items per task.
    pub fn chunk_size(&self, len: usize, threshold: usize) -> usize {
        let per_thread = len.div_ceil(self.num_threads.max(1));
        per_thread.max(threshold).max(1)
    }

    /// Split `items` into contiguous chunks and run `f(chunk_index, offset, chunk)`
    /// for each of them in parallel.
    ///
    /// Outputs are returned in input order, so anything concatenated from
    /// them depends only on the input order, never on thread timing.
    /// Inputs smaller than one chunk run on the calling thread.
    pub fn for_each_parallel<T, R, F>(&self, threshold: usize, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, usize, &[T]) -> R + Sync,
    {
        if items.is_empty() {
            return Vec::new();
        }

        let chunk = self.chunk_size(items.len(), threshold);
        if items.len() <= chunk {
            return vec![f(0, 0, items)];
        }

        self.pool.install(|| {
            items
                .par_chunks(chunk)
                .enumerate()
                .map(|(index, slice)| f(index, index * chunk, slice))
                .collect()
        })
    }

    /// Mutable variant of `for_each_parallel`: `f(offset, chunk)` gets
    /// exclusive access to its range.
    pub fn for_each_parallel_mut<T, F>(&self, threshold: usize, items: &mut [T], f: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync,
    {
        if items.is_empty() {
            return;
        }

        let chunk = self.chunk_size(items.len(), threshold);
        if items.len() <= chunk {
            f(0, items);
            return;
        }

        self.pool.install(|| {
            items
                .par_chunks_mut(chunk)
                .enumerate()
                .for_each(|(index, slice)| f(index * chunk, slice));
        });
    }

    /// Run one task per item, each with exclusive access to its item.
    pub fn for_each_item_mut<T, F>(&self, items: &mut [T], f: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Sync,
    {
        match items.len() {
            0 => {}
            1 => f(0, &mut items[0]),
            _ => self.pool.install(|| {
                items.par_iter_mut().enumerate().for_each(|(i, item)| f(i, item));
            }),
        }
    }

    /// Run `f(segment_index, offset, segment)` for every segment of a
    /// `ThreadedVector`. Runs serially when the whole collection holds
    /// fewer than `threshold` items.
    pub fn for_each_segment<T, R, F>(&self, threshold: usize, items: &ThreadedVector<T>, f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, usize, &[T]) -> R + Sync,
    {
        let offsets = items.segment_offsets();
        if items.len() < threshold || items.num_segments() <= 1 {
            return items
                .segments()
                .enumerate()
                .map(|(i, segment)| f(i, offsets[i], segment))
                .collect();
        }

        let segments: Vec<&[T]> = items.segments().collect();
        self.pool.install(|| {
            segments
                .par_iter()
                .enumerate()
                .map(|(i, segment)| f(i, offsets[i], segment))
                .collect()
        })
    }
}

#[cfg(test)]
#[path = "work_queue_tests.rs"]
mod tests;
