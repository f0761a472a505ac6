//! Packaging options

use std::num::NonZeroUsize;
use std::thread;

/// Tunables for a packaging run.
///
/// None of these affect the archive bytes; they only change how the work is
/// scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackOptions {
    /// Upper bound on concurrent file reads
    pub max_workers: usize,
}

impl PackOptions {
    /// Options with the default worker count.
    pub fn new() -> Self {
        Self {
            max_workers: default_workers(),
        }
    }

    /// Set the worker bound. Zero is treated as one.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Worker threads to spawn for `tasks` files.
    pub fn workers_for(&self, tasks: usize) -> usize {
        self.max_workers.max(1).min(tasks.max(1))
    }
}

impl Default for PackOptions {
    fn default() -> Self {
        Self::new()
    }
}

fn default_workers() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
