//! # SplitSort Configuration
//!
//! The engine threads a single configuration record through every phase
//! instead of reading process-wide globals. Paths, worker count, sample
//! count, partition count, and the arena growth factor all live here;
//! [`constants`] holds the fixed layout values they build on.
//!
//! ## Module Organization
//!
//! - [`constants`]: layout and tuning constants with compile-time assertions
//! - [`SortConfig`]: parameters for one sort run
//! - [`GenerateConfig`]: parameters for populating the unsorted record file

pub mod constants;
pub use constants::*;

use std::path::{Path, PathBuf};
use std::thread;

use eyre::{ensure, Result};

/// Parameters for one sort run.
///
/// `num_threads` defaults to the hardware concurrency; everything else
/// defaults to the fixed fsdax layout the tool was built for. Tests point
/// `input_path`/`arena_dir` at a scratch directory instead.
#[derive(Debug, Clone)]
pub struct SortConfig {
    /// Flat record file produced by the generator.
    pub input_path: PathBuf,
    /// Directory that receives the per-partition node arenas.
    pub arena_dir: PathBuf,
    /// Arena files are named `<arena_prefix>_<partition>_<ordinal>`.
    pub arena_prefix: String,
    /// Worker count for every parallel phase.
    pub num_threads: usize,
    /// Systematic sample count; must satisfy
    /// `num_partitions <= num_samples <= record count`.
    pub num_samples: usize,
    /// Number of key-range partitions, each backed by one search tree.
    pub num_partitions: usize,
    /// Arena headroom over the expected per-partition record count.
    pub growth_factor: f64,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            input_path: Path::new(DEFAULT_NVM_DIR).join(UNSORTED_FILE_NAME),
            arena_dir: PathBuf::from(DEFAULT_NVM_DIR),
            arena_prefix: DEFAULT_ARENA_PREFIX.to_string(),
            num_threads: default_thread_count(),
            num_samples: 10_000,
            num_partitions: 64,
            growth_factor: ARENA_GROWTH_FACTOR,
        }
    }
}

impl SortConfig {
    /// Checks the parameter relationships the engine relies on.
    ///
    /// Sampling needs a step of at least one record, every partition needs
    /// at least one sample to define its lower bound, and the phase fan-out
    /// needs at least one worker.
    pub fn validate(&self, num_records: usize) -> Result<()> {
        ensure!(num_records >= 1, "nothing to sort: record count is zero");
        ensure!(self.num_threads >= 1, "worker count must be at least 1");
        ensure!(
            self.num_partitions >= 1,
            "partition count must be at least 1"
        );
        ensure!(
            self.num_samples >= self.num_partitions,
            "sample count {} must be >= partition count {}",
            self.num_samples,
            self.num_partitions
        );
        ensure!(
            self.num_samples <= num_records,
            "sample count {} must be <= record count {}",
            self.num_samples,
            num_records
        );
        ensure!(
            self.growth_factor >= 1.0,
            "arena growth factor {} must be >= 1.0",
            self.growth_factor
        );
        Ok(())
    }

    /// Path of the arena file for one partition's n-th allocation.
    pub fn arena_path(&self, partition: usize, ordinal: usize) -> PathBuf {
        self.arena_dir
            .join(format!("{}_{}_{}", self.arena_prefix, partition, ordinal))
    }

    /// Arena capacity in nodes for the given total record count.
    ///
    /// The expected per-partition share times the growth factor, rounded up
    /// and never below one node (a seeded root must always fit).
    pub fn nodes_per_arena(&self, num_records: usize) -> u64 {
        let expected = (num_records / self.num_partitions) as f64;
        ((expected * self.growth_factor).ceil() as u64).max(1)
    }
}

/// Parameters for populating the unsorted record file.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Destination record file; created or overwritten in place.
    pub output_path: PathBuf,
    /// Number of records to generate. Keys form a permutation of
    /// `[0, num_keys)`.
    pub num_keys: usize,
    /// Seed for the permutation shuffle.
    pub seed: u64,
    /// Worker count for the parallel fill.
    pub num_threads: usize,
}

impl GenerateConfig {
    pub fn new(num_keys: usize, seed: u64) -> Self {
        Self {
            output_path: Path::new(DEFAULT_NVM_DIR).join(UNSORTED_FILE_NAME),
            num_keys,
            seed,
            num_threads: default_thread_count(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.num_keys >= 1, "key count must be at least 1");
        ensure!(self.num_threads >= 1, "worker count must be at least 1");
        Ok(())
    }
}

/// Hardware concurrency, falling back to one worker when it is unknown.
pub fn default_thread_count() -> usize {
    thread::available_parallelism().map_or(1, |n| n.get())
}
