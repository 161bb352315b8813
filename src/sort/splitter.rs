//! # Splitter Construction and Partition Seeding
//!
//! Three steps turn the raw samples into a bank of seeded partitions:
//!
//! 1. Sort the samples by key.
//! 2. Assign each partition a contiguous range of the sorted samples, as
//!    balanced as integer division allows: with `q = samples / partitions`
//!    and `r = samples % partitions`, the first `r` partitions take `q + 1`
//!    samples and the rest take `q`.
//! 3. In parallel, seed each partition: its lower bound is its range's
//!    first sample key, and its tree root is the range's low-biased median
//!    sample, persisted into a fresh arena sized for the expected share of
//!    the input.
//!
//! The low-biased median (`(begin + end - 1) / 2`) makes the first split of
//! an even-sized range lean left; that mild imbalance is accepted.

use std::ops::Range;
use std::thread;

use eyre::Result;

use crate::config::SortConfig;
use crate::records::KeyPtrPair;
use crate::sort::chunk_ranges;
use crate::tree::Partition;

/// Assigns sorted-sample ranges to partitions with the exact `q`/`r`
/// offsets described above. Every range is non-empty because the driver
/// validates `num_samples >= num_partitions`.
pub(crate) fn sample_ranges(num_samples: usize, num_partitions: usize) -> Vec<Range<usize>> {
    let q = num_samples / num_partitions;
    let r = num_samples % num_partitions;

    (0..num_partitions)
        .map(|i| {
            if i < r {
                let begin = i * (q + 1);
                begin..begin + q + 1
            } else {
                let begin = r * (q + 1) + (i - r) * q;
                begin..begin + q
            }
        })
        .collect()
}

/// Sorts the samples, then seeds all partitions in parallel.
///
/// Returns the partitions in ascending key-range order; their `min_key`s
/// are non-decreasing by construction (sorted samples, contiguous ranges).
pub fn build_partitions<'s>(
    samples: &mut [KeyPtrPair<'s>],
    num_records: usize,
    cfg: &SortConfig,
) -> Result<Vec<Partition>> {
    samples.sort_unstable_by_key(|pair| pair.key);

    let nodes_per_arena = cfg.nodes_per_arena(num_records);
    let ranges = sample_ranges(samples.len(), cfg.num_partitions);
    let sorted: &[KeyPtrPair<'s>] = samples;
    let ranges_ref = &ranges;

    let seeded: Result<Vec<Vec<Partition>>> = thread::scope(|s| {
        let handles: Vec<_> = chunk_ranges(cfg.num_partitions, cfg.num_threads)
            .into_iter()
            .map(|indices| {
                s.spawn(move || -> Result<Vec<Partition>> {
                    indices
                        .map(|i| {
                            let range = &ranges_ref[i];
                            let min_key = sorted[range.start].key;
                            let middle = sorted[(range.start + range.end - 1) / 2];
                            Partition::seed(i, min_key, middle, nodes_per_arena, cfg)
                        })
                        .collect()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().expect("partition seeding worker panicked"))
            .collect()
    });

    Ok(seeded?.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Record, RecordFile};
    use tempfile::{tempdir, TempDir};

    #[test]
    fn test_even_range_assignment() {
        let ranges = sample_ranges(8, 4);
        assert_eq!(ranges, vec![0..2, 2..4, 4..6, 6..8]);
    }

    #[test]
    fn test_remainder_goes_to_leading_partitions() {
        // q = 2, r = 2: the first two partitions take three samples.
        let ranges = sample_ranges(10, 4);
        assert_eq!(ranges, vec![0..3, 3..6, 6..8, 8..10]);
    }

    #[test]
    fn test_one_sample_per_partition() {
        let ranges = sample_ranges(4, 4);
        assert_eq!(ranges, vec![0..1, 1..2, 2..3, 3..4]);
    }

    #[test]
    fn test_single_partition_takes_all_samples() {
        assert_eq!(sample_ranges(7, 1), vec![0..7]);
    }

    fn scratch(dir: &TempDir, partitions: usize, samples: usize) -> SortConfig {
        SortConfig {
            input_path: dir.path().join("records"),
            arena_dir: dir.path().to_path_buf(),
            num_partitions: partitions,
            num_samples: samples,
            num_threads: 2,
            ..SortConfig::default()
        }
    }

    fn record_file(dir: &TempDir, keys: &[u64]) -> RecordFile {
        let mut file = RecordFile::map(dir.path().join("records"), keys.len()).unwrap();
        for (slot, &key) in file.records_mut().unwrap().iter_mut().zip(keys) {
            *slot = Record::with_key(key);
        }
        file
    }

    #[test]
    fn test_seeded_partitions_have_ascending_bounds_and_median_roots() {
        let dir = tempdir().unwrap();
        let keys = [7, 3, 5, 1, 4, 6, 2, 0];
        let cfg = scratch(&dir, 2, 4);
        let file = record_file(&dir, &keys);
        let records = file.records().unwrap();

        // Samples at stride 2: keys 7, 5, 4, 2 -> sorted 2, 4, 5, 7.
        let mut samples: Vec<KeyPtrPair> = [0usize, 2, 4, 6]
            .iter()
            .map(|&i| KeyPtrPair {
                key: records[i].key,
                record: &records[i],
            })
            .collect();

        let partitions = build_partitions(&mut samples, keys.len(), &cfg).unwrap();
        assert_eq!(partitions.len(), 2);

        // Range [2, 4] seeds partition 0: bound 2, low-biased median 2.
        assert_eq!(partitions[0].min_key(), 2);
        let (root0, len0) = partitions[0].root_and_len();
        assert_eq!(len0, 1);
        let root0 = unsafe { &*(root0 as *const crate::tree::BstNode) };
        assert_eq!(root0.key, 2);

        // Range [5, 7] seeds partition 1: bound 5, median 5.
        assert_eq!(partitions[1].min_key(), 5);
        let (root1, _) = partitions[1].root_and_len();
        let root1 = unsafe { &*(root1 as *const crate::tree::BstNode) };
        assert_eq!(root1.key, 5);
    }

    #[test]
    fn test_seed_arena_files_exist_per_partition() {
        let dir = tempdir().unwrap();
        let keys: Vec<u64> = (0..16).rev().collect();
        let cfg = scratch(&dir, 4, 8);
        let file = record_file(&dir, &keys);
        let records = file.records().unwrap();

        let mut samples: Vec<KeyPtrPair> = records
            .iter()
            .step_by(2)
            .map(|r| KeyPtrPair { key: r.key, record: r })
            .collect();

        let partitions = build_partitions(&mut samples, keys.len(), &cfg).unwrap();
        assert_eq!(partitions.len(), 4);
        for i in 0..4 {
            assert!(cfg.arena_path(i, 0).exists(), "partition {}", i);
        }
    }
}
