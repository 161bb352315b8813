//! # Systematic Parallel Sampling
//!
//! The sampler reads every `step`-th record (`step = records / samples`)
//! and emits its key plus its address. Systematic sampling keeps the
//! samples an ordered subsequence of the input and needs no randomness;
//! for the shuffled inputs this tool targets it estimates the key
//! distribution as well as a random sample would.
//!
//! Records past `(num_samples - 1) * step` are never sampled. They still
//! participate in the sort: sampling only picks splitters.

use std::thread;

use crate::records::{KeyPtrPair, Record};
use crate::sort::chunk_ranges;

/// Collects `num_samples` evenly spaced (key, record) pairs in parallel.
///
/// The caller guarantees `1 <= num_samples <= records.len()`, so the
/// stride is always at least one record.
pub fn systematic_sample<'a>(
    records: &'a [Record],
    num_samples: usize,
    num_threads: usize,
) -> Vec<KeyPtrPair<'a>> {
    let step = records.len() / num_samples;

    let mut samples = vec![
        KeyPtrPair {
            key: 0,
            record: &records[0],
        };
        num_samples
    ];

    thread::scope(|s| {
        let mut rest: &mut [KeyPtrPair<'a>] = &mut samples;
        for range in chunk_ranges(num_samples, num_threads) {
            let (chunk, tail) = rest.split_at_mut(range.len());
            rest = tail;
            s.spawn(move || {
                for (offset, slot) in chunk.iter_mut().enumerate() {
                    let record = &records[(range.start + offset) * step];
                    *slot = KeyPtrPair {
                        key: record.key,
                        record,
                    };
                }
            });
        }
    });

    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Record, RecordFile};
    use tempfile::tempdir;

    fn file_with_keys(dir: &tempfile::TempDir, keys: &[u64]) -> RecordFile {
        let mut file = RecordFile::map(dir.path().join("records"), keys.len()).unwrap();
        for (slot, &key) in file.records_mut().unwrap().iter_mut().zip(keys) {
            *slot = Record::with_key(key);
        }
        file
    }

    #[test]
    fn test_samples_every_step_th_record() {
        let dir = tempdir().unwrap();
        let keys: Vec<u64> = (0..8).map(|i| 100 + i).collect();
        let file = file_with_keys(&dir, &keys);
        let records = file.records().unwrap();

        let samples = systematic_sample(records, 4, 2);
        let sampled: Vec<u64> = samples.iter().map(|p| p.key).collect();
        // step = 2: records 0, 2, 4, 6.
        assert_eq!(sampled, vec![100, 102, 104, 106]);
    }

    #[test]
    fn test_sample_pointers_reference_sampled_records() {
        let dir = tempdir().unwrap();
        let keys = [7, 3, 5, 1];
        let file = file_with_keys(&dir, &keys);
        let records = file.records().unwrap();

        let samples = systematic_sample(records, 2, 1);
        for pair in &samples {
            assert_eq!(pair.record.key, pair.key);
            assert_eq!(pair.record.payload_key(), pair.key);
        }
    }

    #[test]
    fn test_output_sized_to_sample_count() {
        let dir = tempdir().unwrap();
        let keys: Vec<u64> = (0..100).collect();
        let file = file_with_keys(&dir, &keys);
        let records = file.records().unwrap();

        let samples = systematic_sample(records, 10, 4);
        assert_eq!(samples.len(), 10);
    }

    #[test]
    fn test_single_record_single_sample() {
        let dir = tempdir().unwrap();
        let file = file_with_keys(&dir, &[42]);
        let records = file.records().unwrap();

        let samples = systematic_sample(records, 1, 4);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].key, 42);
    }

    #[test]
    fn test_more_threads_than_samples() {
        let dir = tempdir().unwrap();
        let keys: Vec<u64> = (0..16).collect();
        let file = file_with_keys(&dir, &keys);
        let records = file.records().unwrap();

        let samples = systematic_sample(records, 3, 8);
        let sampled: Vec<u64> = samples.iter().map(|p| p.key).collect();
        // step = 5: records 0, 5, 10.
        assert_eq!(sampled, vec![0, 5, 10]);
    }
}
