//! # Record Generator
//!
//! Populates the unsorted record file with a seeded random permutation of
//! `[0, num_keys)`. A permutation (rather than independent draws)
//! guarantees key uniqueness, which the conservation property relies on,
//! and gives the sort a known answer: the drained output must be exactly
//! `0, 1, ..., num_keys - 1`.
//!
//! The keys are built and shuffled in DRAM, then copied into the mapped
//! file in parallel through the fence-free NVM write path, and finally
//! read back to confirm the copy. The shuffle matters beyond testing:
//! the trees are unbalanced, so a presorted input would degenerate them
//! into chains.

use std::thread;

use eyre::{ensure, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use zerocopy::IntoBytes;

use crate::config::{GenerateConfig, RECORD_SIZE};
use crate::records::{Record, RecordFile};
use crate::sort::chunk_ranges;
use crate::storage::copy_nodrain;

/// Creates and fills the unsorted record file described by `cfg`.
pub fn generate_records(cfg: &GenerateConfig) -> Result<()> {
    cfg.validate()?;

    println!("Record unit size: {} bytes", RECORD_SIZE);
    println!("Number of keys to generate: {}", cfg.num_keys);
    println!("Using seed: {}", cfg.seed);

    println!("Working... Creating and shuffling keys in DRAM");
    let mut keys: Vec<u64> = (0..cfg.num_keys as u64).collect();
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    keys.shuffle(&mut rng);

    println!("Working... Allocating the record file");
    let mut file = RecordFile::map(&cfg.output_path, cfg.num_keys)?;

    println!("Working... Copying records into NVM");
    let slots = file.records_mut()?;
    thread::scope(|s| {
        let mut rest: &mut [Record] = slots;
        for range in chunk_ranges(cfg.num_keys, cfg.num_threads) {
            let (chunk, tail) = rest.split_at_mut(range.len());
            rest = tail;
            let keys = &keys[range];
            s.spawn(move || {
                for (slot, &key) in chunk.iter_mut().zip(keys) {
                    let record = Record::with_key(key);
                    copy_nodrain(slot.as_mut_bytes(), record.as_bytes());
                }
            });
        }
    });

    println!("Working... Verifying the NVM copy");
    let written = file.records()?;
    for (i, (record, &key)) in written.iter().zip(&keys).enumerate() {
        ensure!(
            record.key == key && record.payload_key() == key,
            "record {} read back key {} (payload {}) instead of {}",
            i,
            record.key,
            record.payload_key(),
            key
        );
    }

    let total_bytes = (cfg.num_keys * RECORD_SIZE) as f64;
    println!("Total size of records generated: {:.3} KB", total_bytes / (1u64 << 10) as f64);
    println!("Total size of records generated: {:.3} MB", total_bytes / (1u64 << 20) as f64);
    println!("Total size of records generated: {:.3} GB", total_bytes / (1u64 << 30) as f64);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config(dir: &tempfile::TempDir, num_keys: usize, seed: u64) -> GenerateConfig {
        GenerateConfig {
            output_path: dir.path().join("records"),
            num_threads: 2,
            ..GenerateConfig::new(num_keys, seed)
        }
    }

    #[test]
    fn test_generates_a_permutation() {
        let dir = tempdir().unwrap();
        let cfg = config(&dir, 100, 7);
        generate_records(&cfg).unwrap();

        let file = RecordFile::map(&cfg.output_path, 100).unwrap();
        let mut keys: Vec<u64> = file.records().unwrap().iter().map(|r| r.key).collect();
        keys.sort_unstable();
        assert_eq!(keys, (0..100).collect::<Vec<u64>>());
    }

    #[test]
    fn test_same_seed_same_order() {
        let dir_a = tempdir().unwrap();
        let dir_b = tempdir().unwrap();
        generate_records(&config(&dir_a, 64, 42)).unwrap();
        generate_records(&config(&dir_b, 64, 42)).unwrap();

        let a = RecordFile::map(dir_a.path().join("records"), 64).unwrap();
        let b = RecordFile::map(dir_b.path().join("records"), 64).unwrap();
        let keys_a: Vec<u64> = a.records().unwrap().iter().map(|r| r.key).collect();
        let keys_b: Vec<u64> = b.records().unwrap().iter().map(|r| r.key).collect();
        assert_eq!(keys_a, keys_b);
    }

    #[test]
    fn test_different_seed_different_order() {
        let dir_a = tempdir().unwrap();
        let dir_b = tempdir().unwrap();
        generate_records(&config(&dir_a, 256, 1)).unwrap();
        generate_records(&config(&dir_b, 256, 2)).unwrap();

        let a = RecordFile::map(dir_a.path().join("records"), 256).unwrap();
        let b = RecordFile::map(dir_b.path().join("records"), 256).unwrap();
        let keys_a: Vec<u64> = a.records().unwrap().iter().map(|r| r.key).collect();
        let keys_b: Vec<u64> = b.records().unwrap().iter().map(|r| r.key).collect();
        assert_ne!(keys_a, keys_b);
    }

    #[test]
    fn test_payload_mirrors_key() {
        let dir = tempdir().unwrap();
        let cfg = config(&dir, 16, 3);
        generate_records(&cfg).unwrap();

        let file = RecordFile::map(&cfg.output_path, 16).unwrap();
        for record in file.records().unwrap() {
            assert_eq!(record.payload_key(), record.key);
        }
    }
}
