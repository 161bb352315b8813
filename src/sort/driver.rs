//! # Phase Sequencing
//!
//! The driver owns the run's DRAM scratch (sample vector, partition bank,
//! output vector) and runs the phases in their fixed order, joining every
//! worker between phases. It prints one progress line per phase boundary;
//! that is the tool's whole user interface while it runs.
//!
//! Teardown is `Drop`: the partition bank unmaps every arena when the
//! function returns (the files themselves are left on disk for the
//! operator), and the caller owns the input mapping.

use std::thread;

use eyre::{Result, WrapErr};

use crate::config::SortConfig;
use crate::records::{KeyPtrPair, Record};
use crate::sort::chunk_ranges;
use crate::sort::classify::partition_for_key;
use crate::sort::drain::drain_partitions;
use crate::sort::sampler::systematic_sample;
use crate::sort::splitter::build_partitions;
use crate::tree::Partition;

/// Sorts the mapped records by key, returning ascending (key, record)
/// pairs that borrow from `records`. The records themselves are not moved.
pub fn split_sort<'a>(records: &'a [Record], cfg: &SortConfig) -> Result<Vec<KeyPtrPair<'a>>> {
    cfg.validate(records.len())?;

    println!("Working... Sampling records (every {}th key)", records.len() / cfg.num_samples);
    let mut samples = systematic_sample(records, cfg.num_samples, cfg.num_threads);

    println!(
        "Working... Sorting {} samples and seeding {} partitions",
        samples.len(),
        cfg.num_partitions
    );
    let partitions = build_partitions(&mut samples, records.len(), cfg)
        .wrap_err("failed to seed partitions")?;
    drop(samples);

    println!("Working... Classifying and inserting {} records", records.len());
    insert_all(records, &partitions, cfg).wrap_err("failed to insert records")?;

    println!("Working... Draining partitions into sorted output");
    let output = drain_partitions(&partitions, records, cfg.num_threads);

    Ok(output)
}

/// The classify + insert phase: workers sweep disjoint record ranges,
/// binary-search the splitter table per record, and insert under the
/// owning partition's lock.
fn insert_all(records: &[Record], partitions: &[Partition], cfg: &SortConfig) -> Result<()> {
    let splitters: Vec<u64> = partitions.iter().map(Partition::min_key).collect();
    let splitters = &splitters;

    thread::scope(|s| {
        let handles: Vec<_> = chunk_ranges(records.len(), cfg.num_threads)
            .into_iter()
            .map(|range| {
                s.spawn(move || -> Result<()> {
                    for record in &records[range] {
                        let index = partition_for_key(record.key, splitters);
                        partitions[index].insert(record.key, record.addr(), cfg)?;
                    }
                    Ok(())
                })
            })
            .collect();

        handles
            .into_iter()
            .try_for_each(|handle| handle.join().expect("insert worker panicked"))
    })
}
