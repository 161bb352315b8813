//! # SplitSort - Pointer Sort for NVM Record Files
//!
//! SplitSort sorts a record file that lives on byte-addressable persistent
//! memory without ever moving a record. Only compact (key, record-address)
//! pairs travel: the engine samples the key distribution, splits the key
//! space into partitions, builds one append-only search tree per partition
//! in NVM arenas, and drains the trees in order into a DRAM array of
//! sorted pairs pointing back at the untouched records.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ unsorted record file (NVM, mapped, never mutated)        │
//! └──────────────────────────────────────────────────────────┘
//!        │ systematic sample                 (parallel)
//!        ▼
//! ┌─────────────────┐  sort + range-assign   (per partition)
//! │ sample pairs    │ ─────────────────────────────┐
//! └─────────────────┘                              ▼
//!                                    ┌──────────────────────┐
//!        classify + locked insert    │ partition bank:      │
//!        (parallel over records) ──> │ splitter + BST in    │
//!                                    │ NVM node arenas      │
//!                                    └──────────────────────┘
//!                                               │ prefix-sum + in-order
//!                                               ▼ drain (parallel)
//!                                    ┌──────────────────────┐
//!                                    │ sorted (key, record) │
//!                                    │ pairs in DRAM        │
//!                                    └──────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use splitsort::{split_sort, RecordFile, SortConfig};
//!
//! let cfg = SortConfig::default();
//! let file = RecordFile::map(&cfg.input_path, num_keys)?;
//! let sorted = split_sort(file.records()?, &cfg)?;
//! assert!(sorted.windows(2).all(|w| w[0].key <= w[1].key));
//! ```
//!
//! ## Design Boundaries
//!
//! - **Ephemeral**: no durability fences, no crash recovery. Arena files
//!   are run-scoped scratch, left on disk for the operator.
//! - **Unbalanced trees**: insertion order plus median seeding stands in
//!   for rebalancing; the tool expects shuffled, near-uniform keys.
//! - **Duplicates**: a key equal to its partition's root is dropped;
//!   deeper duplicates survive. Output order is non-strict ascending.
//!
//! ## Module Overview
//!
//! - [`config`]: run configuration and layout constants
//! - [`records`]: record layout and the typed view over the mapped file
//! - [`storage`]: named NVM regions and the fence-free copy
//! - [`tree`]: per-partition search trees in NVM arenas
//! - [`sort`]: the five-phase engine and its driver
//! - [`generate`]: seeded permutation generator for the input file

pub mod config;
pub mod generate;
pub mod records;
pub mod sort;
pub mod storage;
pub mod tree;

pub use config::{GenerateConfig, SortConfig};
pub use generate::generate_records;
pub use records::{KeyPtrPair, Record, RecordFile};
pub use sort::driver::split_sort;
pub use sort::verify::is_sorted;
