//! # Partitioned Search Trees in NVM Arenas
//!
//! Each key-range partition owns one deliberately unbalanced binary search
//! tree. Nodes live in append-only NVM arenas; the tree is built once
//! during the insert phase and read once during the drain, then thrown
//! away. There is no delete, no rebalance, and no duplicate storage beyond
//! the root guard described below.
//!
//! ## Why Unbalanced
//!
//! The splitter phase seeds every tree with the median of its sample range,
//! and the input is presumed near-uniform (systematically sampled shuffled
//! keys). Under those conditions random insertion keeps expected depth
//! around `1.4 * log2(n)` per partition, and skipping rotations keeps the
//! insert path to one locked walk plus one 32-byte node write.
//!
//! ## Node Addressing
//!
//! Child links and record references are raw virtual addresses (`u64`,
//! 0 = none) into mappings owned by the same partition (children) or by the
//! record file (records). Addresses never leave the process and arenas are
//! never remapped or moved, so an address written during insertion is valid
//! for the whole run. The drain phase re-derives references from these
//! addresses; the safety argument lives at those `unsafe` sites.
//!
//! ## Locking
//!
//! One `parking_lot::Mutex` per partition serializes arena growth, the tree
//! walk, and the link write. Lock release publishes the new node to the
//! next inserter; the drain runs after all insert workers have joined and
//! needs no synchronization at all.
//!
//! ## Module Organization
//!
//! - [`node`]: the 32-byte node layout
//! - [`arena`]: append-only typed slots over one NVM region
//! - [`partition`]: descriptor, seeding, and locked insertion

mod arena;
mod node;
mod partition;

pub use arena::NodeArena;
pub use node::{BstNode, NULL_ADDR};
pub use partition::Partition;
