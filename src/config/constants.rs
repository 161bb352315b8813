//! # SplitSort Configuration Constants
//!
//! This module centralizes the layout and tuning constants for the sort
//! engine. Constants that depend on each other are co-located and tied
//! together with compile-time assertions so a change to one cannot silently
//! invalidate another.
//!
//! ## Dependency Graph
//!
//! ```text
//! RECORD_SIZE (32 bytes)
//!       │
//!       ├─> RECORD_PAYLOAD_SIZE (24 bytes, RECORD_SIZE - 8-byte key)
//!       │     The generator mirrors the key into the first 8 payload
//!       │     bytes; verification reads it back through the record view.
//!       │
//!       └─> unsorted file size = num_keys * RECORD_SIZE (no header)
//!
//! NODE_SIZE (32 bytes)
//!       │
//!       └─> arena file size = nodes_per_arena * NODE_SIZE
//!             nodes_per_arena = ceil(expected_partition_size * ARENA_GROWTH_FACTOR)
//! ```
//!
//! ## Tuning
//!
//! - `ARENA_GROWTH_FACTOR`: headroom over the expected per-partition record
//!   count before an arena rolls over. 1.25 assumes near-uniform keys; a
//!   skewed input produces extra arenas per partition instead of failing.

/// Size of one record in the unsorted NVM file.
/// The file is a flat array of records with no header, so this constant
/// defines the file format together with [`RECORD_PAYLOAD_SIZE`].
pub const RECORD_SIZE: usize = 32;

/// Payload bytes following the 8-byte key in each record.
pub const RECORD_PAYLOAD_SIZE: usize = RECORD_SIZE - 8;

/// Size of one search-tree node in an NVM arena.
/// Key + record address + two child addresses, all 8 bytes each.
pub const NODE_SIZE: usize = 32;

/// Headroom multiplier applied to the expected per-partition record count
/// when sizing an arena.
pub const ARENA_GROWTH_FACTOR: f64 = 1.25;

/// Directory holding the unsorted record file and the node arenas.
/// Matches the fsdax mount layout the tool was built for; override with
/// `SortConfig`/`GenerateConfig` paths for testing.
pub const DEFAULT_NVM_DIR: &str = "/dcpmm/yida";

/// File name of the unsorted record file inside the NVM directory.
pub const UNSORTED_FILE_NAME: &str = "UNSORTED_KEYS";

/// Prefix for arena file names; full names are `<prefix>_<partition>_<ordinal>`.
pub const DEFAULT_ARENA_PREFIX: &str = "BST_POOL";

const _: () = assert!(
    RECORD_PAYLOAD_SIZE == RECORD_SIZE - 8,
    "record payload must fill the record after the 8-byte key"
);

const _: () = assert!(
    RECORD_SIZE % 8 == 0,
    "records must stay 8-byte aligned so a mapped file is a valid &[Record]"
);

const _: () = assert!(
    NODE_SIZE % 8 == 0,
    "nodes must stay 8-byte aligned so packed arena slots are valid &BstNode"
);
