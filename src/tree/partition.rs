//! # Partition Descriptors and Locked Insertion
//!
//! A partition is the DRAM-side descriptor of one key range: its inclusive
//! lower bound, the tree root, and the arena chain the nodes live in. The
//! descriptor is created when the splitter phase seeds the tree with its
//! sample-range median and destroyed at the end of the run, unmapping every
//! arena.
//!
//! ## Insert Contract
//!
//! The whole insert (duplicate guard, arena roll-over, tree walk, link
//! write) runs under the partition mutex. Consequences:
//!
//! - No atomics or fences are needed to publish a node: the mutex release
//!   orders the node write and the parent-link write before any later
//!   acquirer's walk.
//! - Tree shape depends on arrival order and is therefore nondeterministic
//!   under concurrency, but any interleaving satisfies the search-tree
//!   invariant, so the drained output is the same.
//!
//! ## Duplicates
//!
//! A key equal to the *root* is dropped. That guard exists because every
//! partition's root record is also still in the input: without it, the
//! seeded median would be emitted twice. Keys equal to a deeper node are
//! not detected; they descend left and are emitted adjacent to their twin,
//! so the drain stays correctly ordered (non-strictly) even for inputs
//! with repeated keys.
//!
//! ## Counter Semantics
//!
//! `nodes_inserted` counts nodes across the whole arena chain and is never
//! reset: slot-within-arena is `nodes_inserted % nodes_per_arena`, and the
//! chain grows exactly when that remainder wraps to zero with the current
//! arena full.

use eyre::Result;
use parking_lot::Mutex;
use smallvec::{smallvec, SmallVec};

use crate::config::SortConfig;
use crate::records::KeyPtrPair;
use crate::tree::arena::NodeArena;
use crate::tree::node::{BstNode, NULL_ADDR};

#[derive(Debug)]
pub struct Partition {
    index: usize,
    min_key: u64,
    nodes_per_arena: u64,
    state: Mutex<PartitionState>,
}

#[derive(Debug)]
struct PartitionState {
    /// Address of the root node; set at seed time, never changed.
    root: u64,
    /// All arenas of this partition in allocation order; the last is the
    /// active one. Kept so Drop unmaps every region.
    arenas: SmallVec<[NodeArena; 1]>,
    /// Nodes inserted across all arenas, monotonic.
    nodes_inserted: u64,
}

impl Partition {
    /// Creates the partition's first arena and persists the seed node (the
    /// sample-range median) at slot 0.
    pub fn seed(
        index: usize,
        min_key: u64,
        seed_pair: KeyPtrPair<'_>,
        nodes_per_arena: u64,
        cfg: &SortConfig,
    ) -> Result<Self> {
        let mut arena = NodeArena::create(cfg.arena_path(index, 0), nodes_per_arena)?;
        let root = arena.write_node(0, &BstNode::leaf(seed_pair.key, seed_pair.record.addr()))?;

        Ok(Self {
            index,
            min_key,
            nodes_per_arena,
            state: Mutex::new(PartitionState {
                root,
                arenas: smallvec![arena],
                nodes_inserted: 1,
            }),
        })
    }

    /// Inclusive lower bound of this partition's key range.
    pub fn min_key(&self) -> u64 {
        self.min_key
    }

    /// Nodes inserted so far (including the seed node).
    pub fn len(&self) -> u64 {
        self.state.lock().nodes_inserted
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of arenas allocated so far.
    pub fn arena_count(&self) -> usize {
        self.state.lock().arenas.len()
    }

    /// Root address and node count, taken under the lock. Callers use this
    /// after the insert phase has quiesced, when both are final.
    pub fn root_and_len(&self) -> (u64, u64) {
        let state = self.state.lock();
        (state.root, state.nodes_inserted)
    }

    /// Inserts `key` (read from the record at `record_addr`) into the tree.
    ///
    /// Returns `Ok(false)` when the key equals the root and is dropped.
    /// Allocation of a roll-over arena is the only fallible step.
    pub fn insert(&self, key: u64, record_addr: u64, cfg: &SortConfig) -> Result<bool> {
        let mut state = self.state.lock();

        // SAFETY: root was produced by NodeArena::write_node on an arena
        // owned by `state`; the arena chain only grows, regions are never
        // remapped, and we hold the mutex, so the address is valid and
        // unaliased by other threads.
        let root_key = unsafe { (*(state.root as *const BstNode)).key };
        if key == root_key {
            return Ok(false);
        }

        if state.nodes_inserted > 0 && state.nodes_inserted % self.nodes_per_arena == 0 {
            let ordinal = state.arenas.len();
            let arena = NodeArena::create(cfg.arena_path(self.index, ordinal), self.nodes_per_arena)?;
            state.arenas.push(arena);
        }

        let slot = state.nodes_inserted % self.nodes_per_arena;
        let node = BstNode::leaf(key, record_addr);
        let active = state
            .arenas
            .last_mut()
            .expect("seeded partition holds at least one arena");
        let new_addr = active.write_node(slot, &node)?;

        // SAFETY: every address on the walk is either the root or a child
        // link written by a previous insert under this same mutex; all of
        // them point into arenas owned by `state` (or stayed valid across
        // roll-over, since old arenas are kept mapped). The &mut deref is
        // exclusive because the mutex serializes all tree mutation.
        unsafe {
            let mut current = state.root as *mut BstNode;
            loop {
                let node_ref = &mut *current;
                if key > node_ref.key {
                    if node_ref.right == NULL_ADDR {
                        node_ref.right = new_addr;
                        break;
                    }
                    current = node_ref.right as *mut BstNode;
                } else {
                    if node_ref.left == NULL_ADDR {
                        node_ref.left = new_addr;
                        break;
                    }
                    current = node_ref.left as *mut BstNode;
                }
            }
        }

        state.nodes_inserted += 1;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Record, RecordFile};
    use tempfile::{tempdir, TempDir};

    fn scratch_config(dir: &TempDir) -> SortConfig {
        SortConfig {
            input_path: dir.path().join("records"),
            arena_dir: dir.path().to_path_buf(),
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

    fn in_order_keys(addr: u64, out: &mut Vec<u64>) {
        if addr == NULL_ADDR {
            return;
        }
        let node = unsafe { &*(addr as *const BstNode) };
        in_order_keys(node.left, out);
        out.push(node.key);
        in_order_keys(node.right, out);
    }

    fn collect(partition: &Partition) -> Vec<u64> {
        let (root, _) = partition.root_and_len();
        let mut keys = Vec::new();
        in_order_keys(root, &mut keys);
        keys
    }

    #[test]
    fn test_seed_creates_single_node_tree() {
        let dir = tempdir().unwrap();
        let cfg = scratch_config(&dir);
        let file = record_file(&dir, &[50]);
        let records = file.records().unwrap();

        let pair = KeyPtrPair {
            key: 50,
            record: &records[0],
        };
        let partition = Partition::seed(0, 10, pair, 8, &cfg).unwrap();

        assert_eq!(partition.min_key(), 10);
        assert_eq!(partition.len(), 1);
        assert_eq!(partition.arena_count(), 1);
        assert_eq!(collect(&partition), vec![50]);
    }

    #[test]
    fn test_in_order_traversal_sorts_inserted_keys() {
        let dir = tempdir().unwrap();
        let cfg = scratch_config(&dir);
        let keys = [50, 20, 80, 10, 30, 70, 90, 25];
        let file = record_file(&dir, &keys);
        let records = file.records().unwrap();

        let pair = KeyPtrPair {
            key: 50,
            record: &records[0],
        };
        let partition = Partition::seed(0, 0, pair, 16, &cfg).unwrap();
        for rec in &records[1..] {
            assert!(partition.insert(rec.key, rec.addr(), &cfg).unwrap());
        }

        assert_eq!(collect(&partition), vec![10, 20, 25, 30, 50, 70, 80, 90]);
        assert_eq!(partition.len(), keys.len() as u64);
    }

    #[test]
    fn test_root_duplicate_is_dropped() {
        let dir = tempdir().unwrap();
        let cfg = scratch_config(&dir);
        let file = record_file(&dir, &[50, 50]);
        let records = file.records().unwrap();

        let pair = KeyPtrPair {
            key: 50,
            record: &records[0],
        };
        let partition = Partition::seed(0, 0, pair, 8, &cfg).unwrap();

        assert!(!partition.insert(50, records[1].addr(), &cfg).unwrap());
        assert_eq!(partition.len(), 1);
    }

    #[test]
    fn test_non_root_duplicate_descends_left_and_is_kept() {
        let dir = tempdir().unwrap();
        let cfg = scratch_config(&dir);
        let file = record_file(&dir, &[50, 20, 20]);
        let records = file.records().unwrap();

        let pair = KeyPtrPair {
            key: 50,
            record: &records[0],
        };
        let partition = Partition::seed(0, 0, pair, 8, &cfg).unwrap();
        assert!(partition.insert(20, records[1].addr(), &cfg).unwrap());
        assert!(partition.insert(20, records[2].addr(), &cfg).unwrap());

        // Non-strict ascending order: the twin lands next to its sibling.
        assert_eq!(collect(&partition), vec![20, 20, 50]);
    }

    #[test]
    fn test_arena_rolls_over_when_full() {
        let dir = tempdir().unwrap();
        let cfg = scratch_config(&dir);
        let keys = [50, 10, 20, 30, 40, 60, 70];
        let file = record_file(&dir, &keys);
        let records = file.records().unwrap();

        let pair = KeyPtrPair {
            key: 50,
            record: &records[0],
        };
        // Capacity 2: seven nodes need four arenas.
        let partition = Partition::seed(0, 0, pair, 2, &cfg).unwrap();
        for rec in &records[1..] {
            partition.insert(rec.key, rec.addr(), &cfg).unwrap();
        }

        assert_eq!(partition.len(), 7);
        assert_eq!(partition.arena_count(), 4);
        assert_eq!(collect(&partition), vec![10, 20, 30, 40, 50, 60, 70]);

        // Roll-over produced the deterministic arena file names.
        for ordinal in 0..4 {
            assert!(cfg.arena_path(0, ordinal).exists(), "ordinal {}", ordinal);
        }
    }

    #[test]
    fn test_links_stay_valid_across_roll_over() {
        let dir = tempdir().unwrap();
        let cfg = scratch_config(&dir);
        let keys: Vec<u64> = (0..64).map(|i| (i * 37) % 64).collect();
        let file = record_file(&dir, &keys);
        let records = file.records().unwrap();

        let pair = KeyPtrPair {
            key: records[0].key,
            record: &records[0],
        };
        let partition = Partition::seed(0, 0, pair, 3, &cfg).unwrap();
        for rec in &records[1..] {
            partition.insert(rec.key, rec.addr(), &cfg).unwrap();
        }

        let collected = collect(&partition);
        let mut expected: Vec<u64> = keys.clone();
        expected.sort_unstable();
        expected.dedup();
        // (i * 37) % 64 is a permutation, so nothing was dropped.
        assert_eq!(collected, expected);
    }
}
