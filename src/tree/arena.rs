//! # Node Arenas
//!
//! An arena is one NVM region holding a packed array of node slots, filled
//! front to back and never reclaimed. A partition starts with one arena
//! sized for its expected share of the input (plus headroom) and chains
//! further arenas when the share is exceeded; the slots of all arenas of a
//! partition form one logical append-only sequence.

use std::path::Path;

use eyre::{ensure, Result, WrapErr};
use zerocopy::{FromBytes, IntoBytes};

use crate::config::NODE_SIZE;
use crate::storage::{copy_nodrain, NvmRegion};
use crate::tree::node::BstNode;

#[derive(Debug)]
pub struct NodeArena {
    region: NvmRegion,
    capacity: u64,
}

impl NodeArena {
    /// Creates the named arena file sized for `capacity` nodes and maps it.
    pub fn create<P: AsRef<Path>>(path: P, capacity: u64) -> Result<Self> {
        let path = path.as_ref();
        ensure!(
            capacity >= 1,
            "arena '{}' needs capacity for at least one node",
            path.display()
        );
        let region = NvmRegion::map(path, capacity * NODE_SIZE as u64)
            .wrap_err_with(|| format!("failed to allocate node arena '{}'", path.display()))?;
        Ok(Self { region, capacity })
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Writes `node` into `slot` and returns the slot's address for use as
    /// a child link. The write goes through the fence-free copy path.
    pub fn write_node(&mut self, slot: u64, node: &BstNode) -> Result<u64> {
        ensure!(
            slot < self.capacity,
            "arena slot {} out of bounds (capacity={})",
            slot,
            self.capacity
        );
        let offset = slot as usize * NODE_SIZE;
        let bytes = &mut self.region.bytes_mut()[offset..offset + NODE_SIZE];
        copy_nodrain(bytes, node.as_bytes());
        Ok(bytes.as_ptr() as u64)
    }

    /// Bounds-checked read-back of a slot, used by verification and tests;
    /// the hot path walks raw addresses instead.
    pub fn node(&self, slot: u64) -> Result<&BstNode> {
        ensure!(
            slot < self.capacity,
            "arena slot {} out of bounds (capacity={})",
            slot,
            self.capacity
        );
        let offset = slot as usize * NODE_SIZE;
        BstNode::ref_from_bytes(&self.region.bytes()[offset..offset + NODE_SIZE])
            .map_err(|e| eyre::eyre!("arena slot {} is not a valid node: {:?}", slot, e))
    }

    pub fn is_persistent(&self) -> bool {
        self.region.is_persistent()
    }
}
