//! # Tree Node Layout
//!
//! A node is four native-endian words: the key, the address of the NVM
//! record the key came from, and the two child addresses. Nodes are written
//! into arena slots exactly once via [`crate::storage::copy_nodrain`] and
//! mutated afterwards only to set a child link.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::config::NODE_SIZE;

/// Absent child / absent root. Address 0 is never a valid mapping address.
pub const NULL_ADDR: u64 = 0;

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct BstNode {
    pub key: u64,
    /// Address of the record this key was read from.
    pub record: u64,
    /// Address of the left child (keys `<=` this node, see partition docs).
    pub left: u64,
    /// Address of the right child (keys `>` this node).
    pub right: u64,
}

const _: () = assert!(
    std::mem::size_of::<BstNode>() == NODE_SIZE,
    "BstNode layout must match the arena slot size"
);

impl BstNode {
    pub fn leaf(key: u64, record: u64) -> Self {
        Self {
            key,
            record,
            left: NULL_ADDR,
            right: NULL_ADDR,
        }
    }
}
