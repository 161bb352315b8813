//! # Prefix Sums and the Parallel Drain
//!
//! Once insertion has quiesced, every partition knows its exact node count,
//! so each partition's slice of the final output is known before a single
//! pair is written: partition `i` starts at the sum of the counts of
//! partitions `0..i`. The drain hands each partition its disjoint output
//! slice and walks its tree in-order, in parallel across partitions.
//!
//! Concatenating the partitions in index order is what makes the result
//! globally sorted: partition bounds are ascending, and an in-order walk
//! of a search tree is ascending within its bounds.
//!
//! The walk recurses. Expected depth on the near-uniform inputs this tool
//! targets is `~1.4 log2(n / partitions)`; feeding it presorted data would
//! degenerate the trees into chains and the recursion with them, which is
//! why the generator shuffles.

use std::thread;

use crate::records::{KeyPtrPair, Record};
use crate::sort::chunk_ranges;
use crate::tree::{BstNode, Partition, NULL_ADDR};

/// Exclusive prefix sums of the partition node counts, plus the total.
/// Sequential by design: partition counts are few and the sum is trivial.
pub fn displacements(partitions: &[Partition]) -> (Vec<usize>, usize) {
    let mut offsets = Vec::with_capacity(partitions.len());
    let mut total = 0usize;
    for partition in partitions {
        offsets.push(total);
        total += partition.len() as usize;
    }
    (offsets, total)
}

/// Drains every partition into one globally sorted vector of pairs.
///
/// `records` anchors the lifetime of the returned borrows to the input
/// mapping; the tree nodes themselves die with `partitions`.
pub fn drain_partitions<'a>(
    partitions: &[Partition],
    records: &'a [Record],
    num_threads: usize,
) -> Vec<KeyPtrPair<'a>> {
    let (offsets, total) = displacements(partitions);

    let mut output = vec![
        KeyPtrPair {
            key: 0,
            record: &records[0],
        };
        total
    ];

    // Carve the output into per-partition slices at the precomputed
    // displacement boundaries; each slice is written by exactly one worker.
    let mut slices: Vec<&mut [KeyPtrPair<'a>]> = Vec::with_capacity(partitions.len());
    let mut rest: &mut [KeyPtrPair<'a>] = &mut output;
    for (i, &offset) in offsets.iter().enumerate() {
        let end = offsets.get(i + 1).copied().unwrap_or(total);
        let (head, tail) = rest.split_at_mut(end - offset);
        slices.push(head);
        rest = tail;
    }

    thread::scope(|s| {
        let mut work: Vec<(&Partition, &mut [KeyPtrPair<'a>])> =
            partitions.iter().zip(slices).collect();

        for range in chunk_ranges(work.len(), num_threads).into_iter().rev() {
            let batch: Vec<_> = work.drain(range).collect();
            s.spawn(move || {
                for (partition, slice) in batch {
                    let (root, len) = partition.root_and_len();
                    debug_assert_eq!(len as usize, slice.len());
                    let mut cursor = 0usize;
                    fill_in_order(root, slice, &mut cursor);
                    debug_assert_eq!(cursor, slice.len());
                }
            });
        }
    });

    output
}

/// Standard in-order traversal, writing each visited node's pair at the
/// cursor.
fn fill_in_order<'a>(addr: u64, out: &mut [KeyPtrPair<'a>], cursor: &mut usize) {
    if addr == NULL_ADDR {
        return;
    }

    // SAFETY: addr is a node address written by NodeArena::write_node into
    // an arena that its partition keeps mapped for the drain's whole
    // duration, and the record address inside the node points into the
    // record mapping that outlives the returned pairs (the 'a borrow). The
    // insert phase has joined, so nothing mutates the tree concurrently.
    let node = unsafe { &*(addr as *const BstNode) };

    fill_in_order(node.left, out, cursor);
    out[*cursor] = KeyPtrPair {
        key: node.key,
        record: unsafe { &*(node.record as *const Record) },
    };
    *cursor += 1;
    fill_in_order(node.right, out, cursor);
}
