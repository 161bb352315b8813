//! # The Sort Engine
//!
//! The engine runs five strictly ordered phases over the mapped record
//! file; each phase joins all its workers before the next begins:
//!
//! ```text
//! sample ──> sort samples ──> seed partitions ──> classify + insert ──> prefix-sum + drain
//!   C4            C5a              C5b                 C6 + C7                 C8
//! ```
//!
//! Record payloads never move. The phases only ever handle (key, record
//! address) pairs: 16 bytes sorted per 32-byte record left in place.
//!
//! ## Parallelism Model
//!
//! Every parallel phase is a data-parallel loop over contiguous index
//! ranges, fanned out with `std::thread::scope` and a fixed worker count.
//! Workers write disjoint output (chunked sample slots, per-partition
//! output slices) or go through the per-partition mutex (insertion); no
//! other synchronization exists. [`chunk_ranges`] produces the split.
//!
//! ## Module Organization
//!
//! - [`sampler`]: systematic every-k-th sampling
//! - [`splitter`]: sample sort, range assignment, partition seeding
//! - [`classify`]: splitter-table binary search
//! - [`drain`]: prefix sums and the parallel in-order drain
//! - [`verify`]: parallel sortedness check over the final output
//! - [`driver`]: phase sequencing and scratch ownership

pub mod classify;
pub mod drain;
pub mod driver;
pub mod sampler;
pub mod splitter;
pub mod verify;

use std::ops::Range;

/// Splits `0..total` into at most `parts` contiguous, near-even, non-empty
/// ranges in ascending order. The first `total % parts` ranges are one
/// element longer, same as the splitter's sample-range assignment.
pub(crate) fn chunk_ranges(total: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.max(1).min(total.max(1));
    let q = total / parts;
    let r = total % parts;

    let mut ranges = Vec::with_capacity(parts);
    let mut start = 0;
    for i in 0..parts {
        let len = if i < r { q + 1 } else { q };
        if len == 0 {
            break;
        }
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}
