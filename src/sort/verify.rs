//! # Post-Sort Verification
//!
//! Checks that the drained output really is in ascending key order. The
//! check is a parallel reduction over an atomic error flag: workers scan
//! disjoint index ranges (each range re-checks the pair straddling its
//! left seam) and raise the shared flag on the first violation they see.
//! Nobody exits early on another worker's behalf and the flag is read only
//! after every worker has joined, so the result cannot race the scan.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::records::KeyPtrPair;
use crate::sort::chunk_ranges;

/// Whether every adjacent pair satisfies `key[j-1] <= key[j]`.
pub fn is_sorted(pairs: &[KeyPtrPair<'_>], num_threads: usize) -> bool {
    if pairs.len() < 2 {
        return true;
    }

    let out_of_order = AtomicBool::new(false);

    thread::scope(|s| {
        for range in chunk_ranges(pairs.len(), num_threads) {
            let flag = &out_of_order;
            s.spawn(move || {
                for j in range.start.max(1)..range.end {
                    if pairs[j - 1].key > pairs[j].key {
                        flag.store(true, Ordering::Relaxed);
                        return;
                    }
                }
            });
        }
    });

    !out_of_order.load(Ordering::Relaxed)
}
