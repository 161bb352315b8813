//! # Splitter Classification
//!
//! Classification maps a key to the partition whose range contains it: the
//! greatest index whose lower bound does not exceed the key. Ties between
//! equal splitters therefore resolve to the last of them, and keys below
//! every splitter fall into partition 0: the first splitter is the
//! smallest *sampled* key, so unsampled keys can legitimately sit below it.

/// Returns the greatest `i` with `splitters[i] <= key`, or 0 when the key
/// is below every splitter. `splitters` is ascending and non-empty.
pub fn partition_for_key(key: u64, splitters: &[u64]) -> usize {
    debug_assert!(!splitters.is_empty());

    let mut low = 0usize;
    let mut high = splitters.len() - 1;
    let mut index = 0usize;

    while low <= high {
        let mid = (low + high) / 2;
        if key >= splitters[mid] {
            index = mid;
            low = mid + 1;
        } else if mid == 0 {
            break;
        } else {
            high = mid - 1;
        }
    }

    index
}
