//! # Fence-Free Persistent Copy
//!
//! `copy_nodrain` is the single write path into NVM regions. On x86_64 it
//! uses non-temporal streaming stores for the aligned body of the copy,
//! which bypass the cache hierarchy and head straight for the memory
//! controller's write-pending queue. That is the right trade for this
//! workload: every written byte is sort output or tree metadata that will
//! not be re-read until a later phase, so polluting the cache with it only
//! evicts record data the insert phase still needs.
//!
//! ## No Drain
//!
//! Deliberately, no `sfence` (or any flush) follows the streaming stores.
//! The sort is an online computation, not a recoverable index: nothing
//! reads the NVM contents after a crash, and the phase barriers that
//! separate writers from readers are full thread joins, which already give
//! the necessary ordering for in-process readers.
//!
//! ## Portability
//!
//! On other architectures the copy degrades to `copy_from_slice`, which is
//! exactly the "plain memcpy on volatile memory" substitution the design
//! allows.

/// Copies `src` into `dst` without issuing a durability fence.
///
/// Panics if the slices differ in length, like `copy_from_slice`.
pub fn copy_nodrain(dst: &mut [u8], src: &[u8]) {
    assert_eq!(
        dst.len(),
        src.len(),
        "copy_nodrain length mismatch: dst {} vs src {}",
        dst.len(),
        src.len()
    );

    #[cfg(target_arch = "x86_64")]
    stream_copy(dst, src);

    #[cfg(not(target_arch = "x86_64"))]
    dst.copy_from_slice(src);
}

/// Streaming-store copy: scalar head up to 16-byte destination alignment,
/// `movnti`-family stores for the aligned body, scalar tail.
#[cfg(target_arch = "x86_64")]
fn stream_copy(dst: &mut [u8], src: &[u8]) {
    use core::arch::x86_64::{__m128i, _mm_stream_si128};

    let len = dst.len();
    let head = dst.as_mut_ptr().align_offset(16).min(len);
    dst[..head].copy_from_slice(&src[..head]);

    let body = (len - head) & !15;

    // SAFETY: dst.as_mut_ptr() + head is 16-byte aligned by construction,
    // body is a multiple of 16 that fits inside both slices, and the source
    // is read with read_unaligned so its alignment does not matter. The
    // ranges cannot overlap: dst is a &mut borrow.
    unsafe {
        let mut d = dst.as_mut_ptr().add(head) as *mut __m128i;
        let mut s = src.as_ptr().add(head) as *const __m128i;
        let end = d.add(body / 16);
        while d < end {
            _mm_stream_si128(d, s.read_unaligned());
            d = d.add(1);
            s = s.add(1);
        }
    }

    let tail = head + body;
    dst[tail..].copy_from_slice(&src[tail..]);
}
