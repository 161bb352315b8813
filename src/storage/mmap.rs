//! # Named NVM Regions
//!
//! `NvmRegion` creates (or reuses) a named file of a requested byte length
//! and memory-maps it read-write. It is the only place in the crate that
//! touches the filesystem or the mapping syscalls; everything above it works
//! with slices and addresses.
//!
//! ## Create-or-Reuse Semantics
//!
//! Opening never truncates: an existing file is resized to the requested
//! length and mapped as-is, so the sort run can map the record file the
//! generator produced without copying it. This mirrors how the regions are
//! used operationally: the generator and the sorter are separate process
//! invocations sharing one fsdax directory.
//!
//! ## Warnings
//!
//! Two conditions are worth telling the operator about but are not errors:
//!
//! - the file is not backed by persistent memory (the `MAP_SYNC` probe
//!   failed), so the run measures page-cache behavior instead of NVM
//! - the kernel mapped a different length than requested (the region is
//!   still valid up to the mapped length)
//!
//! Both print to stderr and the run continues.

use std::fs::{File, OpenOptions};
use std::path::Path;

use eyre::{ensure, Result, WrapErr};
use memmap2::MmapMut;

#[derive(Debug)]
pub struct NvmRegion {
    mmap: MmapMut,
    is_pmem: bool,
}

impl NvmRegion {
    /// Creates or reuses the named file, sizes it to `len_bytes`, and maps
    /// it read-write. Fails if the file cannot be created, resized, or
    /// mapped; the callers of this tool treat all three as fatal.
    pub fn map<P: AsRef<Path>>(path: P, len_bytes: u64) -> Result<Self> {
        let path = path.as_ref();

        ensure!(
            len_bytes > 0,
            "refusing to map zero-length region '{}'",
            path.display()
        );

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .wrap_err_with(|| format!("failed to open NVM file '{}'", path.display()))?;

        file.set_len(len_bytes)
            .wrap_err_with(|| format!("failed to size '{}' to {} bytes", path.display(), len_bytes))?;

        // SAFETY: MmapMut::map_mut is unsafe because a memory-mapped file can
        // be modified externally. This is safe because:
        // 1. The files live in a directory this tool owns for the run; no
        //    other process writes them while the sort is running.
        // 2. The mapping's lifetime is tied to NvmRegion, so slices handed
        //    out by bytes()/bytes_mut() cannot outlive the mapping.
        // 3. The file was just sized to len_bytes, so the full mapping is
        //    backed by allocated file extent.
        let mmap = unsafe {
            MmapMut::map_mut(&file)
                .wrap_err_with(|| format!("failed to memory-map '{}'", path.display()))?
        };

        if mmap.len() as u64 != len_bytes {
            eprintln!(
                "warning: '{}': requested {} bytes but mapped {}",
                path.display(),
                len_bytes,
                mmap.len()
            );
        }

        let is_pmem = probe_dax(&file, mmap.len());
        if !is_pmem {
            eprintln!(
                "warning: '{}' is not backed by persistent memory",
                path.display()
            );
        }

        Ok(Self { mmap, is_pmem })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.mmap
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.mmap
    }

    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.len() == 0
    }

    /// Whether the backing file accepted a `MAP_SYNC` mapping, i.e. lives
    /// on a DAX filesystem with real persistent-memory semantics.
    pub fn is_persistent(&self) -> bool {
        self.is_pmem
    }
}

/// Probes whether the file supports persistent-memory mapping semantics by
/// attempting a one-page `MAP_SYNC` mapping. `MAP_SYNC` is only accepted
/// for DAX mappings, which makes it a reliable "is this actually pmem"
/// test without parsing mount tables.
#[cfg(target_os = "linux")]
fn probe_dax(file: &File, len: usize) -> bool {
    use std::os::unix::io::AsRawFd;

    let probe_len = len.min(4096);
    if probe_len == 0 {
        return false;
    }

    // SAFETY: mmap with a valid fd, in-range length, and offset 0 either
    // returns a fresh mapping or MAP_FAILED; we immediately unmap on
    // success and never dereference the probe mapping.
    unsafe {
        let ptr = libc::mmap(
            std::ptr::null_mut(),
            probe_len,
            libc::PROT_READ,
            libc::MAP_SHARED_VALIDATE | libc::MAP_SYNC,
            file.as_raw_fd(),
            0,
        );
        if ptr == libc::MAP_FAILED {
            return false;
        }
        libc::munmap(ptr, probe_len);
        true
    }
}

#[cfg(not(target_os = "linux"))]
fn probe_dax(_file: &File, _len: usize) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_map_creates_file_of_requested_length() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("region");
        let region = NvmRegion::map(&path, 4096).unwrap();
        assert_eq!(region.len(), 4096);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 4096);
    }

    #[test]
    fn test_map_rejects_zero_length() {
        let dir = tempdir().unwrap();
        assert!(NvmRegion::map(dir.path().join("empty"), 0).is_err());
    }

    #[test]
    fn test_writes_persist_across_remap() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("region");

        {
            let mut region = NvmRegion::map(&path, 64).unwrap();
            region.bytes_mut()[0..4].copy_from_slice(b"pers");
        }

        let region = NvmRegion::map(&path, 64).unwrap();
        assert_eq!(&region.bytes()[0..4], b"pers");
    }

    #[test]
    fn test_reuse_grows_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("region");

        drop(NvmRegion::map(&path, 32).unwrap());
        let region = NvmRegion::map(&path, 128).unwrap();
        assert_eq!(region.len(), 128);
    }

    #[test]
    fn test_map_fails_for_missing_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("region");
        assert!(NvmRegion::map(&path, 64).is_err());
    }
}
