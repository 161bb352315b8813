//! # Record Layout and Typed File Views
//!
//! The unsorted input is a flat, headerless array of fixed-size records in
//! one NVM file. Only the leading 8-byte key is ever interpreted by the
//! sort; the payload is opaque bytes that never move. The generator mirrors
//! the key into the first payload word so that verification can prove a
//! record round-tripped intact.
//!
//! ## Binary Layout
//!
//! ```text
//! +-------------+--------------------------+
//! | key (u64)   | payload ([u8; 24])       |
//! +-------------+--------------------------+
//! 0             8                          32
//! ```
//!
//! Fields are native-endian: the file is per-run scratch shared between the
//! generator and the sorter on one machine, not a portable artifact.
//!
//! ## Zero-Copy Access
//!
//! [`RecordFile`] maps the file and reinterprets the whole region as
//! `&[Record]` through zerocopy, so sampling and insertion read keys
//! straight out of the mapping with no deserialization step. The sorted
//! output is a vector of [`KeyPtrPair`]s whose borrows are tied to the
//! mapping's lifetime, which keeps dangling output pointers unrepresentable.

use std::path::Path;

use eyre::{Result, WrapErr};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::config::{RECORD_PAYLOAD_SIZE, RECORD_SIZE};
use crate::storage::NvmRegion;

/// One fixed-size NVM-resident record. The sort reads `key` and takes the
/// record's address; it never writes records.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct Record {
    pub key: u64,
    pub payload: [u8; RECORD_PAYLOAD_SIZE],
}

const _: () = assert!(
    std::mem::size_of::<Record>() == RECORD_SIZE,
    "Record layout must match the on-file record size"
);

impl Record {
    /// A record as the generator produces it: the first payload word
    /// mirrors the key, the rest is zero.
    pub fn with_key(key: u64) -> Self {
        let mut payload = [0u8; RECORD_PAYLOAD_SIZE];
        payload[..8].copy_from_slice(&key.to_ne_bytes());
        Self { key, payload }
    }

    /// The key mirrored into the payload by the generator.
    pub fn payload_key(&self) -> u64 {
        let mut word = [0u8; 8];
        word.copy_from_slice(&self.payload[..8]);
        u64::from_ne_bytes(word)
    }

    /// The record's address in the mapped region, used for tree node links.
    pub fn addr(&self) -> u64 {
        self as *const Record as u64
    }
}

/// A sorted-output entry: a key plus a borrow of the NVM record it came
/// from. This is the unit the engine actually sorts; records themselves
/// never move.
#[derive(Debug, Clone, Copy)]
pub struct KeyPtrPair<'a> {
    pub key: u64,
    pub record: &'a Record,
}

/// The unsorted record file, mapped and viewed as `&[Record]`.
#[derive(Debug)]
pub struct RecordFile {
    region: NvmRegion,
}

impl RecordFile {
    /// Maps `count` records at `path`, creating or resizing the file as
    /// needed (the sorter and the generator share this entry point).
    pub fn map<P: AsRef<Path>>(path: P, count: usize) -> Result<Self> {
        let path = path.as_ref();
        let region = NvmRegion::map(path, (count * RECORD_SIZE) as u64)
            .wrap_err_with(|| format!("failed to map record file '{}'", path.display()))?;
        Ok(Self { region })
    }

    pub fn records(&self) -> Result<&[Record]> {
        <[Record]>::ref_from_bytes(self.region.bytes())
            .map_err(|e| eyre::eyre!("record file is not a valid record array: {:?}", e))
    }

    pub fn records_mut(&mut self) -> Result<&mut [Record]> {
        <[Record]>::mut_from_bytes(self.region.bytes_mut())
            .map_err(|e| eyre::eyre!("record file is not a valid record array: {:?}", e))
    }

    pub fn len(&self) -> usize {
        self.region.len() / RECORD_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_persistent(&self) -> bool {
        self.region.is_persistent()
    }
}
