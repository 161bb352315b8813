//! # NVM Storage Layer
//!
//! This module provides the two storage primitives the sort engine is built
//! on: named memory-mapped regions on the persistent-memory filesystem, and
//! a fence-free byte copy for writing into them.
//!
//! ## Region Model
//!
//! Every NVM allocation in this tool is a named file on an fsdax mount,
//! mapped read-write into the address space for its whole lifetime:
//!
//! - the unsorted record file, produced by the generator and mapped again
//!   by the sort run (read-only in practice, mapped RW to keep one path)
//! - one arena file per partition per growth step, holding packed tree nodes
//!
//! Regions are append-only from the engine's point of view: bytes are
//! written once through [`copy_nodrain`] and never relocated, so raw
//! addresses into a mapping stay valid until the region is dropped.
//!
//! ## Safety Model
//!
//! [`NvmRegion`] owns its mapping and unmaps in `Drop`. Byte access goes
//! through `bytes()`/`bytes_mut()`, so the borrow checker ties every slice
//! to the region's lifetime. The tree layer hands out raw addresses into
//! arenas instead; the invariants that keep those valid are documented at
//! each `unsafe` site in `tree` and `sort::drain`.
//!
//! ## Durability
//!
//! None. The sort is an ephemeral computation over scratch files; writes
//! take the non-temporal store path where available but no flush or fence
//! is ever issued, and no recovery is possible after a crash. Arena files
//! are left on disk at exit for the operator to remove.
//!
//! ## Persistence Detection
//!
//! On Linux, a region reports whether its file actually supports persistent
//! memory semantics (a DAX mapping accepted `MAP_SYNC`). A mismatch only
//! produces a warning: the tool still runs correctly on ordinary page-cache
//! backed files, just without the performance profile it was designed for.

mod mmap;
mod pcopy;

pub use mmap::NvmRegion;
pub use pcopy::copy_nodrain;
