//! `spigot`: a zero-copy, copy-on-write byte buffer engine.
//!
//! A [`Buffer`] is a linear, resizable byte buffer with independent reader
//! and writer cursors, backed by a reference-counted [`storage::Storage`]
//! region. Cloning a buffer is cheap and never copies bytes up front; the
//! first mutation after a clone transparently diverges into fresh storage
//! (copy-on-write), so two clones never observe each other's writes.
//!
//! Allocation is pluggable through [`AllocatorHandle`]: the default handle
//! binds to the global allocator, but embedders that want buffers drawn from
//! an arena or shared memory can supply their own four function pointers.
//!
//! This crate does not include an event loop, socket I/O, or wire framing;
//! it only implements the buffer itself. Those concerns belong to whatever
//! networking layer sits on top of it.
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod alloc_handle;
mod buffer;
mod storage;

pub use alloc_handle::{AllocateFn, AllocatorHandle, CopyFn, FreeFn, ReallocateFn};
pub use buffer::{Buffer, StorageHandle};
