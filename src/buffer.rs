//! The value type at the center of this crate.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt::Write as _;
use core::mem::MaybeUninit;

use crate::alloc_handle::AllocatorHandle;
use crate::storage::{Storage, next_pow2_clamped};

/// Number of leading readable bytes a [`Buffer::debug_description`] dump
/// will show before it's truncated.
const DEBUG_DUMP_LIMIT: u32 = 1024;

/// A reference-counted, copy-on-write byte buffer with independent reader
/// and writer cursors.
///
/// `Buffer` is a value type: cloning it is cheap (an `Arc` bump) and the
/// clone's cursors and slice window are independent of the original's, but
/// the two share the same backing bytes until either one mutates, at which
/// point the mutating side transparently copies out into fresh storage.
///
/// ```text
/// 0                reader_index          writer_index           capacity
/// |--- discarded ---|---  readable  ---|---  writable  ---|------ spare ------|
/// ```
pub struct Buffer {
    storage: Arc<Storage>,
    slice_lo: u32,
    slice_hi: u32,
    reader_idx: u32,
    writer_idx: u32,
}

impl AllocatorHandle {
    /// Allocates a fresh [`Buffer`] with at least `starting_capacity` bytes
    /// of capacity, rounded up to the next power of two, backed by this
    /// allocator.
    pub fn buffer(&self, starting_capacity: u32) -> Buffer {
        let capacity = next_pow2_clamped(starting_capacity);
        Buffer {
            storage: Arc::new(Storage::allocate_fresh(capacity, *self)),
            slice_lo: 0,
            slice_hi: capacity,
            reader_idx: 0,
            writer_idx: 0,
        }
    }
}

impl Buffer {
    /// An empty buffer backed by the global allocator.
    pub fn new() -> Self {
        AllocatorHandle::default().buffer(0)
    }

    /// A buffer with at least `capacity` bytes of spare room, backed by the
    /// global allocator.
    pub fn with_capacity(capacity: u32) -> Self {
        AllocatorHandle::default().buffer(capacity)
    }

    /// Total addressable bytes in this buffer's slice of its Storage.
    pub fn capacity(&self) -> u32 {
        self.slice_hi - self.slice_lo
    }

    pub fn reader_index(&self) -> u32 {
        self.reader_idx
    }

    pub fn writer_index(&self) -> u32 {
        self.writer_idx
    }

    pub fn readable_bytes(&self) -> u32 {
        self.writer_idx - self.reader_idx
    }

    pub fn writable_bytes(&self) -> u32 {
        self.capacity() - self.writer_idx
    }

    fn base_ptr(&self) -> *mut u8 {
        unsafe { self.storage.base().as_ptr().add(self.slice_lo as usize) }
    }

    fn readable_slice(&self) -> &[u8] {
        let len = self.readable_bytes() as usize;
        unsafe { core::slice::from_raw_parts(self.base_ptr().add(self.reader_idx as usize), len) }
    }

    fn readable_slice_mut(&mut self) -> &mut [u8] {
        let len = self.readable_bytes() as usize;
        unsafe {
            core::slice::from_raw_parts_mut(self.base_ptr().add(self.reader_idx as usize), len)
        }
    }

    fn writable_slice_uninit(&mut self) -> &mut [MaybeUninit<u8>] {
        let len = self.writable_bytes() as usize;
        unsafe {
            core::slice::from_raw_parts_mut(
                self.base_ptr().add(self.writer_idx as usize) as *mut MaybeUninit<u8>,
                len,
            )
        }
    }

    /// Ensures this buffer is the sole owner of its Storage, copying out
    /// into a freshly allocated region of the same capacity if not.
    fn ensure_unique(&mut self) {
        if Arc::strong_count(&self.storage) != 1 {
            self.diverge_to_capacity(self.capacity());
        }
    }

    /// Copy-on-write divergence: allocates fresh storage of `new_capacity`
    /// bytes, copies the current `[0, writer_index)` window into it, and
    /// rebases this buffer's slice to start at `0` in the new storage.
    /// `new_capacity` must already be `>= writer_index` and a power of two
    /// (or zero).
    fn diverge_to_capacity(&mut self, new_capacity: u32) {
        let keep_len = self.writer_idx;
        let allocator = self.storage.allocator();
        let new_storage = Storage::allocate_fresh(new_capacity, allocator);
        if keep_len > 0 {
            unsafe {
                allocator.copy(new_storage.base().as_ptr(), self.base_ptr(), keep_len as usize);
            }
        }
        self.storage = Arc::new(new_storage);
        self.slice_lo = 0;
        self.slice_hi = new_capacity;
    }

    /// Grows (or shrinks) this buffer's Storage in place to `new_capacity`
    /// and extends the slice to cover it. Only valid while uniquely owned.
    fn grow_in_place(&mut self, new_capacity: u32) {
        let target = self
            .slice_lo
            .checked_add(new_capacity)
            .expect("buffer capacity overflow");
        let storage =
            Arc::get_mut(&mut self.storage).expect("grow_in_place called on a shared Storage");
        storage.grow_to(target);
        self.slice_hi = storage.capacity();
    }

    /// Ensures that `need` more bytes are addressable starting at
    /// `at_index`, performing copy-on-write first and growing (doubling)
    /// the Storage if the current capacity doesn't already cover the
    /// request.
    fn ensure_available_capacity(&mut self, need: u32, at_index: u32) {
        let required_end = at_index
            .checked_add(need)
            .expect("buffer index overflow: at_index + need exceeds u32::MAX");
        if required_end <= self.capacity() {
            self.ensure_unique();
            return;
        }
        let mut new_capacity = core::cmp::max(1, self.capacity());
        while new_capacity < required_end && new_capacity != u32::MAX {
            new_capacity = new_capacity.checked_mul(2).unwrap_or(u32::MAX);
        }
        assert!(
            new_capacity >= required_end,
            "buffer capacity overflow: cannot grow past u32::MAX"
        );
        if Arc::strong_count(&self.storage) == 1 {
            self.grow_in_place(new_capacity);
        } else {
            self.diverge_to_capacity(new_capacity);
        }
    }

    /// Reserves at least `additional` bytes of writable capacity beyond the
    /// current writer index.
    pub fn reserve(&mut self, additional: u32) {
        self.ensure_available_capacity(additional, self.writer_idx);
    }

    /// Explicitly resizes this buffer's capacity to (at least) `new_capacity`,
    /// rounded up to the next power of two. Always copies into fresh
    /// storage unless the buffer already exactly occupies a Storage of that
    /// capacity.
    ///
    /// # Panics
    /// Panics if `new_capacity < writer_index`.
    pub fn change_capacity(&mut self, new_capacity: u32) {
        assert!(
            new_capacity >= self.writer_idx,
            "change_capacity: new capacity {} below writer index {}",
            new_capacity,
            self.writer_idx
        );
        let rounded = next_pow2_clamped(new_capacity);
        let is_full_storage_already =
            self.slice_lo == 0 && self.slice_hi == self.storage.capacity();
        if rounded == self.storage.capacity() && is_full_storage_already {
            return;
        }
        self.diverge_to_capacity(rounded);
    }

    /// Reads `length` bytes starting at absolute offset `at`, independent of
    /// the reader/writer indices.
    ///
    /// # Panics
    /// Panics if `at + length` exceeds `capacity()`.
    pub fn get_bytes(&self, at: u32, length: u32) -> &[u8] {
        let end = at
            .checked_add(length)
            .expect("get_bytes: at + length overflows u32");
        assert!(end <= self.capacity(), "get_bytes: range exceeds capacity");
        unsafe { core::slice::from_raw_parts(self.base_ptr().add(at as usize), length as usize) }
    }

    /// Writes `source` starting at absolute offset `at`, growing the buffer
    /// if needed. Does not move the writer index. Returns the number of
    /// bytes written (always `source.len()`).
    pub fn set_bytes(&mut self, source: &[u8], at: u32) -> u32 {
        assert!(
            source.len() <= u32::MAX as usize,
            "set_bytes: source longer than u32::MAX"
        );
        let len = source.len() as u32;
        let end = at
            .checked_add(len)
            .expect("set_bytes: at + source.len() overflows u32");
        if end > self.capacity() {
            self.ensure_available_capacity(len, at);
        } else {
            self.ensure_unique();
        }
        if !source.is_empty() {
            unsafe {
                core::ptr::copy_nonoverlapping(
                    source.as_ptr(),
                    self.base_ptr().add(at as usize),
                    source.len(),
                );
            }
        }
        len
    }

    /// Writes an arbitrary, possibly non-contiguous sequence of bytes
    /// starting at absolute offset `at`, growing the buffer element by
    /// element as needed. `source`'s lower size-hint bound is used as an
    /// initial reservation to avoid repeated reallocation for
    /// well-estimated iterators. Returns the number of bytes written.
    pub fn set_bytes_from_iter(&mut self, source: impl IntoIterator<Item = u8>, at: u32) -> u32 {
        let mut source = source.into_iter();
        let (lower, _) = source.size_hint();
        let lower = u32::try_from(lower).unwrap_or(u32::MAX);
        self.ensure_available_capacity(lower, at);
        let mut idx = at;
        let mut count: u32 = 0;
        for byte in &mut source {
            self.ensure_available_capacity(1, idx);
            unsafe { *self.base_ptr().add(idx as usize) = byte };
            idx = idx
                .checked_add(1)
                .expect("set_bytes_from_iter: index overflow");
            count += 1;
        }
        count
    }

    pub fn move_reader_index_to(&mut self, offset: u32) {
        assert!(
            offset <= self.writer_idx,
            "reader index {} would exceed writer index {}",
            offset,
            self.writer_idx
        );
        self.reader_idx = offset;
    }

    pub fn move_reader_index_forward(&mut self, delta: u32) {
        let target = self
            .reader_idx
            .checked_add(delta)
            .expect("reader index overflow");
        self.move_reader_index_to(target);
    }

    pub fn move_writer_index_to(&mut self, offset: u32) {
        assert!(
            offset <= self.capacity(),
            "writer index {} would exceed capacity {}",
            offset,
            self.capacity()
        );
        self.writer_idx = offset;
    }

    pub fn move_writer_index_forward(&mut self, delta: u32) {
        let target = self
            .writer_idx
            .checked_add(delta)
            .expect("writer index overflow");
        self.move_writer_index_to(target);
    }

    /// Writes `src` at the current writer index, growing as needed, and
    /// advances the writer index by `src.len()`. Returns the number of
    /// bytes written.
    pub fn write_slice(&mut self, src: &[u8]) -> u32 {
        let at = self.writer_idx;
        let written = self.set_bytes(src, at);
        self.writer_idx = at + written;
        written
    }

    /// Returns `len` bytes starting at the reader index without advancing
    /// it.
    ///
    /// # Panics
    /// Panics if `len` exceeds `readable_bytes()`.
    pub fn peek_bytes(&self, len: u32) -> &[u8] {
        assert!(
            len <= self.readable_bytes(),
            "peek_bytes: requested {} bytes but only {} are readable",
            len,
            self.readable_bytes()
        );
        self.get_bytes(self.reader_idx, len)
    }

    /// Copies `dst.len()` readable bytes into `dst` and advances the reader
    /// index by that many bytes.
    ///
    /// # Panics
    /// Panics if `dst.len()` exceeds `readable_bytes()`.
    pub fn copy_to_slice(&mut self, dst: &mut [u8]) {
        assert!(
            dst.len() <= u32::MAX as usize,
            "copy_to_slice: destination longer than u32::MAX"
        );
        let len = dst.len() as u32;
        dst.copy_from_slice(self.peek_bytes(len));
        self.move_reader_index_forward(len);
    }

    /// Reads `len` readable bytes into a freshly allocated `Vec`,
    /// advancing the reader index.
    pub fn read_to_vec(&mut self, len: u32) -> Vec<u8> {
        let mut out = alloc::vec![0u8; len as usize];
        self.copy_to_slice(&mut out);
        out
    }

    /// Runs `body` against the whole readable window of bytes.
    pub fn with_readable<R>(&self, body: impl FnOnce(&[u8]) -> R) -> R {
        body(self.readable_slice())
    }

    /// Performs copy-on-write, then runs `body` against a mutable view of
    /// the whole readable window of bytes.
    pub fn with_readable_mut<R>(&mut self, body: impl FnOnce(&mut [u8]) -> R) -> R {
        self.ensure_unique();
        body(self.readable_slice_mut())
    }

    /// Performs copy-on-write, then runs `body` against a mutable view of
    /// the writable region beyond the writer index, without advancing the
    /// writer index. For callers that want the index to advance by however
    /// much they actually initialized, use
    /// [`Self::write_with_raw_writable_region`] instead.
    pub fn with_writable_mut<R>(&mut self, body: impl FnOnce(&mut [MaybeUninit<u8>]) -> R) -> R {
        self.ensure_unique();
        body(self.writable_slice_uninit())
    }

    /// Performs copy-on-write, exposes the raw writable region beyond the
    /// writer index to `body`, and advances the writer index by whatever
    /// `body` reports having initialized.
    ///
    /// # Panics
    /// Panics if `body` reports writing more bytes than the region it was
    /// given.
    pub fn write_with_raw_writable_region(
        &mut self,
        body: impl FnOnce(&mut [MaybeUninit<u8>]) -> usize,
    ) -> u32 {
        self.ensure_unique();
        let available = self.writable_bytes();
        let written = body(self.writable_slice_uninit());
        assert!(
            written as u32 <= available,
            "write_with_raw_writable_region: body reported writing past the writable region"
        );
        self.writer_idx += written as u32;
        written as u32
    }

    /// Shifts the readable window down to the start of this buffer's slice,
    /// discarding already-consumed bytes and resetting the reader index to
    /// `0`. Returns `false` (and does nothing) if the reader index is
    /// already `0`.
    pub fn discard_read_bytes(&mut self) -> bool {
        if self.reader_idx == 0 {
            return false;
        }
        let keep_len = self.writer_idx - self.reader_idx;
        if Arc::strong_count(&self.storage) == 1 {
            // Safety: uniquely owned, so no other Buffer observes this
            // region. The source and destination ranges can overlap (when
            // reader_idx < keep_len), so this goes through `core::ptr::copy`
            // (memmove) rather than the allocator's non-overlapping `copy`
            // hook.
            unsafe {
                core::ptr::copy(
                    self.base_ptr().add(self.reader_idx as usize),
                    self.base_ptr(),
                    keep_len as usize,
                );
            }
            self.writer_idx = keep_len;
            self.reader_idx = 0;
            true
        } else {
            let capacity = self.storage.capacity();
            let allocator = self.storage.allocator();
            let new_storage = Storage::allocate_fresh(capacity, allocator);
            if keep_len > 0 {
                unsafe {
                    allocator.copy(
                        new_storage.base().as_ptr(),
                        self.base_ptr().add(self.reader_idx as usize),
                        keep_len as usize,
                    );
                }
            }
            self.storage = Arc::new(new_storage);
            self.slice_lo = 0;
            self.slice_hi = capacity;
            self.reader_idx = 0;
            self.writer_idx = keep_len;
            true
        }
    }

    /// Resets both indices to `0`. If shared, allocates fresh storage of the
    /// same capacity rather than copying (nothing in it is observable after
    /// a clear).
    pub fn clear(&mut self) {
        if Arc::strong_count(&self.storage) != 1 {
            let capacity = self.capacity();
            let allocator = self.storage.allocator();
            self.storage = Arc::new(Storage::allocate_fresh(capacity, allocator));
            self.slice_lo = 0;
            self.slice_hi = capacity;
        }
        self.reader_idx = 0;
        self.writer_idx = 0;
    }

    /// Returns a new buffer sharing this one's Storage, windowed to
    /// `[at, at + length)` of this buffer's own slice, with both of its own
    /// indices reset (`reader_index = 0`, `writer_index = length`). Returns
    /// `None` if the requested range exceeds this buffer's capacity.
    pub fn get_slice(&self, at: u32, length: u32) -> Option<Buffer> {
        let end = at.checked_add(length)?;
        if end > self.capacity() {
            return None;
        }
        Some(Buffer {
            storage: Arc::clone(&self.storage),
            slice_lo: self.slice_lo + at,
            slice_hi: self.slice_lo + end,
            reader_idx: 0,
            writer_idx: length,
        })
    }

    /// Retains a handle to this buffer's Storage that can outlive the
    /// buffer itself. Drop (or the explicit [`StorageHandle::release`]) is
    /// the matching release.
    pub fn retain_storage(&self) -> StorageHandle {
        StorageHandle(Arc::clone(&self.storage))
    }

    /// A human-readable dump of this buffer's metadata plus a hex dump of
    /// up to the first 1024 readable bytes.
    pub fn debug_description(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{:?}", self);
        let dump_len = core::cmp::min(self.readable_bytes(), DEBUG_DUMP_LIMIT);
        let bytes = self.peek_bytes(dump_len);
        for (i, byte) in bytes.iter().enumerate() {
            if i % 16 == 0 {
                if i != 0 {
                    out.push('\n');
                }
                let _ = write!(out, "{:08x}: ", i);
            }
            let _ = write!(out, "{:02x} ", byte);
        }
        out
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Buffer {
    fn clone(&self) -> Self {
        Buffer {
            storage: Arc::clone(&self.storage),
            slice_lo: self.slice_lo,
            slice_hi: self.slice_hi,
            reader_idx: self.reader_idx,
            writer_idx: self.writer_idx,
        }
    }
}

impl PartialEq for Buffer {
    fn eq(&self, other: &Self) -> bool {
        if self.readable_bytes() != other.readable_bytes() {
            return false;
        }
        let same_window = Arc::ptr_eq(&self.storage, &other.storage)
            && self.slice_lo == other.slice_lo
            && self.slice_hi == other.slice_hi
            && self.reader_idx == other.reader_idx;
        if same_window {
            return true;
        }
        self.readable_slice() == other.readable_slice()
    }
}

impl Eq for Buffer {}

impl core::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Buffer")
            .field("capacity", &self.capacity())
            .field("slice", &(self.slice_lo..self.slice_hi))
            .field("reader_index", &self.reader_idx)
            .field("writer_index", &self.writer_idx)
            .field("storage", &self.storage.base().as_ptr())
            .finish()
    }
}

/// An opaque handle extending a Storage's lifetime beyond the [`Buffer`]
/// that produced it, obtained from [`Buffer::retain_storage`].
///
/// The handle itself is just a clone of the underlying `Arc`; retain/release
/// balance is enforced by ordinary Rust ownership rather than by a runtime
/// check.
pub struct StorageHandle(Arc<Storage>);

impl StorageHandle {
    /// Releases this handle. Equivalent to dropping it.
    pub fn release(self) {}
}

#[cfg(feature = "std")]
impl std::io::Read for Buffer {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let len = core::cmp::min(buf.len(), self.readable_bytes() as usize);
        self.copy_to_slice(&mut buf[..len]);
        Ok(len)
    }
}

#[cfg(feature = "std")]
impl std::io::BufRead for Buffer {
    fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
        Ok(self.readable_slice())
    }

    fn consume(&mut self, amt: usize) {
        self.move_reader_index_forward(amt as u32);
    }
}

#[cfg(feature = "std")]
impl std::io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Ok(self.write_slice(buf) as usize)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_sequential_write_then_read() {
        let mut buf = Buffer::with_capacity(8);
        assert_eq!(buf.write_slice(b"abcd"), 4);
        assert_eq!(buf.writer_index(), 4);
        assert_eq!(buf.readable_bytes(), 4);
        let got = buf.read_to_vec(4);
        assert_eq!(&got, b"abcd");
        assert_eq!(buf.reader_index(), 4);
        assert_eq!(buf.readable_bytes(), 0);
    }

    #[test]
    fn s2_growth_doubles_and_rounds_to_power_of_two() {
        let mut buf = Buffer::with_capacity(1);
        assert_eq!(buf.capacity(), 1);
        buf.write_slice(&[0u8; 5]);
        assert_eq!(buf.capacity(), 8);
        assert_eq!(buf.writer_index(), 5);
    }

    #[test]
    fn s3_clone_is_independent_but_shares_bytes_until_mutation() {
        let mut a = Buffer::with_capacity(16);
        a.write_slice(b"hello");
        let b = a.clone();
        assert_eq!(a, b);
        a.write_slice(b"!");
        assert_ne!(a.readable_bytes(), b.readable_bytes());
    }

    #[test]
    fn s3_mutating_one_clone_does_not_affect_the_other() {
        let mut a = Buffer::with_capacity(16);
        a.write_slice(b"hello");
        let mut b = a.clone();
        b.write_slice(b" world");
        assert_eq!(a.readable_bytes(), 5);
        assert_eq!(b.readable_bytes(), 11);
        let a_bytes = a.read_to_vec(5);
        assert_eq!(&a_bytes, b"hello");
    }

    #[test]
    fn s4_get_slice_shares_storage_but_resets_indices() {
        let mut buf = Buffer::with_capacity(16);
        buf.write_slice(b"0123456789");
        let slice = buf.get_slice(2, 4).expect("range within capacity");
        assert_eq!(slice.reader_index(), 0);
        assert_eq!(slice.writer_index(), 4);
        assert_eq!(slice.peek_bytes(4), b"2345");
    }

    #[test]
    fn get_slice_out_of_range_returns_none() {
        let buf = Buffer::with_capacity(8);
        assert!(buf.get_slice(4, 8).is_none());
        assert!(buf.get_slice(u32::MAX, 1).is_none());
    }

    #[test]
    fn s5_discard_read_bytes_owned_shifts_in_place() {
        let mut buf = Buffer::with_capacity(16);
        buf.write_slice(b"0123456789");
        buf.move_reader_index_forward(4);
        assert!(buf.discard_read_bytes());
        assert_eq!(buf.reader_index(), 0);
        assert_eq!(buf.writer_index(), 6);
        assert_eq!(buf.peek_bytes(6), b"456789");
    }

    #[test]
    fn discard_read_bytes_noop_when_reader_at_zero() {
        let mut buf = Buffer::with_capacity(8);
        buf.write_slice(b"ab");
        assert!(!buf.discard_read_bytes());
    }

    #[test]
    fn s5_discard_read_bytes_shared_diverges() {
        let mut a = Buffer::with_capacity(16);
        a.write_slice(b"0123456789");
        a.move_reader_index_forward(4);
        let b = a.clone();
        assert!(a.discard_read_bytes());
        assert_eq!(a.peek_bytes(6), b"456789");
        assert_eq!(b.peek_bytes(6), b"456789");
    }

    #[test]
    fn s6_clear_resets_indices() {
        let mut buf = Buffer::with_capacity(16);
        buf.write_slice(b"hello");
        buf.move_reader_index_forward(2);
        buf.clear();
        assert_eq!(buf.reader_index(), 0);
        assert_eq!(buf.writer_index(), 0);
        assert_eq!(buf.readable_bytes(), 0);
    }

    #[test]
    fn clear_on_shared_buffer_does_not_affect_the_other_clone() {
        let mut a = Buffer::with_capacity(16);
        a.write_slice(b"hello");
        let b = a.clone();
        a.clear();
        assert_eq!(a.readable_bytes(), 0);
        assert_eq!(b.readable_bytes(), 5);
    }

    #[test]
    fn change_capacity_no_op_when_already_exact() {
        let mut buf = Buffer::with_capacity(8);
        buf.write_slice(b"ab");
        buf.change_capacity(8);
        assert_eq!(buf.capacity(), 8);
    }

    #[test]
    fn change_capacity_grows_and_preserves_written_bytes() {
        let mut buf = Buffer::with_capacity(4);
        buf.write_slice(b"ab");
        buf.change_capacity(64);
        assert_eq!(buf.capacity(), 64);
        assert_eq!(buf.peek_bytes(2), b"ab");
    }

    #[test]
    #[should_panic]
    fn change_capacity_below_writer_index_panics() {
        let mut buf = Buffer::with_capacity(8);
        buf.write_slice(b"abcd");
        buf.change_capacity(2);
    }

    #[test]
    fn get_bytes_and_set_bytes_are_index_agnostic() {
        let mut buf = Buffer::with_capacity(8);
        buf.set_bytes(b"xyz", 3);
        assert_eq!(buf.writer_index(), 0);
        assert_eq!(buf.get_bytes(3, 3), b"xyz");
    }

    #[test]
    fn set_bytes_from_iter_grows_as_needed() {
        let mut buf = Buffer::with_capacity(1);
        let written = buf.set_bytes_from_iter(0u8..16, 0);
        assert_eq!(written, 16);
        assert!(buf.capacity() >= 16);
        assert_eq!(
            buf.get_bytes(0, 16),
            &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]
        );
    }

    #[test]
    fn write_with_raw_writable_region_advances_writer_index() {
        let mut buf = Buffer::with_capacity(8);
        buf.reserve(4);
        let written = buf.write_with_raw_writable_region(|region| {
            for (i, slot) in region.iter_mut().take(4).enumerate() {
                slot.write(i as u8);
            }
            4
        });
        assert_eq!(written, 4);
        assert_eq!(buf.peek_bytes(4), &[0, 1, 2, 3]);
    }

    #[test]
    fn with_writable_mut_does_not_advance_writer_index() {
        let mut buf = Buffer::with_capacity(8);
        buf.reserve(4);
        buf.with_writable_mut(|region| {
            region[0].write(0xAA);
        });
        assert_eq!(buf.writer_index(), 0);
        assert_eq!(buf.get_bytes(0, 1), &[0xAA]);
    }

    #[test]
    fn equality_compares_only_the_readable_window() {
        let mut a = Buffer::with_capacity(8);
        a.write_slice(b"xxab");
        a.move_reader_index_forward(2);
        let mut b = Buffer::with_capacity(4);
        b.write_slice(b"ab");
        assert_eq!(a, b);
    }

    #[test]
    fn debug_description_includes_hex_dump() {
        let mut buf = Buffer::with_capacity(8);
        buf.write_slice(b"ab");
        let desc = buf.debug_description();
        assert!(desc.contains("61 62"));
    }

    #[cfg(feature = "std")]
    #[test]
    fn std_io_read_and_write_bridge() {
        use std::io::{Read, Write};
        let mut buf = Buffer::with_capacity(4);
        buf.write_all(b"hello").unwrap();
        let mut out = [0u8; 5];
        buf.read_exact(&mut out).unwrap();
        assert_eq!(&out, b"hello");
    }
}
