//! The arena each [`Buffer`](crate::Buffer) borrows its bytes from.

use core::ptr::NonNull;

use crate::alloc_handle::AllocatorHandle;

/// Rounds `n` up to the next power of two, clamped at `u32::MAX` instead of
/// overflowing. `0` stays `0`.
pub(crate) fn next_pow2_clamped(n: u32) -> u32 {
    if n == 0 {
        0
    } else {
        n.checked_next_power_of_two().unwrap_or(u32::MAX)
    }
}

/// A raw heap region shared by every `Buffer` descended from the same
/// allocation.
///
/// `Storage` has no notion of readers, writers, or slices; it's just
/// `capacity` bytes starting at `base`, plus the allocator that owns them.
/// Sharing and uniqueness are handled by wrapping `Storage` in
/// `alloc::sync::Arc` rather than reimplementing atomic refcounting here:
/// `Arc::strong_count(&self.storage) == 1` is the "uniquely owned" check,
/// and `Arc::get_mut` is the gate on mutating `base`/`capacity` in place.
pub(crate) struct Storage {
    base: NonNull<u8>,
    capacity: u32,
    allocator: AllocatorHandle,
}

// `Storage` is not `Send`/`Sync` by auto-trait inference because it holds a
// `NonNull<u8>`. It's sound to mark both: `base` is only ever read through,
// written through, or reallocated while the owning `Arc`'s strong count is
// known to be 1 (enforced by every call site in `buffer.rs`), and the
// allocator hooks are plain function pointers.
unsafe impl Send for Storage {}
unsafe impl Sync for Storage {}

impl Storage {
    pub(crate) fn allocate_fresh(capacity: u32, allocator: AllocatorHandle) -> Storage {
        let base = if capacity == 0 {
            NonNull::dangling()
        } else {
            unsafe { allocator.allocate(capacity as usize) }
        };
        Storage {
            base,
            capacity,
            allocator,
        }
    }

    pub(crate) fn base(&self) -> NonNull<u8> {
        self.base
    }

    pub(crate) fn capacity(&self) -> u32 {
        self.capacity
    }

    pub(crate) fn allocator(&self) -> AllocatorHandle {
        self.allocator
    }

    /// Resizes this storage to `new_capacity`, growing or shrinking in
    /// place. Only sound to call while uniquely owned, i.e. through
    /// `Arc::get_mut`.
    pub(crate) fn grow_to(&mut self, new_capacity: u32) {
        if new_capacity == self.capacity {
            return;
        }
        let new_base = if self.capacity > 0 {
            if new_capacity > 0 {
                unsafe {
                    self.allocator
                        .reallocate(self.base, self.capacity as usize, new_capacity as usize)
                }
            } else {
                unsafe { self.allocator.free(self.base, self.capacity as usize) };
                NonNull::dangling()
            }
        } else if new_capacity > 0 {
            unsafe { self.allocator.allocate(new_capacity as usize) }
        } else {
            NonNull::dangling()
        };
        self.base = new_base;
        self.capacity = new_capacity;
    }
}

impl Drop for Storage {
    fn drop(&mut self) {
        if self.capacity > 0 {
            unsafe { self.allocator.free(self.base, self.capacity as usize) };
        }
    }
}
