//! Pluggable allocation backend for [`Buffer`](crate::Buffer).
//!
//! An [`AllocatorHandle`] is a cheaply-copyable bundle of four raw function
//! pointers: allocate, reallocate, free, and copy. It plays the role a vtable
//! would play in a C-ABI allocator interface, without requiring a trait
//! object or any dynamic dispatch overhead beyond an indirect call.

use alloc::alloc::{Layout, handle_alloc_error};
use core::ptr::NonNull;

/// Allocates a fresh region of exactly `nbytes` bytes. Must never be called
/// with `nbytes == 0`. Returns a null pointer on failure.
pub type AllocateFn = unsafe extern "C" fn(nbytes: usize) -> *mut u8;

/// Resizes a region previously obtained from `allocate`/`reallocate` from
/// `old_nbytes` to `new_nbytes`, preserving the first `min(old_nbytes,
/// new_nbytes)` bytes. Must never be called with either length equal to
/// zero. Returns a null pointer on failure, in which case `ptr` is still
/// valid and unchanged.
pub type ReallocateFn =
    unsafe extern "C" fn(ptr: *mut u8, old_nbytes: usize, new_nbytes: usize) -> *mut u8;

/// Releases a region of exactly `nbytes` bytes previously obtained from
/// `allocate`/`reallocate`. Must never be called with `nbytes == 0`.
pub type FreeFn = unsafe extern "C" fn(ptr: *mut u8, nbytes: usize);

/// Copies `nbytes` bytes from `src` to `dst`. The two regions must not
/// overlap.
pub type CopyFn = unsafe extern "C" fn(dst: *mut u8, src: *const u8, nbytes: usize);

/// An immutable, `Copy` bundle of the four hooks a [`Buffer`](crate::Buffer)
/// uses to manage its backing memory.
///
/// The default handle binds these hooks to the global allocator
/// (`alloc::alloc`). Embedders that need buffers drawn from an arena, a
/// pool, or shared memory construct their own handle via [`Self::new`].
#[derive(Clone, Copy)]
pub struct AllocatorHandle {
    allocate_fn: AllocateFn,
    reallocate_fn: ReallocateFn,
    free_fn: FreeFn,
    copy_fn: CopyFn,
}

impl AllocatorHandle {
    /// Builds a handle from caller-supplied hooks.
    ///
    /// # Safety
    /// The four function pointers must uphold the contracts documented on
    /// [`AllocateFn`], [`ReallocateFn`], [`FreeFn`], and [`CopyFn`]. Every
    /// `Storage` built from this handle trusts them without further checks.
    pub unsafe fn new(
        allocate_fn: AllocateFn,
        reallocate_fn: ReallocateFn,
        free_fn: FreeFn,
        copy_fn: CopyFn,
    ) -> Self {
        Self {
            allocate_fn,
            reallocate_fn,
            free_fn,
            copy_fn,
        }
    }

    pub(crate) unsafe fn allocate(&self, nbytes: usize) -> NonNull<u8> {
        debug_assert!(nbytes > 0);
        let ptr = unsafe { (self.allocate_fn)(nbytes) };
        NonNull::new(ptr).unwrap_or_else(|| handle_failure(nbytes))
    }

    pub(crate) unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_nbytes: usize,
        new_nbytes: usize,
    ) -> NonNull<u8> {
        debug_assert!(old_nbytes > 0 && new_nbytes > 0);
        let new_ptr = unsafe { (self.reallocate_fn)(ptr.as_ptr(), old_nbytes, new_nbytes) };
        NonNull::new(new_ptr).unwrap_or_else(|| handle_failure(new_nbytes))
    }

    pub(crate) unsafe fn free(&self, ptr: NonNull<u8>, nbytes: usize) {
        debug_assert!(nbytes > 0);
        unsafe { (self.free_fn)(ptr.as_ptr(), nbytes) }
    }

    pub(crate) unsafe fn copy(&self, dst: *mut u8, src: *const u8, nbytes: usize) {
        unsafe { (self.copy_fn)(dst, src, nbytes) }
    }
}

impl Default for AllocatorHandle {
    fn default() -> Self {
        // Safety: the four `system_*` functions below satisfy the contracts
        // `new` requires.
        unsafe { Self::new(system_allocate, system_reallocate, system_free, system_copy) }
    }
}

impl core::fmt::Debug for AllocatorHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AllocatorHandle").finish_non_exhaustive()
    }
}

fn handle_failure(nbytes: usize) -> ! {
    let layout = Layout::array::<u8>(nbytes).unwrap_or_else(|_| Layout::new::<u8>());
    handle_alloc_error(layout)
}

fn byte_layout(nbytes: usize) -> Layout {
    Layout::array::<u8>(nbytes).expect("allocation size exceeds addressable range")
}

unsafe extern "C" fn system_allocate(nbytes: usize) -> *mut u8 {
    unsafe { alloc::alloc::alloc(byte_layout(nbytes)) }
}

unsafe extern "C" fn system_reallocate(ptr: *mut u8, old_nbytes: usize, new_nbytes: usize) -> *mut u8 {
    unsafe { alloc::alloc::realloc(ptr, byte_layout(old_nbytes), new_nbytes) }
}

unsafe extern "C" fn system_free(ptr: *mut u8, nbytes: usize) {
    unsafe { alloc::alloc::dealloc(ptr, byte_layout(nbytes)) }
}

unsafe extern "C" fn system_copy(dst: *mut u8, src: *const u8, nbytes: usize) {
    unsafe { core::ptr::copy_nonoverlapping(src, dst, nbytes) }
}
