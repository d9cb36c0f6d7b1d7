//! Native allocator seam
//!
//! Buffers that change hands across the boundary must be freed by the
//! allocator that produced them. Strings arriving from native code were
//! malloc'd there, and type metadata handed to native code must be
//! releasable with free, so the default is the C heap.

use core::ffi::c_void;
use core::ptr::NonNull;
use std::alloc::{handle_alloc_error, Layout};

/// Allocator shared with native code
///
/// # Safety
/// Implementations must return memory aligned for any fundamental type
/// (like `malloc`), and `free` must accept exactly the pointers `alloc`
/// returned, plus null as a no-op.
pub unsafe trait NativeAllocator {
    /// Allocate `size` bytes; null on failure
    fn alloc(&self, size: usize) -> *mut u8;

    /// Release a block from [`NativeAllocator::alloc`]
    ///
    /// # Safety
    /// `ptr` must be null or a live block from this allocator, released once.
    unsafe fn free(&self, ptr: *mut u8);
}

unsafe impl<A: NativeAllocator + ?Sized> NativeAllocator for &A {
    fn alloc(&self, size: usize) -> *mut u8 {
        (**self).alloc(size)
    }

    unsafe fn free(&self, ptr: *mut u8) {
        (**self).free(ptr)
    }
}

/// The C heap (`malloc` / `free`)
#[derive(Debug, Clone, Copy, Default)]
pub struct LibcAllocator;

unsafe impl NativeAllocator for LibcAllocator {
    #[inline]
    fn alloc(&self, size: usize) -> *mut u8 {
        // malloc(0) may return null; always ask for at least one byte.
        unsafe { libc::malloc(size.max(1)) as *mut u8 }
    }

    #[inline]
    unsafe fn free(&self, ptr: *mut u8) {
        libc::free(ptr as *mut c_void)
    }
}

/// Allocate or abort the process, matching std's out-of-memory behavior
pub(crate) fn alloc_or_abort<A: NativeAllocator + ?Sized>(alloc: &A, size: usize) -> NonNull<u8> {
    match NonNull::new(alloc.alloc(size)) {
        Some(ptr) => ptr,
        None => {
            let layout = Layout::from_size_align(size.max(1), 1).unwrap_or(Layout::new::<u8>());
            handle_alloc_error(layout)
        }
    }
}
