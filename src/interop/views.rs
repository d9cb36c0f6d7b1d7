//! Raw memory views - zero-copy pointer/length windows
//!
//! Crate-private: a view outliving its source is silent memory
//! corruption, not an error. The lifetime parameter carries the borrow for
//! managed sources; [`RawView::from_raw`] is the one unchecked entry point.

use core::ffi::{c_char, c_int};
use core::marker::PhantomData;

/// Non-owning (pointer, length) window into bytes that live for `'a`
#[derive(Clone, Copy)]
pub(crate) struct RawView<'a> {
    ptr: *const c_char,
    len: c_int,
    _marker: PhantomData<&'a [u8]>,
}

impl<'a> RawView<'a> {
    /// View a managed string. Not null-terminated.
    #[inline]
    pub(crate) fn of_str(s: &'a str) -> Self {
        Self::of_bytes(s.as_bytes())
    }

    /// View a managed byte sequence. Not null-terminated.
    #[inline]
    pub(crate) fn of_bytes(bytes: &'a [u8]) -> Self {
        assert!(
            bytes.len() <= c_int::MAX as usize,
            "buffer of {} bytes exceeds the boundary length field",
            bytes.len()
        );
        Self {
            ptr: bytes.as_ptr() as *const c_char,
            len: bytes.len() as c_int,
            _marker: PhantomData,
        }
    }

    /// View a buffer owned by native code
    ///
    /// # Safety
    /// `ptr` must be readable for `len` bytes for all of `'a`, and nothing
    /// may free or move the buffer while the view or anything borrowed from
    /// it is alive. `ptr` may be null only when `len` is zero.
    #[inline]
    pub(crate) unsafe fn from_raw(ptr: *const c_char, len: c_int) -> Self {
        debug_assert!(len >= 0, "negative buffer length {len}");
        debug_assert!(!ptr.is_null() || len == 0, "null buffer with length {len}");
        Self {
            ptr,
            len: len.max(0),
            _marker: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn ptr(&self) -> *const c_char {
        self.ptr
    }

    #[inline]
    pub(crate) fn len(&self) -> c_int {
        self.len
    }

    /// Borrow the viewed bytes
    #[inline]
    pub(crate) fn as_bytes(&self) -> &'a [u8] {
        if self.len == 0 {
            return &[];
        }
        // Invariant established by the constructors.
        unsafe { core::slice::from_raw_parts(self.ptr as *const u8, self.len as usize) }
    }

    /// Borrow the viewed bytes as text, if they are UTF-8
    #[inline]
    pub(crate) fn as_str(&self) -> Option<&'a str> {
        core::str::from_utf8(self.as_bytes()).ok()
    }
}
