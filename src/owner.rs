//! Ownership collaborator - stable handles for managed composites
//!
//! Design: The bridge only needs two capabilities: turn a composite into a
//! handle native code can hold, and turn a handle it gave out back into the
//! same composite. [`HandleTable`] is a reference-counted implementation of
//! both for embedders that have no engine-specific wrapper.
//!
//! All of this runs on the engine thread. `Object` is `!Send`, so a table
//! holding objects cannot leave that thread either.

use crate::logging::trace;
use crate::value::Object;
use core::ffi::c_void;
use core::ptr::NonNull;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;

/// Opaque native-visible handle
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Handle(NonNull<c_void>);

impl Handle {
    #[inline]
    pub fn from_ptr(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    #[inline]
    pub const fn from_non_null(ptr: NonNull<c_void>) -> Self {
        Self(ptr)
    }

    #[inline]
    pub const fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }

    #[inline]
    fn key(self) -> usize {
        self.0.as_ptr() as usize
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({:p})", self.0)
    }
}

/// Wraps managed composites into handles and resolves them back
pub trait ValueOwner {
    /// Produce a handle for `object` that stays valid for its registered
    /// lifetime. Must be called on the engine thread.
    ///
    /// A handle must not be reissued for a different object after its
    /// registration ends, or a stale native copy would resolve to the
    /// wrong composite.
    fn wrap(&self, object: &Object) -> Handle;

    /// The object previously registered under `handle`, if any
    fn resolve(&self, handle: Handle) -> Option<Object>;
}

impl<T: ValueOwner + ?Sized> ValueOwner for &T {
    fn wrap(&self, object: &Object) -> Handle {
        (**self).wrap(object)
    }

    fn resolve(&self, handle: Handle) -> Option<Object> {
        (**self).resolve(handle)
    }
}

struct Entry {
    object: Object,
    refs: u32,
}

/// Reference-counted handle registry
///
/// Wrapping the same object twice returns the same handle and bumps its
/// count; [`HandleTable::release`] drops the registration at zero.
///
/// Handles are sequence numbers, never addresses, and are not reused: once
/// released, a handle resolves to nothing for the rest of the table's life.
pub struct HandleTable {
    entries: RefCell<HashMap<usize, Entry>>,
    by_object: RefCell<HashMap<*const (), Handle>>,
    next_id: Cell<usize>,
}

impl Default for HandleTable {
    fn default() -> Self {
        Self {
            entries: RefCell::default(),
            by_object: RefCell::default(),
            next_id: Cell::new(1),
        }
    }
}

impl HandleTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue(&self) -> Handle {
        let id = self.next_id.get();
        let Some(next) = id.checked_add(1) else {
            panic!("handle table exhausted after {id} registrations");
        };
        self.next_id.set(next);

        match NonNull::new(id as *mut c_void) {
            Some(ptr) => Handle(ptr),
            None => unreachable!("handle ids start at 1"),
        }
    }

    /// Drop one reference; returns false for a handle this table does not
    /// currently hold. The handle is dead once its count reaches zero.
    pub fn release(&self, handle: Handle) -> bool {
        let mut entries = self.entries.borrow_mut();
        let Some(entry) = entries.get_mut(&handle.key()) else {
            return false;
        };

        debug_assert!(entry.refs > 0, "handle refcount underflow");
        entry.refs -= 1;
        trace!(event = "handle_release", handle = ?handle, count = entry.refs);

        if entry.refs == 0 {
            if let Some(entry) = entries.remove(&handle.key()) {
                self.by_object.borrow_mut().remove(&entry.object.addr());
            }
        }
        true
    }

    /// Current reference count (0 for unknown handles)
    pub fn refcount(&self, handle: Handle) -> u32 {
        self.entries
            .borrow()
            .get(&handle.key())
            .map_or(0, |entry| entry.refs)
    }

    /// Number of registered objects
    pub fn live(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.live() == 0
    }
}

impl ValueOwner for HandleTable {
    fn wrap(&self, object: &Object) -> Handle {
        if let Some(&handle) = self.by_object.borrow().get(&object.addr()) {
            if let Some(entry) = self.entries.borrow_mut().get_mut(&handle.key()) {
                entry.refs = entry.refs.saturating_add(1);
                trace!(event = "handle_wrap", handle = ?handle, count = entry.refs);
                return handle;
            }
        }

        let handle = self.issue();
        trace!(event = "handle_wrap", handle = ?handle, count = 1u32);

        self.entries.borrow_mut().insert(
            handle.key(),
            Entry {
                object: object.clone(),
                refs: 1,
            },
        );
        self.by_object.borrow_mut().insert(object.addr(), handle);
        handle
    }

    fn resolve(&self, handle: Handle) -> Option<Object> {
        self.entries
            .borrow()
            .get(&handle.key())
            .map(|entry| entry.object.clone())
    }
}

impl fmt::Debug for HandleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleTable")
            .field("live", &self.live())
            .finish()
    }
}
