//! Native metadata records
//!
//! Three allocations per exported type, all from the native allocator:
//! the type name, the name arena (copied in one piece), and the member
//! array. Each `MemberInfo.member_name` points at arena base + offset.
//! After [`TypeLayout::export`] returns, native code owns all of it.

use super::layout::TypeLayout;
use crate::alloc::{alloc_or_abort, NativeAllocator};
use crate::interop::{DataType, RawView};
use crate::logging::debug;
use core::ffi::{c_char, c_int, CStr};
use core::ptr::NonNull;

/// One member as native introspection sees it
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MemberInfo {
    pub member_name: *const c_char,
    pub member_type: c_int,
    pub member_index: c_int,
}

impl MemberInfo {
    /// # Safety
    /// The owning [`TypeInfo`] must still be alive.
    pub unsafe fn name(&self) -> &CStr {
        CStr::from_ptr(self.member_name)
    }

    pub fn data_type(&self) -> Option<DataType> {
        DataType::from_raw(self.member_type)
    }
}

/// One exposed composite as native introspection sees it
#[repr(C)]
#[derive(Debug)]
pub struct TypeInfo {
    pub type_name: *mut c_char,
    pub member_names: *mut c_char,
    pub members: *mut MemberInfo,
    pub members_len: c_int,
}

impl TypeInfo {
    /// # Safety
    /// `self` must come from [`TypeLayout::export`] and not be freed.
    pub unsafe fn type_name(&self) -> &CStr {
        CStr::from_ptr(self.type_name)
    }

    /// # Safety
    /// `self` must come from [`TypeLayout::export`] and not be freed.
    pub unsafe fn members(&self) -> &[MemberInfo] {
        if self.members_len <= 0 {
            return &[];
        }
        core::slice::from_raw_parts(self.members, self.members_len as usize)
    }
}

impl TypeLayout {
    /// Materialise the layout as native records
    ///
    /// The returned pointer and everything reachable from it belong to
    /// native code; release with [`free_type_info`] using the same allocator.
    pub fn export<A: NativeAllocator + ?Sized>(&self, alloc: &A) -> NonNull<TypeInfo> {
        // Bounded by `TypeLayout::build`.
        let members_len = self.len() as c_int;
        let type_name = copy_c_string(self.type_name().as_bytes(), alloc);
        let member_names = copy_bytes(self.names(), alloc);

        let members = alloc_or_abort(
            alloc,
            core::mem::size_of::<MemberInfo>() * self.len(),
        )
        .cast::<MemberInfo>();

        for (i, member) in self.members().iter().enumerate() {
            let info = MemberInfo {
                member_name: unsafe { member_names.as_ptr().add(member.offset()) } as *const c_char,
                member_type: member.data_type().as_raw(),
                member_index: member.index() as c_int,
            };
            unsafe { members.as_ptr().add(i).write(info) };
        }

        let info = alloc_or_abort(alloc, core::mem::size_of::<TypeInfo>()).cast::<TypeInfo>();
        unsafe {
            info.as_ptr().write(TypeInfo {
                type_name: type_name.as_ptr() as *mut c_char,
                member_names: member_names.as_ptr() as *mut c_char,
                members: members.as_ptr(),
                members_len,
            });
        }

        debug!(
            event = "type_info_export",
            type_name = self.type_name(),
            members = members_len,
            "type metadata handed to native code"
        );
        info
    }
}

/// Release everything [`TypeLayout::export`] allocated
///
/// # Safety
/// `info` must come from `export` with the same allocator, and must not be
/// used or freed again.
pub unsafe fn free_type_info<A: NativeAllocator + ?Sized>(info: NonNull<TypeInfo>, alloc: &A) {
    let record = info.as_ptr().read();
    alloc.free(record.members as *mut u8);
    alloc.free(record.member_names as *mut u8);
    alloc.free(record.type_name as *mut u8);
    alloc.free(info.as_ptr() as *mut u8);
}

fn copy_bytes<A: NativeAllocator + ?Sized>(bytes: &[u8], alloc: &A) -> NonNull<u8> {
    let view = RawView::of_bytes(bytes);
    let dst = alloc_or_abort(alloc, bytes.len());
    unsafe {
        core::ptr::copy_nonoverlapping(view.ptr() as *const u8, dst.as_ptr(), view.len() as usize);
    }
    dst
}

fn copy_c_string<A: NativeAllocator + ?Sized>(bytes: &[u8], alloc: &A) -> NonNull<u8> {
    let view = RawView::of_bytes(bytes);
    let len = view.len() as usize;
    let dst = alloc_or_abort(alloc, len + 1);
    unsafe {
        core::ptr::copy_nonoverlapping(view.ptr() as *const u8, dst.as_ptr(), len);
        dst.as_ptr().add(len).write(0);
    }
    dst
}
