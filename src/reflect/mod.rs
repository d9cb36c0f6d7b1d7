//! Reflection metadata - struct/member descriptors for native introspection
//!
//! Design: Built once per exposed type during binding setup.
//! - `layout.rs` - owned description: one name arena, offset/length per member
//! - `native.rs` - the `#[repr(C)]` records native code keeps for good
//!
//! Rust has no runtime field reflection, so exposed types describe their
//! fields through [`Composite`], usually via [`impl_composite!`].

mod layout;
mod native;

pub use layout::{external_name, MemberLayout, TypeLayout};
pub use native::{free_type_info, MemberInfo, TypeInfo};

use crate::error::Result;
use crate::interop::TypeDesc;
use crate::probe::Platform;
use std::rc::Rc;

/// One field of an exposed composite, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    name: &'static str,
    ty: TypeDesc,
}

impl Field {
    pub fn new(name: &'static str, ty: TypeDesc) -> Self {
        debug_assert!(!name.contains('\0'), "field name {name:?} contains NUL");
        Self { name, ty }
    }

    /// Field `name` of static type `T`
    pub fn of<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self::new(name, TypeDesc::of::<T>())
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn ty(&self) -> &TypeDesc {
        &self.ty
    }
}

/// A composite type exposed to native code
pub trait Composite: 'static {
    /// Name reported to native code; the unqualified Rust type name by default
    fn type_name() -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Fields in declaration order, under their source names
    fn fields() -> Vec<Field>;
}

// Indirection is transparent: a pointer to a composite describes the pointee.

impl<T: Composite> Composite for Box<T> {
    fn type_name() -> &'static str {
        T::type_name()
    }

    fn fields() -> Vec<Field> {
        T::fields()
    }
}

impl<T: Composite> Composite for Rc<T> {
    fn type_name() -> &'static str {
        T::type_name()
    }

    fn fields() -> Vec<Field> {
        T::fields()
    }
}

impl<T: Composite> Composite for &'static T {
    fn type_name() -> &'static str {
        T::type_name()
    }

    fn fields() -> Vec<Field> {
        T::fields()
    }
}

/// `a::b::Point<c::D>` → `Point`
fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Metadata for the type of a representative value
pub fn type_info<T: Composite>(_value: &T, platform: &Platform) -> Result<TypeLayout> {
    TypeLayout::of::<T>(platform)
}

/// Implement [`Composite`] by listing a struct's fields
///
/// Fields are named by their Rust identifiers, in declaration order, each
/// with its declared type. `field as "Name"` overrides the source name the
/// external name is folded from. Every field must be listed: a missing,
/// unknown or mistyped field fails to compile.
///
/// ```rust
/// struct Point { x: i32, y: i32 }
/// tagbridge::impl_composite!(Point { x: i32, y: i32 });
///
/// struct Label { text: String, font_size: f32 }
/// tagbridge::impl_composite!(Label as "QLabel" { text as "Text": String, font_size as "FontSize": f32 });
/// ```
///
/// ```compile_fail
/// struct Point { x: i32, y: i32 }
/// tagbridge::impl_composite!(Point { x: i32, y: i64 });
/// ```
///
/// ```compile_fail
/// struct Point { x: i32, y: i32 }
/// tagbridge::impl_composite!(Point { x: i32 });
/// ```
#[macro_export]
macro_rules! impl_composite {
    (@name $field:ident $name:literal) => {
        $name
    };
    (@name $field:ident) => {
        ::core::stringify!($field)
    };
    (@fields $($field:ident $(as $name:literal)? : $field_ty:ty),* $(,)?) => {
        fn fields() -> ::std::vec::Vec<$crate::reflect::Field> {
            let _ = |value: &Self| {
                let Self { $($field: _),* } = value;
                $(let _: *const $field_ty = ::core::ptr::addr_of!(value.$field);)*
            };

            ::std::vec![$(
                $crate::reflect::Field::of::<$field_ty>(
                    $crate::impl_composite!(@name $field $($name)?)
                )
            ),*]
        }
    };
    ($ty:ty as $type_name:literal { $($body:tt)* }) => {
        impl $crate::reflect::Composite for $ty {
            fn type_name() -> &'static str {
                $type_name
            }

            $crate::impl_composite!(@fields $($body)*);
        }
    };
    ($ty:ty { $($body:tt)* }) => {
        impl $crate::reflect::Composite for $ty {
            $crate::impl_composite!(@fields $($body)*);
        }
    };
}

#[cfg(test)]
mod tests;
