//! Type resolution - static type to boundary tag
//!
//! Resolution is by exact type identity, not shape. A newtype over `String`
//! is not `String`: it resolves (and fails) on its own, so native-side
//! introspection can special-case it later.

use super::types::DataType;
use crate::error::{BridgeError, Result};
use crate::logging::error;
use crate::probe::Platform;
use crate::value::Value;
use std::any::TypeId;
use std::fmt;

/// Static type descriptor
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDesc {
    id: TypeId,
    name: &'static str,
}

impl TypeDesc {
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDesc({})", self.name)
    }
}

/// Lookup without reporting; `None` for unsupported types
pub(crate) fn lookup(ty: &TypeDesc, platform: &Platform) -> Option<DataType> {
    let id = ty.id;
    let data_type = if id == TypeId::of::<String>() {
        DataType::String
    } else if id == TypeId::of::<bool>() {
        DataType::Bool
    } else if id == TypeId::of::<isize>() {
        platform.int_type()
    } else if id == TypeId::of::<i64>() {
        DataType::Int64
    } else if id == TypeId::of::<i32>() {
        DataType::Int32
    } else if id == TypeId::of::<f64>() {
        DataType::Float64
    } else if id == TypeId::of::<f32>() {
        DataType::Float32
    } else if id == TypeId::of::<Value>() {
        // Unconstrained dynamic slot
        DataType::Any
    } else {
        return None;
    };
    Some(data_type)
}

/// Boundary tag for a static type
///
/// Unsupported types are a setup-time failure carrying the type's name.
pub fn data_type_of(ty: &TypeDesc, platform: &Platform) -> Result<DataType> {
    lookup(ty, platform).ok_or_else(|| {
        error!(
            event = "unsupported_type",
            type_name = ty.name,
            "type has no boundary mapping"
        );
        BridgeError::unsupported_type(ty.name)
    })
}
