//! Managed values - the closed set of things that cross the boundary
//!
//! Design: Scalars, strings and two reference kinds:
//! - `Object` is a managed composite, shared by `Rc` so identity survives a
//!   trip through native code
//! - `Handle` is an opaque native-visible handle obtained earlier
//!
//! `Object` is `!Send`, which keeps composite values (and anything that can
//! register them) on the thread that created them.

use crate::owner::Handle;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Shared managed composite value
#[derive(Clone)]
pub struct Object(Rc<dyn Any>);

impl Object {
    pub fn new<T: Any>(value: T) -> Self {
        Self(Rc::new(value))
    }

    pub fn from_rc(rc: Rc<dyn Any>) -> Self {
        Self(rc)
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    /// Address of the shared allocation; equal for every clone
    #[inline]
    pub fn addr(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }

    /// Identity comparison
    #[inline]
    pub fn ptr_eq(&self, other: &Object) -> bool {
        self.addr() == other.addr()
    }

    /// Number of managed references (excluding weak ones)
    pub fn strong_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Object {}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({:p})", self.addr())
    }
}

/// Managed value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    /// Platform-width integer; its tag comes from the probe
    Int(isize),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    String(String),
    Object(Object),
    Handle(Handle),
}

impl Value {
    pub fn object<T: Any>(value: T) -> Self {
        Self::Object(Object::new(value))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Int32(_) => "int32",
            Self::Int64(_) => "int64",
            Self::Float32(_) => "float32",
            Self::Float64(_) => "float64",
            Self::String(_) => "string",
            Self::Object(_) => "object",
            Self::Handle(_) => "handle",
        }
    }

    /// Whether encoding this value registers it with the ownership
    /// collaborator
    #[inline]
    pub fn needs_wrap(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Self::Object(v)
    }
}

impl From<Handle> for Value {
    fn from(v: Handle) -> Self {
        Self::Handle(v)
    }
}
