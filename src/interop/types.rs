//! Boundary types - tag enumeration and tagged-value record
//!
//! Layout must stay bit-identical to `include/tagbridge.h`; both sides are
//! compiled from the same ordinal table.

use core::ffi::{c_int, c_void};
use core::fmt;
use core::marker::PhantomData;

/// Payload width in bytes (largest scalar or a native pointer)
pub const PAYLOAD_SIZE: usize = 8;

const _: () = assert!(core::mem::size_of::<*mut c_void>() <= PAYLOAD_SIZE);

/// Boundary tag
///
/// Ordinals are part of the ABI. Never reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum DataType {
    Invalid = 0,
    Bool = 1,
    Int32 = 2,
    Int64 = 3,
    Float32 = 4,
    Float64 = 5,
    String = 6,
    Object = 7,
    Any = 8,
    OwnedHandleReturn = 9,
}

impl DataType {
    /// Every tag in ordinal order
    pub const ALL: [DataType; 10] = [
        Self::Invalid,
        Self::Bool,
        Self::Int32,
        Self::Int64,
        Self::Float32,
        Self::Float64,
        Self::String,
        Self::Object,
        Self::Any,
        Self::OwnedHandleReturn,
    ];

    /// Interpret a raw tag written by native code
    #[inline]
    pub const fn from_raw(raw: c_int) -> Option<Self> {
        match raw {
            0 => Some(Self::Invalid),
            1 => Some(Self::Bool),
            2 => Some(Self::Int32),
            3 => Some(Self::Int64),
            4 => Some(Self::Float32),
            5 => Some(Self::Float64),
            6 => Some(Self::String),
            7 => Some(Self::Object),
            8 => Some(Self::Any),
            9 => Some(Self::OwnedHandleReturn),
            _ => None,
        }
    }

    /// Raw ordinal as stored in records
    #[inline]
    pub const fn as_raw(self) -> c_int {
        self as c_int
    }

    /// Number of payload bytes meaningful for this tag
    #[inline]
    pub const fn payload_size(self) -> usize {
        match self {
            Self::Invalid => 0,
            Self::Bool => 1,
            Self::Int32 | Self::Float32 => 4,
            Self::Int64 | Self::Float64 => 8,
            Self::String | Self::Object | Self::Any | Self::OwnedHandleReturn => {
                core::mem::size_of::<*mut c_void>()
            }
        }
    }

    /// Fixed-width scalar kinds copied bit for bit
    #[inline]
    pub const fn is_scalar(self) -> bool {
        matches!(
            self,
            Self::Bool | Self::Int32 | Self::Int64 | Self::Float32 | Self::Float64
        )
    }

    /// Tags whose payload is a pointer
    #[inline]
    pub const fn is_pointer(self) -> bool {
        matches!(
            self,
            Self::String | Self::Object | Self::Any | Self::OwnedHandleReturn
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Invalid => "invalid",
            Self::Bool => "bool",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::String => "string",
            Self::Object => "object",
            Self::Any => "any",
            Self::OwnedHandleReturn => "owned handle",
        };
        f.write_str(name)
    }
}

/// Inline payload storage (untagged union)
#[repr(C)]
#[derive(Clone, Copy)]
pub union Payload {
    pub boolean: bool,
    pub i32: i32,
    pub i64: i64,
    pub f32: f32,
    pub f64: f64,
    pub ptr: *mut c_void,
    pub bytes: [u8; PAYLOAD_SIZE],
}

impl Payload {
    /// All-zero payload
    #[inline]
    pub const fn zeroed() -> Self {
        Self {
            bytes: [0; PAYLOAD_SIZE],
        }
    }

    #[inline]
    pub fn from_bool(value: bool) -> Self {
        let mut payload = Self::zeroed();
        payload.boolean = value;
        payload
    }

    #[inline]
    pub fn from_i32(value: i32) -> Self {
        let mut payload = Self::zeroed();
        payload.i32 = value;
        payload
    }

    #[inline]
    pub const fn from_i64(value: i64) -> Self {
        Self { i64: value }
    }

    #[inline]
    pub fn from_f32(value: f32) -> Self {
        let mut payload = Self::zeroed();
        payload.f32 = value;
        payload
    }

    #[inline]
    pub const fn from_f64(value: f64) -> Self {
        Self { f64: value }
    }

    #[inline]
    pub fn from_ptr(ptr: *mut c_void) -> Self {
        let mut payload = Self::zeroed();
        payload.ptr = ptr;
        payload
    }
}

impl Default for Payload {
    #[inline]
    fn default() -> Self {
        Self::zeroed()
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payload {{ ... }}")
    }
}

/// Tagged value as it crosses the boundary
///
/// Produced by the encoder. `'a` is the lifetime of the managed string a
/// String payload points into. Records coming back from native code are
/// [`NativeValue`]s instead.
///
/// Fields are private so a record is always built whole: tag, payload and
/// length are written together.
#[repr(C)]
pub struct DataValue<'a> {
    data_type: c_int,
    data: Payload,
    len: c_int,
    _borrow: PhantomData<&'a [u8]>,
}

impl<'a> DataValue<'a> {
    #[inline]
    pub(crate) fn new(data_type: DataType, data: Payload, len: c_int) -> Self {
        Self {
            data_type: data_type.as_raw(),
            data,
            len,
            _borrow: PhantomData,
        }
    }

    /// Tag, or `None` for an ordinal this build does not know
    #[inline]
    pub fn data_type(&self) -> Option<DataType> {
        DataType::from_raw(self.data_type)
    }

    /// Tag exactly as stored
    #[inline]
    pub fn raw_type(&self) -> c_int {
        self.data_type
    }

    #[inline]
    pub fn payload(&self) -> Payload {
        self.data
    }

    /// Byte length; only meaningful for String
    #[inline]
    pub fn len(&self) -> c_int {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pointer handed to native code for the duration of a call
    #[inline]
    pub fn as_ptr(&self) -> *const Self {
        self
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut Self {
        self
    }
}

/// Record received from native code
///
/// Same layout as [`DataValue`], but it owns what it points to: a String
/// payload is a native buffer the decoder copies and then releases. Only the
/// unsafe constructors build one, so encoder output cannot reach the decoder.
#[repr(transparent)]
pub struct NativeValue(DataValue<'static>);

impl NativeValue {
    /// The Invalid record, decoded as "no value"
    #[inline]
    pub fn invalid() -> Self {
        Self(DataValue::new(DataType::Invalid, Payload::zeroed(), 0))
    }

    /// Assemble a record received from native code
    ///
    /// # Safety
    /// - For String, `data.ptr` must point to `len` readable bytes allocated
    ///   by the allocator the decoder will release it with, and ownership of
    ///   that buffer moves into the returned record
    /// - For OwnedHandleReturn, `data.ptr` must be a handle produced by the
    ///   ownership collaborator that will resolve it
    #[inline]
    pub unsafe fn from_native(data_type: c_int, data: Payload, len: c_int) -> Self {
        Self(DataValue {
            data_type,
            data,
            len,
            _borrow: PhantomData,
        })
    }

    /// Take a record out of native memory
    ///
    /// # Safety
    /// Same contract as [`NativeValue::from_native`]; `ptr` must be valid for
    /// reads and the record must not be read again afterwards.
    #[inline]
    pub unsafe fn read(ptr: *const NativeValue) -> Self {
        core::ptr::read(ptr)
    }

    #[inline]
    pub fn data_type(&self) -> Option<DataType> {
        self.0.data_type()
    }

    #[inline]
    pub fn raw_type(&self) -> c_int {
        self.0.raw_type()
    }

    #[inline]
    pub fn payload(&self) -> Payload {
        self.0.payload()
    }

    #[inline]
    pub fn len(&self) -> c_int {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for NativeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NativeValue").field(&self.0).finish()
    }
}

impl fmt::Debug for DataValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataValue")
            .field("data_type", &self.data_type())
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod layout_tests {
    //! Must agree with `include/tagbridge.h`

    use super::*;
    use core::mem::{align_of, offset_of, size_of};

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_data_value_layout() {
        assert_eq!(offset_of!(DataValue<'static>, data_type), 0);
        assert_eq!(offset_of!(DataValue<'static>, data), 8);
        assert_eq!(offset_of!(DataValue<'static>, len), 16);
        assert_eq!(size_of::<DataValue<'static>>(), 24);
        assert_eq!(align_of::<DataValue<'static>>(), 8);
        assert_eq!(size_of::<NativeValue>(), size_of::<DataValue<'static>>());
    }
}
