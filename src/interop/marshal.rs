//! Value marshaling - managed ↔ native conversions
//!
//! Design: Zero-copy for strings going out, bit copies for scalars, and a
//! handle from the ownership collaborator for composites. Coming back,
//! strings are copied and their native buffer released, handles resolve to
//! the very object that was wrapped.
//!
//! An unknown tag on the way in is an ABI skew between the two sides and
//! aborts the process.

use super::types::{DataType, DataValue, NativeValue, Payload};
use super::views::RawView;
use crate::alloc::NativeAllocator;
use crate::logging::{error, trace, warn};
use crate::owner::{Handle, ValueOwner};
use crate::probe::Platform;
use crate::value::Value;
use core::ffi::{c_char, c_int, c_void};

/// Encode a managed value
///
/// A String result borrows `value`'s bytes: the record must not be read by
/// native code after `value` is dropped or mutated, which the lifetime
/// enforces on this side.
///
/// Encoding an `Object` calls [`ValueOwner::wrap`] and therefore must run on
/// the engine thread.
pub fn pack<'a, O: ValueOwner + ?Sized>(
    value: &'a Value,
    platform: &Platform,
    owner: &O,
) -> DataValue<'a> {
    let packed = match value {
        Value::String(s) => {
            let view = RawView::of_str(s);
            DataValue::new(
                DataType::String,
                Payload::from_ptr(view.ptr() as *mut c_void),
                view.len(),
            )
        }
        Value::Bool(v) => DataValue::new(DataType::Bool, Payload::from_bool(*v), 0),
        Value::Int(v) => pack_platform_int(*v, platform),
        Value::Int32(v) => DataValue::new(DataType::Int32, Payload::from_i32(*v), 0),
        Value::Int64(v) => DataValue::new(DataType::Int64, Payload::from_i64(*v), 0),
        Value::Float32(v) => DataValue::new(DataType::Float32, Payload::from_f32(*v), 0),
        Value::Float64(v) => DataValue::new(DataType::Float64, Payload::from_f64(*v), 0),
        Value::Object(object) => {
            let handle = owner.wrap(object);
            DataValue::new(DataType::Object, Payload::from_ptr(handle.as_ptr()), 0)
        }
        Value::Handle(handle) => {
            DataValue::new(DataType::Object, Payload::from_ptr(handle.as_ptr()), 0)
        }
    };

    trace!(event = "pack", kind = value.kind_name(), data_type = ?packed.data_type());
    packed
}

#[inline]
fn pack_platform_int<'a>(v: isize, platform: &Platform) -> DataValue<'a> {
    if platform.int_is_64() {
        DataValue::new(DataType::Int64, Payload::from_i64(v as i64), 0)
    } else {
        debug_assert!(
            i32::try_from(v).is_ok(),
            "platform int {v} does not fit the probed 32-bit width"
        );
        DataValue::new(DataType::Int32, Payload::from_i32(v as i32), 0)
    }
}

/// Decode a value received from native code
///
/// Consumes the record: a String buffer is copied and then released through
/// `alloc` exactly once. Returns `None` for Invalid.
///
/// Only [`NativeValue`]s are accepted; a record from [`pack`] points into
/// managed memory the decoder must never free.
pub fn unpack<O, A>(value: NativeValue, owner: &O, alloc: &A) -> Option<Value>
where
    O: ValueOwner + ?Sized,
    A: NativeAllocator + ?Sized,
{
    let raw = value.raw_type();
    let Some(data_type) = DataType::from_raw(raw) else {
        abi_skew(raw)
    };
    let payload = value.payload();

    trace!(event = "unpack", data_type = ?data_type, len = value.len());

    // The union field read in each arm is the one the tag designates.
    unsafe {
        match data_type {
            DataType::String => {
                let ptr = payload.ptr as *mut c_char;
                let s = copy_native_string(ptr, value.len());
                alloc.free(ptr as *mut u8);
                Some(Value::String(s))
            }
            DataType::Bool => Some(Value::Bool(payload.bytes[0] != 0)),
            DataType::Int64 => Some(Value::Int64(payload.i64)),
            DataType::Int32 => Some(Value::Int32(payload.i32)),
            DataType::Float64 => Some(Value::Float64(payload.f64)),
            DataType::Float32 => Some(Value::Float32(payload.f32)),
            DataType::OwnedHandleReturn => {
                let Some(handle) = Handle::from_ptr(payload.ptr) else {
                    contract_violation("null handle returned across the boundary")
                };
                match owner.resolve(handle) {
                    Some(object) => Some(Value::Object(object)),
                    None => contract_violation("handle returned across the boundary was never issued"),
                }
            }
            DataType::Invalid => None,
            DataType::Object | DataType::Any => abi_skew(raw),
        }
    }
}

/// Copy `len` bytes of a native buffer into a new managed string
///
/// # Safety
/// `ptr` must be readable for `len` bytes.
unsafe fn copy_native_string(ptr: *const c_char, len: c_int) -> String {
    let view = RawView::from_raw(ptr, len);
    match view.as_str() {
        Some(s) => s.to_owned(),
        None => {
            warn!(
                event = "invalid_utf8",
                len,
                "string from native code is not UTF-8, replacing invalid sequences"
            );
            String::from_utf8_lossy(view.as_bytes()).into_owned()
        }
    }
}

/// Encode an argument list
pub fn pack_args<'a, O: ValueOwner + ?Sized>(
    values: &'a [Value],
    platform: &Platform,
    owner: &O,
) -> Vec<DataValue<'a>> {
    values
        .iter()
        .map(|value| pack(value, platform, owner))
        .collect()
}

/// Decode a list of records received from native code
pub fn unpack_args<O, A>(values: Vec<NativeValue>, owner: &O, alloc: &A) -> Vec<Option<Value>>
where
    O: ValueOwner + ?Sized,
    A: NativeAllocator + ?Sized,
{
    values
        .into_iter()
        .map(|value| unpack(value, owner, alloc))
        .collect()
}

/// Both sides disagree on the tag table; nothing sensible can follow
#[cold]
#[inline(never)]
fn abi_skew(raw: c_int) -> ! {
    error!(event = "abi_skew", data_type = raw, "unsupported data type");
    eprintln!("tagbridge: unsupported data type: {raw}");
    std::process::abort()
}

#[cold]
#[inline(never)]
fn contract_violation(msg: &str) -> ! {
    error!(event = "contract_violation", "{}", msg);
    eprintln!("tagbridge: {msg}");
    std::process::abort()
}
