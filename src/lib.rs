//! tagbridge - value marshaling between a managed engine and native code
//!
//! Values cross the boundary as fixed-layout tagged records ([`DataValue`]):
//! strings go out as zero-copy views, scalars as bit copies, composites as
//! opaque handles from an ownership collaborator ([`ValueOwner`]). Exposed
//! composite types can also be described to native code once, through
//! [`TypeInfo`] records whose member names share one allocation.
//!
//! Modules:
//! - `interop` - boundary tags, records, encoder, decoder, type resolver
//! - `reflect` - composite metadata builder
//! - `probe` - native integer width
//! - `owner` / `alloc` - the two collaborators: handles and native memory
//! - `bridge` - a bundle of the above for one binding
//! - `config` / `logging` / `error` - ambient plumbing

pub mod alloc;
pub mod bridge;
pub mod config;
pub mod error;
pub mod interop;
pub mod logging;
pub mod owner;
pub mod probe;
pub mod reflect;
pub mod value;

pub use alloc::{LibcAllocator, NativeAllocator};
pub use bridge::Bridge;
pub use config::Config;
pub use error::{BridgeError, Result, UnmappedField};
pub use interop::{
    data_type_of, pack, unpack, DataType, DataValue, NativeValue, Payload, TypeDesc,
};
pub use owner::{Handle, HandleTable, ValueOwner};
pub use probe::Platform;
pub use reflect::{type_info, Composite, Field, MemberInfo, TypeInfo, TypeLayout};
pub use value::{Object, Value};

use std::ffi::c_int;

/// Native entry point: install logging and run the platform probe
///
/// Logging follows the nearest `tagbridge.toml`, with `TAGBRIDGE_LOG_*`
/// environment variables taking precedence.
#[no_mangle]
pub extern "C" fn tagbridge_init() {
    logging::init_with_config(Config::discover().log_config());
    let platform = Platform::current();
    logging::info!(
        event = "init",
        int_type = ?platform.int_type(),
        "tagbridge ready"
    );
}

/// Tag the platform integer crosses as
#[no_mangle]
pub extern "C" fn tagbridge_platform_int_type() -> c_int {
    Platform::current().int_type().as_raw()
}

#[cfg(test)]
mod abi_tests {
    //! Layout checks against `include/tagbridge.h`

    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn test_type_info_layout() {
        let ptr = size_of::<*const u8>();
        assert_eq!(offset_of!(MemberInfo, member_type), ptr);
        assert_eq!(offset_of!(MemberInfo, member_index), ptr + 4);
        assert_eq!(offset_of!(TypeInfo, members), ptr * 2);
        assert_eq!(offset_of!(TypeInfo, members_len), ptr * 3);
        assert_eq!(size_of::<MemberInfo>(), ptr + 8);
    }

    #[test]
    fn test_platform_int_export() {
        tagbridge_init();
        let raw = tagbridge_platform_int_type();
        assert_eq!(DataType::from_raw(raw), Some(Platform::detect().int_type()));
    }
}
