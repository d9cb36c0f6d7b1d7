//! Interoperability - values across the managed/native boundary
//!
//! Design: A fixed, small tag set both sides agree on at compile time
//!
//! Architecture:
//! - `types.rs` - boundary ABI (DataType, Payload, DataValue, NativeValue)
//! - `views.rs` - zero-copy pointer/length windows (crate-private)
//! - `marshal.rs` - encoder and decoder
//! - `resolve.rs` - static type → tag

mod types;
mod views;
mod marshal;
mod resolve;

pub use types::{DataType, DataValue, NativeValue, Payload, PAYLOAD_SIZE};
pub use marshal::{pack, unpack, pack_args, unpack_args};
pub use resolve::{data_type_of, TypeDesc};

pub(crate) use resolve::lookup;
pub(crate) use views::RawView;
