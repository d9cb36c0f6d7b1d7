//! Bridge - one binding's view of the boundary
//!
//! Bundles the probed platform, the ownership collaborator and the native
//! allocator so call sites do not thread them through every conversion.
//! A bridge remembers the thread that created it; composites may only be
//! encoded there.

use crate::alloc::{LibcAllocator, NativeAllocator};
use crate::config::Config;
use crate::error::Result;
use crate::interop::{self, DataType, DataValue, NativeValue, TypeDesc};
use crate::logging::debug;
use crate::owner::ValueOwner;
use crate::probe::Platform;
use crate::reflect::{Composite, TypeInfo, TypeLayout};
use crate::value::Value;
use core::ptr::NonNull;
use std::thread::{self, ThreadId};

pub struct Bridge<O: ValueOwner, A: NativeAllocator = LibcAllocator> {
    platform: Platform,
    owner: O,
    alloc: A,
    engine_thread: ThreadId,
    thread_checks: bool,
}

impl<O: ValueOwner> Bridge<O> {
    /// Bridge using the C heap for native buffers
    pub fn new(owner: O) -> Self {
        Self::with_allocator(owner, LibcAllocator)
    }

    /// Bridge configured from a loaded [`Config`]
    pub fn from_config(config: &Config, owner: O) -> Self {
        Self::new(owner).with_thread_checks(config.bridge.engine_thread_checks)
    }
}

impl<O: ValueOwner, A: NativeAllocator> Bridge<O, A> {
    pub fn with_allocator(owner: O, alloc: A) -> Self {
        let platform = Platform::current();
        debug!(
            event = "bridge_init",
            int_type = ?platform.int_type(),
            "bridge bound to engine thread"
        );

        Self {
            platform,
            owner,
            alloc,
            engine_thread: thread::current().id(),
            thread_checks: true,
        }
    }

    /// Override the probed platform
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_thread_checks(mut self, enabled: bool) -> Self {
        self.thread_checks = enabled;
        self
    }

    #[inline]
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    #[inline]
    pub fn owner(&self) -> &O {
        &self.owner
    }

    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Whether the caller is on the thread that created this bridge
    pub fn on_engine_thread(&self) -> bool {
        thread::current().id() == self.engine_thread
    }

    fn check_engine_thread(&self, value: &Value) {
        if self.thread_checks && value.needs_wrap() {
            assert!(
                self.on_engine_thread(),
                "composite values must be encoded on the engine thread"
            );
        }
    }

    /// See [`interop::pack`]
    pub fn pack<'a>(&self, value: &'a Value) -> DataValue<'a> {
        self.check_engine_thread(value);
        interop::pack(value, &self.platform, &self.owner)
    }

    pub fn pack_args<'a>(&self, values: &'a [Value]) -> Vec<DataValue<'a>> {
        values.iter().for_each(|value| self.check_engine_thread(value));
        interop::pack_args(values, &self.platform, &self.owner)
    }

    /// See [`interop::unpack`]
    ///
    /// Encoder output is not a native record:
    ///
    /// ```compile_fail
    /// use tagbridge::{Bridge, HandleTable, Value};
    ///
    /// let bridge = Bridge::new(HandleTable::new());
    /// let text = Value::from("owned by the managed side");
    /// bridge.unpack(bridge.pack(&text));
    /// ```
    pub fn unpack(&self, value: NativeValue) -> Option<Value> {
        interop::unpack(value, &self.owner, &self.alloc)
    }

    pub fn unpack_args(&self, values: Vec<NativeValue>) -> Vec<Option<Value>> {
        interop::unpack_args(values, &self.owner, &self.alloc)
    }

    /// Boundary tag for the static type `T`
    pub fn data_type_of<T: ?Sized + 'static>(&self) -> Result<DataType> {
        interop::data_type_of(&TypeDesc::of::<T>(), &self.platform)
    }

    pub fn type_layout<T: Composite>(&self) -> Result<TypeLayout> {
        TypeLayout::of::<T>(&self.platform)
    }

    /// Build and hand over native metadata for `T`
    ///
    /// Release with [`crate::reflect::free_type_info`] and [`Bridge::allocator`].
    pub fn export_type_info<T: Composite>(&self) -> Result<NonNull<TypeInfo>> {
        Ok(self.type_layout::<T>()?.export(&self.alloc))
    }
}
