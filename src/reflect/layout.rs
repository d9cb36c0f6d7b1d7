//! Type layout - owned member metadata
//!
//! All member names live in one byte arena, each followed by a NUL:
//! `struct { FooBar; Baz }` → `fooBar\0baz\0`. A member records the offset
//! and length of its name in the arena, so offsets are the running sum of
//! the previous names' byte lengths plus one terminator each.

use super::{Composite, Field};
use crate::error::{BridgeError, Result, UnmappedField};
use crate::interop::{lookup, DataType};
use crate::logging::{debug, error};
use crate::probe::Platform;
use core::ffi::c_int;

/// Conventional external name: first character lower-cased, rest untouched
pub fn external_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Member counts and indices cross as C `int`
pub(super) fn check_member_count(owner: &str, count: usize) -> Result<()> {
    if c_int::try_from(count).is_err() {
        error!(event = "too_many_members", owner, count, "composite too large to export");
        return Err(BridgeError::TooManyMembers {
            owner: owner.to_owned(),
            count,
        });
    }
    Ok(())
}

/// One member's metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberLayout {
    offset: usize,
    len: usize,
    data_type: DataType,
    index: usize,
}

impl MemberLayout {
    /// Byte offset of the name in the arena
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Name length in bytes, terminator excluded
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Position of the field in the originating composite
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Owned metadata for one exposed composite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeLayout {
    type_name: String,
    names: Vec<u8>,
    members: Vec<MemberLayout>,
}

impl TypeLayout {
    /// Describe `fields` of the composite called `type_name`
    ///
    /// Every unsupported field is logged on its own and all of them are
    /// returned together, in declaration order.
    pub fn build(type_name: &str, fields: &[Field], platform: &Platform) -> Result<Self> {
        check_member_count(type_name, fields.len())?;

        let external: Vec<String> = fields.iter().map(|f| external_name(f.name())).collect();
        let arena_len = external.iter().map(|name| name.len() + 1).sum();

        let mut names = Vec::with_capacity(arena_len);
        let mut members = Vec::with_capacity(fields.len());
        let mut unmapped = Vec::new();

        for (index, (field, name)) in fields.iter().zip(&external).enumerate() {
            let Some(data_type) = lookup(field.ty(), platform) else {
                error!(
                    event = "unsupported_field",
                    owner = type_name,
                    field = field.name(),
                    type_name = field.ty().name(),
                    "field type has no boundary mapping"
                );
                unmapped.push(UnmappedField {
                    field: field.name().to_owned(),
                    type_name: field.ty().name().to_owned(),
                });
                continue;
            };

            members.push(MemberLayout {
                offset: names.len(),
                len: name.len(),
                data_type,
                index,
            });
            names.extend_from_slice(name.as_bytes());
            names.push(0);
        }

        if !unmapped.is_empty() {
            return Err(BridgeError::UnsupportedFields {
                owner: type_name.to_owned(),
                fields: unmapped,
            });
        }
        debug_assert_eq!(names.len(), arena_len);

        debug!(
            event = "type_layout",
            type_name,
            members = members.len(),
            names_len = names.len(),
            "type metadata built"
        );

        Ok(Self {
            type_name: type_name.to_owned(),
            names,
            members,
        })
    }

    /// Describe a [`Composite`]
    pub fn of<T: Composite>(platform: &Platform) -> Result<Self> {
        Self::build(T::type_name(), &T::fields(), platform)
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The NUL-separated name arena
    #[inline]
    pub fn names(&self) -> &[u8] {
        &self.names
    }

    #[inline]
    pub fn members(&self) -> &[MemberLayout] {
        &self.members
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// External name of a member
    pub fn member_name(&self, member: &MemberLayout) -> &str {
        let bytes = &self.names[member.offset..member.offset + member.len];
        std::str::from_utf8(bytes).unwrap_or_default()
    }

    /// Find a member by external name
    pub fn member(&self, name: &str) -> Option<&MemberLayout> {
        self.members.iter().find(|m| self.member_name(m) == name)
    }
}
