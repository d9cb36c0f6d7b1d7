//! Unit tests for reflection metadata

use super::layout::check_member_count;
use super::*;
use crate::alloc::LibcAllocator;
use crate::error::BridgeError;
use crate::interop::DataType;
use crate::value::Value;
use core::ffi::c_int;

#[allow(dead_code)]
struct Sample {
    foo_bar: String,
    baz: i32,
}

crate::impl_composite!(Sample { foo_bar as "FooBar": String, baz as "Baz": i32 });

#[allow(dead_code)]
struct Mixed {
    enabled: bool,
    count: isize,
    ratio: f32,
    total: f64,
    id: i64,
    slot: Value,
}

crate::impl_composite!(Mixed as "MixedRecord" {
    enabled: bool,
    count: isize,
    ratio: f32,
    total: f64,
    id: i64,
    slot: Value,
});

#[allow(dead_code)]
struct Broken {
    ok: i32,
    tags: Vec<String>,
    flags: u8,
}

crate::impl_composite!(Broken { ok as "Ok": i32, tags as "Tags": Vec<String>, flags as "Flags": u8 });

struct Empty {}

crate::impl_composite!(Empty {});

fn platform() -> Platform {
    Platform::probe::<i64>()
}

#[test]
fn test_external_name() {
    assert_eq!(external_name("FooBar"), "fooBar");
    assert_eq!(external_name("Baz"), "baz");
    assert_eq!(external_name("URL"), "uRL");
    assert_eq!(external_name("already"), "already");
    assert_eq!(external_name("X"), "x");
    assert_eq!(external_name(""), "");
    assert_eq!(external_name("Ärger"), "ärger");
}

#[test]
fn test_layout_name_arena() {
    let layout = TypeLayout::of::<Sample>(&platform()).unwrap();

    assert_eq!(layout.type_name(), "Sample");
    assert_eq!(layout.names(), b"fooBar\0baz\0");
    assert_eq!(layout.len(), 2);

    let members = layout.members();
    assert_eq!(members[0].offset(), 0);
    assert_eq!(members[0].len(), 6);
    assert_eq!(members[0].data_type(), DataType::String);
    assert_eq!(members[0].index(), 0);
    assert_eq!(members[1].offset(), 7);
    assert_eq!(members[1].len(), 3);
    assert_eq!(members[1].data_type(), DataType::Int32);
    assert_eq!(members[1].index(), 1);

    assert_eq!(layout.member_name(&members[0]), "fooBar");
    assert_eq!(layout.member("baz"), Some(&members[1]));
    assert_eq!(layout.member("Baz"), None);
}

#[test]
fn test_layout_all_supported_kinds() {
    let layout = TypeLayout::of::<Mixed>(&platform()).unwrap();
    assert_eq!(layout.type_name(), "MixedRecord");

    let types: Vec<DataType> = layout.members().iter().map(|m| m.data_type()).collect();
    assert_eq!(
        types,
        vec![
            DataType::Bool,
            DataType::Int64,
            DataType::Float32,
            DataType::Float64,
            DataType::Int64,
            DataType::Any,
        ]
    );
    assert_eq!(layout.names(), b"enabled\0count\0ratio\0total\0id\0slot\0");
}

#[test]
fn test_platform_int_member_uses_probe() {
    let layout = TypeLayout::of::<Mixed>(&Platform::probe::<i32>()).unwrap();
    assert_eq!(layout.member("count").unwrap().data_type(), DataType::Int32);
}

#[test]
fn test_every_unsupported_field_is_reported() {
    match TypeLayout::of::<Broken>(&platform()) {
        Err(BridgeError::UnsupportedFields { owner, fields }) => {
            assert_eq!(owner, "Broken");
            let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
            assert_eq!(names, vec!["Tags", "Flags"]);
            assert!(fields[0].type_name.contains("Vec"));
            assert_eq!(fields[1].type_name, "u8");
        }
        other => panic!("expected unsupported fields, got {other:?}"),
    }
}

#[test]
fn test_unsupported_fields_message_names_all() {
    let err = TypeLayout::of::<Broken>(&platform()).unwrap_err();
    assert!(err.is_unsupported());
    assert_eq!(err.unsupported_fields().len(), 2);

    let message = err.to_string();
    assert!(message.contains("'Tags'"));
    assert!(message.contains("'Flags'"));
}

#[test]
fn test_member_count_must_fit_native_int() {
    assert!(check_member_count("Huge", c_int::MAX as usize).is_ok());
    match check_member_count("Huge", c_int::MAX as usize + 1) {
        Err(BridgeError::TooManyMembers { owner, count }) => {
            assert_eq!(owner, "Huge");
            assert_eq!(count, c_int::MAX as usize + 1);
        }
        other => panic!("expected too many members, got {other:?}"),
    }
}

#[test]
fn test_member_index_follows_declaration_order() {
    let layout = TypeLayout::of::<Mixed>(&platform()).unwrap();
    let indices: Vec<usize> = layout.members().iter().map(|m| m.index()).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(layout.member("slot").unwrap().index(), 5);
}

#[test]
fn test_empty_composite() {
    let layout = TypeLayout::of::<Empty>(&platform()).unwrap();
    assert!(layout.is_empty());
    assert!(layout.names().is_empty());
}

#[test]
fn test_pointer_indirection_is_stripped() {
    let direct = TypeLayout::of::<Sample>(&platform()).unwrap();
    assert_eq!(TypeLayout::of::<Box<Sample>>(&platform()).unwrap(), direct);
    assert_eq!(TypeLayout::of::<Rc<Box<Sample>>>(&platform()).unwrap(), direct);

    let value = Rc::new(Sample {
        foo_bar: String::new(),
        baz: 0,
    });
    assert_eq!(type_info(&value, &platform()).unwrap(), direct);
}

#[test]
fn test_short_type_name() {
    assert_eq!(short_type_name("a::b::Point"), "Point");
    assert_eq!(short_type_name("a::Wrapper<b::Inner>"), "Wrapper");
    assert_eq!(short_type_name("Plain"), "Plain");
}

#[test]
fn test_export_member_pointers() {
    let layout = TypeLayout::of::<Sample>(&platform()).unwrap();
    let alloc = LibcAllocator;
    let info = layout.export(&alloc);

    unsafe {
        let record = info.as_ref();
        assert_eq!(record.type_name().to_str(), Ok("Sample"));
        assert_eq!(record.members_len, 2);

        let base = record.member_names as usize;
        let members = record.members();
        assert_eq!(members[0].member_name as usize - base, 0);
        assert_eq!(members[1].member_name as usize - base, 7);
        assert_eq!(members[0].name().to_str(), Ok("fooBar"));
        assert_eq!(members[1].name().to_str(), Ok("baz"));
        assert_eq!(members[0].data_type(), Some(DataType::String));
        assert_eq!(members[1].member_type, DataType::Int32.as_raw());
        assert_eq!(members[1].member_index, 1);

        let arena = core::slice::from_raw_parts(record.member_names as *const u8, 11);
        assert_eq!(arena, b"fooBar\0baz\0");

        free_type_info(info, &alloc);
    }
}

#[test]
fn test_export_empty() {
    let layout = TypeLayout::of::<Empty>(&platform()).unwrap();
    let alloc = LibcAllocator;
    let info = layout.export(&alloc);
    unsafe {
        assert_eq!(info.as_ref().members_len, 0);
        assert!(info.as_ref().members().is_empty());
        free_type_info(info, &alloc);
    }
}
