use proptest::prelude::*;
use std::rc::Rc;
use tagbridge::reflect::{external_name, free_type_info};
use tagbridge::{impl_composite, Bridge, BridgeError, DataType, HandleTable, Platform, TypeLayout, Value};

#[allow(dead_code)]
struct Record {
    foo_bar: String,
    baz: i32,
}

impl_composite!(Record { foo_bar as "FooBar": String, baz as "Baz": i32 });

#[allow(dead_code)]
struct Widget {
    visible: bool,
    width: f64,
    label: String,
    payload: Value,
}

impl_composite!(Widget as "Widget" {
    visible: bool,
    width: f64,
    label: String,
    payload: Value,
});

#[allow(dead_code)]
struct Opaque {
    inner: Rc<String>,
}

impl_composite!(Opaque { inner as "Inner": Rc<String> });

#[test]
fn test_name_arena_offsets() {
    let layout = TypeLayout::of::<Record>(&Platform::current()).unwrap();
    assert_eq!(layout.names(), b"fooBar\0baz\0");

    let offsets: Vec<usize> = layout.members().iter().map(|m| m.offset()).collect();
    assert_eq!(offsets, vec![0, 7]);
}

#[test]
fn test_export_through_bridge() {
    let bridge = Bridge::new(HandleTable::new());
    let info = bridge.export_type_info::<Widget>().unwrap();

    unsafe {
        let record = info.as_ref();
        assert_eq!(record.type_name().to_str(), Ok("Widget"));

        let names: Vec<&str> = record
            .members()
            .iter()
            .map(|m| m.name().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["visible", "width", "label", "payload"]);

        let types: Vec<Option<DataType>> = record.members().iter().map(|m| m.data_type()).collect();
        assert_eq!(
            types,
            vec![
                Some(DataType::Bool),
                Some(DataType::Float64),
                Some(DataType::String),
                Some(DataType::Any),
            ]
        );

        free_type_info(info, bridge.allocator());
    }
}

#[test]
fn test_unsupported_member_fails_setup() {
    let bridge = Bridge::new(HandleTable::new());
    let err = bridge.export_type_info::<Opaque>().unwrap_err();
    assert!(err.is_unsupported());
    assert!(matches!(err, BridgeError::UnsupportedFields { ref owner, .. } if owner == "Opaque"));
    assert_eq!(err.unsupported_fields().len(), 1);
    assert_eq!(err.unsupported_fields()[0].field, "Inner");
}

proptest! {
    #[test]
    fn prop_external_name_only_touches_first_char(name in "[A-Za-z][A-Za-z0-9_]{0,16}") {
        let external = external_name(&name);
        prop_assert_eq!(&external[1..], &name[1..]);
        prop_assert_eq!(
            external.chars().next(),
            name.chars().next().map(|c| c.to_ascii_lowercase())
        );
    }
}
