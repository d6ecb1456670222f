use bytes::Bytes;

use super::*;
use crate::algebra::MergeFlags;
use crate::types::{ArchiveError, LocalObject, ObjectRef, StatusCode, TypeCode, Value};

fn s(text: &str) -> Value {
    Value::from(text)
}

fn round_trip(v: &Value) -> Value {
    let bytes = v.to_bytes().expect("archive");
    assert_eq!(bytes.len(), v.archived_size());
    Value::from_bytes(bytes).expect("unarchive")
}

#[test]
fn int32_wire_layout() {
    let bytes = Value::from(10i32).to_bytes().unwrap();
    assert_eq!(
        &bytes[..],
        &[0x49, 0x33, 0x32, 0x08, 4, 0, 0, 0, 10, 0, 0, 0][..]
    );
    let back = Value::from_bytes(bytes).unwrap();
    assert_eq!(back, Value::from(10i32));
    assert_eq!(back.type_code(), TypeCode::INT32);
}

#[test]
fn short_inline_payload_is_padded() {
    let bytes = s("ab").to_bytes().unwrap();
    assert_eq!(bytes.len(), 12);
    assert_eq!(&bytes[4..], &[2, 0, 0, 0, b'a', b'b', 0, 0][..]);
}

#[test]
fn large_payload_layout() {
    let v = s("hello");
    let bytes = v.to_bytes().unwrap();
    // header word, length 5, payload padded to 8
    assert_eq!(bytes.len(), 16);
    assert_eq!(bytes[3] & 0x3, 1);
    assert_eq!(&bytes[4..8], &[5, 0, 0, 0][..]);
    assert_eq!(&bytes[8..13], b"hello");
    assert_eq!(&bytes[13..], &[0, 0, 0][..]);
    assert_eq!(round_trip(&v), v);
}

#[test]
fn sentinels_round_trip() {
    for v in [Value::Undefined, Value::Wild, Value::Null, Value::error(StatusCode::NameNotFound)] {
        let back = round_trip(&v);
        assert_eq!(back, v);
        assert_eq!(back.type_code(), v.type_code());
    }
    assert_eq!(Value::Null.archived_size(), 8);
}

#[test]
fn scalars_round_trip() {
    let values = [
        Value::from(-3i8),
        Value::from(-300i16),
        Value::from(i64::MIN),
        Value::from(1.25f32),
        Value::from(-2.5e100f64),
        Value::from(true),
        Value::from(""),
        Value::from("a somewhat longer string"),
        Value::raw(&[1, 2, 3, 4, 5, 6, 7]),
        Value::time(90_000_000_000),
        Value::status(StatusCode::Overflow),
    ];
    for v in &values {
        let back = round_trip(v);
        assert_eq!(&back, v);
        assert_eq!(back.type_code(), v.type_code());
    }
}

#[test]
fn maps_round_trip() {
    let mut v = Value::from_entries([
        (s("name"), s("omnivalue")),
        (s("nested"), Value::pair(s("depth"), Value::from(2i32))),
        (Value::Wild, Value::from(1i32)),
        (Value::Wild, Value::from(2i32)),
    ]);
    v.join_item_with(Value::pair(s("x"), s("y")), Value::Null, MergeFlags::NO_FLATTEN);
    let back = round_trip(&v);
    assert_eq!(back, v);
    assert_eq!(back.count_items(), v.count_items());
}

#[test]
fn equal_maps_archive_identically() {
    let a = Value::from_entries([(s("a"), Value::from(1i32)), (s("b"), Value::from(2i32))]);
    let b = Value::from_entries([(s("b"), Value::from(2i32)), (s("a"), Value::from(1i32))]);
    assert_eq!(a.to_bytes().unwrap(), b.to_bytes().unwrap());
}

#[test]
fn map_size_is_cached_until_mutation() {
    let mut v = Value::from_entries([(s("a"), Value::from(1i32)), (s("b"), s("long value"))]);
    let size = v.archived_size();
    assert_eq!(v.map_store().unwrap().cached_archived_size(), Some(size));
    v.join_item(s("c"), Value::Null);
    assert_eq!(v.map_store().unwrap().cached_archived_size(), None);
    assert_eq!(v.archived_size(), size + 8 + 12);
}

#[test]
fn objects_travel_through_side_table() {
    let object = ObjectRef::new(LocalObject::new(77));
    let v = Value::pair(s("handle"), Value::object(object.clone()));

    let mut writer = ArchiveWriter::new();
    let written = v.archive(&mut writer).unwrap();
    assert_eq!(written, v.archived_size());
    let (bytes, objects) = writer.into_parts();
    assert_eq!(objects.len(), 1);
    assert!(objects[0].ptr_eq(&object));

    let mut reader = ArchiveReader::with_objects(bytes, objects);
    let back = Value::unarchive(&mut reader).unwrap();
    assert_eq!(back, v);
    let held = back.value_for(&s("handle"));
    assert!(held.as_object().unwrap().ptr_eq(&object));
}

#[test]
fn objects_need_a_side_table() {
    let v = Value::object(ObjectRef::new(LocalObject::new(1)));
    assert_eq!(v.to_bytes(), Err(ArchiveError::NoObjectTable));

    let mut writer = ArchiveWriter::new();
    v.archive(&mut writer).unwrap();
    let mut reader = ArchiveReader::new(writer.freeze());
    assert_eq!(Value::unarchive(&mut reader).unwrap_err(), ArchiveError::NoObjectTable);
}

#[test]
fn unknown_object_slot() {
    let mut writer = ArchiveWriter::new();
    Value::object(ObjectRef::new(LocalObject::new(1))).archive(&mut writer).unwrap();
    let mut reader = ArchiveReader::with_objects(writer.freeze(), Vec::new());
    assert_eq!(Value::unarchive(&mut reader).unwrap_err(), ArchiveError::UnknownObjectSlot(0));
}

#[test]
fn big_endian_input_is_swapped() {
    // int32 0x01020304, byte-order bit clear
    let bytes = Bytes::from_static(&[0x49, 0x33, 0x32, 0x00, 0, 0, 0, 4, 1, 2, 3, 4]);
    assert_eq!(Value::from_bytes(bytes).unwrap(), Value::from(0x0102_0304i32));

    // int64 -2 in big-endian, large class
    let mut raw = vec![0x49, 0x36, 0x34, 0x01, 0, 0, 0, 8];
    raw.extend_from_slice(&(-2i64).to_be_bytes());
    assert_eq!(Value::from_bytes(Bytes::from(raw)).unwrap(), Value::from(-2i64));

    // strings are not swapped
    let bytes = Bytes::from_static(&[0x53, 0x54, 0x52, 0x00, 0, 0, 0, 2, b'o', b'k', 0, 0]);
    assert_eq!(Value::from_bytes(bytes).unwrap(), s("ok"));
}

#[test]
fn rejects_truncated_input() {
    let bytes = s("hello world").to_bytes().unwrap();
    let cut = bytes.slice(..bytes.len() - 4);
    assert!(matches!(Value::from_bytes(cut), Err(ArchiveError::Truncated { .. })));
    assert!(matches!(
        Value::from_bytes(Bytes::from_static(&[0x49, 0x33])),
        Err(ArchiveError::Truncated { needed: 8, available: 2 })
    ));
}

#[test]
fn rejects_malformed_headers() {
    let reserved = Bytes::from_static(&[0x49, 0x33, 0x32, 0x0c, 4, 0, 0, 0, 1, 0, 0, 0]);
    assert!(matches!(Value::from_bytes(reserved), Err(ArchiveError::ReservedBits(_))));

    let class3 = Bytes::from_static(&[0x49, 0x33, 0x32, 0x0b, 0, 0, 0, 0]);
    assert_eq!(Value::from_bytes(class3), Err(ArchiveError::BadLengthClass(3)));

    let long_inline = Bytes::from_static(&[0x49, 0x33, 0x32, 0x08, 5, 0, 0, 0, 1, 0, 0, 0]);
    assert_eq!(Value::from_bytes(long_inline), Err(ArchiveError::InlineTooLong(5)));

    let wild_with_payload = Bytes::from_static(&[0x57, 0x4c, 0x44, 0x08, 1, 0, 0, 0, 1, 0, 0, 0]);
    assert!(matches!(Value::from_bytes(wild_with_payload), Err(ArchiveError::InvalidSentinel(_))));

    let inline_map = Bytes::from_static(&[0x4d, 0x41, 0x50, 0x08, 0, 0, 0, 0]);
    assert!(matches!(Value::from_bytes(inline_map), Err(ArchiveError::ClassMismatch(_))));
}

#[test]
fn rejects_trailing_bytes() {
    let mut raw = Value::from(1i32).to_bytes().unwrap().to_vec();
    raw.extend_from_slice(&[0, 0, 0, 0]);
    assert_eq!(Value::from_bytes(Bytes::from(raw)), Err(ArchiveError::TrailingBytes(4)));
}

#[test]
fn rejects_excessive_nesting() {
    let depth = crate::global_config().archive.max_depth;
    let mut v = Value::from(1i32);
    for _ in 0..depth {
        v = Value::pair(s("k"), v);
    }
    assert_eq!(round_trip(&v), v);

    let deeper = Value::pair(s("k"), v);
    let bytes = deeper.to_bytes().unwrap();
    assert_eq!(Value::from_bytes(bytes), Err(ArchiveError::DepthExceeded(depth)));
}

#[test]
fn map_count_beyond_input_is_truncated() {
    let bytes = Bytes::from_static(&[0x4d, 0x41, 0x50, 0x0a, 0xff, 0xff, 0, 0]);
    assert!(matches!(Value::from_bytes(bytes), Err(ArchiveError::Truncated { .. })));
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "archive size mismatch")]
fn size_mismatch_is_fatal() {
    let v = Value::from_entries([(s("a"), Value::from(1i32)), (s("b"), Value::from(2i32))]);
    v.map_store().unwrap().cache_archived_size(3);
    let _ = v.to_bytes();
}
