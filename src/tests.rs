use std::io::Write;

use bytes::Bytes;

use super::*;

fn map<const N: usize>(entries: [(&str, Value); N]) -> Value {
    Value::from_entries(entries.into_iter().map(|(k, v)| (Value::from(k), v)))
}

fn set<const N: usize>(members: [i32; N]) -> Value {
    Value::from_entries(members.into_iter().map(|m| (Value::wild(), Value::from(m))))
}

#[test]
fn join_builds_a_set_on_conflict() {
    let joined = map([("a", Value::from(1))]).joined(&map([("a", Value::from(2))]), MergeFlags::NONE);
    assert_eq!(joined, map([("a", set([1, 2]))]));
    assert_eq!(joined.value_for(&Value::from("a")).count_items(), 2);
    assert_eq!(joined.to_string(), "{\"a\" -> {1, 2}}");
}

#[test]
fn overlay_replaces_shared_keys() {
    let base = map([("a", Value::from(1)), ("b", Value::from(2))]);
    let result = base.overlaid(&map([("a", Value::from(3))]), MergeFlags::NONE);
    assert_eq!(result, map([("a", Value::from(3)), ("b", Value::from(2))]));
}

#[test]
fn inherit_keeps_own_values() {
    let own = map([("a", Value::from(1))]);
    let defaults = map([("a", Value::from(2)), ("c", Value::from(3))]);
    let result = own.inherited(&defaults, MergeFlags::NONE);
    assert_eq!(result, map([("a", Value::from(1)), ("c", Value::from(3))]));
}

#[test]
fn integer_survives_archiving() {
    let bytes = Value::from(10).to_bytes().unwrap();
    let back = Value::from_bytes(bytes).unwrap();
    assert_eq!(back, Value::from(10));
    assert_eq!(back.type_code(), TypeCode::INT32);
    assert_eq!(back.type_code().name(), Some("int32"));
    assert_eq!(back.as_i32(), 10);
}

#[test]
fn wild_lookup_returns_the_value() {
    let values = [
        Value::undefined(),
        Value::null(),
        Value::from("text"),
        set([4, 5, 6]),
        map([("x", map([("y", Value::from(1))]))]),
        Value::error(StatusCode::BadType),
    ];
    for value in values {
        assert_eq!(value.value_for(&Value::wild()), value);
    }
}

#[test]
fn configuration_document_round_trip() {
    // A settings tree assembled from defaults, user values and an override
    let defaults = map([
        ("timeout", Value::time(30_000_000_000)),
        ("retries", Value::from(3)),
        ("tags", set([1, 2])),
    ]);
    let user = map([("retries", Value::from(5)), ("name", Value::from("worker"))]);
    let settings = user.inherited(&defaults, MergeFlags::NONE);
    assert_eq!(settings.value_for(&Value::from("retries")), Value::from(5));
    assert_eq!(settings.value_for(&Value::from("timeout")).as_string(), "30s");

    // Keep only the keys a consumer asked for
    let wanted = map([("name", Value::wild()), ("tags", Value::wild())]);
    let visible = settings.retained(&wanted, MergeFlags::NONE);
    assert_eq!(visible, map([("name", Value::from("worker")), ("tags", set([1, 2]))]));

    let back = Value::from_bytes(visible.to_bytes().unwrap()).unwrap();
    assert_eq!(back, visible);
}

#[test]
fn object_references_travel_in_the_side_table() {
    let object = ObjectRef::new(LocalObject::new(42));
    let message = map([("target", Value::object(object.clone())), ("op", Value::from("ping"))]);

    let mut writer = ArchiveWriter::new();
    message.archive(&mut writer).unwrap();
    let (bytes, objects) = writer.into_parts();
    assert_eq!(objects.len(), 1);

    let mut reader = ArchiveReader::with_objects(bytes.clone(), objects);
    let back = Value::unarchive(&mut reader).unwrap();
    assert_eq!(back, message);
    assert!(back.value_for(&Value::from("target")).as_object().unwrap().ptr_eq(&object));

    // Without a table the reference cannot be resolved
    assert!(Value::from_bytes(bytes).is_err());
}

#[test]
fn malformed_input_is_rejected_softly() {
    let garbage = Bytes::from_static(&[0xff, 0xff, 0xff, 0xff, 0, 0, 0, 0]);
    let err = Value::from_bytes(garbage).unwrap_err();
    assert_eq!(StatusCode::from(err), StatusCode::MalformedArchive);
}

#[test]
fn errors_propagate_through_the_algebra() {
    let failed = Value::error(StatusCode::NameNotFound);
    let data = map([("a", Value::from(1))]);
    assert_eq!(failed.joined(&data, MergeFlags::NONE), failed);
    assert_eq!(data.overlaid(&failed, MergeFlags::NONE), failed);
    assert_eq!(failed.try_as_i64(), Err(StatusCode::NameNotFound));
    assert_eq!(failed.try_as_status(), Ok(StatusCode::NameNotFound));
}

#[test]
fn item_editing_workflow() {
    let mut registry = Value::undefined();
    registry.set_value(Value::from("svc"), Value::from(1));
    registry.join_item(Value::from("svc"), Value::from(2));
    assert!(registry.has_item(&Value::from("svc"), &Value::from(2)));

    registry.rename_item(&Value::from("svc"), Value::from("service")).unwrap();
    assert_eq!(
        registry.rename_item(&Value::from("svc"), Value::from("other")),
        Err(StatusCode::NameNotFound)
    );

    {
        let mut slot = registry.edit_item(Value::from("service"));
        slot.erase_item_value(&Value::wild(), &Value::from(1));
    }
    assert_eq!(registry, map([("service", Value::from(2))]));

    assert!(registry.erase_item(&Value::from("service")));
    assert!(!registry.is_defined());
}

#[test]
fn config_file_loads_and_validates() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[growth]\ngrow_percent = 200\n\n[archive]\nmax_depth = 8").unwrap();
    let config = load_config(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.growth.grow_percent, 200);
    assert_eq!(config.archive.max_depth, 8);
    assert_eq!(config.pool.bucket_capacities, vec![1, 3, 6, 12]);

    let mut bad = tempfile::NamedTempFile::new().unwrap();
    writeln!(bad, "[growth]\nshrink_percent = 75").unwrap();
    assert!(load_config(bad.path().to_str().unwrap()).is_err());
}

#[test]
fn second_init_is_an_error() {
    let _ = init();
    assert!(matches!(init(), Err(InitError::Subscriber(_))));
}
