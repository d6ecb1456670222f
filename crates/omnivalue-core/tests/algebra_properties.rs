//! Property tests for the map algebra, ordering and archive codec

use std::cmp::Ordering;

use bytes::Bytes;
use omnivalue_core::types::{compare, lexical_compare};
use omnivalue_core::{MergeFlags, StatusCode, Value};
use proptest::prelude::*;

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i8>().prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        (-1.0e6f64..1.0e6).prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        "[a-z]{0,12}".prop_map(Value::from),
        prop::collection::vec(any::<u8>(), 0..10).prop_map(|data| Value::raw(&data)),
        Just(Value::null()),
    ]
}

/// Keys from a small alphabet so generated maps collide often
fn key() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => "[a-e]".prop_map(Value::from),
        2 => (0i32..4).prop_map(Value::from),
        1 => Just(Value::wild()),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(3, 32, 5, |inner| {
        prop::collection::vec((key(), inner), 1..6).prop_map(Value::from_entries)
    })
}

/// Walk a value checking the stored form: maps are never empty or a lone
/// wild entry, entries are sorted and only the wild key repeats.
fn assert_normalized(value: &Value) {
    let Some(store) = value.map_store() else {
        assert!(!matches!(value, Value::Map(_)));
        return;
    };
    assert!(!store.is_empty(), "empty map store in {:?}", value);
    assert!(
        !(store.len() == 1 && store.entries()[0].key.is_wild()),
        "lone wild entry in {:?}",
        value
    );
    for pair in store.entries().windows(2) {
        let key_order = compare(&pair[0].key, &pair[1].key);
        match key_order {
            Ordering::Less => {}
            Ordering::Equal => {
                assert!(pair[0].key.is_wild(), "repeated key {:?}", pair[0].key);
                assert_eq!(compare(&pair[0].value, &pair[1].value), Ordering::Less);
            }
            Ordering::Greater => panic!("entries out of order in {:?}", value),
        }
    }
    for entry in store.entries() {
        assert!(entry.value.is_defined());
        assert!(!entry.value.is_error());
        if entry.key.is_wild() {
            assert!(!entry.value.is_map(), "map value under wild key in {:?}", value);
        }
        assert_normalized(&entry.key);
        assert_normalized(&entry.value);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn generated_values_are_normalized(a in value()) {
        assert_normalized(&a);
    }

    #[test]
    fn operations_preserve_normal_form(a in value(), b in value()) {
        for flags in [MergeFlags::NONE, MergeFlags::NO_RECURSION] {
            assert_normalized(&a.joined(&b, flags));
            assert_normalized(&a.overlaid(&b, flags));
            assert_normalized(&a.inherited(&b, flags));
            assert_normalized(&a.retained(&b, flags));
            assert_normalized(&a.removed(&b, flags));
            assert_normalized(&a.mapped_values(&b, flags));
        }
    }

    #[test]
    fn archive_round_trip(a in value()) {
        let bytes = a.to_bytes().unwrap();
        prop_assert_eq!(bytes.len(), a.archived_size());
        prop_assert_eq!(bytes.len() % 4, 0);
        let back = Value::from_bytes(bytes).unwrap();
        prop_assert_eq!(back, a);
    }

    #[test]
    fn archive_decode_never_panics(data in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = Value::from_bytes(Bytes::from(data));
    }

    #[test]
    fn fast_order_is_total(a in value(), b in value(), c in value()) {
        prop_assert_eq!(compare(&a, &b), compare(&b, &a).reverse());
        prop_assert_eq!(compare(&a, &a), Ordering::Equal);
        if compare(&a, &b) != Ordering::Greater && compare(&b, &c) != Ordering::Greater {
            prop_assert_ne!(compare(&a, &c), Ordering::Greater);
        }
        prop_assert_eq!(a == b, compare(&a, &b) == Ordering::Equal);
    }

    #[test]
    fn lexical_order_is_total(a in value(), b in value(), c in value()) {
        prop_assert_eq!(lexical_compare(&a, &b), lexical_compare(&b, &a).reverse());
        if lexical_compare(&a, &b) != Ordering::Greater && lexical_compare(&b, &c) != Ordering::Greater {
            prop_assert_ne!(lexical_compare(&a, &c), Ordering::Greater);
        }
        // Lexical equality is identity
        prop_assert_eq!(lexical_compare(&a, &b) == Ordering::Equal, a == b);
    }

    #[test]
    fn retain_and_remove_partition(a in value(), b in value()) {
        let kept = a.retained(&b, MergeFlags::NONE);
        let dropped = a.removed(&b, MergeFlags::NONE);
        prop_assert_eq!(kept.joined(&dropped, MergeFlags::NONE), a.clone());
        prop_assert_eq!(a.retained(&a, MergeFlags::NONE), a.clone());
        prop_assert!(!a.removed(&a, MergeFlags::NONE).is_defined());
    }

    #[test]
    fn merges_are_idempotent(a in value()) {
        prop_assert_eq!(a.joined(&a, MergeFlags::NONE), a.clone());
        prop_assert_eq!(a.overlaid(&a, MergeFlags::NONE), a.clone());
        prop_assert_eq!(a.inherited(&a, MergeFlags::NONE), a.clone());
    }

    #[test]
    fn undefined_is_identity(a in value()) {
        let undefined = Value::undefined();
        prop_assert_eq!(a.joined(&undefined, MergeFlags::NONE), a.clone());
        prop_assert_eq!(undefined.joined(&a, MergeFlags::NONE), a.clone());
        prop_assert_eq!(a.overlaid(&undefined, MergeFlags::NONE), a.clone());
        prop_assert_eq!(a.inherited(&undefined, MergeFlags::NONE), a.clone());
    }

    #[test]
    fn wild_and_error_absorb(a in value()) {
        let wild = Value::wild();
        prop_assert_eq!(a.joined(&wild, MergeFlags::NONE), Value::wild());
        prop_assert_eq!(wild.joined(&a, MergeFlags::NONE), Value::wild());
        prop_assert_eq!(a.retained(&wild, MergeFlags::NONE), a.clone());
        prop_assert!(!a.removed(&wild, MergeFlags::NONE).is_defined());

        let error = Value::error(StatusCode::NameNotFound);
        prop_assert_eq!(a.joined(&error, MergeFlags::NONE), error.clone());
        prop_assert_eq!(error.joined(&a, MergeFlags::NONE), error.clone());
    }

    #[test]
    fn wild_key_looks_up_everything(a in value()) {
        prop_assert_eq!(a.value_for(&Value::wild()), a.clone());
    }

    #[test]
    fn every_item_is_found(a in value()) {
        for (key, value) in a.items() {
            prop_assert!(a.has_item(key, value));
            prop_assert!(a.has_item(key, &Value::wild()));
            prop_assert!(a.has_item(&Value::wild(), value));
        }
    }

    #[test]
    fn erasing_every_key_empties(a in value()) {
        let keys: Vec<Value> = a.keys().cloned().collect();
        let mut erased = a.clone();
        for key in &keys {
            erased.erase_item_with(key, MergeFlags::NO_FLATTEN);
            assert_normalized(&erased);
        }
        prop_assert!(!erased.is_defined());
    }
}
