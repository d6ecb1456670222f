use super::*;
use crate::constants::DEFAULT_BUCKET_CAPACITIES;

fn key(name: &str) -> Value {
    Value::from(name)
}

fn int(v: i32) -> Value {
    Value::from(v)
}

fn store_of(keys: &[&str]) -> MapStore {
    let mut store = MapStore::new();
    for (i, name) in keys.iter().enumerate() {
        assert!(store.insert(key(name), int(i as i32)).is_ok());
    }
    store
}

fn is_sorted(store: &MapStore) -> bool {
    store
        .entries()
        .windows(2)
        .all(|w| w[0].order(&w[1].key, &w[1].value) == CmpOrdering::Less)
}

#[test]
fn insert_keeps_entries_sorted() {
    let store = store_of(&["d", "a", "c", "b", "e"]);
    assert_eq!(store.len(), 5);
    assert!(is_sorted(&store));
    assert_eq!(store.value_of(&key("a")), Some(&int(1)));
    assert_eq!(store.value_of(&key("e")), Some(&int(4)));
    assert_eq!(store.value_of(&key("z")), None);
}

#[test]
fn exact_duplicates_are_rejected() {
    let mut store = MapStore::new();
    assert_eq!(store.insert(Value::Wild, int(1)), Ok(0));
    assert_eq!(store.insert(Value::Wild, int(1)), Err(0));
    assert_eq!(store.len(), 1);
}

#[test]
fn wild_members_sort_by_value() {
    let mut store = MapStore::new();
    for v in [5, 1, 3] {
        store.insert(Value::Wild, int(v)).unwrap();
    }
    store.insert(key("k"), int(0)).unwrap();
    let range = store.key_range(&Value::Wild);
    assert_eq!(range.len(), 3);
    let members: Vec<i32> = store.entries()[range].iter().map(|e| e.value.as_i32()).collect();
    assert_eq!(members, vec![1, 3, 5]);
    assert!(store.find_entry(&Value::Wild, &int(3)).is_ok());
    assert!(store.find_entry(&Value::Wild, &int(4)).is_err());
}

#[test]
fn find_key_reports_insertion_point() {
    let store = store_of(&["b", "d"]);
    assert_eq!(store.find_key(&key("b")), Ok(0));
    assert_eq!(store.find_key(&key("c")), Err(1));
    assert_eq!(store.find_key(&key("e")), Err(2));
    assert!(store.key_range(&key("c")).is_empty());
}

#[test]
fn grows_through_buckets_then_by_percent() {
    let mut store = MapStore::new();
    assert_eq!(store.avail(), DEFAULT_BUCKET_CAPACITIES[0]);
    let mut seen = vec![store.avail()];
    for i in 0..20 {
        store.insert(int(i), Value::Null).unwrap();
        if *seen.last().unwrap() != store.avail() {
            seen.push(store.avail());
        }
    }
    assert_eq!(seen, vec![1, 3, 6, 12, 18, 27]);
    assert!(is_sorted(&store));
}

#[test]
fn shrinks_below_occupancy_threshold() {
    let mut store = MapStore::new();
    for i in 0..12 {
        store.insert(int(i), Value::Null).unwrap();
    }
    assert_eq!(store.avail(), 12);
    while store.len() > 3 {
        store.remove_at(0);
    }
    // 3 of 12 is exactly 25%: no shrink yet
    assert_eq!(store.avail(), 12);
    store.remove_at(0);
    assert_eq!(store.avail(), 3);
    assert_eq!(store.len(), 2);
    assert_eq!(store.entries()[0].key, int(10));
}

#[test]
fn remove_key_drops_every_member() {
    let mut store = MapStore::new();
    for v in [1, 2, 3] {
        store.insert(Value::Wild, int(v)).unwrap();
    }
    store.insert(key("x"), int(9)).unwrap();
    assert_eq!(store.remove_key(&Value::Wild), 3);
    assert_eq!(store.len(), 1);
    assert_eq!(store.remove_key(&Value::Wild), 0);
}

#[test]
fn edit_guard_updates_in_place() {
    let mut store = store_of(&["a", "b"]);
    {
        let mut edit = store.begin_edit(1);
        assert_eq!(edit.key(), &key("b"));
        *edit = int(42);
    }
    assert_eq!(store.value_of(&key("b")), Some(&int(42)));
}

#[test]
fn edit_to_undefined_removes_entry() {
    let mut store = store_of(&["a", "b"]);
    store.begin_edit(0).undefine();
    assert_eq!(store.len(), 1);
    assert_eq!(store.value_of(&key("a")), None);
}

#[test]
fn edited_set_member_is_resorted_and_deduplicated() {
    let mut store = MapStore::new();
    for v in [1, 5, 9] {
        store.insert(Value::Wild, int(v)).unwrap();
    }
    *store.begin_edit(0) = int(7);
    assert!(is_sorted(&store));
    assert_eq!(store.len(), 3);

    // Editing 7 into the existing 9 leaves one copy
    *store.begin_edit(1) = int(9);
    assert_eq!(store.len(), 2);
    assert!(is_sorted(&store));
}

#[test]
#[should_panic(expected = "out of bounds")]
fn edit_past_end_is_fatal() {
    let mut store = store_of(&["a"]);
    let _edit = store.begin_edit(3);
}

#[test]
fn archived_size_cache_is_invalidated_by_mutation() {
    let mut store = store_of(&["a"]);
    assert_eq!(store.cached_archived_size(), None);
    store.cache_archived_size(40);
    assert_eq!(store.cached_archived_size(), Some(40));
    store.insert(key("b"), int(1)).unwrap();
    assert_eq!(store.cached_archived_size(), None);

    store.cache_archived_size(60);
    *store.begin_edit(0) = int(5);
    assert_eq!(store.cached_archived_size(), None);
}

#[test]
fn clone_is_deep_and_independent() {
    let original = store_of(&["a", "b", "c"]);
    let mut copy = original.clone();
    copy.remove_key(&key("a"));
    assert_eq!(original.len(), 3);
    assert_eq!(copy.len(), 2);
    assert_eq!(copy.avail(), 3);
}

#[test]
fn replace_value_at_keeps_order() {
    let mut store = MapStore::new();
    for v in [10, 20, 30] {
        store.insert(Value::Wild, int(v)).unwrap();
    }
    store.replace_value_at(0, int(40));
    let members: Vec<i32> = store.iter().map(|e| e.value.as_i32()).collect();
    assert_eq!(members, vec![20, 30, 40]);
}
