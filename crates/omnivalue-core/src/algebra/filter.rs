//! Retain and remove
//!
//! Both walk the mappings of `self` and test each one against `other`:
//! retain keeps the matches, remove keeps the rest, so joining the two
//! results gives back the original value.
//!
//! A wild-keyed member matches if `other` has the same member. A keyed
//! mapping is tested against the value `other` stores under exactly that
//! key: none means no match, `Wild` matches anything, simple values compare
//! by equality and nested values are filtered recursively (or compared as a
//! whole under `NO_RECURSION`).

use super::MergeFlags;
use crate::structures::{MapEntry, MapStore};
use crate::types::Value;

impl Value {
    /// Keep only the mappings matched by `other`
    pub fn retain(&mut self, other: &Value, flags: MergeFlags) {
        self.filter(other, flags, true);
    }

    /// [`Value::retain`] into a copy
    pub fn retained(&self, other: &Value, flags: MergeFlags) -> Value {
        let mut result = self.clone();
        result.retain(other, flags);
        result
    }

    /// Drop the mappings matched by `other`
    pub fn remove(&mut self, other: &Value, flags: MergeFlags) {
        self.filter(other, flags, false);
    }

    /// [`Value::remove`] into a copy
    pub fn removed(&self, other: &Value, flags: MergeFlags) -> Value {
        let mut result = self.clone();
        result.remove(other, flags);
        result
    }

    fn filter(&mut self, other: &Value, flags: MergeFlags, retain: bool) {
        if self.is_error() {
            return;
        }
        if other.is_error() {
            *self = other.clone();
            return;
        }
        if !self.is_defined() {
            return;
        }
        match other {
            Value::Undefined => {
                if retain {
                    self.undefine();
                }
                return;
            }
            Value::Wild => {
                if !retain {
                    self.undefine();
                }
                return;
            }
            _ => {}
        }
        if self.is_wild() {
            if retain {
                *self = other.clone();
            }
            return;
        }

        let mut kept = MapStore::with_capacity(self.count_items());
        for (key, value) in self.items() {
            if let Some(value) = filter_mapping(key, value, other, flags, retain) {
                kept.push_sorted(MapEntry::new(key.clone(), value));
            }
        }
        *self = Value::from_store(kept);
    }

    /// True if `member` is one of this value's wild-keyed members
    pub(crate) fn has_wild_member(&self, member: &Value) -> bool {
        match self {
            Value::Map(store) => store.find_entry(&Value::Wild, member).is_ok(),
            Value::Undefined | Value::Error(_) => false,
            simple => simple == member,
        }
    }
}

/// What survives of one mapping, if anything
fn filter_mapping(
    key: &Value,
    value: &Value,
    other: &Value,
    flags: MergeFlags,
    retain: bool,
) -> Option<Value> {
    if key.is_wild() {
        return (other.has_wild_member(value) == retain).then(|| value.clone());
    }
    let counterpart = other.map_store().and_then(|store| store.value_of(key));
    match counterpart {
        None => (!retain).then(|| value.clone()),
        Some(Value::Wild) => retain.then(|| value.clone()),
        Some(target) if !flags.recursion() || (value.is_simple() && target.is_simple()) => {
            ((value == target) == retain).then(|| value.clone())
        }
        Some(target) => {
            let filtered = if retain {
                value.retained(target, flags)
            } else {
                value.removed(target, flags)
            };
            filtered.is_defined().then_some(filtered)
        }
    }
}
