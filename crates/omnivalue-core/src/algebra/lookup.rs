//! Lookups, remapping and item removal
//!
//! Lookup is exact: a key finds only the mapping stored under that key,
//! never a wild-keyed fallback. The wild key stands for the whole value.

use super::MergeFlags;
use crate::types::{StatusCode, Value};

impl Value {
    /// Value stored under `key`, `Undefined` if none.
    ///
    /// The wild key returns the whole value; a map key is looked up as a
    /// path. An error value returns itself and `Wild` returns `Wild`.
    pub fn value_for(&self, key: &Value) -> Value {
        self.value_for_with(key, MergeFlags::NONE)
    }

    /// [`Value::value_for`] with explicit flags (`NO_FLATTEN` looks a map
    /// key up as-is)
    pub fn value_for_with(&self, key: &Value, flags: MergeFlags) -> Value {
        if self.is_error() {
            return self.clone();
        }
        if key.is_error() {
            return key.clone();
        }
        if key.is_wild() {
            return self.clone();
        }
        if !key.is_defined() {
            return Value::Undefined;
        }
        if self.is_wild() {
            return Value::Wild;
        }
        if let Some(found) = self.map_store().and_then(|store| store.value_of(key)) {
            return found.clone();
        }
        if key.is_map() && flags.flatten() {
            let mut result = Value::Undefined;
            for (head, tail) in key.items() {
                result.join(&self.value_for_with(head, flags).value_for_with(tail, flags), flags);
            }
            return result;
        }
        Value::Undefined
    }

    /// True if the mapping `{key -> value}` is present.
    ///
    /// A wild key asks whether any mapping holds `value`, a wild value
    /// whether `key` is present at all. Otherwise the stored value must
    /// equal `value` or be a set containing it.
    pub fn has_item(&self, key: &Value, value: &Value) -> bool {
        if self.is_error() || !self.is_defined() {
            return false;
        }
        match (key.is_wild(), value.is_wild()) {
            (true, true) => true,
            (true, false) => self.items().any(|(_, held)| held == value),
            (false, true) => self.value_for(key).is_defined(),
            (false, false) => {
                let stored = self.value_for(key);
                stored == *value || (stored.is_map() && stored.has_wild_member(value))
            }
        }
    }

    /// Replace every value `v` with `mapping.value_for(v)`, joining the
    /// results. Nested maps are remapped recursively unless `NO_RECURSION`.
    pub fn map_values(&mut self, mapping: &Value, flags: MergeFlags) {
        if self.is_error() {
            return;
        }
        if mapping.is_error() {
            *self = mapping.clone();
            return;
        }
        if !self.is_defined() {
            return;
        }
        let mut result = Value::Undefined;
        for (key, value) in self.items() {
            let mapped = if value.is_map() && flags.recursion() {
                value.mapped_values(mapping, flags)
            } else {
                mapping.value_for_with(value, flags)
            };
            result.join_item_with(key.clone(), mapped, flags | MergeFlags::NO_FLATTEN);
        }
        *self = result;
    }

    /// [`Value::map_values`] into a copy
    pub fn mapped_values(&self, mapping: &Value, flags: MergeFlags) -> Value {
        let mut result = self.clone();
        result.map_values(mapping, flags);
        result
    }

    /// Remove every mapping under `key`; returns true if anything went.
    ///
    /// The wild key removes the set members. A map key is tried as stored,
    /// then as a path.
    pub fn erase_item(&mut self, key: &Value) -> bool {
        self.erase_item_with(key, MergeFlags::NONE)
    }

    /// [`Value::erase_item`] with explicit flags (`NO_FLATTEN` disables the
    /// path fallback)
    pub fn erase_item_with(&mut self, key: &Value, flags: MergeFlags) -> bool {
        if self.is_error() || self.is_wild() || !self.is_defined() || !key.is_defined() || key.is_error() {
            return false;
        }
        if key.is_wild() {
            let had_members = self.has_wild_members();
            self.erase_wild_members();
            return had_members;
        }
        if self.map_store().map_or(false, |store| store.find_key(key).is_ok()) {
            self.store_mut().remove_key(key);
            self.normalize();
            return true;
        }
        if key.is_map() && flags.flatten() {
            let mut erased = false;
            for (head, tail) in key.items() {
                erased |= if head.is_wild() {
                    self.erase_item_with(tail, flags)
                } else {
                    self.edit_existing(head, |nested| nested.erase_item_with(tail, flags))
                };
            }
            return erased;
        }
        false
    }

    /// Remove the single mapping `{key -> value}`; a set stored under `key`
    /// loses just that member. Returns true if something was removed.
    pub fn erase_item_value(&mut self, key: &Value, value: &Value) -> bool {
        if self.is_error() || self.is_wild() || !self.is_defined() {
            return false;
        }
        if key.is_wild() {
            if self.is_simple() {
                if *self == *value {
                    self.undefine();
                    return true;
                }
                return false;
            }
            let Some(index) = self.map_store().and_then(|store| store.find_entry(key, value).ok()) else {
                return false;
            };
            self.store_mut().remove_at(index);
            self.normalize();
            return true;
        }
        self.edit_existing(key, |stored| {
            if *stored == *value {
                stored.undefine();
                true
            } else {
                stored.erase_item_value(&Value::Wild, value)
            }
        })
    }

    /// Move the mapping under `old_key` to `new_key`.
    ///
    /// Fails with `BadValue` if either key is wild, with the key's own code
    /// if either key is an error, `AlreadyExists` if `new_key` is taken and
    /// `NameNotFound` if `old_key` is absent. The new key is stored as
    /// given, without path expansion.
    pub fn rename_item(&mut self, old_key: &Value, new_key: Value) -> Result<(), StatusCode> {
        if old_key.is_wild() || new_key.is_wild() {
            return Err(StatusCode::BadValue);
        }
        self.error_check()?;
        old_key.error_check()?;
        new_key.error_check()?;
        if !old_key.is_specified() || !new_key.is_specified() {
            return Err(StatusCode::BadValue);
        }
        let Some(store) = self.map_store() else {
            return Err(StatusCode::NameNotFound);
        };
        if store.find_key(&new_key).is_ok() {
            return Err(StatusCode::AlreadyExists);
        }
        let Ok(index) = store.find_key(old_key) else {
            return Err(StatusCode::NameNotFound);
        };
        let store = self.store_mut();
        let entry = store.remove_at(index);
        let _ = store.insert(new_key, entry.value);
        self.normalize();
        Ok(())
    }

    /// Run `edit` on the value stored under `key` in place; an edit that
    /// leaves it undefined removes the mapping
    pub(crate) fn edit_existing<R, F>(&mut self, key: &Value, edit: F) -> R
    where
        R: Default,
        F: FnOnce(&mut Value) -> R,
    {
        let Some(index) = self.map_store().and_then(|store| store.find_key(key).ok()) else {
            return R::default();
        };
        let result = {
            let mut slot = self.store_mut().begin_edit(index);
            edit(&mut *slot)
        };
        self.normalize();
        result
    }
}
