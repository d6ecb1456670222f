//! Scoped edit of one mapping
//!
//! [`Value::edit_item`] moves the value stored under a key into a guard and
//! hands out `&mut Value`. Dropping the guard writes the value back and
//! re-normalizes the owner: an undefined result erases the mapping and an
//! error result poisons the owner.

use std::ops::{Deref, DerefMut};

use super::MergeFlags;
use crate::types::Value;

/// Guard over the value stored under one key
pub struct ItemEdit<'a> {
    owner: &'a mut Value,
    key: Value,
    value: Value,
    slot: Option<usize>,
}

impl Value {
    /// Edit the value under `key` in place.
    ///
    /// The guard starts out holding the stored value (`Undefined` if the key
    /// is absent). The wild key edits the whole value. Keys are used as
    /// given, without path expansion.
    pub fn edit_item(&mut self, key: Value) -> ItemEdit<'_> {
        if key.is_wild() {
            let value = std::mem::take(self);
            return ItemEdit { owner: self, key, value, slot: None };
        }
        let slot = self.map_store().and_then(|store| store.find_key(&key).ok());
        let value = match slot {
            Some(index) => self.store_mut().take_value(index),
            None => Value::Undefined,
        };
        ItemEdit { owner: self, key, value, slot }
    }
}

impl ItemEdit<'_> {
    /// Key under edit
    pub fn key(&self) -> &Value {
        &self.key
    }
}

impl Deref for ItemEdit<'_> {
    type Target = Value;

    fn deref(&self) -> &Value {
        &self.value
    }
}

impl DerefMut for ItemEdit<'_> {
    fn deref_mut(&mut self) -> &mut Value {
        &mut self.value
    }
}

impl Drop for ItemEdit<'_> {
    fn drop(&mut self) {
        let value = std::mem::take(&mut self.value);
        if self.key.is_wild() || value.is_error() {
            *self.owner = value;
            self.owner.normalize();
            return;
        }
        match self.slot {
            Some(index) => {
                self.owner.store_mut().replace_value_at(index, value);
                self.owner.normalize();
            }
            None => {
                let key = std::mem::take(&mut self.key);
                self.owner.join_item_with(key, value, MergeFlags::NO_FLATTEN);
            }
        }
    }
}
