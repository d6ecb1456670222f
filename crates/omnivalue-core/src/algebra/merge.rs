//! Join, overlay and inherit
//!
//! All three walk the mappings of the right-hand value into the left one.
//! They differ on a key conflict: join unions, overlay replaces and inherit
//! keeps. A map key is expanded into a nested path (`{a -> b}` as a key
//! means "key `b` inside key `a`") unless `NO_FLATTEN` is set; a set of keys
//! applies the value under each of them.

use super::MergeFlags;
use crate::types::Value;

/// How a conflicting non-wild key is resolved
#[derive(Clone, Copy, PartialEq, Eq)]
enum Merge {
    Join,
    Overlay,
    Inherit,
}

impl Value {
    // ---------------------------------------------------------------------
    // Join
    // ---------------------------------------------------------------------

    /// Union of mappings. Values meeting under one key are joined
    /// recursively, so simple values accumulate into sets. `Wild` absorbs.
    pub fn join(&mut self, from: &Value, flags: MergeFlags) {
        if self.is_error() {
            return;
        }
        if from.is_error() {
            *self = from.clone();
            return;
        }
        if !from.is_defined() || self.is_wild() {
            return;
        }
        if from.is_wild() {
            *self = Value::Wild;
            return;
        }
        if !self.is_defined() {
            *self = from.clone();
            return;
        }
        for (key, value) in from.items() {
            self.join_item_with(key.clone(), value.clone(), flags | MergeFlags::NO_FLATTEN);
        }
    }

    /// [`Value::join`] into a copy
    pub fn joined(&self, from: &Value, flags: MergeFlags) -> Value {
        let mut result = self.clone();
        result.join(from, flags);
        result
    }

    /// Join the single mapping `{key -> value}`
    pub fn join_item(&mut self, key: Value, value: Value) {
        self.join_item_with(key, value, MergeFlags::NONE);
    }

    /// [`Value::join_item`] with explicit flags.
    ///
    /// Under the wild key a map value merges into this level and a simple
    /// value becomes a set member. With `NO_RECURSION` a conflicting key
    /// unions set-like values and otherwise takes the new value.
    pub fn join_item_with(&mut self, key: Value, value: Value, flags: MergeFlags) {
        if !self.accepts_item(&key, &value) {
            return;
        }
        if key.is_wild() {
            match value {
                Value::Wild => *self = Value::Wild,
                Value::Map(_) => self.join(&value, flags),
                member => self.add_member(member),
            }
        } else if key.is_map() && flags.flatten() {
            for (head, tail) in key.items() {
                let nested = Value::pair_with(tail.clone(), value.clone(), flags);
                self.join_item_with(head.clone(), nested, flags);
            }
        } else {
            self.merge_key(key, value, flags, Merge::Join);
        }
    }

    // ---------------------------------------------------------------------
    // Overlay
    // ---------------------------------------------------------------------

    /// Mappings of `from` replace those of `self`.
    ///
    /// Wild-keyed members of `from` replace all wild-keyed members here.
    /// A shared key takes `from`'s value, recursing instead when both sides
    /// are maps (unless `NO_RECURSION`). `Wild` on the right replaces
    /// everything; `Wild` on the left survives unless `from` has members.
    pub fn overlay(&mut self, from: &Value, flags: MergeFlags) {
        if self.is_error() {
            return;
        }
        if from.is_error() {
            *self = from.clone();
            return;
        }
        if !from.is_defined() {
            return;
        }
        if from.is_wild() || !self.is_defined() {
            *self = from.clone();
            return;
        }
        if self.is_wild() {
            if from.has_wild_members() {
                *self = from.clone();
            }
            return;
        }
        if from.has_wild_members() {
            self.erase_wild_members();
            self.join(&from.wild_members(), flags);
        }
        for (key, value) in from.items().filter(|(key, _)| !key.is_wild()) {
            self.merge_key(key.clone(), value.clone(), flags, Merge::Overlay);
        }
    }

    /// [`Value::overlay`] into a copy
    pub fn overlaid(&self, from: &Value, flags: MergeFlags) -> Value {
        let mut result = self.clone();
        result.overlay(from, flags);
        result
    }

    /// Overlay the single mapping `{key -> value}`
    pub fn overlay_item(&mut self, key: Value, value: Value) {
        self.overlay_item_with(key, value, MergeFlags::NONE);
    }

    /// [`Value::overlay_item`] with explicit flags
    pub fn overlay_item_with(&mut self, key: Value, value: Value, flags: MergeFlags) {
        if self.is_plain_item(&key, &value, flags) {
            if self.is_wild() {
                return;
            }
            self.merge_key(key, value, flags, Merge::Overlay);
        } else {
            self.overlay(&Value::pair_with(key, value, flags), flags);
        }
    }

    // ---------------------------------------------------------------------
    // Inherit
    // ---------------------------------------------------------------------

    /// Fill in what `self` lacks from `from`.
    ///
    /// Wild-keyed members of `from` are added only if `self` has none. A key
    /// missing here is added; a shared key keeps this value, merging
    /// recursively when both sides are maps (unless `NO_RECURSION`).
    pub fn inherit(&mut self, from: &Value, flags: MergeFlags) {
        if self.is_error() {
            return;
        }
        if from.is_error() {
            *self = from.clone();
            return;
        }
        if !from.is_defined() || self.is_wild() {
            return;
        }
        if !self.is_defined() {
            *self = from.clone();
            return;
        }
        if from.is_wild() {
            if !self.has_wild_members() {
                *self = Value::Wild;
            }
            return;
        }
        if !self.has_wild_members() && from.has_wild_members() {
            self.join(&from.wild_members(), flags);
        }
        for (key, value) in from.items().filter(|(key, _)| !key.is_wild()) {
            self.merge_key(key.clone(), value.clone(), flags, Merge::Inherit);
        }
    }

    /// [`Value::inherit`] into a copy
    pub fn inherited(&self, from: &Value, flags: MergeFlags) -> Value {
        let mut result = self.clone();
        result.inherit(from, flags);
        result
    }

    /// Inherit the single mapping `{key -> value}`
    pub fn inherit_item(&mut self, key: Value, value: Value) {
        self.inherit_item_with(key, value, MergeFlags::NONE);
    }

    /// [`Value::inherit_item`] with explicit flags
    pub fn inherit_item_with(&mut self, key: Value, value: Value, flags: MergeFlags) {
        if self.is_plain_item(&key, &value, flags) {
            if self.is_wild() {
                return;
            }
            self.merge_key(key, value, flags, Merge::Inherit);
        } else {
            self.inherit(&Value::pair_with(key, value, flags), flags);
        }
    }

    // ---------------------------------------------------------------------
    // Set
    // ---------------------------------------------------------------------

    /// Replace whatever is stored under `key` with `value`; an undefined
    /// value just erases the key
    pub fn set_value(&mut self, key: Value, value: Value) {
        self.set_value_with(key, value, MergeFlags::NONE);
    }

    /// [`Value::set_value`] with explicit flags
    pub fn set_value_with(&mut self, key: Value, value: Value, flags: MergeFlags) {
        if self.is_error() {
            return;
        }
        if value.is_error() {
            *self = value;
            return;
        }
        self.erase_item_with(&key, flags);
        self.join_item_with(key, value, flags);
    }

    // ---------------------------------------------------------------------
    // Shared plumbing
    // ---------------------------------------------------------------------

    /// Error and undefined handling shared by the single-item operations.
    /// Returns false when there is nothing left to do.
    fn accepts_item(&mut self, key: &Value, value: &Value) -> bool {
        if self.is_error() {
            return false;
        }
        if let Value::Error(code) = key {
            *self = Value::Error(*code);
            return false;
        }
        if let Value::Error(code) = value {
            *self = Value::Error(*code);
            return false;
        }
        key.is_defined() && value.is_defined() && !self.is_wild()
    }

    /// True for a single ordinary key that can be merged in place; wild and
    /// path keys go through the whole-value operation instead
    fn is_plain_item(&self, key: &Value, value: &Value, flags: MergeFlags) -> bool {
        if self.is_error() || key.is_error() || value.is_error() {
            return false;
        }
        key.is_specified() && value.is_defined() && !(key.is_map() && flags.flatten())
    }

    /// Merge one ordinary key into this value
    fn merge_key(&mut self, key: Value, value: Value, flags: MergeFlags, merge: Merge) {
        let store = self.store_mut();
        match store.find_key(&key) {
            Err(_) => {
                let _ = store.insert(key, value);
            }
            Ok(index) => {
                let mut slot = store.begin_edit(index);
                let nested = !slot.is_simple() && !value.is_simple();
                match merge {
                    Merge::Join if flags.recursion() || (slot.is_set_like() && value.is_set_like()) => {
                        slot.join(&value, flags);
                    }
                    Merge::Join => *slot = value,
                    Merge::Overlay if nested && flags.recursion() => slot.overlay(&value, flags),
                    Merge::Overlay => *slot = value,
                    Merge::Inherit if nested && flags.recursion() => slot.inherit(&value, flags),
                    Merge::Inherit => {}
                }
            }
        }
        self.normalize();
    }

    /// Add a simple value as a wild-keyed set member
    fn add_member(&mut self, member: Value) {
        if !self.is_defined() {
            *self = member;
            return;
        }
        if self.is_simple() && *self == member {
            return;
        }
        let _ = self.store_mut().insert(Value::Wild, member);
        self.normalize();
    }

    /// Drop every wild-keyed member
    pub(crate) fn erase_wild_members(&mut self) {
        match self {
            Value::Map(_) => {
                if self.has_wild_members() {
                    self.store_mut().remove_key(&Value::Wild);
                    self.normalize();
                }
            }
            Value::Undefined | Value::Wild | Value::Error(_) => {}
            _ => self.undefine(),
        }
    }
}
