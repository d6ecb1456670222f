//! Sorted map store
//!
//! The out-of-line storage behind map values: a pooled block of
//! `(key, value)` entries kept sorted by key, then by value. Only the wild
//! key may repeat (that is how sets are stored), so the value tiebreak only
//! orders set members.
//!
//! Stores are shared through `Arc` and copied on write. Every mutation
//! invalidates the cached archived size. Only this crate builds or mutates
//! stores, so a store reachable from a [`Value`] is always in normalized
//! form.

use std::cmp::Ordering as CmpOrdering;
use std::fmt;
use std::ops::{Deref, DerefMut, Range};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::map_pool::map_pool;
use crate::constants::ARCHIVED_SIZE_UNKNOWN;
use crate::core::config::global_config;
use crate::log_trace;
use crate::types::compare::compare;
use crate::types::Value;

/// One key/value association
#[derive(Clone, PartialEq, Eq)]
pub struct MapEntry {
    /// Entry key
    pub key: Value,
    /// Entry value
    pub value: Value,
}

impl MapEntry {
    /// Build an entry
    pub fn new(key: Value, value: Value) -> Self {
        Self { key, value }
    }

    /// Store order: key first, then value
    #[inline]
    fn order(&self, key: &Value, value: &Value) -> CmpOrdering {
        compare(&self.key, key).then_with(|| compare(&self.value, value))
    }
}

impl fmt::Debug for MapEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} -> {:?}", self.key, self.value)
    }
}

/// Sorted, pooled array of map entries.
///
/// Read-only outside this crate; maps are built through the [`Value`]
/// operations. A store cannot be created directly:
///
/// ```compile_fail
/// use omnivalue_core::MapStore;
/// let _store = MapStore::new();
/// ```
///
/// nor edited once taken out of a value:
///
/// ```compile_fail
/// use omnivalue_core::Value;
/// let value = Value::from_entries([
///     (Value::from("a"), Value::from(1)),
///     (Value::from("b"), Value::from(2)),
/// ]);
/// let Value::Map(store) = value else { return };
/// let mut store = (*store).clone();
/// store.remove_key(&Value::from("a"));
/// ```
pub struct MapStore {
    entries: Vec<MapEntry>,
    archived_size: AtomicUsize,
}

impl MapStore {
    /// Empty store in the smallest pooled block
    pub(crate) fn new() -> Self {
        Self::with_capacity(1)
    }

    /// Empty store able to hold `capacity` entries without growing
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: map_pool().acquire(capacity),
            archived_size: AtomicUsize::new(ARCHIVED_SIZE_UNKNOWN),
        }
    }

    /// Number of entries
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are stored
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Allocated capacity in entries
    #[inline]
    pub fn avail(&self) -> usize {
        self.entries.capacity()
    }

    /// Entries in store order
    #[inline]
    pub fn entries(&self) -> &[MapEntry] {
        &self.entries
    }

    /// Iterate entries in store order
    pub fn iter(&self) -> std::slice::Iter<'_, MapEntry> {
        self.entries.iter()
    }

    /// Entry at `index`
    pub fn get(&self, index: usize) -> Option<&MapEntry> {
        self.entries.get(index)
    }

    /// Locate the first entry with `key`, or where it would be inserted
    pub fn find_key(&self, key: &Value) -> Result<usize, usize> {
        let index = self.entries.partition_point(|e| compare(&e.key, key) == CmpOrdering::Less);
        match self.entries.get(index) {
            Some(entry) if compare(&entry.key, key) == CmpOrdering::Equal => Ok(index),
            _ => Err(index),
        }
    }

    /// Index range of all entries with `key` (several only for the wild key)
    pub fn key_range(&self, key: &Value) -> Range<usize> {
        let start = self.entries.partition_point(|e| compare(&e.key, key) == CmpOrdering::Less);
        let end = start
            + self.entries[start..].partition_point(|e| compare(&e.key, key) == CmpOrdering::Equal);
        start..end
    }

    /// Locate the exact `(key, value)` entry
    pub fn find_entry(&self, key: &Value, value: &Value) -> Result<usize, usize> {
        self.entries.binary_search_by(|e| e.order(key, value))
    }

    /// Value stored under a non-repeating `key`
    pub fn value_of(&self, key: &Value) -> Option<&Value> {
        self.find_key(key).ok().map(|index| &self.entries[index].value)
    }

    /// Insert keeping sort order. Returns the index, or `Err` with the index
    /// of an identical entry already present.
    ///
    /// Callers keep non-wild keys unique.
    pub(crate) fn insert(&mut self, key: Value, value: Value) -> Result<usize, usize> {
        let index = match self.find_entry(&key, &value) {
            Ok(existing) => return Err(existing),
            Err(index) => index,
        };
        self.reserve_one();
        self.entries.insert(index, MapEntry::new(key, value));
        self.invalidate();
        Ok(index)
    }

    /// Append an entry known to sort after every existing one
    pub(crate) fn push_sorted(&mut self, entry: MapEntry) {
        debug_assert!(self
            .entries
            .last()
            .map_or(true, |last| last.order(&entry.key, &entry.value) == CmpOrdering::Less));
        self.reserve_one();
        self.entries.push(entry);
        self.invalidate();
    }

    /// Replace the value at `index`, re-sorting wild-keyed entries
    pub(crate) fn replace_value_at(&mut self, index: usize, value: Value) {
        self.entries[index].value = value;
        self.end_edit(index);
    }

    /// Move the value at `index` out, leaving `Undefined` until it is put
    /// back with [`MapStore::replace_value_at`]
    pub(crate) fn take_value(&mut self, index: usize) -> Value {
        self.invalidate();
        std::mem::take(&mut self.entries[index].value)
    }

    /// Remove and return the entry at `index`
    pub(crate) fn remove_at(&mut self, index: usize) -> MapEntry {
        let entry = self.entries.remove(index);
        self.invalidate();
        self.maybe_shrink();
        entry
    }

    /// Remove every entry with `key`; returns how many were removed
    pub(crate) fn remove_key(&mut self, key: &Value) -> usize {
        let range = self.key_range(key);
        let removed = range.len();
        if removed > 0 {
            self.entries.drain(range);
            self.invalidate();
            self.maybe_shrink();
        }
        removed
    }

    /// Start an in-place edit of the value at `index`.
    ///
    /// Dropping the guard ends the edit: an `Undefined` value removes the
    /// entry and an edited set member moves back into sort position.
    pub(crate) fn begin_edit(&mut self, index: usize) -> EntryEdit<'_> {
        assert!(index < self.entries.len(), "edit index {} out of bounds", index);
        EntryEdit { store: self, index }
    }

    fn end_edit(&mut self, index: usize) {
        self.invalidate();
        if !self.entries[index].value.is_defined() {
            self.remove_at(index);
        } else if self.entries[index].key.is_wild() {
            let entry = self.entries.remove(index);
            match self.find_entry(&entry.key, &entry.value) {
                // Edited into an existing member: the set keeps one copy
                Ok(_) => self.maybe_shrink(),
                Err(at) => self.entries.insert(at, entry),
            }
        }
    }

    /// Cached archived size, if still valid
    pub fn cached_archived_size(&self) -> Option<usize> {
        match self.archived_size.load(Ordering::Relaxed) {
            ARCHIVED_SIZE_UNKNOWN => None,
            size => Some(size),
        }
    }

    /// Remember the archived size computed for the current contents
    pub(crate) fn cache_archived_size(&self, size: usize) {
        self.archived_size.store(size, Ordering::Relaxed);
    }

    #[inline]
    fn invalidate(&self) {
        self.archived_size.store(ARCHIVED_SIZE_UNKNOWN, Ordering::Relaxed);
    }

    /// Make room for one more entry, moving to a bigger block when full
    fn reserve_one(&mut self) {
        let capacity = self.entries.capacity();
        if self.entries.len() < capacity {
            return;
        }
        let pool = map_pool();
        let target = pool.next_capacity(capacity, global_config().growth.grow_percent);
        log_trace!("map store grow: {} -> {}", capacity, target);
        self.move_to_block(target);
    }

    /// Move to a smaller block once occupancy drops below the shrink threshold
    fn maybe_shrink(&mut self) {
        let pool = map_pool();
        let capacity = self.entries.capacity();
        if capacity <= pool.smallest_capacity() {
            return;
        }
        let len = self.entries.len();
        if len * 100 >= capacity * global_config().growth.shrink_percent {
            return;
        }
        let target = pool.capacity_for(len);
        if target < capacity {
            log_trace!("map store shrink: {} -> {}", capacity, target);
            self.move_to_block(target);
        }
    }

    fn move_to_block(&mut self, capacity: usize) {
        let mut block = map_pool().acquire(capacity);
        block.extend(self.entries.drain(..));
        let old = std::mem::replace(&mut self.entries, block);
        map_pool().release(old);
    }
}

impl Clone for MapStore {
    fn clone(&self) -> Self {
        let mut entries = map_pool().acquire(self.entries.len());
        entries.extend(self.entries.iter().cloned());
        Self {
            entries,
            archived_size: AtomicUsize::new(self.archived_size.load(Ordering::Relaxed)),
        }
    }
}

impl Drop for MapStore {
    fn drop(&mut self) {
        map_pool().release(std::mem::take(&mut self.entries));
    }
}

impl fmt::Debug for MapStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}

/// In-place edit of one entry's value; ends the edit on drop
pub struct EntryEdit<'a> {
    store: &'a mut MapStore,
    index: usize,
}

impl EntryEdit<'_> {
    /// Key of the entry under edit
    pub fn key(&self) -> &Value {
        &self.store.entries[self.index].key
    }
}

impl Deref for EntryEdit<'_> {
    type Target = Value;

    fn deref(&self) -> &Value {
        &self.store.entries[self.index].value
    }
}

impl DerefMut for EntryEdit<'_> {
    fn deref_mut(&mut self) -> &mut Value {
        &mut self.store.entries[self.index].value
    }
}

impl Drop for EntryEdit<'_> {
    fn drop(&mut self) {
        self.store.end_edit(self.index);
    }
}

#[cfg(test)]
mod tests;
