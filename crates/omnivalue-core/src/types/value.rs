//! The value type
//!
//! A [`Value`] is one of three storage classes (inline bytes, a shared
//! out-of-line buffer, or a shared map store) or one of the sentinels
//! `Undefined`, `Wild`, `Null` and `Error`. Every value has a type code.
//!
//! A simple (non-map) value `v` means the same thing as the one-entry map
//! `{Wild -> v}`; it is just stored without the map. Map values are kept in
//! normalized form: a store never holds zero entries (that is `Undefined`)
//! or a single wild-keyed entry (that is the bare value).

use std::sync::Arc;

use super::{ObjectRef, StatusCode, TypeCode};
use crate::algebra::MergeFlags;
use crate::constants::INLINE_CAPACITY;
use crate::structures::{MapEntry, MapStore, SharedBuffer};

static WILD: Value = Value::Wild;

/// Up to four payload bytes stored inside the value
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InlineData {
    len: u8,
    bytes: [u8; INLINE_CAPACITY],
}

impl InlineData {
    /// Copy `data` inline; `None` if it is longer than four bytes
    pub fn new(data: &[u8]) -> Option<Self> {
        if data.len() > INLINE_CAPACITY {
            return None;
        }
        let mut bytes = [0u8; INLINE_CAPACITY];
        bytes[..data.len()].copy_from_slice(data);
        Some(Self { len: data.len() as u8, bytes })
    }

    /// Payload bytes
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Payload length
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// True for a zero-length payload
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Payload read as a little-endian unsigned integer
    #[inline]
    pub fn as_u32(&self) -> u32 {
        u32::from_le_bytes(self.bytes)
    }
}

/// Self-describing value
#[derive(Clone, Default)]
pub enum Value {
    /// No value at all
    #[default]
    Undefined,
    /// The universal value; as a key it stands for every key
    Wild,
    /// Present but empty; asks for the default
    Null,
    /// Absorbing fault carrying a status code
    Error(StatusCode),
    /// Payload of at most four bytes
    Inline(TypeCode, InlineData),
    /// Payload in a shared buffer
    Large(TypeCode, SharedBuffer),
    /// Object reference
    Object(ObjectRef),
    /// Normalized key/value map
    Map(Arc<MapStore>),
}

impl Value {
    /// The undefined value
    pub const fn undefined() -> Self {
        Value::Undefined
    }

    /// The wild value
    pub const fn wild() -> Self {
        Value::Wild
    }

    /// The null value
    pub const fn null() -> Self {
        Value::Null
    }

    /// An error value
    pub const fn error(code: StatusCode) -> Self {
        Value::Error(code)
    }

    /// A time value in nanoseconds
    pub fn time(nanos: i64) -> Self {
        Value::from_raw(TypeCode::TIME, &nanos.to_le_bytes())
    }

    /// A status code carried as data (not an error sentinel)
    pub fn status(code: StatusCode) -> Self {
        Value::from_raw(TypeCode::STATUS, &code.to_raw().to_le_bytes())
    }

    /// Untyped bytes
    pub fn raw(data: &[u8]) -> Self {
        Value::from_raw(TypeCode::RAW, data)
    }

    /// An object reference
    pub fn object(object: ObjectRef) -> Self {
        Value::Object(object)
    }

    /// Build a value from a type code and payload, choosing the storage class.
    ///
    /// Sentinel codes produce the sentinel. Map and object codes cannot be
    /// built from bytes and give `Error(BadType)`.
    pub fn from_raw(type_code: TypeCode, data: &[u8]) -> Self {
        match type_code {
            TypeCode::UNDEFINED => Value::Undefined,
            TypeCode::WILD => Value::Wild,
            TypeCode::NULL => Value::Null,
            TypeCode::ERROR => match <[u8; 4]>::try_from(data) {
                Ok(raw) => Value::Error(StatusCode::from_raw(i32::from_le_bytes(raw))),
                Err(_) => Value::Error(StatusCode::BadValue),
            },
            TypeCode::MAP | TypeCode::OBJECT => Value::Error(StatusCode::BadType),
            _ => match InlineData::new(data) {
                Some(inline) => Value::Inline(type_code, inline),
                None => Value::Large(type_code, SharedBuffer::from_slice(data)),
            },
        }
    }

    /// The mapping `{key -> value}` in normalized form.
    ///
    /// A wild key gives back `value` itself; an undefined key or value gives
    /// `Undefined`; an error in either gives that error. A map key is
    /// flattened into nested mappings.
    pub fn pair(key: Value, value: Value) -> Self {
        Value::pair_with(key, value, MergeFlags::NONE)
    }

    /// [`Value::pair`] with explicit flags (`NO_FLATTEN` keeps map keys whole)
    pub fn pair_with(key: Value, value: Value, flags: MergeFlags) -> Self {
        let mut result = Value::Undefined;
        result.join_item_with(key, value, flags);
        result
    }

    /// Join a sequence of mappings into one value
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        let mut result = Value::Undefined;
        for (key, value) in entries {
            result.join_item(key, value);
        }
        result
    }

    /// Normalized value for a store: empty is undefined, a lone wild entry is
    /// its bare value
    pub(crate) fn from_store(mut store: MapStore) -> Self {
        match store.len() {
            0 => Value::Undefined,
            1 if store.entries()[0].key.is_wild() => store.remove_at(0).value,
            _ => Value::Map(Arc::new(store)),
        }
    }

    /// Re-establish normalized form after a map mutation
    pub(crate) fn normalize(&mut self) {
        let collapse = match self {
            Value::Map(store) => store.is_empty() || (store.len() == 1 && store.entries()[0].key.is_wild()),
            _ => false,
        };
        if collapse {
            if let Value::Map(store) = std::mem::take(self) {
                let store = Arc::try_unwrap(store).unwrap_or_else(|shared| (*shared).clone());
                *self = Value::from_store(store);
            }
        }
    }

    /// Mutable store for an in-place map mutation, copying it first if shared.
    ///
    /// A simple value is promoted to `{Wild -> value}` and `Undefined` to an
    /// empty store. Callers must [`Value::normalize`] afterwards.
    pub(crate) fn store_mut(&mut self) -> &mut MapStore {
        if !self.is_map() {
            let mut store = MapStore::new();
            match std::mem::take(self) {
                Value::Undefined => {}
                simple => {
                    let _ = store.insert(Value::Wild, simple);
                }
            }
            *self = Value::Map(Arc::new(store));
        }
        match self {
            Value::Map(store) => Arc::make_mut(store),
            _ => unreachable!("value was just promoted to a map"),
        }
    }

    // ---------------------------------------------------------------------
    // Predicates
    // ---------------------------------------------------------------------

    /// Anything but `Undefined`
    #[inline]
    pub fn is_defined(&self) -> bool {
        !matches!(self, Value::Undefined)
    }

    /// The wild value
    #[inline]
    pub fn is_wild(&self) -> bool {
        matches!(self, Value::Wild)
    }

    /// The null value
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// An error value
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Storage class is not a map
    #[inline]
    pub fn is_simple(&self) -> bool {
        !self.is_map()
    }

    /// Storage class is a map
    #[inline]
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Holds an object reference
    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Defined and not wild
    #[inline]
    pub fn is_specified(&self) -> bool {
        self.is_defined() && !self.is_wild()
    }

    /// `Err` with the code of an error value
    pub fn error_check(&self) -> Result<(), StatusCode> {
        match self {
            Value::Error(code) => Err(*code),
            _ => Ok(()),
        }
    }

    /// True if every key is wild: a simple value or a set of simple values
    pub fn is_set_like(&self) -> bool {
        match self {
            Value::Map(store) => store.iter().all(|e| e.key.is_wild()),
            _ => true,
        }
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    /// Type code of this value
    pub fn type_code(&self) -> TypeCode {
        match self {
            Value::Undefined => TypeCode::UNDEFINED,
            Value::Wild => TypeCode::WILD,
            Value::Null => TypeCode::NULL,
            Value::Error(_) => TypeCode::ERROR,
            Value::Inline(type_code, _) | Value::Large(type_code, _) => *type_code,
            Value::Object(_) => TypeCode::OBJECT,
            Value::Map(_) => TypeCode::MAP,
        }
    }

    /// Payload bytes of an inline or large value
    pub fn data(&self) -> Option<&[u8]> {
        match self {
            Value::Inline(_, inline) => Some(inline.as_slice()),
            Value::Large(_, buffer) => Some(buffer.data()),
            _ => None,
        }
    }

    /// Payload length in bytes (0 for sentinels, objects and maps)
    pub fn payload_len(&self) -> usize {
        self.data().map_or(0, <[u8]>::len)
    }

    /// Number of mappings: 0 for undefined, 1 for a simple value
    pub fn count_items(&self) -> usize {
        match self {
            Value::Undefined | Value::Error(_) => 0,
            Value::Map(store) => store.len(),
            _ => 1,
        }
    }

    /// Iterate `(key, value)` mappings; a simple value yields `(Wild, self)`
    pub fn items(&self) -> Items<'_> {
        match self {
            Value::Undefined | Value::Error(_) => Items::Empty,
            Value::Map(store) => Items::Entries(store.iter()),
            simple => Items::Single(Some(simple)),
        }
    }

    /// Iterate keys in store order
    pub fn keys(&self) -> impl Iterator<Item = &Value> + '_ {
        self.items().map(|(key, _)| key)
    }

    /// Underlying map store
    pub fn map_store(&self) -> Option<&MapStore> {
        match self {
            Value::Map(store) => Some(store),
            _ => None,
        }
    }

    /// Object reference held by this value
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Replace with `Undefined`, releasing any storage
    pub fn undefine(&mut self) {
        *self = Value::Undefined;
    }

    /// Exchange contents with `other`
    pub fn swap_with(&mut self, other: &mut Value) {
        std::mem::swap(self, other);
    }

    /// The wild-keyed members of this value as one value (a set, a single
    /// member or `Undefined`)
    pub(crate) fn wild_members(&self) -> Value {
        match self {
            Value::Map(store) => {
                let range = store.key_range(&Value::Wild);
                if range.is_empty() {
                    return Value::Undefined;
                }
                let mut members = MapStore::with_capacity(range.len());
                for entry in &store.entries()[range] {
                    members.push_sorted(entry.clone());
                }
                Value::from_store(members)
            }
            Value::Undefined | Value::Error(_) => Value::Undefined,
            simple => simple.clone(),
        }
    }

    /// True if this value has at least one wild-keyed mapping
    pub(crate) fn has_wild_members(&self) -> bool {
        match self {
            Value::Map(store) => !store.key_range(&Value::Wild).is_empty(),
            Value::Undefined | Value::Error(_) => false,
            _ => true,
        }
    }

    /// Entry slice for map values, empty otherwise
    pub(crate) fn entries(&self) -> &[MapEntry] {
        match self {
            Value::Map(store) => store.entries(),
            _ => &[],
        }
    }
}

/// Iterator over the mappings of a value
pub enum Items<'a> {
    /// Nothing to yield
    Empty,
    /// A simple value, yielded once under the wild key
    Single(Option<&'a Value>),
    /// Entries of a map store
    Entries(std::slice::Iter<'a, MapEntry>),
}

impl<'a> Iterator for Items<'a> {
    type Item = (&'a Value, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Items::Empty => None,
            Items::Single(value) => value.take().map(|v| (&WILD, v)),
            Items::Entries(iter) => iter.next().map(|e| (&e.key, &e.value)),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = match self {
            Items::Empty => 0,
            Items::Single(value) => usize::from(value.is_some()),
            Items::Entries(iter) => iter.len(),
        };
        (n, Some(n))
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::from_raw(TypeCode::INT8, &v.to_le_bytes())
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::from_raw(TypeCode::INT16, &v.to_le_bytes())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::from_raw(TypeCode::INT32, &v.to_le_bytes())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::from_raw(TypeCode::INT64, &v.to_le_bytes())
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::from_raw(TypeCode::FLOAT, &v.to_le_bytes())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::from_raw(TypeCode::DOUBLE, &v.to_le_bytes())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::from_raw(TypeCode::BOOL, &[u8::from(v)])
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::from_raw(TypeCode::STRING, v.as_bytes())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::from(v.as_str())
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Value::Object(v)
    }
}
