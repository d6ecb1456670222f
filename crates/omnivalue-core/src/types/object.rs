//! Object references
//!
//! An object-typed value holds a handle to something living outside the
//! value system (a local object or a proxy for a remote one). The value core
//! only needs its flattened, process-relative identity; acquiring and
//! releasing the reference are the handle's `Clone` and `Drop`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Flattened, process-relative identity of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlatObject {
    /// Kind of reference (local, proxy, weak, ...) as defined by the runtime
    pub kind: u32,
    /// Handle or address identifying the object within this process
    pub handle: u64,
}

/// Anything that can be referenced from a value
pub trait RemoteObject: Send + Sync + fmt::Debug {
    /// Identity of this object as seen by the transport
    fn flatten(&self) -> FlatObject;
}

/// Shared handle to an object; clone to acquire, drop to release
#[derive(Clone)]
pub struct ObjectRef(Arc<dyn RemoteObject>);

impl ObjectRef {
    /// Wrap an object in a new handle
    pub fn new<T: RemoteObject + 'static>(object: T) -> Self {
        ObjectRef(Arc::new(object))
    }

    /// Wrap an already shared object
    pub fn from_arc(object: Arc<dyn RemoteObject>) -> Self {
        ObjectRef(object)
    }

    /// Flattened identity
    pub fn flatten(&self) -> FlatObject {
        self.0.flatten()
    }

    /// Number of live handles to this object
    pub fn users(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Borrow the underlying object
    pub fn get(&self) -> &dyn RemoteObject {
        self.0.as_ref()
    }

    /// True if both handles point at the same allocation
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.flatten() == other.flatten()
    }
}

impl Eq for ObjectRef {}

impl PartialOrd for ObjectRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ObjectRef {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.ptr_eq(other) {
            return Ordering::Equal;
        }
        self.flatten().cmp(&other.flatten())
    }
}

impl Hash for ObjectRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.flatten().hash(state);
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flat = self.flatten();
        write!(f, "object({}:{:#x})", flat.kind, flat.handle)
    }
}

/// Plain in-process object identified by a kind and a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalObject {
    /// Reference kind
    pub kind: u32,
    /// Process-relative handle
    pub handle: u64,
}

impl LocalObject {
    /// Local reference kind
    pub const KIND_LOCAL: u32 = 1;

    /// A local object with the given handle
    pub fn new(handle: u64) -> Self {
        Self { kind: Self::KIND_LOCAL, handle }
    }
}

impl RemoteObject for LocalObject {
    fn flatten(&self) -> FlatObject {
        FlatObject { kind: self.kind, handle: self.handle }
    }
}
