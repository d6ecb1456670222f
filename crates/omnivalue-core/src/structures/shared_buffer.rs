//! Reference-counted, copy-on-write byte buffer backing large payloads

use std::sync::Arc;

/// Shared byte buffer; cloning adds a user, dropping removes one
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SharedBuffer(Arc<Vec<u8>>);

impl SharedBuffer {
    /// Allocate a zero-filled buffer of `len` bytes
    pub fn alloc(len: usize) -> Self {
        SharedBuffer(Arc::new(vec![0u8; len]))
    }

    /// Copy `data` into a new buffer
    pub fn from_slice(data: &[u8]) -> Self {
        SharedBuffer(Arc::new(data.to_vec()))
    }

    /// Buffer contents
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a zero-length buffer
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of values sharing this buffer
    pub fn users(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// True if both handles share one allocation
    pub fn ptr_eq(&self, other: &SharedBuffer) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Make the buffer private and resize it to `new_len`.
    ///
    /// A shared buffer is cloned first; a private one is resized in place.
    /// New bytes are zero.
    pub fn edit(&mut self, new_len: usize) -> &mut [u8] {
        let buf = Arc::make_mut(&mut self.0);
        buf.resize(new_len, 0);
        buf.as_mut_slice()
    }
}

impl From<Vec<u8>> for SharedBuffer {
    fn from(data: Vec<u8>) -> Self {
        SharedBuffer(Arc::new(data))
    }
}

impl std::fmt::Debug for SharedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SharedBuffer({} bytes, {} users)", self.len(), self.users())
    }
}
