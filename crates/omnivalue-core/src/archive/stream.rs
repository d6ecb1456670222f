//! Byte transports for the archive codec
//!
//! The codec only needs sequential writes and reads plus a hook for object
//! references, which cannot travel as raw bytes: the writer parks each
//! reference in a side table and puts its slot index on the wire, the
//! reader resolves slots back through its own table.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::constants::OBJECT_SLOT_SIZE;
use crate::types::{ArchiveError, ObjectRef};

/// Sequential output for archived values
pub trait ByteSink {
    /// Append header words and inline payloads
    fn write_small_data(&mut self, data: &[u8]) -> Result<(), ArchiveError>;

    /// Append an out-of-line payload
    fn write_large_data(&mut self, data: &[u8]) -> Result<(), ArchiveError>;

    /// Register `object` with the transport and append its slot: a `u32`
    /// slot index and the `u32` object kind, little-endian
    fn write_object_slot(&mut self, object: &ObjectRef) -> Result<(), ArchiveError>;

    /// Bytes written so far
    fn position(&self) -> usize;
}

/// Sequential input for archived values
pub trait ByteSource {
    /// Fill `out` with the next header or inline bytes
    fn read_small_data(&mut self, out: &mut [u8]) -> Result<(), ArchiveError>;

    /// Fill `out` with the next out-of-line payload
    fn read_large_data(&mut self, out: &mut [u8]) -> Result<(), ArchiveError>;

    /// Read an object slot and resolve it to a reference
    fn read_object_slot(&mut self, little_endian: bool) -> Result<ObjectRef, ArchiveError>;

    /// Bytes left to read
    fn remaining(&self) -> usize;
}

/// [`ByteSink`] over a growable buffer
#[derive(Debug)]
pub struct ArchiveWriter {
    buf: BytesMut,
    objects: Option<Vec<ObjectRef>>,
}

impl ArchiveWriter {
    /// Writer with an object side table
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Writer with an object side table and `capacity` bytes reserved
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            objects: Some(Vec::new()),
        }
    }

    /// Writer that rejects object references
    pub fn without_objects() -> Self {
        Self {
            buf: BytesMut::new(),
            objects: None,
        }
    }

    /// Bytes written so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Objects registered so far, in slot order
    pub fn objects(&self) -> &[ObjectRef] {
        self.objects.as_deref().unwrap_or_default()
    }

    /// Finish writing; returns the bytes and the object side table
    pub fn into_parts(self) -> (Bytes, Vec<ObjectRef>) {
        (self.buf.freeze(), self.objects.unwrap_or_default())
    }

    /// Finish writing, dropping the side table
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}

impl Default for ArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteSink for ArchiveWriter {
    fn write_small_data(&mut self, data: &[u8]) -> Result<(), ArchiveError> {
        self.buf.put_slice(data);
        Ok(())
    }

    fn write_large_data(&mut self, data: &[u8]) -> Result<(), ArchiveError> {
        self.buf.reserve(data.len());
        self.buf.put_slice(data);
        Ok(())
    }

    fn write_object_slot(&mut self, object: &ObjectRef) -> Result<(), ArchiveError> {
        let objects = self.objects.as_mut().ok_or(ArchiveError::NoObjectTable)?;
        let slot = u32::try_from(objects.len()).map_err(|_| ArchiveError::TooLarge(objects.len()))?;
        objects.push(object.clone());
        self.buf.put_u32_le(slot);
        self.buf.put_u32_le(object.flatten().kind);
        Ok(())
    }

    fn position(&self) -> usize {
        self.buf.len()
    }
}

/// [`ByteSource`] over an immutable buffer
#[derive(Debug, Clone)]
pub struct ArchiveReader {
    data: Bytes,
    objects: Option<Vec<ObjectRef>>,
}

impl ArchiveReader {
    /// Reader that rejects object slots
    pub fn new(data: Bytes) -> Self {
        Self { data, objects: None }
    }

    /// Reader resolving object slots through `objects`
    pub fn with_objects(data: Bytes, objects: Vec<ObjectRef>) -> Self {
        Self {
            data,
            objects: Some(objects),
        }
    }

    fn take(&mut self, out: &mut [u8]) -> Result<(), ArchiveError> {
        if self.data.remaining() < out.len() {
            return Err(ArchiveError::Truncated {
                needed: out.len(),
                available: self.data.remaining(),
            });
        }
        self.data.copy_to_slice(out);
        Ok(())
    }
}

impl ByteSource for ArchiveReader {
    fn read_small_data(&mut self, out: &mut [u8]) -> Result<(), ArchiveError> {
        self.take(out)
    }

    fn read_large_data(&mut self, out: &mut [u8]) -> Result<(), ArchiveError> {
        self.take(out)
    }

    fn read_object_slot(&mut self, little_endian: bool) -> Result<ObjectRef, ArchiveError> {
        let mut raw = [0u8; OBJECT_SLOT_SIZE];
        self.take(&mut raw)?;
        let slot_bytes = [raw[0], raw[1], raw[2], raw[3]];
        let slot = if little_endian {
            u32::from_le_bytes(slot_bytes)
        } else {
            u32::from_be_bytes(slot_bytes)
        };
        let objects = self.objects.as_ref().ok_or(ArchiveError::NoObjectTable)?;
        objects
            .get(slot as usize)
            .cloned()
            .ok_or(ArchiveError::UnknownObjectSlot(slot))
    }

    fn remaining(&self) -> usize {
        self.data.remaining()
    }
}
