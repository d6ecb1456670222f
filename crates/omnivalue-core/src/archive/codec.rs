//! Archive encoding and decoding
//!
//! Every value starts with an 8-byte header. The first word is written
//! big-endian:
//!
//! ```text
//! bits 31..4  type code
//! bit  3      byte order of the fields below (1 = little-endian)
//! bit  2      reserved, always 0
//! bits 1..0   length class: 0 inline, 1 large, 2 map
//! ```
//!
//! The second word is a `u32` in the marked byte order: the payload length
//! for inline and large values, the entry count for maps. Inline payloads
//! (0 to 4 bytes) follow padded to one word; large payloads follow padded
//! to a 4-byte boundary; a map is followed by each key archive and value
//! archive in store order, so equal values archive to identical bytes.
//! Object references use the large class with an 8-byte object slot.
//!
//! The writer always emits little-endian fields. Big-endian input is
//! accepted and numeric payloads are swapped element by element.

use bytes::Bytes;

use super::stream::{ArchiveReader, ArchiveWriter, ByteSink, ByteSource};
use crate::algebra::MergeFlags;
use crate::constants::{
    ARCHIVE_ALIGNMENT, ARCHIVE_HEADER_SIZE, BYTE_ORDER_LITTLE, HEADER_RESERVED_BIT,
    INLINE_CAPACITY, LENGTH_CLASS_MASK, OBJECT_SLOT_SIZE, TYPE_CODE_RESERVED_MASK,
};
use crate::core::config::global_config;
use crate::{log_debug, log_error};
use crate::structures::SharedBuffer;
use crate::types::{ArchiveError, TypeCode, Value};

const CLASS_INLINE: u32 = 0;
const CLASS_LARGE: u32 = 1;
const CLASS_MAP: u32 = 2;

/// Round `len` up to the archive alignment
#[inline]
fn padded(len: usize) -> usize {
    (len + ARCHIVE_ALIGNMENT - 1) & !(ARCHIVE_ALIGNMENT - 1)
}

/// Parsed header
#[derive(Debug, Clone, Copy)]
struct Header {
    word: u32,
    type_code: TypeCode,
    little_endian: bool,
    class: u32,
    len: usize,
}

impl Value {
    /// Exact number of bytes [`Value::archive`] writes for this value.
    ///
    /// Map sizes are cached in the store until it next changes.
    pub fn archived_size(&self) -> usize {
        match self {
            Value::Undefined | Value::Wild | Value::Null => ARCHIVE_HEADER_SIZE,
            Value::Error(_) => ARCHIVE_HEADER_SIZE + INLINE_CAPACITY,
            Value::Inline(_, inline) if inline.is_empty() => ARCHIVE_HEADER_SIZE,
            Value::Inline(..) => ARCHIVE_HEADER_SIZE + INLINE_CAPACITY,
            Value::Large(_, buffer) => ARCHIVE_HEADER_SIZE + padded(buffer.len()),
            Value::Object(_) => ARCHIVE_HEADER_SIZE + OBJECT_SLOT_SIZE,
            Value::Map(store) => {
                if let Some(size) = store.cached_archived_size() {
                    return size;
                }
                let size = store.iter().fold(ARCHIVE_HEADER_SIZE, |size, entry| {
                    size + entry.key.archived_size() + entry.value.archived_size()
                });
                store.cache_archived_size(size);
                size
            }
        }
    }

    /// Write this value to `sink`; returns the number of bytes written.
    ///
    /// Panics when integrity checks are on and the written length differs
    /// from [`Value::archived_size`].
    pub fn archive<S>(&self, sink: &mut S) -> Result<usize, ArchiveError>
    where
        S: ByteSink + ?Sized,
    {
        let start = sink.position();
        self.write_archive(sink)?;
        let written = sink.position() - start;
        if global_config().archive.check_integrity {
            let expected = self.archived_size();
            if written != expected {
                log_error!("archive size mismatch: wrote {} bytes, expected {}", written, expected);
                panic!("archive size mismatch: wrote {} bytes, expected {}", written, expected);
            }
        }
        Ok(written)
    }

    /// Read one value from `source`
    pub fn unarchive<R>(source: &mut R) -> Result<Value, ArchiveError>
    where
        R: ByteSource + ?Sized,
    {
        read_value(source, 0, global_config().archive.max_depth).map_err(|e| {
            log_debug!("archive decode failed: {}", e);
            e
        })
    }

    /// Archive into a fresh buffer. Object references are rejected since the
    /// side table would be lost; use an [`ArchiveWriter`] to keep it.
    pub fn to_bytes(&self) -> Result<Bytes, ArchiveError> {
        let mut writer = ArchiveWriter::without_objects();
        self.archive(&mut writer)?;
        Ok(writer.freeze())
    }

    /// Decode a buffer holding exactly one archived value
    pub fn from_bytes(data: Bytes) -> Result<Value, ArchiveError> {
        let mut reader = ArchiveReader::new(data);
        let value = Value::unarchive(&mut reader)?;
        match reader.remaining() {
            0 => Ok(value),
            extra => Err(ArchiveError::TrailingBytes(extra)),
        }
    }

    fn write_archive<S>(&self, sink: &mut S) -> Result<(), ArchiveError>
    where
        S: ByteSink + ?Sized,
    {
        match self {
            Value::Undefined | Value::Wild | Value::Null => {
                write_header(sink, self.type_code(), CLASS_INLINE, 0)
            }
            Value::Error(code) => {
                write_header(sink, TypeCode::ERROR, CLASS_INLINE, INLINE_CAPACITY)?;
                sink.write_small_data(&code.to_raw().to_le_bytes())
            }
            Value::Inline(type_code, inline) => {
                write_header(sink, *type_code, CLASS_INLINE, inline.len())?;
                if inline.is_empty() {
                    return Ok(());
                }
                let mut word = [0u8; INLINE_CAPACITY];
                word[..inline.len()].copy_from_slice(inline.as_slice());
                sink.write_small_data(&word)
            }
            Value::Large(type_code, buffer) => {
                write_header(sink, *type_code, CLASS_LARGE, buffer.len())?;
                sink.write_large_data(buffer.data())?;
                write_padding(sink, buffer.len())
            }
            Value::Object(object) => {
                write_header(sink, TypeCode::OBJECT, CLASS_LARGE, OBJECT_SLOT_SIZE)?;
                sink.write_object_slot(object)
            }
            Value::Map(store) => {
                write_header(sink, TypeCode::MAP, CLASS_MAP, store.len())?;
                for entry in store.iter() {
                    entry.key.write_archive(sink)?;
                    entry.value.write_archive(sink)?;
                }
                Ok(())
            }
        }
    }
}

fn write_header<S>(sink: &mut S, type_code: TypeCode, class: u32, len: usize) -> Result<(), ArchiveError>
where
    S: ByteSink + ?Sized,
{
    let len = u32::try_from(len).map_err(|_| ArchiveError::TooLarge(len))?;
    let mut header = [0u8; ARCHIVE_HEADER_SIZE];
    header[..4].copy_from_slice(&(type_code.raw() | BYTE_ORDER_LITTLE | class).to_be_bytes());
    header[4..].copy_from_slice(&len.to_le_bytes());
    sink.write_small_data(&header)
}

fn write_padding<S>(sink: &mut S, len: usize) -> Result<(), ArchiveError>
where
    S: ByteSink + ?Sized,
{
    let pad = padded(len) - len;
    if pad == 0 {
        return Ok(());
    }
    sink.write_small_data(&[0u8; ARCHIVE_ALIGNMENT][..pad])
}

fn read_header<R>(source: &mut R) -> Result<Header, ArchiveError>
where
    R: ByteSource + ?Sized,
{
    let mut raw = [0u8; ARCHIVE_HEADER_SIZE];
    source.read_small_data(&mut raw)?;
    let word = u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]);
    if word & HEADER_RESERVED_BIT != 0 {
        return Err(ArchiveError::ReservedBits(word));
    }
    let little_endian = word & BYTE_ORDER_LITTLE != 0;
    let len_bytes = [raw[4], raw[5], raw[6], raw[7]];
    let len = if little_endian {
        u32::from_le_bytes(len_bytes)
    } else {
        u32::from_be_bytes(len_bytes)
    };
    Ok(Header {
        word,
        type_code: TypeCode::new(word & !TYPE_CODE_RESERVED_MASK),
        little_endian,
        class: word & LENGTH_CLASS_MASK,
        len: len as usize,
    })
}

fn read_value<R>(source: &mut R, depth: usize, max_depth: usize) -> Result<Value, ArchiveError>
where
    R: ByteSource + ?Sized,
{
    let header = read_header(source)?;
    match header.class {
        CLASS_INLINE => read_inline(source, &header),
        CLASS_LARGE if header.type_code == TypeCode::OBJECT => {
            if header.len != OBJECT_SLOT_SIZE {
                return Err(ArchiveError::ClassMismatch(header.word));
            }
            source.read_object_slot(header.little_endian).map(Value::Object)
        }
        CLASS_LARGE => read_large(source, &header),
        CLASS_MAP => read_map(source, &header, depth, max_depth),
        class => Err(ArchiveError::BadLengthClass(class)),
    }
}

fn read_inline<R>(source: &mut R, header: &Header) -> Result<Value, ArchiveError>
where
    R: ByteSource + ?Sized,
{
    if header.len > INLINE_CAPACITY {
        return Err(ArchiveError::InlineTooLong(header.len as u32));
    }
    let mut word = [0u8; INLINE_CAPACITY];
    if header.len > 0 {
        source.read_small_data(&mut word)?;
    }
    decode_payload(header, &mut word[..header.len])
}

fn read_large<R>(source: &mut R, header: &Header) -> Result<Value, ArchiveError>
where
    R: ByteSource + ?Sized,
{
    let total = padded(header.len);
    if source.remaining() < total {
        return Err(ArchiveError::Truncated {
            needed: total,
            available: source.remaining(),
        });
    }
    let is_payload = !is_sentinel(header.type_code) && header.type_code != TypeCode::MAP;
    if is_payload && header.len > INLINE_CAPACITY {
        let mut buffer = SharedBuffer::alloc(header.len);
        let data = buffer.edit(header.len);
        source.read_large_data(data)?;
        if !header.little_endian {
            swap_elements(data, header.type_code.payload_width());
        }
        skip_padding(source, header.len)?;
        return Ok(Value::Large(header.type_code, buffer));
    }
    let mut data = vec![0u8; header.len];
    source.read_large_data(&mut data)?;
    skip_padding(source, header.len)?;
    decode_payload(header, &mut data)
}

fn read_map<R>(source: &mut R, header: &Header, depth: usize, max_depth: usize) -> Result<Value, ArchiveError>
where
    R: ByteSource + ?Sized,
{
    if header.type_code != TypeCode::MAP {
        return Err(ArchiveError::ClassMismatch(header.word));
    }
    if depth >= max_depth {
        return Err(ArchiveError::DepthExceeded(max_depth));
    }
    // Each entry needs at least a key header and a value header
    let needed = header.len.saturating_mul(2 * ARCHIVE_HEADER_SIZE);
    if source.remaining() < needed {
        return Err(ArchiveError::Truncated {
            needed,
            available: source.remaining(),
        });
    }
    let mut result = Value::Undefined;
    for _ in 0..header.len {
        let key = read_value(source, depth + 1, max_depth)?;
        let value = read_value(source, depth + 1, max_depth)?;
        result.join_item_with(key, value, MergeFlags::NO_FLATTEN);
    }
    Ok(result)
}

fn skip_padding<R>(source: &mut R, len: usize) -> Result<(), ArchiveError>
where
    R: ByteSource + ?Sized,
{
    let pad = padded(len) - len;
    if pad == 0 {
        return Ok(());
    }
    let mut scratch = [0u8; ARCHIVE_ALIGNMENT];
    source.read_small_data(&mut scratch[..pad])
}

fn is_sentinel(type_code: TypeCode) -> bool {
    matches!(
        type_code,
        TypeCode::UNDEFINED | TypeCode::WILD | TypeCode::NULL | TypeCode::ERROR
    )
}

/// Build a value from a payload in the header's byte order
fn decode_payload(header: &Header, payload: &mut [u8]) -> Result<Value, ArchiveError> {
    let type_code = header.type_code;
    let sentinel_error = || {
        ArchiveError::InvalidSentinel(type_code.name().unwrap_or("sentinel").to_owned())
    };
    match type_code {
        TypeCode::UNDEFINED | TypeCode::WILD | TypeCode::NULL if !payload.is_empty() => {
            return Err(sentinel_error());
        }
        TypeCode::ERROR if payload.len() != INLINE_CAPACITY => return Err(sentinel_error()),
        TypeCode::MAP | TypeCode::OBJECT => return Err(ArchiveError::ClassMismatch(header.word)),
        _ => {}
    }
    if !header.little_endian {
        swap_elements(payload, type_code.payload_width());
    }
    Ok(Value::from_raw(type_code, payload))
}

/// Reverse each `width`-byte element in place; ragged payloads are left alone
fn swap_elements(data: &mut [u8], width: usize) {
    if width <= 1 || data.len() % width != 0 {
        return;
    }
    for element in data.chunks_exact_mut(width) {
        element.reverse();
    }
}
