//! Global constants used throughout the omnivalue codebase
//!
//! Tuning defaults and wire-format constants live here so the map store,
//! pool, configuration and archive codec agree on them.

/// Largest payload, in bytes, stored inline in a [`crate::Value`].
///
/// Anything bigger moves to a shared out-of-line buffer.
pub const INLINE_CAPACITY: usize = 4;

/// Default capacities (in entries) of the map pool buckets.
///
/// Most maps produced by the algebra hold one to a handful of entries,
/// so the small buckets see nearly all of the traffic.
pub const DEFAULT_BUCKET_CAPACITIES: [usize; 4] = [1, 3, 6, 12];

/// Default number of recycled blocks kept per pool bucket.
pub const DEFAULT_FREE_LIST_DEPTH: usize = 256;

/// Default growth factor for map stores, in percent of current capacity.
pub const DEFAULT_GROW_PERCENT: usize = 150;

/// Default occupancy, in percent, below which a map store shrinks.
pub const DEFAULT_SHRINK_PERCENT: usize = 25;

/// Default maximum nesting depth accepted by the archive decoder.
pub const DEFAULT_MAX_ARCHIVE_DEPTH: usize = 64;

// Wire format constants

/// Size of an archived value header: type word plus length/count word.
pub const ARCHIVE_HEADER_SIZE: usize = 8;

/// Payload alignment in the archive.
pub const ARCHIVE_ALIGNMENT: usize = 4;

/// Size of an archived object slot (slot index plus object kind).
pub const OBJECT_SLOT_SIZE: usize = 8;

/// Header bit marking little-endian length fields and payloads.
pub const BYTE_ORDER_LITTLE: u32 = 0x8;

/// Header bit that must always be clear.
pub const HEADER_RESERVED_BIT: u32 = 0x4;

/// Mask of the length-class bits in the header word.
pub const LENGTH_CLASS_MASK: u32 = 0x3;

/// Mask of the reserved low bits of a type code.
pub const TYPE_CODE_RESERVED_MASK: u32 = 0xF;

/// Marker for an archived size that must be recomputed.
pub const ARCHIVED_SIZE_UNKNOWN: usize = usize::MAX;
