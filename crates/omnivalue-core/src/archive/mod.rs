//! Binary archive format
//!
//! [`codec`] turns values into the wire format and back; [`stream`] holds
//! the transport traits and the buffer-backed writer and reader.

/// Encoder and decoder
pub mod codec;

/// Byte transports
pub mod stream;

pub use stream::{ArchiveReader, ArchiveWriter, ByteSink, ByteSource};

#[cfg(test)]
mod tests;
