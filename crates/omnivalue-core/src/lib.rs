//! # Omnivalue Core
//!
//! The self-describing value type used as the data currency of an object IPC
//! runtime: scalars, opaque object references and nested key/value maps all
//! travel as one [`Value`].
//!
//! Layers, leaf first:
//! - [`structures`]: shared byte buffers, the pooled sorted map store
//! - [`types`]: type codes, the value enum, comparison and coercion
//! - [`algebra`]: join/overlay/inherit/retain/remove and item operations
//! - [`archive`]: the binary wire format

#![warn(missing_docs)]

/// Logging, configuration
pub mod core;

/// System constants
pub mod constants;

/// Reusable storage structures
pub mod structures;

/// Type definitions
pub mod types;

/// Map algebra over values
pub mod algebra;

/// Binary archive codec
pub mod archive;

// Re-export commonly used items
pub use crate::core::config::{global_config, install_config, load_config, load_config_or_default, ValueConfig};
pub use algebra::MergeFlags;
pub use archive::{ArchiveReader, ArchiveWriter, ByteSink, ByteSource};
pub use structures::{map_pool, MapEntry, MapStore, SharedBuffer};
pub use types::{
    ArchiveError, ConfigError, Error, FlatObject, LocalObject, ObjectRef, RemoteObject, Result,
    StatusCode, TypeCode, Value,
};
