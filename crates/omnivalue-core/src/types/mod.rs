/// Type codes
pub mod type_code;

/// Error types
pub mod error;

/// Object references
pub mod object;

/// The value enum
pub mod value;

/// Ordering and equality
pub mod compare;

/// Scalar coercions and string parsing
pub mod coerce;

/// Text rendering
pub mod display;

// Re-export the main types
pub use compare::{compare, lexical_compare};
pub use error::{ArchiveError, ConfigError, Error, Result, StatusCode};
pub use object::{FlatObject, LocalObject, ObjectRef, RemoteObject};
pub use type_code::TypeCode;
pub use value::{InlineData, Items, Value};
