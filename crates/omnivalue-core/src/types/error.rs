//! Error types for omnivalue
//!
//! Two tiers exist. Data errors (bad coercions, malformed archives, missing
//! keys) are ordinary values: a [`StatusCode`] carried by the `Error`
//! sentinel or returned from conversions. Contract violations (reserved
//! type-code bits, archive size mismatches under integrity checks) panic.

use thiserror::Error;

/// Main result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Umbrella error for callers that mix configuration, archive and status failures
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Archive encode/decode errors
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Soft value-level failure
    #[error("Status: {0}")]
    Status(#[from] StatusCode),
}

/// Soft error codes carried by values and returned by conversions
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatusCode {
    /// The value's type cannot be converted to the requested type
    #[error("bad type")]
    BadType,
    /// The value has the right type but unusable content
    #[error("bad value")]
    BadValue,
    /// The value does not fit in the requested representation
    #[error("out of range")]
    OutOfRange,
    /// Arithmetic overflow while parsing or converting
    #[error("overflow")]
    Overflow,
    /// A key was not present
    #[error("name not found")]
    NameNotFound,
    /// A key was already present
    #[error("already exists")]
    AlreadyExists,
    /// Allocation failed
    #[error("no memory")]
    NoMemory,
    /// Archive input was malformed
    #[error("malformed archive")]
    MalformedArchive,
    /// The operation is not supported for this value
    #[error("unsupported")]
    Unsupported,
    /// Any other code, kept verbatim
    #[error("status {0}")]
    Other(i32),
}

impl StatusCode {
    /// Stable numeric code used on the wire
    pub fn to_raw(self) -> i32 {
        match self {
            StatusCode::BadType => -1001,
            StatusCode::BadValue => -1002,
            StatusCode::OutOfRange => -1003,
            StatusCode::Overflow => -1004,
            StatusCode::NameNotFound => -1005,
            StatusCode::AlreadyExists => -1006,
            StatusCode::NoMemory => -1007,
            StatusCode::MalformedArchive => -1008,
            StatusCode::Unsupported => -1009,
            StatusCode::Other(code) => code,
        }
    }

    /// Inverse of [`StatusCode::to_raw`]
    pub fn from_raw(code: i32) -> Self {
        match code {
            -1001 => StatusCode::BadType,
            -1002 => StatusCode::BadValue,
            -1003 => StatusCode::OutOfRange,
            -1004 => StatusCode::Overflow,
            -1005 => StatusCode::NameNotFound,
            -1006 => StatusCode::AlreadyExists,
            -1007 => StatusCode::NoMemory,
            -1008 => StatusCode::MalformedArchive,
            -1009 => StatusCode::Unsupported,
            other => StatusCode::Other(other),
        }
    }
}

/// Archive encode/decode errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArchiveError {
    /// Input ended before a complete value was read
    #[error("archive truncated: needed {needed} bytes, {available} available")]
    Truncated {
        /// Bytes the decoder asked for
        needed: usize,
        /// Bytes left in the input
        available: usize,
    },

    /// Length class bits hold the unused value 3
    #[error("invalid length class {0}")]
    BadLengthClass(u32),

    /// The reserved header bit is set
    #[error("reserved header bits set in 0x{0:08x}")]
    ReservedBits(u32),

    /// An inline value claims more than four payload bytes
    #[error("inline payload of {0} bytes exceeds inline capacity")]
    InlineTooLong(u32),

    /// A sentinel type code arrived with a payload it cannot carry
    #[error("invalid payload for sentinel {0}")]
    InvalidSentinel(String),

    /// Maps nest deeper than the configured limit
    #[error("archive nesting exceeds depth {0}")]
    DepthExceeded(usize),

    /// An object slot refers past the side table
    #[error("unknown object slot {0}")]
    UnknownObjectSlot(u32),

    /// An object reference met a transport without an object table
    #[error("object references need a transport with an object table")]
    NoObjectTable,

    /// A type code arrived in a length class it cannot use
    #[error("type code in header 0x{0:08x} does not fit its length class")]
    ClassMismatch(u32),

    /// A payload or entry count does not fit the 32-bit length field
    #[error("length {0} does not fit the archive length field")]
    TooLarge(usize),

    /// Input continued past the end of the value
    #[error("{0} trailing bytes after archived value")]
    TrailingBytes(usize),
}

impl From<ArchiveError> for StatusCode {
    fn from(err: ArchiveError) -> Self {
        match err {
            ArchiveError::NoObjectTable | ArchiveError::UnknownObjectSlot(_) => StatusCode::Unsupported,
            ArchiveError::TooLarge(_) => StatusCode::OutOfRange,
            _ => StatusCode::MalformedArchive,
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML text did not parse
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A tuning value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The process-wide configuration is already fixed
    #[error("Configuration already installed")]
    AlreadyInstalled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_codes_round_trip() {
        for code in [
            StatusCode::BadType,
            StatusCode::BadValue,
            StatusCode::OutOfRange,
            StatusCode::Overflow,
            StatusCode::NameNotFound,
            StatusCode::AlreadyExists,
            StatusCode::NoMemory,
            StatusCode::MalformedArchive,
            StatusCode::Unsupported,
            StatusCode::Other(42),
        ] {
            assert_eq!(StatusCode::from_raw(code.to_raw()), code);
        }
    }

    #[test]
    fn archive_errors_map_to_status() {
        let truncated = ArchiveError::Truncated { needed: 8, available: 2 };
        assert_eq!(StatusCode::from(truncated), StatusCode::MalformedArchive);
        assert_eq!(StatusCode::from(ArchiveError::NoObjectTable), StatusCode::Unsupported);
    }
}
