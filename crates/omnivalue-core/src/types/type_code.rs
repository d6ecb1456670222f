//! Type codes
//!
//! Every value carries a 28-bit type code identifying its scalar or opaque
//! kind. The low four bits of the 32-bit word are reserved for the archive
//! header (byte order and length class) and must stay clear.

use std::fmt;

use crate::constants::TYPE_CODE_RESERVED_MASK;

/// 28-bit type identifier stored in bits 31..4 of a `u32`
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeCode(u32);

impl TypeCode {
    /// 8-bit signed integer
    pub const INT8: TypeCode = TypeCode::from_tag(*b"I08");
    /// 16-bit signed integer
    pub const INT16: TypeCode = TypeCode::from_tag(*b"I16");
    /// 32-bit signed integer
    pub const INT32: TypeCode = TypeCode::from_tag(*b"I32");
    /// 64-bit signed integer
    pub const INT64: TypeCode = TypeCode::from_tag(*b"I64");
    /// 32-bit float
    pub const FLOAT: TypeCode = TypeCode::from_tag(*b"F32");
    /// 64-bit float
    pub const DOUBLE: TypeCode = TypeCode::from_tag(*b"F64");
    /// Boolean, one byte
    pub const BOOL: TypeCode = TypeCode::from_tag(*b"BOL");
    /// UTF-8 string
    pub const STRING: TypeCode = TypeCode::from_tag(*b"STR");
    /// Untyped bytes
    pub const RAW: TypeCode = TypeCode::from_tag(*b"RAW");
    /// Duration or timestamp in nanoseconds (i64)
    pub const TIME: TypeCode = TypeCode::from_tag(*b"TIM");
    /// Status code carried as data (i32)
    pub const STATUS: TypeCode = TypeCode::from_tag(*b"STS");
    /// Object reference
    pub const OBJECT: TypeCode = TypeCode::from_tag(*b"OBJ");
    /// Null sentinel
    pub const NULL: TypeCode = TypeCode::from_tag(*b"NUL");
    /// Wild sentinel
    pub const WILD: TypeCode = TypeCode::from_tag(*b"WLD");
    /// Undefined sentinel
    pub const UNDEFINED: TypeCode = TypeCode::from_tag(*b"UND");
    /// Error sentinel
    pub const ERROR: TypeCode = TypeCode::from_tag(*b"ERR");
    /// Nested key/value map
    pub const MAP: TypeCode = TypeCode::from_tag(*b"MAP");

    /// Build a type code from a raw word.
    ///
    /// Panics if any reserved low bit is set: such a code cannot be archived.
    pub const fn new(raw: u32) -> Self {
        assert!(raw & TYPE_CODE_RESERVED_MASK == 0, "type code has reserved bits set");
        TypeCode(raw)
    }

    /// Build a type code from three ASCII characters packed into the top 24 bits
    pub const fn from_tag(tag: [u8; 3]) -> Self {
        TypeCode::new(((tag[0] as u32) << 24) | ((tag[1] as u32) << 16) | ((tag[2] as u32) << 8))
    }

    /// Raw 32-bit word (low four bits always zero)
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Human-readable name of a built-in code
    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            TypeCode::INT8 => "int8",
            TypeCode::INT16 => "int16",
            TypeCode::INT32 => "int32",
            TypeCode::INT64 => "int64",
            TypeCode::FLOAT => "float",
            TypeCode::DOUBLE => "double",
            TypeCode::BOOL => "bool",
            TypeCode::STRING => "string",
            TypeCode::RAW => "raw",
            TypeCode::TIME => "time",
            TypeCode::STATUS => "status",
            TypeCode::OBJECT => "object",
            TypeCode::NULL => "null",
            TypeCode::WILD => "wild",
            TypeCode::UNDEFINED => "undefined",
            TypeCode::ERROR => "error",
            TypeCode::MAP => "map",
            _ => return None,
        };
        Some(name)
    }

    /// Width of one numeric element, used to swap byte order; 1 for byte data
    pub fn payload_width(self) -> usize {
        match self {
            TypeCode::INT16 => 2,
            TypeCode::INT32 | TypeCode::FLOAT | TypeCode::STATUS | TypeCode::ERROR => 4,
            TypeCode::INT64 | TypeCode::DOUBLE | TypeCode::TIME => 8,
            _ => 1,
        }
    }

    /// Integer, float, bool and status codes: the family compared by magnitude
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            TypeCode::INT8
                | TypeCode::INT16
                | TypeCode::INT32
                | TypeCode::INT64
                | TypeCode::FLOAT
                | TypeCode::DOUBLE
                | TypeCode::BOOL
                | TypeCode::STATUS
        )
    }

    /// The three tag characters, if printable
    fn tag(self) -> Option<[u8; 3]> {
        let bytes = self.0.to_be_bytes();
        let tag = [bytes[0], bytes[1], bytes[2]];
        if tag.iter().all(|b| b.is_ascii_graphic() || *b == b' ') && bytes[3] == 0 {
            Some(tag)
        } else {
            None
        }
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.name() {
            return f.write_str(name);
        }
        match self.tag() {
            Some(tag) => write!(f, "'{}'", String::from_utf8_lossy(&tag)),
            None => write!(f, "0x{:08x}", self.0),
        }
    }
}

impl fmt::Debug for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeCode({})", self)
    }
}
