//! Text rendering
//!
//! `Display` prints maps as `{key -> value, ...}` with entries in lexical
//! order, so `{b -> 2, a -> 1}` and `{a -> 1, b -> 2}` print alike no matter
//! how the keys sort in binary. Wild-keyed set members print bare. `Debug`
//! prints the same shape in store order.

use std::fmt;

use super::compare::lexical_compare;
use super::coerce::format_time;
use super::{TypeCode, Value};
use crate::structures::MapEntry;

impl Value {
    fn fmt_scalar(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Wild => f.write_str("wild"),
            Value::Null => f.write_str("null"),
            Value::Error(code) => write!(f, "error({:?})", code),
            Value::Object(object) => {
                let flat = object.flatten();
                write!(f, "object({}:{})", flat.kind, flat.handle)
            }
            Value::Map(_) => unreachable!("maps are rendered entrywise"),
            Value::Inline(..) | Value::Large(..) => match self.type_code() {
                TypeCode::STRING => match self.try_as_string() {
                    Ok(text) => write!(f, "{:?}", text),
                    Err(_) => write_bytes(f, "string", self.data().unwrap_or_default()),
                },
                TypeCode::BOOL => write!(f, "{}", self.as_bool()),
                TypeCode::FLOAT | TypeCode::DOUBLE => write!(f, "{}", self.as_f64()),
                TypeCode::TIME => f.write_str(&format_time(self.as_time())),
                TypeCode::STATUS => match self.try_as_status() {
                    Ok(code) => write!(f, "status({:?})", code),
                    Err(_) => write_bytes(f, "status", self.data().unwrap_or_default()),
                },
                t if t.is_numeric() => write!(f, "{}", self.as_i64()),
                TypeCode::RAW => write_bytes(f, "raw", self.data().unwrap_or_default()),
                other => write_bytes(f, &other.to_string(), self.data().unwrap_or_default()),
            },
        }
    }

    fn fmt_entries<'a, I>(f: &mut fmt::Formatter<'_>, entries: I, lexical: bool) -> fmt::Result
    where
        I: Iterator<Item = &'a MapEntry>,
    {
        let mut entries: Vec<&MapEntry> = entries.collect();
        if lexical {
            entries.sort_by(|a, b| {
                lexical_compare(&a.key, &b.key).then_with(|| lexical_compare(&a.value, &b.value))
            });
        }
        f.write_str("{")?;
        for (i, entry) in entries.into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if entry.key.is_wild() {
                entry.value.fmt_with(f, lexical)?;
            } else {
                entry.key.fmt_with(f, lexical)?;
                f.write_str(" -> ")?;
                entry.value.fmt_with(f, lexical)?;
            }
        }
        f.write_str("}")
    }

    fn fmt_with(&self, f: &mut fmt::Formatter<'_>, lexical: bool) -> fmt::Result {
        match self {
            Value::Map(store) => Value::fmt_entries(f, store.iter(), lexical),
            scalar => scalar.fmt_scalar(f),
        }
    }
}

fn write_bytes(f: &mut fmt::Formatter<'_>, label: &str, data: &[u8]) -> fmt::Result {
    write!(f, "{}<", label)?;
    for byte in data {
        write!(f, "{:02x}", byte)?;
    }
    f.write_str(">")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with(f, true)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with(f, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LocalObject, ObjectRef, StatusCode};

    #[test]
    fn sentinels() {
        assert_eq!(Value::Undefined.to_string(), "undefined");
        assert_eq!(Value::Wild.to_string(), "wild");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::error(StatusCode::BadType).to_string(), "error(BadType)");
    }

    #[test]
    fn scalars() {
        assert_eq!(Value::from(-7i32).to_string(), "-7");
        assert_eq!(Value::from(2.5f64).to_string(), "2.5");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from("hi").to_string(), "\"hi\"");
        assert_eq!(Value::raw(&[0x0a, 0xff]).to_string(), "raw<0aff>");
        assert_eq!(Value::time(3_000_000_000).to_string(), "3s");
        assert_eq!(Value::status(StatusCode::AlreadyExists).to_string(), "status(AlreadyExists)");
        assert_eq!(Value::object(ObjectRef::new(LocalObject::new(9))).to_string(), "object(1:9)");
    }

    #[test]
    fn maps_print_lexically() {
        let map = Value::from_entries([
            (Value::from("b"), Value::from(2i32)),
            (Value::from("a"), Value::from(1i32)),
        ]);
        assert_eq!(map.to_string(), "{\"a\" -> 1, \"b\" -> 2}");
    }

    #[test]
    fn set_members_print_bare() {
        let set = Value::from_entries([
            (Value::Wild, Value::from(300i32)),
            (Value::Wild, Value::from(-1i32)),
        ]);
        assert_eq!(set.to_string(), "{-1, 300}");
        // Binary order puts -1 (0xffffffff) last
        assert_eq!(format!("{:?}", set), "{300, -1}");
    }

    #[test]
    fn nested_maps() {
        let nested = Value::pair(Value::from("outer"), Value::pair(Value::from("inner"), Value::from(1i8)));
        assert_eq!(nested.to_string(), "{\"outer\" -> {\"inner\" -> 1}}");
    }
}
