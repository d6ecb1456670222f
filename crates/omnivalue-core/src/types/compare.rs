//! Value ordering
//!
//! [`compare`] is the fast binary order used for map-entry sorting and for
//! equality: type tag first, then raw payload. [`lexical_compare`] is the
//! slower human order used when sorting for display; numbers compare by
//! magnitude across widths and strings byte-lexically.

use std::cmp::Ordering;
use std::sync::Arc;

use super::{TypeCode, Value};
use crate::structures::MapStore;

/// Fast total order over values.
///
/// Different type codes order by raw tag. Equal type codes order payloads by
/// length, then 1-4 byte payloads as little-endian integers and longer ones
/// byte by byte. Maps order by entry count, then entry by entry.
pub fn compare(a: &Value, b: &Value) -> Ordering {
    let (ta, tb) = (a.type_code(), b.type_code());
    if ta != tb {
        return ta.raw().cmp(&tb.raw());
    }
    match (a, b) {
        (Value::Error(x), Value::Error(y)) => x.to_raw().cmp(&y.to_raw()),
        (Value::Object(x), Value::Object(y)) => x.cmp(y),
        (Value::Map(x), Value::Map(y)) => compare_stores(x, y),
        _ => match (a.data(), b.data()) {
            (Some(x), Some(y)) => compare_payloads(x, y),
            _ => Ordering::Equal,
        },
    }
}

fn compare_payloads(x: &[u8], y: &[u8]) -> Ordering {
    x.len().cmp(&y.len()).then_with(|| {
        if x.len() <= 4 {
            small_int(x).cmp(&small_int(y))
        } else {
            x.cmp(y)
        }
    })
}

#[inline]
fn small_int(data: &[u8]) -> u32 {
    let mut word = [0u8; 4];
    word[..data.len()].copy_from_slice(data);
    u32::from_le_bytes(word)
}

fn compare_stores(x: &Arc<MapStore>, y: &Arc<MapStore>) -> Ordering {
    if Arc::ptr_eq(x, y) {
        return Ordering::Equal;
    }
    x.len().cmp(&y.len()).then_with(|| {
        x.iter()
            .zip(y.iter())
            .map(|(ex, ey)| compare(&ex.key, &ey.key).then_with(|| compare(&ex.value, &ey.value)))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    })
}

/// Display order.
///
/// Numeric types (integers, floats, bool, status) form one family ordered by
/// magnitude, ties broken by type code; times order by duration; strings
/// byte-lexically; maps entry by entry. Unrelated families order by tag.
pub fn lexical_compare(a: &Value, b: &Value) -> Ordering {
    let (fa, fb) = (family_rank(a), family_rank(b));
    if fa != fb {
        return fa.cmp(&fb);
    }
    match a.type_code() {
        t if t.is_numeric() => compare_numbers(a, b)
            .then_with(|| a.type_code().raw().cmp(&b.type_code().raw()))
            .then_with(|| compare(a, b)),
        TypeCode::TIME => a.as_time().cmp(&b.as_time()).then_with(|| compare(a, b)),
        TypeCode::STRING => a.data().cmp(&b.data()),
        TypeCode::MAP => {
            let (ea, eb) = (a.entries(), b.entries());
            ea.iter()
                .zip(eb.iter())
                .map(|(x, y)| {
                    lexical_compare(&x.key, &y.key).then_with(|| lexical_compare(&x.value, &y.value))
                })
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or_else(|| ea.len().cmp(&eb.len()))
        }
        _ => compare(a, b),
    }
}

/// Cross-family rank: every numeric type shares the rank of `DOUBLE`
fn family_rank(v: &Value) -> u32 {
    let type_code = v.type_code();
    if type_code.is_numeric() {
        TypeCode::DOUBLE.raw()
    } else {
        type_code.raw()
    }
}

enum Number {
    Int(i64),
    Float(f64),
}

fn number_of(v: &Value) -> Number {
    match v.type_code() {
        TypeCode::FLOAT | TypeCode::DOUBLE => Number::Float(v.as_f64()),
        _ => Number::Int(v.as_i64()),
    }
}

fn compare_numbers(a: &Value, b: &Value) -> Ordering {
    match (number_of(a), number_of(b)) {
        (Number::Int(x), Number::Int(y)) => x.cmp(&y),
        (Number::Float(x), Number::Float(y)) => x.total_cmp(&y),
        (Number::Int(x), Number::Float(y)) => compare_int_float(x, y),
        (Number::Float(x), Number::Int(y)) => compare_int_float(y, x).reverse(),
    }
}

/// Exact comparison of an integer with a float; NaN sorts as `total_cmp`
/// places it
fn compare_int_float(int: i64, float: f64) -> Ordering {
    // 2^63, exactly representable
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if float.is_nan() {
        return if float.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if float >= LIMIT {
        return Ordering::Less;
    }
    if float < -LIMIT {
        return Ordering::Greater;
    }
    let whole = float.trunc();
    int.cmp(&(whole as i64)).then_with(|| {
        let fraction = float - whole;
        if fraction > 0.0 {
            Ordering::Less
        } else if fraction < 0.0 {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    })
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        compare(self, other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}

impl Value {
    /// Display-order comparison, see [`lexical_compare`]
    pub fn lexical_cmp(&self, other: &Value) -> Ordering {
        lexical_compare(self, other)
    }
}
