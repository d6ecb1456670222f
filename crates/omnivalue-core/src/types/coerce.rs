//! Scalar coercions
//!
//! Every `try_as_*` conversion follows one per-type table and reports failure
//! with a [`StatusCode`]; the matching `as_*` form returns the zero value
//! instead. `Null` converts to the zero value successfully, an `Error` value
//! converts to its own code.

use std::num::IntErrorKind;

use super::{StatusCode, TypeCode, Value};

const NANOS_PER_MICRO: i64 = 1_000;
const NANOS_PER_MILLI: i64 = 1_000_000;
const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_MINUTE: i64 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: i64 = 60 * NANOS_PER_MINUTE;
const NANOS_PER_DAY: i64 = 24 * NANOS_PER_HOUR;

/// Time units, largest first
const TIME_UNITS: [(&str, i64); 7] = [
    ("d", NANOS_PER_DAY),
    ("h", NANOS_PER_HOUR),
    ("m", NANOS_PER_MINUTE),
    ("s", NANOS_PER_SECOND),
    ("ms", NANOS_PER_MILLI),
    ("us", NANOS_PER_MICRO),
    ("ns", 1),
];

type Coerced<T> = Result<T, StatusCode>;

impl Value {
    /// Signed integer payload of an integer, bool, status or time value
    fn integer_payload(&self) -> Option<Coerced<i64>> {
        let data = self.data()?;
        let decoded = match self.type_code() {
            TypeCode::INT8 | TypeCode::BOOL => fixed::<1>(data).map(|b| {
                if self.type_code() == TypeCode::BOOL {
                    i64::from(b[0] != 0)
                } else {
                    i64::from(b[0] as i8)
                }
            }),
            TypeCode::INT16 => fixed::<2>(data).map(|b| i64::from(i16::from_le_bytes(b))),
            TypeCode::INT32 | TypeCode::STATUS => fixed::<4>(data).map(|b| i64::from(i32::from_le_bytes(b))),
            TypeCode::INT64 | TypeCode::TIME => fixed::<8>(data).map(i64::from_le_bytes),
            _ => return None,
        };
        Some(decoded.ok_or(StatusCode::BadValue))
    }

    /// Floating payload of a float or double value
    fn float_payload(&self) -> Option<Coerced<f64>> {
        let data = self.data()?;
        let decoded = match self.type_code() {
            TypeCode::FLOAT => fixed::<4>(data).map(|b| f64::from(f32::from_le_bytes(b))),
            TypeCode::DOUBLE => fixed::<8>(data).map(f64::from_le_bytes),
            _ => return None,
        };
        Some(decoded.ok_or(StatusCode::BadValue))
    }

    /// String payload, which must be UTF-8
    fn str_payload(&self) -> Option<Coerced<&str>> {
        if self.type_code() != TypeCode::STRING {
            return None;
        }
        let data = self.data()?;
        Some(std::str::from_utf8(data).map_err(|_| StatusCode::BadValue))
    }

    /// Conversion as a 64-bit integer; floats truncate toward zero
    pub fn try_as_i64(&self) -> Coerced<i64> {
        match self {
            Value::Null => return Ok(0),
            Value::Error(code) => return Err(*code),
            _ => {}
        }
        if let Some(int) = self.integer_payload() {
            return int;
        }
        if let Some(float) = self.float_payload() {
            return float_to_i64(float?);
        }
        if let Some(text) = self.str_payload() {
            return parse_integer(text?);
        }
        Err(StatusCode::BadType)
    }

    /// Conversion as a 32-bit integer
    pub fn try_as_i32(&self) -> Coerced<i32> {
        let wide = self.try_as_i64()?;
        i32::try_from(wide).map_err(|_| StatusCode::OutOfRange)
    }

    /// Conversion as a double
    pub fn try_as_f64(&self) -> Coerced<f64> {
        match self {
            Value::Null => return Ok(0.0),
            Value::Error(code) => return Err(*code),
            _ => {}
        }
        if let Some(float) = self.float_payload() {
            return float;
        }
        if let Some(int) = self.integer_payload() {
            return Ok(int? as f64);
        }
        if let Some(text) = self.str_payload() {
            let text = text?.trim();
            return match text.parse::<f64>() {
                Ok(v) => Ok(v),
                Err(_) => parse_integer(text).map(|v| v as f64),
            };
        }
        Err(StatusCode::BadType)
    }

    /// Conversion as a float; finite doubles beyond `f32` range fail
    pub fn try_as_f32(&self) -> Coerced<f32> {
        let wide = self.try_as_f64()?;
        if wide.is_finite() && wide.abs() > f64::from(f32::MAX) {
            return Err(StatusCode::OutOfRange);
        }
        Ok(wide as f32)
    }

    /// Conversion as a bool: non-zero magnitude, or the literals
    /// `true`/`false`
    pub fn try_as_bool(&self) -> Coerced<bool> {
        match self {
            Value::Null => return Ok(false),
            Value::Error(code) => return Err(*code),
            _ => {}
        }
        if let Some(int) = self.integer_payload() {
            return Ok(int? != 0);
        }
        if let Some(float) = self.float_payload() {
            return Ok(float? != 0.0);
        }
        if let Some(text) = self.str_payload() {
            let text = text?.trim();
            if text.eq_ignore_ascii_case("true") {
                return Ok(true);
            }
            if text.eq_ignore_ascii_case("false") {
                return Ok(false);
            }
            return parse_integer(text).map(|v| v != 0);
        }
        Err(StatusCode::BadType)
    }

    /// Conversion as text; numbers render in decimal and times with
    /// [`format_time`]
    pub fn try_as_string(&self) -> Coerced<String> {
        match self {
            Value::Null => return Ok(String::new()),
            Value::Error(code) => return Err(*code),
            _ => {}
        }
        if let Some(text) = self.str_payload() {
            return text.map(str::to_owned);
        }
        match self.type_code() {
            TypeCode::BOOL => Ok(self.try_as_bool()?.to_string()),
            TypeCode::TIME => Ok(format_time(self.try_as_time()?)),
            TypeCode::STATUS => Ok(self.try_as_status()?.to_string()),
            TypeCode::FLOAT | TypeCode::DOUBLE => Ok(self.try_as_f64()?.to_string()),
            t if t.is_numeric() => Ok(self.try_as_i64()?.to_string()),
            _ => Err(StatusCode::BadType),
        }
    }

    /// Conversion as a duration in nanoseconds; integers count nanoseconds
    /// and strings go through [`parse_time`]
    pub fn try_as_time(&self) -> Coerced<i64> {
        match self {
            Value::Null => return Ok(0),
            Value::Error(code) => return Err(*code),
            _ => {}
        }
        if let Some(int) = self.integer_payload() {
            return int;
        }
        if let Some(float) = self.float_payload() {
            return float_to_i64(float?);
        }
        if let Some(text) = self.str_payload() {
            return parse_time(text?);
        }
        Err(StatusCode::BadType)
    }

    /// Conversion as a status code; an error value yields its own code
    pub fn try_as_status(&self) -> Coerced<StatusCode> {
        match self {
            Value::Error(code) => Ok(*code),
            Value::Null => Err(StatusCode::BadValue),
            _ => match self.type_code() {
                TypeCode::STATUS | TypeCode::INT8 | TypeCode::INT16 | TypeCode::INT32 => {
                    Ok(StatusCode::from_raw(self.try_as_i32()?))
                }
                _ => Err(StatusCode::BadType),
            },
        }
    }

    /// [`Value::try_as_i32`], or 0
    pub fn as_i32(&self) -> i32 {
        self.try_as_i32().unwrap_or_default()
    }

    /// [`Value::try_as_i64`], or 0
    pub fn as_i64(&self) -> i64 {
        self.try_as_i64().unwrap_or_default()
    }

    /// [`Value::try_as_f64`], or 0.0
    pub fn as_f64(&self) -> f64 {
        self.try_as_f64().unwrap_or_default()
    }

    /// [`Value::try_as_f32`], or 0.0
    pub fn as_f32(&self) -> f32 {
        self.try_as_f32().unwrap_or_default()
    }

    /// [`Value::try_as_bool`], or false
    pub fn as_bool(&self) -> bool {
        self.try_as_bool().unwrap_or_default()
    }

    /// [`Value::try_as_string`], or empty
    pub fn as_string(&self) -> String {
        self.try_as_string().unwrap_or_default()
    }

    /// [`Value::try_as_time`], or 0
    pub fn as_time(&self) -> i64 {
        self.try_as_time().unwrap_or_default()
    }
}

#[inline]
fn fixed<const N: usize>(data: &[u8]) -> Option<[u8; N]> {
    data.try_into().ok()
}

fn float_to_i64(v: f64) -> Coerced<i64> {
    if v.is_nan() {
        return Err(StatusCode::BadValue);
    }
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    if v < i64::MIN as f64 || v >= i64::MAX as f64 {
        return Err(StatusCode::OutOfRange);
    }
    Ok(v.trunc() as i64)
}

/// Parse an integer written in decimal, `0x` hex, leading-zero octal, or as
/// up to four packed ASCII characters (`'abcd'` or `[abcd]`, big-endian).
pub fn parse_integer(text: &str) -> Result<i64, StatusCode> {
    let text = text.trim();
    if let Some(packed) = packed_ascii(text) {
        return packed;
    }
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, digits) = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        (16, hex)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };
    if digits.is_empty() || digits.starts_with(|c: char| c == '+' || c == '-') {
        return Err(StatusCode::BadValue);
    }
    let magnitude = u64::from_str_radix(digits, radix).map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow => StatusCode::Overflow,
        _ => StatusCode::BadValue,
    })?;
    if negative {
        if magnitude > i64::MIN.unsigned_abs() {
            return Err(StatusCode::Overflow);
        }
        Ok((magnitude as i64).wrapping_neg())
    } else {
        i64::try_from(magnitude).map_err(|_| StatusCode::Overflow)
    }
}

fn packed_ascii(text: &str) -> Option<Result<i64, StatusCode>> {
    let inner = text
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .or_else(|| text.strip_prefix('[').and_then(|t| t.strip_suffix(']')))?;
    if inner.is_empty() || inner.len() > 4 || !inner.is_ascii() {
        return Some(Err(StatusCode::BadValue));
    }
    let packed = inner.bytes().fold(0u32, |acc, b| (acc << 8) | u32::from(b));
    Some(Ok(i64::from(packed)))
}

/// Parse a duration into nanoseconds.
///
/// Accepts a bare integer (nanoseconds) or one or more `<number><unit>`
/// terms with units `d`, `h`, `m`, `s`, `ms`, `us` and `ns`, optionally
/// separated by whitespace and summed: `"1h 30m"`, `"1.5s"`, `"-2ms"`.
pub fn parse_time(text: &str) -> Result<i64, StatusCode> {
    let text = text.trim();
    if text.is_empty() {
        return Err(StatusCode::BadValue);
    }
    if let Ok(nanos) = parse_integer(text) {
        return Ok(nanos);
    }
    let (negative, mut rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    // A sign needs at least one term after it
    if rest.trim().is_empty() {
        return Err(StatusCode::BadValue);
    }
    let mut total: i64 = 0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or(StatusCode::BadValue)?;
        let (number, after) = rest.split_at(number_len);
        let unit_len = after.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(after.len());
        let (unit, after) = after.split_at(unit_len);
        let scale = TIME_UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or(StatusCode::BadValue)?;
        total = total.checked_add(scaled_term(number, scale)?).ok_or(StatusCode::Overflow)?;
        rest = after.trim_start();
    }
    Ok(if negative { -total } else { total })
}

fn scaled_term(number: &str, scale: i64) -> Result<i64, StatusCode> {
    if number.is_empty() {
        return Err(StatusCode::BadValue);
    }
    if number.contains('.') {
        let value: f64 = number.parse().map_err(|_| StatusCode::BadValue)?;
        return float_to_i64((value * scale as f64).round()).map_err(|_| StatusCode::Overflow);
    }
    let value: i64 = number.parse().map_err(|_| StatusCode::Overflow)?;
    value.checked_mul(scale).ok_or(StatusCode::Overflow)
}

/// Render a duration with the largest unit that divides it exactly:
/// `90s` becomes `"90s"`, `3_600_000_000_000` becomes `"1h"`.
pub fn format_time(nanos: i64) -> String {
    if nanos == 0 {
        return "0s".to_owned();
    }
    for (unit, scale) in TIME_UNITS {
        if nanos % scale == 0 {
            return format!("{}{}", nanos / scale, unit);
        }
    }
    unreachable!("every duration is a whole number of nanoseconds")
}
