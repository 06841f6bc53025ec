//! In-memory UBJSON values.

use std::fmt;

/// A value exchanged at the marshaller boundary, corresponding to the
/// UBJSON marker families.
///
/// Integers of every wire width collapse to `i64`; `f32` payloads widen
/// losslessly to `f64`. Objects preserve insertion order, which is also
/// the order pairs appear on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    /// Protocol padding. Never produced by the encoder and only surfaced
    /// by the decoder when no-op passthrough is enabled.
    Noop,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Arbitrary-precision decimal in its canonical string form.
    Huge(String),
    String(String),
    /// Raw bytes. Encoded through the string path (or rejected) per
    /// [`BytesPolicy`](crate::encode::BytesPolicy); never produced by
    /// the decoder.
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Returns the value as a string slice, if it is a `String` variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an `i64`, if it is an `Int` variant.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as an `f64`, if it is a `Float` variant.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the array items, if the value is an `Array` variant.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the object pairs, if the value is an `Object` variant.
    pub fn as_object(&self) -> Option<&[(String, Value)]> {
        match self {
            Self::Object(pairs) => Some(pairs),
            _ => None,
        }
    }
}

/// Checks that `s` is a canonical decimal string: an optional sign,
/// digits with at most one decimal point, and an optional exponent.
/// This is the only shape the codec accepts for huge-number payloads;
/// non-finite spellings are not part of the wire grammar.
pub(crate) fn is_canonical_decimal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut pos = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        pos += 1;
    }

    let int_digits = count_digits(&bytes[pos..]);
    pos += int_digits;

    let mut frac_digits = 0;
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        frac_digits = count_digits(&bytes[pos..]);
        pos += frac_digits;
    }
    if int_digits == 0 && frac_digits == 0 {
        return false;
    }

    if matches!(bytes.get(pos), Some(b'e') | Some(b'E')) {
        pos += 1;
        if matches!(bytes.get(pos), Some(b'+') | Some(b'-')) {
            pos += 1;
        }
        let exp_digits = count_digits(&bytes[pos..]);
        if exp_digits == 0 {
            return false;
        }
        pos += exp_digits;
    }

    pos == bytes.len()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

// -- Convenience conversions --

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

impl From<Vec<(String, Value)>> for Value {
    fn from(pairs: Vec<(String, Value)>) -> Self {
        Self::Object(pairs)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Noop => write!(f, "noop"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Huge(s) => write!(f, "{s}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Self::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Object(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_decimal_accepts_plain_and_exponent_forms() {
        for s in [
            "0",
            "42",
            "-42",
            "+7",
            "3.14",
            "-3.14159265358979323846264338327950288419716939937510",
            ".5",
            "5.",
            "2e+10",
            "2E+10",
            "1.5e-300",
        ] {
            assert!(is_canonical_decimal(s), "expected valid: {s:?}");
        }
    }

    #[test]
    fn canonical_decimal_rejects_junk() {
        for s in [
            "",
            "-",
            ".",
            "e10",
            "2e",
            "2e+",
            "foobarbaz",
            "314159 65358979",
            "NaN",
            "Infinity",
            "0x10",
            "1.2.3",
        ] {
            assert!(!is_canonical_decimal(s), "expected invalid: {s:?}");
        }
    }

    #[test]
    fn display_is_compact() {
        let value = Value::Object(vec![
            ("id".into(), Value::Int(7)),
            ("tags".into(), Value::Array(vec!["a".into(), "b".into()])),
        ]);
        assert_eq!(value.to_string(), "{id: 7, tags: [\"a\", \"b\"]}");
    }
}
