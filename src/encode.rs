//! Encoding: [`Value`] trees → UBJSON bytes.
//!
//! Integers and length prefixes always take the narrowest marker whose
//! encode range admits the value, so output is canonical. Containers
//! with a known length encode sized where the draft has a sized form
//! (Draft-8); iterator inputs encode streamed. Draft-9 containers are
//! streamed on the wire in both cases.

use std::io::Write;

use crate::draft::Draft;
use crate::error::{Error, Result};
use crate::markers::{draft8 as m8, draft9 as m9};
use crate::value::{is_canonical_decimal, Value};

/// Encodes a value, returning the wire bytes.
pub fn encode(value: &Value, draft: Draft) -> Result<Vec<u8>> {
    Encoder::new(draft).encode(value)
}

/// Encodes a value into a sink. On error the sink may already have
/// received a prefix of the output; truncation is the caller's concern.
pub fn encode_into<W: Write>(value: &Value, writer: &mut W, draft: Draft) -> Result<()> {
    Encoder::new(draft).encode_into(value, writer)
}

/// How [`Value::Bytes`] is put on the wire.
///
/// Neither draft defines a byte-string marker, so raw bytes either ride
/// the text path (the legacy behavior, requiring valid UTF-8) or are
/// rejected outright. On decode they always come back as text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BytesPolicy {
    /// Encode byte strings through the string markers; the payload must
    /// be valid UTF-8.
    #[default]
    Utf8Text,
    /// Refuse byte strings with an encode error.
    Reject,
}

/// Configurable encoder.
pub struct Encoder {
    draft: Draft,
    bytes: BytesPolicy,
}

impl Encoder {
    pub fn new(draft: Draft) -> Self {
        Self {
            draft,
            bytes: BytesPolicy::default(),
        }
    }

    /// Sets the byte-string handling policy.
    pub fn bytes_policy(mut self, policy: BytesPolicy) -> Self {
        self.bytes = policy;
        self
    }

    pub fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.encode_into(value, &mut out)?;
        Ok(out)
    }

    pub fn encode_into<W: Write>(&self, value: &Value, writer: &mut W) -> Result<()> {
        tracing::trace!(draft = %self.draft, "encoding value");
        self.write_value(writer, value)
    }

    /// Encodes an iterator of items as a streamed array. This is the
    /// entry point for producers whose length is unknown up front.
    pub fn encode_seq<W, I>(&self, items: I, writer: &mut W) -> Result<()>
    where
        W: Write,
        I: IntoIterator<Item = Value>,
    {
        match self.draft {
            Draft::Draft8 => {
                writer.write_all(&[m8::ARRAY_SHORT, m8::STREAM_COUNT])?;
                for item in items {
                    self.write_value(writer, &item)?;
                }
                writer.write_all(&[m8::END])?;
            }
            Draft::Draft9 => {
                writer.write_all(&[m9::ARRAY_OPEN])?;
                for item in items {
                    self.write_value(writer, &item)?;
                }
                writer.write_all(&[m9::ARRAY_CLOSE])?;
            }
        }
        Ok(())
    }

    /// Encodes an iterator of key/value pairs as a streamed object.
    pub fn encode_entries<W, I>(&self, entries: I, writer: &mut W) -> Result<()>
    where
        W: Write,
        I: IntoIterator<Item = (String, Value)>,
    {
        match self.draft {
            Draft::Draft8 => {
                writer.write_all(&[m8::OBJECT_SHORT, m8::STREAM_COUNT])?;
                for (key, value) in entries {
                    self.write_str(writer, &key)?;
                    self.write_value(writer, &value)?;
                }
                writer.write_all(&[m8::END])?;
            }
            Draft::Draft9 => {
                writer.write_all(&[m9::OBJECT_OPEN])?;
                for (key, value) in entries {
                    self.write_str(writer, &key)?;
                    self.write_value(writer, &value)?;
                }
                writer.write_all(&[m9::OBJECT_CLOSE])?;
            }
        }
        Ok(())
    }

    fn write_value<W: Write>(&self, w: &mut W, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.write_tag(w, m8::NULL, m9::NULL),
            // Padding is read-side only; the sentinel has no encoding.
            Value::Noop => Err(Error::Encode(
                "the no-op sentinel has no wire representation".into(),
            )),
            Value::Bool(true) => self.write_tag(w, m8::TRUE, m9::TRUE),
            Value::Bool(false) => self.write_tag(w, m8::FALSE, m9::FALSE),
            Value::Int(i) => self.write_int(w, *i),
            Value::Float(f) => self.write_float(w, *f),
            Value::Huge(s) => self.write_huge(w, s),
            Value::String(s) => self.write_str(w, s),
            Value::Bytes(b) => self.write_bytes(w, b),
            Value::Array(items) => self.write_array(w, items),
            Value::Object(pairs) => self.write_object(w, pairs),
        }
    }

    /// Writes an integer with the narrowest marker that admits it.
    fn write_int<W: Write>(&self, w: &mut W, value: i64) -> Result<()> {
        match self.draft {
            Draft::Draft8 => {
                // `B` is kept to the range where the signed and unsigned
                // one-byte readings agree.
                if (0..=127).contains(&value) {
                    w.write_all(&[m8::BYTE, value as u8])?;
                } else if i64::from(i16::MIN) <= value && value <= i64::from(i16::MAX) {
                    w.write_all(&[m8::INT16])?;
                    w.write_all(&(value as i16).to_be_bytes())?;
                } else if i64::from(i32::MIN) <= value && value <= i64::from(i32::MAX) {
                    w.write_all(&[m8::INT32])?;
                    w.write_all(&(value as i32).to_be_bytes())?;
                } else {
                    w.write_all(&[m8::INT64])?;
                    w.write_all(&value.to_be_bytes())?;
                }
            }
            Draft::Draft9 => {
                if i64::from(i8::MIN) <= value && value <= i64::from(i8::MAX) {
                    w.write_all(&[m9::INT8, value as i8 as u8])?;
                } else if (0..=255).contains(&value) {
                    w.write_all(&[m9::UINT8, value as u8])?;
                } else if i64::from(i16::MIN) <= value && value <= i64::from(i16::MAX) {
                    w.write_all(&[m9::INT16])?;
                    w.write_all(&(value as i16).to_be_bytes())?;
                } else if i64::from(i32::MIN) <= value && value <= i64::from(i32::MAX) {
                    w.write_all(&[m9::INT32])?;
                    w.write_all(&(value as i32).to_be_bytes())?;
                } else {
                    w.write_all(&[m9::INT64])?;
                    w.write_all(&value.to_be_bytes())?;
                }
            }
        }
        Ok(())
    }

    /// Writes the draft's marker byte for a payload-free token.
    fn write_tag<W: Write>(&self, w: &mut W, draft8: u8, draft9: u8) -> Result<()> {
        let tag = match self.draft {
            Draft::Draft8 => draft8,
            Draft::Draft9 => draft9,
        };
        w.write_all(&[tag]).map_err(Into::into)
    }

    /// Single precision iff the value survives the f32 round trip;
    /// non-finite values have no wire form and collapse to null.
    fn write_float<W: Write>(&self, w: &mut W, value: f64) -> Result<()> {
        if !value.is_finite() {
            return self.write_tag(w, m8::NULL, m9::NULL);
        }
        let narrowed = value as f32;
        if f64::from(narrowed) == value {
            self.write_tag(w, m8::FLOAT32, m9::FLOAT32)?;
            w.write_all(&narrowed.to_be_bytes())?;
        } else {
            self.write_tag(w, m8::FLOAT64, m9::FLOAT64)?;
            w.write_all(&value.to_be_bytes())?;
        }
        Ok(())
    }

    fn write_str<W: Write>(&self, w: &mut W, s: &str) -> Result<()> {
        match self.draft {
            Draft::Draft8 => {
                self.write_len_prefixed(w, m8::STR_SHORT, m8::STR_LONG, s.as_bytes())
            }
            Draft::Draft9 => {
                let mut chars = s.chars();
                if let (Some(c), None) = (chars.next(), chars.next()) {
                    if c.is_ascii() {
                        return w.write_all(&[m9::CHAR, c as u8]).map_err(Into::into);
                    }
                }
                w.write_all(&[m9::STRING])?;
                self.write_len(w, s.len())?;
                w.write_all(s.as_bytes()).map_err(Into::into)
            }
        }
    }

    fn write_huge<W: Write>(&self, w: &mut W, s: &str) -> Result<()> {
        if !is_canonical_decimal(s) {
            return Err(Error::Encode(format!(
                "huge number is not a canonical decimal: {s:?}"
            )));
        }
        match self.draft {
            Draft::Draft8 => {
                self.write_len_prefixed(w, m8::HUGE_SHORT, m8::HUGE_LONG, s.as_bytes())
            }
            Draft::Draft9 => {
                w.write_all(&[m9::HUGE])?;
                self.write_len(w, s.len())?;
                w.write_all(s.as_bytes()).map_err(Into::into)
            }
        }
    }

    fn write_bytes<W: Write>(&self, w: &mut W, bytes: &[u8]) -> Result<()> {
        match self.bytes {
            BytesPolicy::Utf8Text => {
                let text = std::str::from_utf8(bytes).map_err(|_| {
                    Error::Encode("byte string is not valid UTF-8".into())
                })?;
                self.write_str(w, text)
            }
            BytesPolicy::Reject => Err(Error::Encode(
                "byte strings are refused by BytesPolicy::Reject".into(),
            )),
        }
    }

    fn write_array<W: Write>(&self, w: &mut W, items: &[Value]) -> Result<()> {
        match self.draft {
            Draft::Draft8 => {
                self.write_container_header(
                    w,
                    m8::ARRAY_SHORT,
                    m8::ARRAY_LONG,
                    items.len(),
                )?;
                for item in items {
                    self.write_value(w, item)?;
                }
                Ok(())
            }
            Draft::Draft9 => {
                w.write_all(&[m9::ARRAY_OPEN])?;
                for item in items {
                    self.write_value(w, item)?;
                }
                w.write_all(&[m9::ARRAY_CLOSE]).map_err(Into::into)
            }
        }
    }

    fn write_object<W: Write>(&self, w: &mut W, pairs: &[(String, Value)]) -> Result<()> {
        match self.draft {
            Draft::Draft8 => {
                self.write_container_header(
                    w,
                    m8::OBJECT_SHORT,
                    m8::OBJECT_LONG,
                    pairs.len(),
                )?;
                for (key, value) in pairs {
                    self.write_str(w, key)?;
                    self.write_value(w, value)?;
                }
                Ok(())
            }
            Draft::Draft9 => {
                w.write_all(&[m9::OBJECT_OPEN])?;
                for (key, value) in pairs {
                    self.write_str(w, key)?;
                    self.write_value(w, value)?;
                }
                w.write_all(&[m9::OBJECT_CLOSE]).map_err(Into::into)
            }
        }
    }

    /// Draft-8 length-prefixed payload: u8 length below 255, u32 above.
    fn write_len_prefixed<W: Write>(
        &self,
        w: &mut W,
        short: u8,
        long: u8,
        payload: &[u8],
    ) -> Result<()> {
        let len = payload.len();
        if len < usize::from(m8::STREAM_COUNT) {
            w.write_all(&[short, len as u8])?;
        } else {
            w.write_all(&[long])?;
            w.write_all(&checked_u32(len)?.to_be_bytes())?;
        }
        w.write_all(payload).map_err(Into::into)
    }

    /// Draft-8 sized container header; the 0xFF count is reserved for
    /// the streamed form, so 255 items already take the long marker.
    fn write_container_header<W: Write>(
        &self,
        w: &mut W,
        short: u8,
        long: u8,
        count: usize,
    ) -> Result<()> {
        if count < usize::from(m8::STREAM_COUNT) {
            w.write_all(&[short, count as u8])?;
        } else {
            w.write_all(&[long])?;
            w.write_all(&checked_u32(count)?.to_be_bytes())?;
        }
        Ok(())
    }

    /// Draft-9 length prefix: a full integer token.
    fn write_len<W: Write>(&self, w: &mut W, len: usize) -> Result<()> {
        let len = i64::try_from(len)
            .map_err(|_| Error::Encode(format!("length {len} exceeds the wire range")))?;
        self.write_int(w, len)
    }
}

fn checked_u32(len: usize) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| Error::Encode(format!("length {len} exceeds the u32 wire range")))
}
