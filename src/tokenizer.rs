//! Flat tokenizer: bytes → a stream of typed markers.
//!
//! The tokenizer reads exactly one marker byte plus its payload per
//! step and never tracks nesting; container opens and closes come out
//! as ordinary tokens and the consumer (marshaller or pretty printer)
//! reconstructs the tree. This keeps decoding state-free and lets both
//! consumers share one parse.

use std::io::Read;

use crate::draft::Draft;
use crate::error::{Error, Result};
use crate::markers::{draft8 as m8, draft9 as m9};
use crate::source::Source;
use crate::value::is_canonical_decimal;

/// One wire token: the marker byte it started with, plus its decoded
/// payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The marker byte as read from the wire. Kept so consumers can
    /// reproduce the exact wire form (`s` vs `S`, `B` vs `i`).
    pub tag: u8,
    pub kind: TokenKind,
}

/// The decoded payload of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Noop,
    Null,
    Bool(bool),
    Int(i64),
    Float32(f32),
    Float64(f64),
    Char(char),
    String(String),
    Huge(String),
    /// Container open; `Some(n)` declares `n` items (`n` pairs for an
    /// object), `None` means streamed until the matching close.
    ArrayOpen(Option<usize>),
    ObjectOpen(Option<usize>),
    /// Draft-9 `]`.
    ArrayClose,
    /// Draft-9 `}`.
    ObjectClose,
    /// Draft-8 `E`; closes a streamed container of either kind.
    End,
}

/// Pull tokenizer over a byte [`Source`].
pub struct Tokenizer<R> {
    source: Source<R>,
    draft: Draft,
}

impl<R: Read> Tokenizer<R> {
    pub fn new(source: Source<R>, draft: Draft) -> Self {
        Self { source, draft }
    }

    pub fn draft(&self) -> Draft {
        self.draft
    }

    /// Produces the next token, or `None` on a clean end of stream at a
    /// token boundary.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        let Some(marker) = self.source.read_byte()? else {
            return Ok(None);
        };
        let kind = match self.draft {
            Draft::Draft8 => self.read_draft8(marker)?,
            Draft::Draft9 => self.read_draft9(marker)?,
        };
        Ok(Some(Token { tag: marker, kind }))
    }

    fn read_draft8(&mut self, marker: u8) -> Result<TokenKind> {
        let kind = match marker {
            m8::NOOP => TokenKind::Noop,
            m8::NULL => TokenKind::Null,
            m8::FALSE => TokenKind::Bool(false),
            m8::TRUE => TokenKind::Bool(true),

            m8::BYTE => TokenKind::Int(i64::from(self.source.read_u8()?)),
            m8::INT16 => TokenKind::Int(i64::from(self.source.read_i16()?)),
            m8::INT32 => TokenKind::Int(i64::from(self.source.read_i32()?)),
            m8::INT64 => TokenKind::Int(self.source.read_i64()?),
            m8::FLOAT32 => TokenKind::Float32(self.source.read_f32()?),
            m8::FLOAT64 => TokenKind::Float64(self.source.read_f64()?),

            m8::STR_SHORT => {
                let len = usize::from(self.source.read_u8()?);
                TokenKind::String(self.read_utf8(len)?)
            }
            m8::STR_LONG => {
                let len = self.source.read_u32()? as usize;
                TokenKind::String(self.read_utf8(len)?)
            }
            m8::HUGE_SHORT => {
                let len = usize::from(self.source.read_u8()?);
                TokenKind::Huge(self.read_decimal(len)?)
            }
            m8::HUGE_LONG => {
                let len = self.source.read_u32()? as usize;
                TokenKind::Huge(self.read_decimal(len)?)
            }

            m8::ARRAY_SHORT => match self.source.read_u8()? {
                m8::STREAM_COUNT => TokenKind::ArrayOpen(None),
                count => TokenKind::ArrayOpen(Some(usize::from(count))),
            },
            m8::ARRAY_LONG => {
                TokenKind::ArrayOpen(Some(self.source.read_u32()? as usize))
            }
            m8::OBJECT_SHORT => match self.source.read_u8()? {
                m8::STREAM_COUNT => TokenKind::ObjectOpen(None),
                count => TokenKind::ObjectOpen(Some(usize::from(count))),
            },
            m8::OBJECT_LONG => {
                TokenKind::ObjectOpen(Some(self.source.read_u32()? as usize))
            }
            m8::END => TokenKind::End,

            _ => return Err(Error::unknown_marker(marker)),
        };
        Ok(kind)
    }

    fn read_draft9(&mut self, marker: u8) -> Result<TokenKind> {
        let kind = match marker {
            m9::NOOP => TokenKind::Noop,
            m9::NULL => TokenKind::Null,
            m9::FALSE => TokenKind::Bool(false),
            m9::TRUE => TokenKind::Bool(true),

            m9::UINT8 => TokenKind::Int(i64::from(self.source.read_u8()?)),
            m9::INT8 => TokenKind::Int(i64::from(self.source.read_i8()?)),
            m9::INT16 => TokenKind::Int(i64::from(self.source.read_i16()?)),
            m9::INT32 => TokenKind::Int(i64::from(self.source.read_i32()?)),
            m9::INT64 => TokenKind::Int(self.source.read_i64()?),
            m9::FLOAT32 => TokenKind::Float32(self.source.read_f32()?),
            m9::FLOAT64 => TokenKind::Float64(self.source.read_f64()?),

            m9::CHAR => TokenKind::Char(char::from(self.source.read_u8()?)),
            m9::STRING => {
                let len = self.read_length()?;
                TokenKind::String(self.read_utf8(len)?)
            }
            m9::HUGE => {
                let len = self.read_length()?;
                TokenKind::Huge(self.read_decimal(len)?)
            }

            m9::ARRAY_OPEN => TokenKind::ArrayOpen(None),
            m9::OBJECT_OPEN => TokenKind::ObjectOpen(None),
            m9::ARRAY_CLOSE => TokenKind::ArrayClose,
            m9::OBJECT_CLOSE => TokenKind::ObjectClose,

            _ => return Err(Error::unknown_marker(marker)),
        };
        Ok(kind)
    }

    /// Draft-9 length prefix: a complete integer token.
    fn read_length(&mut self) -> Result<usize> {
        let marker = self.source.read_u8()?;
        let value = match marker {
            m9::UINT8 => i64::from(self.source.read_u8()?),
            m9::INT8 => i64::from(self.source.read_i8()?),
            m9::INT16 => i64::from(self.source.read_i16()?),
            m9::INT32 => i64::from(self.source.read_i32()?),
            m9::INT64 => self.source.read_i64()?,
            _ => {
                return Err(Error::Marker(format!(
                    "expected an integer length marker, got 0x{marker:02X}"
                )));
            }
        };
        if value < 0 {
            return Err(Error::Decode(format!("negative length prefix: {value}")));
        }
        usize::try_from(value)
            .map_err(|_| Error::Decode(format!("length prefix out of range: {value}")))
    }

    fn read_utf8(&mut self, len: usize) -> Result<String> {
        String::from_utf8(self.source.read_vec(len)?)
            .map_err(|_| Error::Decode("invalid UTF-8 in string payload".into()))
    }

    fn read_decimal(&mut self, len: usize) -> Result<String> {
        let text = String::from_utf8(self.source.read_vec(len)?)
            .map_err(|_| Error::Decode("invalid UTF-8 in huge number payload".into()))?;
        if !is_canonical_decimal(&text) {
            return Err(Error::Decode(format!(
                "huge number payload is not a decimal: {text:?}"
            )));
        }
        Ok(text)
    }
}

impl<R: Read> Iterator for Tokenizer<R> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}
