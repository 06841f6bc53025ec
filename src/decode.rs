//! Decoding: marker tokens → [`Value`] trees.
//!
//! The marshaller drives a [`Tokenizer`] and is the only component that
//! tracks nesting: sized containers consume exactly their declared
//! count, streamed containers consume values until the matching close
//! token.

use std::io::Read;

use crate::draft::Draft;
use crate::error::{Error, Result};
use crate::source::Source;
use crate::tokenizer::{Token, TokenKind, Tokenizer};
use crate::value::Value;

/// Decodes one value from a byte slice. Trailing bytes after the first
/// complete value are ignored.
pub fn decode(data: &[u8], draft: Draft) -> Result<Value> {
    Decoder::new(draft).decode(data)
}

/// Decodes one value from a reader, consuming only the bytes the value
/// occupies.
pub fn decode_reader<R: Read>(reader: R, draft: Draft) -> Result<Value> {
    Decoder::new(draft).decode_reader(reader)
}

/// Configurable decoder.
///
/// By default no-op padding markers are discarded wherever they appear.
/// With [`allow_noop`](Self::allow_noop) they surface as [`Value::Noop`]
/// at the top level and as items of streamed arrays; inside objects and
/// sized containers they are always discarded, since neither a key slot
/// nor a counted slot can hold padding.
pub struct Decoder {
    draft: Draft,
    allow_noop: bool,
}

impl Decoder {
    pub fn new(draft: Draft) -> Self {
        Self {
            draft,
            allow_noop: false,
        }
    }

    /// Surfaces no-op markers instead of discarding them.
    pub fn allow_noop(mut self, allow: bool) -> Self {
        self.allow_noop = allow;
        self
    }

    pub fn decode(&self, data: &[u8]) -> Result<Value> {
        self.decode_source(Source::from_slice(data))
    }

    pub fn decode_reader<R: Read>(&self, reader: R) -> Result<Value> {
        self.decode_source(Source::new(reader))
    }

    /// Decodes one value from an arbitrary byte source.
    pub fn decode_source<R: Read>(&self, source: Source<R>) -> Result<Value> {
        tracing::trace!(draft = %self.draft, "decoding value");
        let mut tokens = Tokenizer::new(source, self.draft);
        loop {
            match tokens.next_token()? {
                None => return Err(Error::Decode("no data to decode".into())),
                Some(Token {
                    kind: TokenKind::Noop,
                    ..
                }) => {
                    if self.allow_noop {
                        return Ok(Value::Noop);
                    }
                }
                Some(token) => return self.value_from(token, &mut tokens),
            }
        }
    }

    fn value_from<R: Read>(
        &self,
        token: Token,
        tokens: &mut Tokenizer<R>,
    ) -> Result<Value> {
        match token.kind {
            TokenKind::Noop => Ok(Value::Noop),
            TokenKind::Null => Ok(Value::Null),
            TokenKind::Bool(b) => Ok(Value::Bool(b)),
            TokenKind::Int(i) => Ok(Value::Int(i)),
            TokenKind::Float32(f) => Ok(Value::Float(f64::from(f))),
            TokenKind::Float64(f) => Ok(Value::Float(f)),
            TokenKind::Char(c) => Ok(Value::String(c.to_string())),
            TokenKind::String(s) => Ok(Value::String(s)),
            TokenKind::Huge(s) => Ok(Value::Huge(s)),
            TokenKind::ArrayOpen(Some(count)) => self.sized_array(count, tokens),
            TokenKind::ArrayOpen(None) => self.streamed_array(tokens),
            TokenKind::ObjectOpen(Some(count)) => self.sized_object(count, tokens),
            TokenKind::ObjectOpen(None) => self.streamed_object(tokens),
            TokenKind::ArrayClose | TokenKind::ObjectClose | TokenKind::End => {
                Err(unexpected_close(&token))
            }
        }
    }

    /// Next token with no-op padding discarded; end of stream here is
    /// always inside an unfinished construct.
    fn next_significant<R: Read>(&self, tokens: &mut Tokenizer<R>) -> Result<Token> {
        loop {
            match tokens.next_token()? {
                None => return Err(Error::EndOfStream),
                Some(Token {
                    kind: TokenKind::Noop,
                    ..
                }) => continue,
                Some(token) => return Ok(token),
            }
        }
    }

    fn sized_array<R: Read>(
        &self,
        count: usize,
        tokens: &mut Tokenizer<R>,
    ) -> Result<Value> {
        // Preallocation is bounded: a lying count fails on end of
        // stream, not on allocation.
        let mut items = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            let token = self.next_significant(tokens)?;
            if is_close(&token) {
                return Err(unexpected_close(&token));
            }
            items.push(self.value_from(token, tokens)?);
        }
        Ok(Value::Array(items))
    }

    fn streamed_array<R: Read>(&self, tokens: &mut Tokenizer<R>) -> Result<Value> {
        let mut items = Vec::new();
        loop {
            let token = match tokens.next_token()? {
                None => return Err(Error::EndOfStream),
                Some(token) => token,
            };
            match token.kind {
                TokenKind::Noop => {
                    if self.allow_noop {
                        items.push(Value::Noop);
                    }
                }
                TokenKind::End | TokenKind::ArrayClose => break,
                TokenKind::ObjectClose => return Err(unexpected_close(&token)),
                _ => items.push(self.value_from(token, tokens)?),
            }
        }
        Ok(Value::Array(items))
    }

    fn sized_object<R: Read>(
        &self,
        count: usize,
        tokens: &mut Tokenizer<R>,
    ) -> Result<Value> {
        let mut pairs = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            let key = self.object_key(self.next_significant(tokens)?)?;
            let token = self.next_significant(tokens)?;
            if is_close(&token) {
                return Err(unexpected_close(&token));
            }
            pairs.push((key, self.value_from(token, tokens)?));
        }
        Ok(Value::Object(pairs))
    }

    fn streamed_object<R: Read>(&self, tokens: &mut Tokenizer<R>) -> Result<Value> {
        let mut pairs = Vec::new();
        loop {
            let token = self.next_significant(tokens)?;
            let key = match token.kind {
                TokenKind::End | TokenKind::ObjectClose => break,
                TokenKind::ArrayClose => return Err(unexpected_close(&token)),
                _ => self.object_key(token)?,
            };
            let token = self.next_significant(tokens)?;
            if is_close(&token) {
                return Err(Error::Marker(format!(
                    "value expected for key {key:?}, got close marker"
                )));
            }
            pairs.push((key, self.value_from(token, tokens)?));
        }
        Ok(Value::Object(pairs))
    }

    fn object_key(&self, token: Token) -> Result<String> {
        match token.kind {
            TokenKind::String(s) => Ok(s),
            TokenKind::Char(c) => Ok(c.to_string()),
            _ => Err(Error::Marker(format!(
                "object key must be a string, got marker 0x{:02X}",
                token.tag
            ))),
        }
    }
}

fn is_close(token: &Token) -> bool {
    matches!(
        token.kind,
        TokenKind::ArrayClose | TokenKind::ObjectClose | TokenKind::End
    )
}

fn unexpected_close(token: &Token) -> Error {
    Error::Marker(format!(
        "unexpected close marker 0x{:02X} at value position",
        token.tag
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d8(data: &[u8]) -> Result<Value> {
        decode(data, Draft::Draft8)
    }

    fn d9(data: &[u8]) -> Result<Value> {
        decode(data, Draft::Draft9)
    }

    fn obj(pairs: &[(&str, Value)]) -> Value {
        Value::Object(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn skip_head_noops() {
        assert_eq!(d8(b"NNNNNNNNNNNNNZ").unwrap(), Value::Null);
        assert_eq!(d9(b"NNNNNNNNNNNNNZ").unwrap(), Value::Null);
    }

    #[test]
    fn skip_trailing_data() {
        assert_eq!(d8(b"Zfoobarbaz").unwrap(), Value::Null);
        assert_eq!(d9(b"Zfoobarbaz").unwrap(), Value::Null);
    }

    #[test]
    fn no_data_fails() {
        assert!(matches!(d8(b""), Err(Error::Decode(_))));
        assert!(matches!(d9(b"NNN"), Err(Error::Decode(_))));
    }

    #[test]
    fn noop_surfaces_only_when_allowed() {
        let decoded = Decoder::new(Draft::Draft9).allow_noop(true).decode(b"N");
        assert_eq!(decoded.unwrap(), Value::Noop);
    }

    #[test]
    fn draft8_scalars() {
        assert_eq!(d8(b"Z").unwrap(), Value::Null);
        assert_eq!(d8(b"T").unwrap(), Value::Bool(true));
        assert_eq!(d8(b"F").unwrap(), Value::Bool(false));
        assert_eq!(d8(b"B\x2a").unwrap(), Value::Int(42));
        assert_eq!(d8(b"i\x30\x39").unwrap(), Value::Int(12345));
        assert_eq!(d8(b"I\xff\xfe\x77\x6c").unwrap(), Value::Int(-100_500));
        assert_eq!(
            d8(b"L\x80\x00\x00\x00\x00\x00\x00\x00").unwrap(),
            Value::Int(i64::MIN)
        );
        assert_eq!(
            d8(b"D\x71\x8e\xde\x0b\x49\x13\x5b\x25").unwrap(),
            Value::Float(100500e234)
        );
    }

    #[test]
    fn draft8_huge_number() {
        let source = b"h\x33314159265358979323846264338327950288419716939937510";
        assert_eq!(
            d8(source).unwrap(),
            Value::Huge("314159265358979323846264338327950288419716939937510".into())
        );
    }

    #[test]
    fn draft8_strings() {
        assert_eq!(d8(b"s\x03foo").unwrap(), Value::String("foo".into()));
        assert_eq!(
            d8(b"s\x0c\xd0\xbf\xd1\x80\xd0\xb8\xd0\xb2\xd0\xb5\xd1\x82").unwrap(),
            Value::String("привет".into())
        );
    }

    #[test]
    fn draft8_sized_containers() {
        assert_eq!(
            d8(b"a\x03B\x01B\x02B\x03").unwrap(),
            Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        let mut large = b"A\x00\x00\x04\x00".to_vec();
        for _ in 0..1024 {
            large.extend_from_slice(b"B\x01");
        }
        assert_eq!(
            d8(&large).unwrap(),
            Value::Array(vec![Value::Int(1); 1024])
        );
        assert_eq!(
            d8(b"o\x02s\x03foos\x03bars\x03bars\x03baz").unwrap(),
            obj(&[("foo", "bar".into()), ("bar", "baz".into())])
        );
        assert_eq!(d8(b"a\x00").unwrap(), Value::Array(vec![]));
    }

    #[test]
    fn draft8_streamed_containers() {
        assert_eq!(
            d8(b"a\xffB\x01B\x02B\x03E").unwrap(),
            Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        assert_eq!(
            d8(b"o\xffs\x03foos\x03bars\x03bars\x03bazE").unwrap(),
            obj(&[("foo", "bar".into()), ("bar", "baz".into())])
        );
        assert_eq!(d8(b"Na\xffE").unwrap(), Value::Array(vec![]));
        assert_eq!(
            d8(b"a\xffNB\x01NNNB\x02NNNNNNNNNNNNNB\x03E").unwrap(),
            Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
    }

    #[test]
    fn draft8_nested_streamed_values() {
        assert_eq!(
            d8(b"a\xffa\xffB\x2aEo\xffs\x03fooB\x2aEE").unwrap(),
            Value::Array(vec![
                Value::Array(vec![Value::Int(42)]),
                obj(&[("foo", Value::Int(42))]),
            ])
        );
        assert_eq!(
            d8(b"o\x02s\x03bara\xffB\x2aEs\x03bazo\xffNNNs\x03fooB\x2aE").unwrap(),
            obj(&[
                ("bar", Value::Array(vec![Value::Int(42)])),
                ("baz", obj(&[("foo", Value::Int(42))])),
            ])
        );
    }

    #[test]
    fn draft8_noops_in_sized_containers_are_skipped() {
        assert_eq!(
            d8(b"a\x03B\x01B\x02NB\x03N").unwrap(),
            Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
    }

    #[test]
    fn draft8_end_marker_inside_sized_container_fails() {
        assert!(matches!(
            d8(b"a\x03B\x01B\x02EB\x03"),
            Err(Error::Marker(_))
        ));
        assert!(matches!(
            d8(b"o\x02s\x03foos\x03bars\x03barEs\x03baz"),
            Err(Error::Marker(_))
        ));
    }

    #[test]
    fn draft8_non_string_key_fails() {
        assert!(matches!(d8(b"o\x01B\x03s\x03bar"), Err(Error::Marker(_))));
        assert!(matches!(
            d8(b"o\xffB\x03s\x03fooE"),
            Err(Error::Marker(_))
        ));
    }

    #[test]
    fn draft8_early_end_fails() {
        assert!(matches!(d8(b"o\x01"), Err(Error::EndOfStream)));
        assert!(matches!(d8(b"a\xff"), Err(Error::EndOfStream)));
        assert!(matches!(d8(b"o\xff"), Err(Error::EndOfStream)));
        assert!(matches!(d8(b"o\xffs\x03fooE"), Err(Error::Marker(_))));
    }

    #[test]
    fn draft9_scalars() {
        assert_eq!(d9(b"Z").unwrap(), Value::Null);
        assert_eq!(d9(b"i\x2a").unwrap(), Value::Int(42));
        assert_eq!(d9(b"U\xd6").unwrap(), Value::Int(214));
        assert_eq!(d9(b"I\xa0\xff").unwrap(), Value::Int(-24321));
        assert_eq!(d9(b"l\x00\x01\x88\x94").unwrap(), Value::Int(100_500));
        assert_eq!(
            d9(b"L\x7f\xff\xff\xff\xff\xff\xff\xff").unwrap(),
            Value::Int(i64::MAX)
        );
        assert_eq!(d9(b"C\x42").unwrap(), Value::String("B".into()));
        assert_eq!(d9(b"Si\x03foo").unwrap(), Value::String("foo".into()));
    }

    #[test]
    fn draft9_huge_numbers() {
        assert_eq!(
            d9(b"Hi\x33314159265358979323846264338327950288419716939937510")
                .unwrap(),
            Value::Huge("314159265358979323846264338327950288419716939937510".into())
        );
        assert_eq!(
            d9(b"Hi\x35-3.14159265358979323846264338327950288419716939937510")
                .unwrap(),
            Value::Huge(
                "-3.14159265358979323846264338327950288419716939937510".into()
            )
        );
        assert_eq!(d9(b"Hi\x052e+10").unwrap(), Value::Huge("2e+10".into()));
        assert!(matches!(d9(b"Hi\x09foobarbaz"), Err(Error::Decode(_))));
    }

    #[test]
    fn draft9_streamed_containers() {
        assert_eq!(
            d9(b"[i\x01i\x02i\x03]").unwrap(),
            Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        assert_eq!(
            d9(b"{Si\x03fooSi\x03barSi\x03barSi\x03baz}").unwrap(),
            obj(&[("foo", "bar".into()), ("bar", "baz".into())])
        );
        assert_eq!(d9(b"[]").unwrap(), Value::Array(vec![]));
        assert_eq!(d9(b"{}").unwrap(), Value::Object(vec![]));
    }

    #[test]
    fn draft9_nested_values() {
        assert_eq!(
            d9(b"[[i\x2a]{Si\x03fooi\x2a}]").unwrap(),
            Value::Array(vec![
                Value::Array(vec![Value::Int(42)]),
                obj(&[("foo", Value::Int(42))]),
            ])
        );
        assert_eq!(
            d9(b"{Si\x03bar[i\x2a]Si\x03baz{NNNSi\x03fooi\x2a}}").unwrap(),
            obj(&[
                ("bar", Value::Array(vec![Value::Int(42)])),
                ("baz", obj(&[("foo", Value::Int(42))])),
            ])
        );
    }

    #[test]
    fn draft9_char_object_key() {
        assert_eq!(
            d9(b"{CUSi\x06UBJSON}").unwrap(),
            obj(&[("U", "UBJSON".into())])
        );
    }

    #[test]
    fn draft9_noop_handling_in_streams() {
        assert_eq!(
            d9(b"[Ni\x01NNNi\x02NNNNNNNNNNNNNi\x03]").unwrap(),
            Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        let decoded = Decoder::new(Draft::Draft9)
            .allow_noop(true)
            .decode(b"[i\x00Ni\x01N]")
            .unwrap();
        assert_eq!(
            decoded,
            Value::Array(vec![
                Value::Int(0),
                Value::Noop,
                Value::Int(1),
                Value::Noop,
            ])
        );
        // Objects cannot carry padding pairs, so no-ops stay hidden.
        let decoded = Decoder::new(Draft::Draft9)
            .allow_noop(true)
            .decode(b"{NSi\x03fooNSi\x03barN}")
            .unwrap();
        assert_eq!(decoded, obj(&[("foo", "bar".into())]));
    }

    #[test]
    fn draft9_mismatched_close_fails() {
        assert!(matches!(d9(b"[i\x01}"), Err(Error::Marker(_))));
        assert!(matches!(d9(b"{Si\x01a]"), Err(Error::Marker(_))));
    }

    #[test]
    fn draft9_key_and_value_position_errors() {
        assert!(matches!(d9(b"{i\x03Si\x03bar}"), Err(Error::Marker(_))));
        assert!(matches!(d9(b"{Si\x03foo}"), Err(Error::Marker(_))));
        assert!(matches!(d9(b"{i\x01"), Err(Error::Marker(_))));
        assert!(matches!(d9(b"["), Err(Error::EndOfStream)));
        assert!(matches!(d9(b"{"), Err(Error::EndOfStream)));
    }

    #[test]
    fn close_marker_at_top_level_fails() {
        assert!(matches!(d9(b"]"), Err(Error::Marker(_))));
        assert!(matches!(d8(b"E"), Err(Error::Marker(_))));
    }

    #[test]
    fn deeply_nested_arrays_decode() {
        let mut data = Vec::new();
        for _ in 0..80 {
            data.push(b'[');
        }
        data.extend_from_slice(b"i\x07");
        for _ in 0..80 {
            data.push(b']');
        }
        let mut value = d9(&data).unwrap();
        for _ in 0..80 {
            match value {
                Value::Array(mut items) => {
                    assert_eq!(items.len(), 1);
                    value = items.pop().unwrap();
                }
                other => panic!("expected array, got {other}"),
            }
        }
        assert_eq!(value, Value::Int(7));
    }

    #[test]
    fn decode_reader_stops_after_first_value() {
        let mut reader: &[u8] = b"i\x01i\x02";
        let value = decode_reader(&mut reader, Draft::Draft9).unwrap();
        assert_eq!(value, Value::Int(1));
        assert_eq!(reader, b"i\x02");
    }
}
