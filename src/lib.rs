//! ubjsonr — a pure-Rust Universal Binary JSON (UBJSON) codec.
//!
//! This crate converts between in-memory [`Value`] trees and the
//! compact, tag-prefixed UBJSON byte format. Two incompatible revisions
//! of the format are supported — [`Draft::Draft8`] and
//! [`Draft::Draft9`] — selectable per call; they share the
//! architecture but disagree on marker bytes and container framing.
//!
//! # Architecture
//!
//! - **`source`** — pull byte sources: slices, readers, chunk producers
//! - **`tokenizer`** — flat marker tokenizer (no nesting state)
//! - **`decode`** — marshaller building [`Value`] trees from tokens
//! - **`encode`** — value-tree encoder with canonical marker narrowing
//! - **`pprint`** — indented textual rendering of a marker stream
//! - **`markers`** — per-draft marker byte tables
//!
//! # Example
//!
//! ```
//! use ubjsonr::{decode, encode, Draft, Value};
//!
//! let value = Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
//! let bytes = encode(&value, Draft::Draft9)?;
//! assert_eq!(bytes, b"[i\x01i\x02i\x03]");
//! assert_eq!(decode(&bytes, Draft::Draft9)?, value);
//! # Ok::<(), ubjsonr::Error>(())
//! ```

pub mod decode;
pub mod draft;
pub mod encode;
pub mod error;
pub mod markers;
pub mod pprint;
pub mod source;
pub mod tokenizer;
pub mod value;

pub use crate::decode::{decode, decode_reader, Decoder};
pub use crate::draft::Draft;
pub use crate::encode::{encode, encode_into, BytesPolicy, Encoder};
pub use crate::error::{Error, Result};
pub use crate::pprint::{pprint, pprint_reader, pprint_to_string, pprint_value};
pub use crate::source::{ChunkSource, Source};
pub use crate::tokenizer::{Token, TokenKind, Tokenizer};
pub use crate::value::Value;
