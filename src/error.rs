//! Error types for the UBJSON codec.

/// Errors that can occur while encoding, decoding or pretty-printing
/// UBJSON data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The byte source was exhausted in the middle of a token.
    #[error("unexpected end of stream")]
    EndOfStream,

    /// Unknown marker byte, or a known marker in a position where it is
    /// not allowed (e.g. a non-integer marker where a length was
    /// expected, or a non-string marker as an object key).
    #[error("marker error: {0}")]
    Marker(String),

    /// The value has no representation in the selected draft.
    #[error("encode error: {0}")]
    Encode(String),

    /// A marker's payload is malformed (invalid UTF-8, a non-decimal
    /// huge-number body, a negative length prefix).
    #[error("decode error: {0}")]
    Decode(String),

    /// The requested draft name is not recognized.
    #[error("unknown or unsupported draft: {0:?}")]
    Draft(String),

    /// An error raised by the caller-supplied source or sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Marker error for a byte that has no meaning in the active draft.
    pub(crate) fn unknown_marker(marker: u8) -> Self {
        Self::Marker(format!("unknown marker 0x{marker:02X}"))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
