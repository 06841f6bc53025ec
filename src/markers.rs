//! UBJSON marker byte constants.
//!
//! Each token on the wire starts with a single marker byte. The two
//! drafts disagree on marker identities (Draft-9 reassigned most of the
//! integer markers and replaced the container framing), so the constants
//! are kept in separate modules and never mixed.

/// Draft-8 markers.
pub mod draft8 {
    // Standalone markers
    pub const NOOP: u8 = b'N';
    pub const NULL: u8 = b'Z';
    pub const FALSE: u8 = b'F';
    pub const TRUE: u8 = b'T';

    // Numeric markers (big-endian payloads)
    pub const BYTE: u8 = b'B'; // uint8
    pub const INT16: u8 = b'i';
    pub const INT32: u8 = b'I';
    pub const INT64: u8 = b'L';
    pub const FLOAT32: u8 = b'd';
    pub const FLOAT64: u8 = b'D';

    // Length-prefixed markers: lowercase takes a u8 length, uppercase
    // a u32 length.
    pub const STR_SHORT: u8 = b's';
    pub const STR_LONG: u8 = b'S';
    pub const HUGE_SHORT: u8 = b'h';
    pub const HUGE_LONG: u8 = b'H';

    // Containers: `a`/`o` take a u8 count, `A`/`O` a u32 count.
    pub const ARRAY_SHORT: u8 = b'a';
    pub const ARRAY_LONG: u8 = b'A';
    pub const OBJECT_SHORT: u8 = b'o';
    pub const OBJECT_LONG: u8 = b'O';

    /// A u8 count of `0xFF` marks a streamed container, closed by `END`.
    pub const STREAM_COUNT: u8 = 0xFF;
    pub const END: u8 = b'E';
}

/// Draft-9 markers.
pub mod draft9 {
    // Standalone markers
    pub const NOOP: u8 = b'N';
    pub const NULL: u8 = b'Z';
    pub const FALSE: u8 = b'F';
    pub const TRUE: u8 = b'T';

    // Numeric markers (big-endian payloads)
    pub const UINT8: u8 = b'U';
    pub const INT8: u8 = b'i';
    pub const INT16: u8 = b'I';
    pub const INT32: u8 = b'l';
    pub const INT64: u8 = b'L';
    pub const FLOAT32: u8 = b'd';
    pub const FLOAT64: u8 = b'D';

    /// Single code point whose UTF-8 form is one byte.
    pub const CHAR: u8 = b'C';

    // Length-prefixed markers; the length is itself a full integer
    // token (marker plus payload).
    pub const STRING: u8 = b'S';
    pub const HUGE: u8 = b'H';

    // Containers are streamed: no count, closed by the matching close
    // marker.
    pub const ARRAY_OPEN: u8 = b'[';
    pub const ARRAY_CLOSE: u8 = b']';
    pub const OBJECT_OPEN: u8 = b'{';
    pub const OBJECT_CLOSE: u8 = b'}';
}
