//! Pull-based byte sources for the decoder.
//!
//! Everything the tokenizer reads comes through [`Source`], a thin
//! wrapper over any [`std::io::Read`] that distinguishes a clean end of
//! stream at a token boundary from a short read inside a token. Chunked
//! producers (iterators or callables yielding byte chunks) are adapted
//! with [`ChunkSource`], which buffers until enough bytes are available.

use std::io::{ErrorKind, Read};

use bytes::{Buf, BytesMut};

use crate::error::{Error, Result};

/// Largest single allocation made up front for a length-prefixed
/// payload. Longer payloads grow as bytes actually arrive, so a lying
/// length prefix fails with `EndOfStream` instead of exhausting memory.
const READ_CHUNK: usize = 64 * 1024;

/// A pull byte source with exact-read semantics.
pub struct Source<R> {
    reader: R,
}

impl<'a> Source<&'a [u8]> {
    /// Source over an in-memory byte buffer.
    pub fn from_slice(data: &'a [u8]) -> Self {
        Self::new(data)
    }
}

impl<I> Source<ChunkSource<I>>
where
    I: Iterator,
    I::Item: AsRef<[u8]>,
{
    /// Source over an iterator of byte chunks.
    pub fn from_chunks<T: IntoIterator<IntoIter = I>>(chunks: T) -> Self {
        Self::new(ChunkSource::new(chunks))
    }
}

impl<F> Source<ChunkSource<std::iter::FromFn<F>>>
where
    F: FnMut() -> Option<Vec<u8>>,
{
    /// Source over a callable producing byte chunks until it returns
    /// `None`.
    pub fn from_fn(f: F) -> Self {
        Self::new(ChunkSource::new(std::iter::from_fn(f)))
    }
}

impl<R: Read> Source<R> {
    /// Source over any reader.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Reads one byte, or `None` on a clean end of stream.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Reads one byte; end of stream here is mid-token.
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_byte()?.ok_or(Error::EndOfStream)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_be_bytes(self.read_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_be_bytes(self.read_array()?))
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.reader.read_exact(&mut buf).map_err(map_eof)?;
        Ok(buf)
    }

    /// Reads exactly `len` bytes. Allocation grows with the bytes read,
    /// capped per step, and never exceeds what the length prefix
    /// authorizes.
    pub fn read_vec(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(len.min(READ_CHUNK));
        let read = (&mut self.reader)
            .take(len as u64)
            .read_to_end(&mut buf)
            .map_err(map_eof)?;
        if read < len {
            return Err(Error::EndOfStream);
        }
        Ok(buf)
    }
}

fn map_eof(e: std::io::Error) -> Error {
    if e.kind() == ErrorKind::UnexpectedEof {
        Error::EndOfStream
    } else {
        e.into()
    }
}

/// Adapts an iterator of byte chunks into a [`Read`].
///
/// Chunks are appended to an internal buffer and drained on demand, so a
/// single `read_vec` may span any number of produced chunks. Empty
/// chunks are skipped.
pub struct ChunkSource<I> {
    chunks: I,
    buf: BytesMut,
}

impl<I> ChunkSource<I>
where
    I: Iterator,
    I::Item: AsRef<[u8]>,
{
    pub fn new<T: IntoIterator<IntoIter = I>>(chunks: T) -> Self {
        Self {
            chunks: chunks.into_iter(),
            buf: BytesMut::new(),
        }
    }
}

impl<I> Read for ChunkSource<I>
where
    I: Iterator,
    I::Item: AsRef<[u8]>,
{
    fn read(&mut self, out: &mut [u8]) -> std::io::Result<usize> {
        while !self.buf.has_remaining() {
            match self.chunks.next() {
                Some(chunk) => self.buf.extend_from_slice(chunk.as_ref()),
                None => return Ok(0),
            }
        }
        let n = out.len().min(self.buf.remaining());
        self.buf.copy_to_slice(&mut out[..n]);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_source_reads_exactly() {
        let mut src = Source::from_slice(b"\x01\x02\x03\x04");
        assert_eq!(src.read_u8().unwrap(), 1);
        assert_eq!(src.read_vec(3).unwrap(), vec![2, 3, 4]);
        assert!(src.read_byte().unwrap().is_none());
    }

    #[test]
    fn short_read_is_end_of_stream() {
        let mut src = Source::from_slice(b"\x01\x02");
        assert!(matches!(src.read_vec(3), Err(Error::EndOfStream)));

        let mut src = Source::from_slice(b"\x01");
        assert!(matches!(src.read_i16(), Err(Error::EndOfStream)));
    }

    #[test]
    fn typed_reads_are_big_endian() {
        let mut src = Source::from_slice(b"\x30\x39\xff\xfe\x77\x6c");
        assert_eq!(src.read_i16().unwrap(), 12345);
        assert_eq!(src.read_i32().unwrap(), -100500);
    }

    #[test]
    fn chunk_source_spans_chunk_boundaries() {
        let chunks: Vec<&[u8]> = vec![b"\x01\x02", b"", b"\x03\x04\x05"];
        let mut src = Source::from_chunks(chunks);
        assert_eq!(src.read_vec(4).unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(src.read_u8().unwrap(), 5);
        assert!(src.read_byte().unwrap().is_none());
    }

    #[test]
    fn fn_source_pulls_until_none() {
        let mut remaining = 3u8;
        let mut src = Source::from_fn(move || {
            if remaining == 0 {
                None
            } else {
                remaining -= 1;
                Some(vec![remaining])
            }
        });
        assert_eq!(src.read_vec(3).unwrap(), vec![2, 1, 0]);
        assert!(src.read_byte().unwrap().is_none());
    }

    #[test]
    fn lying_length_prefix_fails_before_exhausting_memory() {
        let mut src = Source::from_slice(b"abc");
        assert!(matches!(src.read_vec(usize::MAX), Err(Error::EndOfStream)));
    }
}
