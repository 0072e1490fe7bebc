//! Byte Sources
//!
//! The parser consumes stylesheets from a forward-only byte source. The
//! source also carries a human-readable name used in diagnostics.

use std::io::{self, Read};

/// Forward-only, read-once byte source
pub trait ByteStream {
    /// Read up to `buf.len()` bytes. `Ok(0)` signals end of stream.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Name of the source for diagnostics (file path, URL, "inline", ...)
    fn source_name(&self) -> &str;
}

/// In-memory byte stream over a borrowed slice
#[derive(Debug, Clone)]
pub struct MemoryStream<'a> {
    data: &'a [u8],
    position: usize,
    name: String,
}

impl<'a> MemoryStream<'a> {
    pub fn new(data: &'a [u8], name: impl Into<String>) -> Self {
        Self {
            data,
            position: 0,
            name: name.into(),
        }
    }

    pub fn from_text(text: &'a str, name: impl Into<String>) -> Self {
        Self::new(text.as_bytes(), name)
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }
}

impl ByteStream for MemoryStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let count = buf.len().min(self.remaining());
        buf[..count].copy_from_slice(&self.data[self.position..self.position + count]);
        self.position += count;
        Ok(count)
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

/// Byte stream adapter over any [`Read`] implementation
pub struct ReaderStream<R> {
    reader: R,
    name: String,
}

impl<R: Read> ReaderStream<R> {
    pub fn new(reader: R, name: impl Into<String>) -> Self {
        Self {
            reader,
            name: name.into(),
        }
    }
}

impl<R: Read> ByteStream for ReaderStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.reader.read(buf) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => return other,
            }
        }
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_stream_chunks() {
        let mut stream = MemoryStream::from_text("abcdef", "inline");
        let mut buf = [0u8; 4];

        assert_eq!(stream.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(stream.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ef");
        assert_eq!(stream.read(&mut buf).unwrap(), 0);
        assert_eq!(stream.source_name(), "inline");
    }

    #[test]
    fn test_reader_stream() {
        let mut stream = ReaderStream::new(io::Cursor::new(b"xyz".to_vec()), "cursor");
        let mut buf = [0u8; 8];
        assert_eq!(stream.read(&mut buf).unwrap(), 3);
        assert_eq!(stream.read(&mut buf).unwrap(), 0);
    }
}
