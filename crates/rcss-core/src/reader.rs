//! Buffered Character Reader
//!
//! Pulls fixed-size chunks from a [`ByteStream`] and hands out one logical
//! character at a time. Block comments are removed here, so nothing above
//! this layer ever sees them, and newlines are counted for diagnostics.

use std::io;

use crate::stream::ByteStream;

/// Character reader over a byte stream, valid for one parse
pub struct BufferedReader<'s> {
    stream: &'s mut dyn ByteStream,
    source_name: String,
    buffer: Box<[u8]>,
    /// Number of valid bytes in `buffer`
    filled: usize,
    position: usize,
    /// Byte read ahead while probing for `/*`
    pushback: Option<u8>,
    line: u32,
    exhausted: bool,
    read_error: Option<io::Error>,
}

impl<'s> BufferedReader<'s> {
    pub fn new(stream: &'s mut dyn ByteStream, buffer_size: usize) -> Self {
        let source_name = stream.source_name().to_string();
        Self {
            stream,
            source_name,
            buffer: vec![0; buffer_size.max(1)].into_boxed_slice(),
            filled: 0,
            position: 0,
            pushback: None,
            line: 1,
            exhausted: false,
            read_error: None,
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Current line number (1-based)
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Error that ended the stream early, if any
    pub fn take_read_error(&mut self) -> Option<io::Error> {
        self.read_error.take()
    }

    /// Request more bytes from the stream. Returns false at end of stream.
    pub fn fill_buffer(&mut self) -> bool {
        if self.exhausted {
            return false;
        }

        self.position = 0;
        match self.stream.read(&mut self.buffer) {
            Ok(0) => {
                self.filled = 0;
                self.exhausted = true;
                false
            }
            Ok(count) => {
                self.filled = count;
                true
            }
            Err(e) => {
                self.filled = 0;
                self.exhausted = true;
                self.read_error = Some(e);
                false
            }
        }
    }

    fn next_byte(&mut self) -> Option<u8> {
        if let Some(byte) = self.pushback.take() {
            return Some(byte);
        }
        if self.position >= self.filled && !self.fill_buffer() {
            return None;
        }
        let byte = self.buffer[self.position];
        self.position += 1;
        Some(byte)
    }

    /// Next logical character, with comments removed. `None` at end of
    /// stream, including inside an unterminated comment.
    pub fn read_character(&mut self) -> Option<char> {
        loop {
            let byte = self.next_byte()?;
            match byte {
                b'\n' => {
                    self.line += 1;
                    return Some('\n');
                }
                b'/' => match self.next_byte() {
                    Some(b'*') => {
                        if !self.skip_comment() {
                            return None;
                        }
                    }
                    Some(other) => {
                        self.pushback = Some(other);
                        return Some('/');
                    }
                    None => return Some('/'),
                },
                _ => return Some(self.decode(byte)),
            }
        }
    }

    /// Consume up to and including the closing `*/`
    fn skip_comment(&mut self) -> bool {
        let mut star = false;
        while let Some(byte) = self.next_byte() {
            match byte {
                b'/' if star => return true,
                b'*' => star = true,
                b'\n' => {
                    self.line += 1;
                    star = false;
                }
                _ => star = false,
            }
        }
        false
    }

    fn decode(&mut self, lead: u8) -> char {
        let width = match lead {
            0x00..=0x7F => return lead as char,
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return char::REPLACEMENT_CHARACTER,
        };

        let mut bytes = [lead, 0, 0, 0];
        for slot in bytes.iter_mut().take(width).skip(1) {
            match self.next_byte() {
                Some(byte) if byte & 0xC0 == 0x80 => *slot = byte,
                Some(byte) => {
                    self.pushback = Some(byte);
                    return char::REPLACEMENT_CHARACTER;
                }
                None => return char::REPLACEMENT_CHARACTER,
            }
        }

        std::str::from_utf8(&bytes[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::MemoryStream;

    fn read_all(text: &str, buffer_size: usize) -> (String, u32) {
        let mut stream = MemoryStream::from_text(text, "test");
        let mut reader = BufferedReader::new(&mut stream, buffer_size);
        let mut out = String::new();
        while let Some(c) = reader.read_character() {
            out.push(c);
        }
        (out, reader.line())
    }

    #[test]
    fn test_strips_comments() {
        let (out, _) = read_all("a/* comment */b", 4092);
        assert_eq!(out, "ab");
    }

    #[test]
    fn test_comment_across_refills() {
        for size in 1..8 {
            let (out, _) = read_all("x{/* split * comment **/y}", size);
            assert_eq!(out, "x{y}", "buffer size {}", size);
        }
    }

    #[test]
    fn test_lone_slash_is_kept() {
        for size in 1..4 {
            let (out, _) = read_all("a/b/", size);
            assert_eq!(out, "a/b/", "buffer size {}", size);
        }
    }

    #[test]
    fn test_counts_lines() {
        let (out, line) = read_all("a\n/* one\ntwo */\nb", 3);
        assert_eq!(out, "a\n\nb");
        assert_eq!(line, 4);
    }

    #[test]
    fn test_unterminated_comment_ends_stream() {
        let (out, _) = read_all("ab/* never closed", 4092);
        assert_eq!(out, "ab");
    }

    #[test]
    fn test_utf8_across_refills() {
        for size in 1..5 {
            let (out, _) = read_all("\"é→😀\"", size);
            assert_eq!(out, "\"é→😀\"", "buffer size {}", size);
        }
    }

    #[test]
    fn test_invalid_utf8_replaced() {
        let bytes = [b'a', 0xFF, b'b'];
        let mut stream = MemoryStream::new(&bytes, "bytes");
        let mut reader = BufferedReader::new(&mut stream, 16);
        assert_eq!(reader.read_character(), Some('a'));
        assert_eq!(reader.read_character(), Some(char::REPLACEMENT_CHARACTER));
        assert_eq!(reader.read_character(), Some('b'));
        assert_eq!(reader.read_character(), None);
    }

    #[test]
    fn test_fill_buffer_reports_end() {
        let mut stream = MemoryStream::from_text("", "empty");
        let mut reader = BufferedReader::new(&mut stream, 8);
        assert!(!reader.fill_buffer());
        assert_eq!(reader.read_character(), None);
    }
}
