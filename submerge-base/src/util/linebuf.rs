//! Growable line buffer: reads one line at a time from any
//! `BufRead`, trims trailing whitespace or chomps a CR/LF terminator, and
//! splits on a character, a character set, or a delimiter substring.

use std::io::BufRead;

use crate::Result;

#[derive(Default)]
pub struct LineBuffer {
    line: String,
}

impl LineBuffer {
    pub fn new() -> Self {
        LineBuffer::default()
    }

    /// Reads the next line (terminator included) from `src` into the
    /// internal buffer. Returns `false` at end of input, matching the
    /// original's `getline(FILE*)` boolean-success contract.
    pub fn getline(&mut self, src: &mut impl BufRead) -> Result<bool> {
        self.line.clear();
        let n = src.read_line(&mut self.line)?;
        Ok(n > 0)
    }

    pub fn as_str(&self) -> &str {
        &self.line
    }

    /// Removes a trailing `\r\n` or `\n` terminator, if present.
    pub fn chomp(&mut self) -> &str {
        if self.line.ends_with('\n') {
            self.line.pop();
            if self.line.ends_with('\r') {
                self.line.pop();
            }
        }
        &self.line
    }

    /// Removes trailing ASCII whitespace (after any terminator).
    pub fn trim_trailing(&mut self) -> &str {
        let trimmed_len = self.line.trim_end().len();
        self.line.truncate(trimmed_len);
        &self.line
    }

    pub fn split_char(&self, sep: char) -> Vec<&str> {
        self.line.split(sep).collect()
    }

    pub fn split_any(&self, seps: &[char]) -> Vec<&str> {
        self.line.split(|c| seps.contains(&c)).collect()
    }

    pub fn split_delim(&self, delim: &str) -> Vec<&str> {
        self.line.split(delim).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;
    use test_log::test;

    #[test]
    fn test_getline_and_chomp() {
        let mut cursor = Cursor::new(b"first\r\nsecond\n".to_vec());
        let mut lb = LineBuffer::new();
        assert!(lb.getline(&mut cursor).unwrap());
        assert_eq!(lb.chomp(), "first");
        assert!(lb.getline(&mut cursor).unwrap());
        assert_eq!(lb.chomp(), "second");
        assert!(!lb.getline(&mut cursor).unwrap());
    }

    #[test]
    fn test_trim_trailing() {
        let mut cursor = Cursor::new(b"padded   \n".to_vec());
        let mut lb = LineBuffer::new();
        lb.getline(&mut cursor).unwrap();
        assert_eq!(lb.trim_trailing(), "padded");
    }

    #[test]
    fn test_split_variants() {
        let mut cursor = Cursor::new(b"a,b;c  d::e".to_vec());
        let mut lb = LineBuffer::new();
        lb.getline(&mut cursor).unwrap();
        assert_eq!(lb.split_char(','), vec!["a", "b;c  d::e"]);
        assert_eq!(lb.split_any(&[',', ';', ' ']), vec!["a", "b", "c", "", "d::e"]);
        assert_eq!(lb.split_delim("::"), vec!["a,b;c  d", "e"]);
    }
}
