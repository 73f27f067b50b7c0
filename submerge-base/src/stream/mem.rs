//! In-memory stream backends: a non-owning view over
//! a caller buffer, an owning auto-growing buffer, and an owning
//! fixed-size seekable buffer.

use std::fmt::Write as _;

use super::{Input, Output, Seekable, Whence, ZeroCopyRead, ZeroCopyWrite};
use crate::error::{data_format, end_of_file, out_of_space};
use crate::Result;

/// Non-owning view over a caller-provided buffer. Sequential read/write
/// only — input and output, not seekable.
pub struct MemStream<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> MemStream<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        MemStream { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}

impl Input for MemStream<'_> {
    fn read(&mut self, out: &mut [u8]) -> Result<usize> {
        let n = out.len().min(self.remaining());
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Output for MemStream<'_> {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let n = data.len().min(self.remaining());
        self.buf[self.pos..self.pos + n].copy_from_slice(&data[..n]);
        self.pos += n;
        Ok(n)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl ZeroCopyRead for MemStream<'_> {
    fn zc_read(&mut self, len: usize) -> Result<&[u8]> {
        let n = len.min(self.remaining());
        Ok(&self.buf[self.pos..self.pos + n])
    }

    fn zc_advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.buf.len());
    }
}

impl ZeroCopyWrite for MemStream<'_> {
    fn zc_write(&mut self, len: usize) -> Result<&mut [u8]> {
        let n = len.min(self.remaining());
        Ok(&mut self.buf[self.pos..self.pos + n])
    }

    fn zc_advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.buf.len());
    }
}

/// Owning, unboundedly expandable in-memory stream. Supports `printf`-style
/// formatted writes that grow the backing `Vec` as needed, matching the
/// original's `AutoGrownMemIO::printf`/`vprintf`.
#[derive(Default)]
pub struct AutoGrownMemStream {
    buf: Vec<u8>,
    pos: usize,
}

impl AutoGrownMemStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        AutoGrownMemStream {
            buf: Vec::with_capacity(cap),
            pos: 0,
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    /// Append formatted text at the current position, growing the buffer
    /// as needed; the stream-level analogue of `printf`.
    pub fn printf(&mut self, args: std::fmt::Arguments<'_>) -> Result<()> {
        let mut s = String::new();
        s.write_fmt(args)
            .map_err(|e| data_format(format!("printf formatting failed: {e}")))?;
        self.ensure_write(s.as_bytes())
    }
}

impl From<Vec<u8>> for AutoGrownMemStream {
    fn from(buf: Vec<u8>) -> Self {
        AutoGrownMemStream { buf, pos: 0 }
    }
}

impl Input for AutoGrownMemStream {
    fn read(&mut self, out: &mut [u8]) -> Result<usize> {
        let avail = self.buf.len() - self.pos;
        let n = out.len().min(avail);
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Output for AutoGrownMemStream {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let end = self.pos + data.len();
        if end > self.buf.len() {
            self.buf.resize(end, 0);
        }
        self.buf[self.pos..end].copy_from_slice(data);
        self.pos = end;
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Seekable for AutoGrownMemStream {
    fn tell(&mut self) -> Result<u64> {
        Ok(self.pos as u64)
    }

    fn size(&mut self) -> Result<u64> {
        Ok(self.buf.len() as u64)
    }

    fn seek_from(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        let base = match whence {
            Whence::Begin => 0i64,
            Whence::Current => self.pos as i64,
            Whence::End => self.buf.len() as i64,
        };
        let new_pos = base + offset;
        if new_pos < 0 {
            return Err(data_format("seek to negative position"));
        }
        self.pos = new_pos as usize;
        Ok(self.pos as u64)
    }
}

impl ZeroCopyRead for AutoGrownMemStream {
    fn zc_read(&mut self, len: usize) -> Result<&[u8]> {
        let avail = self.buf.len() - self.pos;
        let n = len.min(avail);
        Ok(&self.buf[self.pos..self.pos + n])
    }

    fn zc_advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.buf.len());
    }
}

/// Owning, fixed-capacity seekable in-memory stream: same role set as
/// [`AutoGrownMemStream`] but writes past capacity raise `OutOfSpace`
/// rather than growing.
pub struct SeekableMemStream {
    buf: Vec<u8>,
    len: usize,
    pos: usize,
}

impl SeekableMemStream {
    pub fn with_capacity(cap: usize) -> Self {
        SeekableMemStream {
            buf: vec![0u8; cap],
            len: 0,
            pos: 0,
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl Input for SeekableMemStream {
    fn read(&mut self, out: &mut [u8]) -> Result<usize> {
        let n = out.len().min(self.len - self.pos);
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Output for SeekableMemStream {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let capacity = self.buf.len();
        if self.pos >= capacity {
            return Err(out_of_space("seekable mem stream is full"));
        }
        let n = data.len().min(capacity - self.pos);
        self.buf[self.pos..self.pos + n].copy_from_slice(&data[..n]);
        self.pos += n;
        self.len = self.len.max(self.pos);
        Ok(n)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Seekable for SeekableMemStream {
    fn tell(&mut self) -> Result<u64> {
        Ok(self.pos as u64)
    }

    fn size(&mut self) -> Result<u64> {
        Ok(self.len as u64)
    }

    fn seek_from(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        let base = match whence {
            Whence::Begin => 0i64,
            Whence::Current => self.pos as i64,
            Whence::End => self.len as i64,
        };
        let new_pos = base + offset;
        if new_pos < 0 || new_pos as usize > self.buf.len() {
            return Err(end_of_file("seek out of seekable mem stream bounds"));
        }
        self.pos = new_pos as usize;
        Ok(self.pos as u64)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn test_mem_stream_roundtrip() {
        let mut backing = [0u8; 8];
        {
            let mut w = MemStream::new(&mut backing);
            w.ensure_write(b"abcd").unwrap();
        }
        let mut r = MemStream::new(&mut backing);
        let mut out = [0u8; 4];
        r.ensure_read(&mut out).unwrap();
        assert_eq!(&out, b"abcd");
    }

    #[test]
    fn test_mem_stream_zero_copy() {
        let mut backing = *b"hello world";
        let mut s = MemStream::new(&mut backing);
        let window = s.zc_read(5).unwrap().to_vec();
        assert_eq!(&window, b"hello");
        s.zc_advance(5);
        assert_eq!(s.position(), 5);
    }

    #[test]
    fn test_auto_grown_mem_stream_grows() {
        let mut s = AutoGrownMemStream::new();
        s.ensure_write(b"0123456789").unwrap();
        assert_eq!(s.as_slice(), b"0123456789");
        s.seek(0).unwrap();
        let mut out = [0u8; 5];
        s.ensure_read(&mut out).unwrap();
        assert_eq!(&out, b"01234");
    }

    #[test]
    fn test_auto_grown_mem_stream_printf() {
        let mut s = AutoGrownMemStream::new();
        s.printf(format_args!("{}-{}", 1, "two")).unwrap();
        assert_eq!(s.as_slice(), b"1-two");
    }

    #[test]
    fn test_seekable_mem_stream_out_of_space() {
        let mut s = SeekableMemStream::with_capacity(4);
        assert!(s.ensure_write(b"abcd").is_ok());
        assert!(s.ensure_write(b"e").is_err());
    }

    #[test]
    fn test_seekable_mem_stream_seek_end() {
        let mut s = SeekableMemStream::with_capacity(8);
        s.ensure_write(b"abcd").unwrap();
        s.seek_from(0, Whence::End).unwrap();
        assert_eq!(s.tell().unwrap(), 4);
    }
}
