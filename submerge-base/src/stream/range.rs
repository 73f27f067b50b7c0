//! Sub-range stream view, grounded on `original_source/terark-base/
//! src/terark/io/RangeStream.hpp`: restricts reads/writes on an existing
//! seekable stream to a `[base, base + len)` window, translating seeks so
//! the wrapped stream sees only its own slice. Used to hand a DataIO
//! reader a bounded region of a larger file without exposing the rest.

use super::{Input, Output, Seekable, Whence};
use crate::error::{data_format, end_of_file};
use crate::Result;

pub struct RangeStream<S> {
    inner: S,
    base: u64,
    len: u64,
    pos: u64,
}

impl<S: Seekable> RangeStream<S> {
    /// Wraps `inner`, restricting it to `[base, base + len)`. Positions
    /// `inner`'s cursor at the start of the window.
    pub fn new(mut inner: S, base: u64, len: u64) -> Result<Self> {
        inner.seek(base)?;
        Ok(RangeStream {
            inner,
            base,
            len,
            pos: 0,
        })
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Input + Seekable> Input for RangeStream<S> {
    fn read(&mut self, out: &mut [u8]) -> Result<usize> {
        let remaining = (self.len - self.pos) as usize;
        let want = out.len().min(remaining);
        let n = self.inner.read(&mut out[..want])?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<S: Output + Seekable> Output for RangeStream<S> {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let remaining = (self.len - self.pos) as usize;
        if remaining == 0 && !data.is_empty() {
            return Ok(0);
        }
        let want = data.len().min(remaining);
        let n = self.inner.write(&data[..want])?;
        self.pos += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }
}

impl<S: Seekable> Seekable for RangeStream<S> {
    fn tell(&mut self) -> Result<u64> {
        Ok(self.pos)
    }

    fn size(&mut self) -> Result<u64> {
        Ok(self.len)
    }

    fn seek_from(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        let local_base = match whence {
            Whence::Begin => 0i64,
            Whence::Current => self.pos as i64,
            Whence::End => self.len as i64,
        };
        let target = local_base + offset;
        if target < 0 || target as u64 > self.len {
            return Err(end_of_file("RangeStream: seek outside window"));
        }
        let target = target as u64;
        self.inner.seek(self.base + target)?;
        self.pos = target;
        Ok(target)
    }
}

impl<S> RangeStream<S> {
    /// Asserts the window is well-formed relative to the backing stream's
    /// total size, as reported by `total_size`. Callers with a seekable
    /// `S` typically check this at construction via `size()` on `inner`
    /// before wrapping; exposed separately since `new` takes `inner` by
    /// value.
    pub fn check_bounds(base: u64, len: u64, total_size: u64) -> Result<()> {
        if base.checked_add(len).map_or(true, |end| end > total_size) {
            return Err(data_format("RangeStream: window exceeds backing stream size"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::stream::SeekableMemStream;
    use test_log::test;

    #[test]
    fn test_range_stream_reads_window_only() {
        let mut backing = SeekableMemStream::with_capacity(16);
        backing.ensure_write(b"0123456789abcdef").unwrap();
        backing.rewind().unwrap();
        let mut r = RangeStream::new(backing, 4, 4).unwrap();
        let mut out = [0u8; 4];
        r.ensure_read(&mut out).unwrap();
        assert_eq!(&out, b"4567");
        assert_eq!(r.size().unwrap(), 4);
    }

    #[test]
    fn test_range_stream_seek_translates() {
        let mut backing = SeekableMemStream::with_capacity(16);
        backing.ensure_write(b"0123456789abcdef").unwrap();
        backing.rewind().unwrap();
        let mut r = RangeStream::new(backing, 8, 4).unwrap();
        r.seek(2).unwrap();
        let mut out = [0u8; 2];
        r.ensure_read(&mut out).unwrap();
        assert_eq!(&out, b"ab");
    }

    #[test]
    fn test_range_stream_rejects_seek_past_window() {
        let mut backing = SeekableMemStream::with_capacity(16);
        backing.ensure_write(b"0123456789abcdef").unwrap();
        backing.rewind().unwrap();
        let mut r = RangeStream::new(backing, 0, 4).unwrap();
        assert!(r.seek(5).is_err());
    }
}
