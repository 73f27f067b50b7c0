//! Buffered stream wrapper: overlays a fixed-capacity
//! read or write buffer on any underlying stream and exposes the buffered
//! bytes as a raw slice so the varint fast path can decode
//! without a virtual call per byte. Five variants: read-only, write-only,
//! seekable-read-only, seekable-write-only,
//! seekable read-write (with a dirty bit and a "prefetched" flag
//! distinguishing a read-primed buffer, where the underlying stream
//! position trails the buffer's end, from a write-primed one, where it
//! leads the buffer's start).

use super::{Input, Output, Seekable, Whence};
use crate::error::out_of_space;
use crate::Result;

const DEFAULT_CAPACITY: usize = 64 * 1024;

/// Trait the varint fast path (and any other hot-path caller) uses to peek
/// directly at buffered bytes without going through [`Input::read`].
pub trait BufferedRead {
    /// Bytes currently buffered and not yet consumed.
    fn buffered(&self) -> &[u8];
    /// Consume `n` buffered bytes (`n <= self.buffered().len()`).
    fn consume(&mut self, n: usize);
    /// Ensure at least `want` bytes are buffered (short of EOF), refilling
    /// from the underlying stream if necessary.
    fn fill(&mut self, want: usize) -> Result<()>;
}

pub trait BufferedWrite {
    /// Remaining writable capacity in the buffer before a flush is needed.
    fn writable_capacity(&self) -> usize;
    /// A mutable window of up to `want` writable bytes, growing/flushing
    /// the buffer first if it's currently full.
    fn writable(&mut self, want: usize) -> Result<&mut [u8]>;
    /// Mark `n` bytes (from the start of the last [`Self::writable`]
    /// window) as logically written.
    fn advance(&mut self, n: usize);
}

/// Read-only buffered wrapper over any [`Input`].
pub struct BufferedReader<S> {
    inner: S,
    buf: Vec<u8>,
    start: usize,
    end: usize,
}

impl<S: Input> BufferedReader<S> {
    pub fn new(inner: S) -> Self {
        Self::with_capacity(inner, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(inner: S, capacity: usize) -> Self {
        BufferedReader {
            inner,
            buf: vec![0u8; capacity],
            start: 0,
            end: 0,
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn refill(&mut self) -> Result<usize> {
        if self.start > 0 {
            self.buf.copy_within(self.start..self.end, 0);
            self.end -= self.start;
            self.start = 0;
        }
        if self.end == self.buf.len() {
            return Ok(0);
        }
        let n = self.inner.read(&mut self.buf[self.end..])?;
        self.end += n;
        Ok(n)
    }
}

impl<S: Input> BufferedRead for BufferedReader<S> {
    fn buffered(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    fn consume(&mut self, n: usize) {
        debug_assert!(self.start + n <= self.end);
        self.start += n;
    }

    fn fill(&mut self, want: usize) -> Result<()> {
        while self.end - self.start < want {
            if self.refill()? == 0 {
                break;
            }
        }
        Ok(())
    }
}

impl<S: Input> Input for BufferedReader<S> {
    fn read(&mut self, out: &mut [u8]) -> Result<usize> {
        if self.start == self.end && out.len() >= self.buf.len() {
            // Bypass the buffer entirely for reads at least as large as it.
            return self.inner.read(out);
        }
        if self.start == self.end {
            self.refill()?;
        }
        let n = out.len().min(self.end - self.start);
        out[..n].copy_from_slice(&self.buf[self.start..self.start + n]);
        self.start += n;
        Ok(n)
    }
}

/// Write-only buffered wrapper over any [`Output`].
pub struct BufferedWriter<S> {
    inner: S,
    buf: Vec<u8>,
    len: usize,
}

impl<S: Output> BufferedWriter<S> {
    pub fn new(inner: S) -> Self {
        Self::with_capacity(inner, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(inner: S, capacity: usize) -> Self {
        BufferedWriter {
            inner,
            buf: vec![0u8; capacity],
            len: 0,
        }
    }

    pub fn into_inner(mut self) -> Result<S> {
        self.flush_buffer()?;
        Ok(self.inner)
    }

    fn flush_buffer(&mut self) -> Result<()> {
        if self.len > 0 {
            self.inner.ensure_write(&self.buf[..self.len])?;
            self.len = 0;
        }
        Ok(())
    }
}

impl<S: Output> BufferedWrite for BufferedWriter<S> {
    fn writable_capacity(&self) -> usize {
        self.buf.len() - self.len
    }

    fn writable(&mut self, want: usize) -> Result<&mut [u8]> {
        if self.buf.len() - self.len < want {
            self.flush_buffer()?;
        }
        if self.buf.len() < want {
            self.buf.resize(want, 0);
        }
        Ok(&mut self.buf[self.len..])
    }

    fn advance(&mut self, n: usize) {
        debug_assert!(self.len + n <= self.buf.len());
        self.len += n;
    }
}

impl<S: Output> Output for BufferedWriter<S> {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        if data.len() >= self.buf.len() {
            self.flush_buffer()?;
            return self.inner.write(data);
        }
        if self.buf.len() - self.len < data.len() {
            self.flush_buffer()?;
        }
        self.buf[self.len..self.len + data.len()].copy_from_slice(data);
        self.len += data.len();
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<()> {
        self.flush_buffer()?;
        self.inner.flush()
    }
}

impl<S: Output> Drop for BufferedWriter<S> {
    fn drop(&mut self) {
        // Destructors must not raise; a failed final flush is logged (via
        // the error constructor's `tracing::error!`) and swallowed rather
        // than propagated.
        let _ = self.flush_buffer();
    }
}

/// Seekable read-only buffered wrapper. Unlike [`BufferedReader`] this
/// tracks `base`, the underlying stream position corresponding to
/// `buf[0]`, so a seek landing inside `[base, base + end)` can reposition
/// the buffer pointer with no underlying I/O.
pub struct SeekableBufferedReader<S> {
    inner: S,
    buf: Vec<u8>,
    start: usize,
    end: usize,
    base: u64,
}

impl<S: Input + Seekable> SeekableBufferedReader<S> {
    pub fn new(inner: S) -> Self {
        Self::with_capacity(inner, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(inner: S, capacity: usize) -> Self {
        SeekableBufferedReader {
            inner,
            buf: vec![0u8; capacity],
            start: 0,
            end: 0,
            base: 0,
        }
    }
}

impl<S: Input + Seekable> BufferedRead for SeekableBufferedReader<S> {
    fn buffered(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    fn consume(&mut self, n: usize) {
        debug_assert!(self.start + n <= self.end);
        self.start += n;
    }

    fn fill(&mut self, want: usize) -> Result<()> {
        while self.end - self.start < want {
            if self.start > 0 {
                self.base += self.start as u64;
                self.buf.copy_within(self.start..self.end, 0);
                self.end -= self.start;
                self.start = 0;
            }
            if self.end == self.buf.len() {
                break;
            }
            let n = self.inner.read(&mut self.buf[self.end..])?;
            if n == 0 {
                break;
            }
            self.end += n;
        }
        Ok(())
    }
}

impl<S: Input + Seekable> Input for SeekableBufferedReader<S> {
    fn read(&mut self, out: &mut [u8]) -> Result<usize> {
        if self.start == self.end {
            self.base += self.end as u64;
            self.start = 0;
            self.end = 0;
            if out.len() >= self.buf.len() {
                return self.inner.read(out);
            }
            let n = self.inner.read(&mut self.buf)?;
            self.end = n;
        }
        let n = out.len().min(self.end - self.start);
        out[..n].copy_from_slice(&self.buf[self.start..self.start + n]);
        self.start += n;
        Ok(n)
    }
}

impl<S: Input + Seekable> Seekable for SeekableBufferedReader<S> {
    fn tell(&mut self) -> Result<u64> {
        Ok(self.base + self.start as u64)
    }

    fn size(&mut self) -> Result<u64> {
        self.inner.size()
    }

    fn seek_from(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        let cur = self.tell()?;
        let base_off = match whence {
            Whence::Begin => 0i64,
            Whence::Current => cur as i64,
            Whence::End => self.size()? as i64,
        };
        let target = base_off + offset;
        if target < 0 {
            return Err(out_of_space("seek to negative position"));
        }
        let target = target as u64;
        let buf_lo = self.base;
        let buf_hi = self.base + self.end as u64;
        if target >= buf_lo && target <= buf_hi {
            self.start = (target - buf_lo) as usize;
            return Ok(target);
        }
        let new_pos = self.inner.seek(target)?;
        self.start = 0;
        self.end = 0;
        self.base = new_pos;
        Ok(new_pos)
    }
}

/// Seekable write-only buffered wrapper.
pub struct SeekableBufferedWriter<S> {
    inner: BufferedWriter<S>,
    stream_pos: u64,
}

impl<S: Output + Seekable> SeekableBufferedWriter<S> {
    pub fn new(inner: S) -> Self {
        SeekableBufferedWriter {
            inner: BufferedWriter::new(inner),
            stream_pos: 0,
        }
    }
}

impl<S: Output + Seekable> BufferedWrite for SeekableBufferedWriter<S> {
    fn writable_capacity(&self) -> usize {
        self.inner.writable_capacity()
    }
    fn writable(&mut self, want: usize) -> Result<&mut [u8]> {
        self.inner.writable(want)
    }
    fn advance(&mut self, n: usize) {
        self.inner.advance(n);
        self.stream_pos += n as u64;
    }
}

impl<S: Output + Seekable> Output for SeekableBufferedWriter<S> {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let n = self.inner.write(data)?;
        self.stream_pos += n as u64;
        Ok(n)
    }
    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }
}

impl<S: Output + Seekable> Seekable for SeekableBufferedWriter<S> {
    fn tell(&mut self) -> Result<u64> {
        Ok(self.stream_pos)
    }

    fn size(&mut self) -> Result<u64> {
        // The backing stream's own length doesn't yet include bytes still
        // sitting in the write buffer; flush first so the logical length
        // (spec.md §8's `seek(0, end); tell() = size()` invariant) is
        // accurate even before the next flush or seek would do it anyway.
        self.inner.flush_buffer()?;
        self.inner.inner.size()
    }

    fn seek_from(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        self.inner.flush_buffer()?;
        let cur = self.stream_pos as i64;
        let base = match whence {
            Whence::Begin => 0i64,
            Whence::Current => cur,
            Whence::End => self.inner.inner.size()? as i64,
        };
        let new_pos = self.inner.inner.seek_from(base + offset, Whence::Begin)?;
        self.stream_pos = new_pos;
        Ok(new_pos)
    }
}

/// Combined seekable read-write buffered wrapper: a single buffer that is
/// either read-primed (prefetched, `stream_pos` = buffer end) or
/// write-primed (`stream_pos` = buffer start); switching direction flushes
/// a dirty write buffer and invalidates a read buffer.
pub struct SeekableBufferedReadWrite<S> {
    inner: S,
    buf: Vec<u8>,
    start: usize,
    end: usize,
    stream_pos: u64,
    prefetched: bool,
    dirty: bool,
}

impl<S: Input + Output + Seekable> SeekableBufferedReadWrite<S> {
    pub fn new(inner: S) -> Self {
        Self::with_capacity(inner, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(inner: S, capacity: usize) -> Self {
        SeekableBufferedReadWrite {
            inner,
            buf: vec![0u8; capacity],
            start: 0,
            end: 0,
            stream_pos: 0,
            prefetched: false,
            dirty: false,
        }
    }

    fn invalidate(&mut self) -> Result<()> {
        if self.dirty {
            self.flush_dirty()?;
        }
        self.start = 0;
        self.end = 0;
        Ok(())
    }

    fn flush_dirty(&mut self) -> Result<()> {
        if self.dirty {
            self.inner.ensure_write(&self.buf[..self.end])?;
            self.stream_pos += self.end as u64;
            self.start = 0;
            self.end = 0;
            self.dirty = false;
        }
        Ok(())
    }

    fn switch_to_read(&mut self) -> Result<()> {
        if self.dirty {
            self.flush_dirty()?;
        }
        if !self.prefetched {
            self.start = 0;
            self.end = 0;
            self.prefetched = true;
        }
        Ok(())
    }

    fn switch_to_write(&mut self) -> Result<()> {
        if self.prefetched {
            // Reposition the underlying stream to the logical read cursor
            // before switching to write-primed buffering.
            let logical = self.stream_pos - (self.end - self.start) as u64;
            self.inner.seek(logical)?;
            self.stream_pos = logical;
            self.start = 0;
            self.end = 0;
            self.prefetched = false;
        }
        Ok(())
    }

    fn buffer_base(&self) -> u64 {
        if self.prefetched {
            self.stream_pos - self.end as u64
        } else {
            self.stream_pos
        }
    }
}

impl<S: Input + Output + Seekable> BufferedRead for SeekableBufferedReadWrite<S> {
    fn buffered(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    fn consume(&mut self, n: usize) {
        debug_assert!(self.start + n <= self.end);
        self.start += n;
    }

    fn fill(&mut self, want: usize) -> Result<()> {
        self.switch_to_read()?;
        while self.end - self.start < want {
            if self.start > 0 {
                self.buf.copy_within(self.start..self.end, 0);
                self.end -= self.start;
                self.start = 0;
            }
            if self.end == self.buf.len() {
                break;
            }
            let n = self.inner.read(&mut self.buf[self.end..])?;
            if n == 0 {
                break;
            }
            self.end += n;
            self.stream_pos += n as u64;
        }
        Ok(())
    }
}

impl<S: Input + Output + Seekable> Input for SeekableBufferedReadWrite<S> {
    fn read(&mut self, out: &mut [u8]) -> Result<usize> {
        self.switch_to_read()?;
        if self.start == self.end {
            if self.start > 0 {
                self.start = 0;
                self.end = 0;
            }
            let n = self.inner.read(&mut self.buf)?;
            self.end = n;
            self.stream_pos += n as u64;
        }
        let n = out.len().min(self.end - self.start);
        out[..n].copy_from_slice(&self.buf[self.start..self.start + n]);
        self.start += n;
        Ok(n)
    }
}

impl<S: Input + Output + Seekable> BufferedWrite for SeekableBufferedReadWrite<S> {
    fn writable_capacity(&self) -> usize {
        self.buf.len() - self.end
    }

    fn writable(&mut self, want: usize) -> Result<&mut [u8]> {
        self.switch_to_write()?;
        if self.buf.len() - self.end < want {
            self.flush_dirty()?;
        }
        if self.buf.len() < want {
            self.buf.resize(want, 0);
        }
        Ok(&mut self.buf[self.end..])
    }

    fn advance(&mut self, n: usize) {
        self.end += n;
        self.dirty = true;
    }
}

impl<S: Input + Output + Seekable> Output for SeekableBufferedReadWrite<S> {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.switch_to_write()?;
        if self.buf.len() - self.end < data.len() {
            self.flush_dirty()?;
        }
        if data.len() > self.buf.len() {
            self.inner.ensure_write(data)?;
            self.stream_pos += data.len() as u64;
            return Ok(data.len());
        }
        self.buf[self.end..self.end + data.len()].copy_from_slice(data);
        self.end += data.len();
        self.dirty = true;
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<()> {
        self.flush_dirty()?;
        self.inner.flush()
    }
}

impl<S: Input + Output + Seekable> Seekable for SeekableBufferedReadWrite<S> {
    fn tell(&mut self) -> Result<u64> {
        if self.prefetched {
            Ok(self.buffer_base() + self.start as u64)
        } else {
            Ok(self.stream_pos + self.end as u64)
        }
    }

    fn size(&mut self) -> Result<u64> {
        // As with `SeekableBufferedWriter::size`, a dirty write buffer holds
        // bytes the backing stream doesn't know about yet; flush them first
        // so the logical length is correct before the next flush or seek.
        if self.dirty {
            self.flush_dirty()?;
        }
        self.inner.size()
    }

    fn seek_from(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        let cur = self.tell()?;
        let base = match whence {
            Whence::Begin => 0i64,
            Whence::Current => cur as i64,
            Whence::End => self.size()? as i64,
        };
        let target = base + offset;
        if target < 0 {
            return Err(out_of_space("seek to negative position"));
        }
        let target = target as u64;
        if self.prefetched {
            let buf_base = self.buffer_base();
            let buf_end = self.stream_pos;
            if target >= buf_base && target <= buf_end {
                self.start = (target - buf_base) as usize;
                return Ok(target);
            }
        }
        self.invalidate()?;
        let new_pos = self.inner.seek(target)?;
        self.stream_pos = new_pos;
        self.prefetched = false;
        Ok(new_pos)
    }
}

impl<S: Input + Output + Seekable> Drop for SeekableBufferedReadWrite<S> {
    fn drop(&mut self) {
        let _ = self.flush_dirty();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::stream::SeekableMemStream;
    use test_log::test;

    #[test]
    fn test_buffered_reader_fill_and_peek() {
        let mut backing = SeekableMemStream::with_capacity(16);
        backing.ensure_write(b"abcdefgh").unwrap();
        backing.rewind().unwrap();
        let mut r = BufferedReader::with_capacity(backing, 4);
        r.fill(3).unwrap();
        assert_eq!(r.buffered(), b"abcd");
        r.consume(3);
        assert_eq!(r.buffered(), b"d");
    }

    #[test]
    fn test_buffered_writer_flushes_on_overflow() {
        let backing = SeekableMemStream::with_capacity(32);
        let mut w = BufferedWriter::with_capacity(backing, 4);
        w.ensure_write(b"abcdefgh").unwrap();
        let backing = w.into_inner().unwrap();
        assert_eq!(backing.as_slice(), b"abcdefgh");
    }

    #[test]
    fn test_seekable_buffered_reader_seek_within_buffer_no_io() {
        let mut backing = SeekableMemStream::with_capacity(16);
        backing.ensure_write(b"0123456789").unwrap();
        backing.rewind().unwrap();
        let mut r = SeekableBufferedReader::new(backing);
        let mut out = [0u8; 4];
        r.ensure_read(&mut out).unwrap();
        assert_eq!(&out, b"0123");
        r.seek(1).unwrap();
        let mut out2 = [0u8; 2];
        r.ensure_read(&mut out2).unwrap();
        assert_eq!(&out2, b"12");
    }

    #[test]
    fn test_seekable_buffered_writer_size_includes_unflushed() {
        let backing = SeekableMemStream::with_capacity(64);
        let mut w = SeekableBufferedWriter::new(backing);
        w.write(b"hello").unwrap();
        assert_eq!(w.size().unwrap(), 5);
    }

    #[test]
    fn test_seekable_buffered_readwrite_size_includes_unflushed() {
        let backing = SeekableMemStream::with_capacity(64);
        let mut rw = SeekableBufferedReadWrite::new(backing);
        rw.write(b"hello").unwrap();
        assert_eq!(rw.size().unwrap(), 5);
    }

    #[test]
    fn test_seekable_buffered_readwrite_roundtrip() {
        let backing = SeekableMemStream::with_capacity(64);
        let mut rw = SeekableBufferedReadWrite::new(backing);
        rw.ensure_write(b"hello world").unwrap();
        rw.seek(0).unwrap();
        let mut out = [0u8; 5];
        rw.ensure_read(&mut out).unwrap();
        assert_eq!(&out, b"hello");
    }

    #[test]
    fn test_seekable_buffered_readwrite_seek_is_noop_on_tell() {
        let backing = SeekableMemStream::with_capacity(64);
        let mut rw = SeekableBufferedReadWrite::new(backing);
        rw.ensure_write(b"0123456789").unwrap();
        let t = rw.tell().unwrap();
        rw.seek(t).unwrap();
        assert_eq!(rw.tell().unwrap(), t);
    }
}
