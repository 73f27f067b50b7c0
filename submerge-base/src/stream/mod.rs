//! Layered stream I/O abstraction: three role traits —
//! input, output, seekable — composed independently by each concrete
//! backend, plus a buffered wrapper that overlays any of them and exposes
//! its raw buffer to the varint fast path.
//!
//! Unlike leaning on `std::io::{Read, Write, Seek}` directly, these roles
//! carry a specific `ensure_read`/`ensure_write` contract (fail loudly on
//! a short read/write rather than silently returning a partial count) and
//! report through the `submerge_base::Error` taxonomy, so callers get a
//! uniform, typed failure mode across every backend below.

mod bzip;
mod buffered;
mod file;
mod gzip;
mod hex;
mod mem;
mod mmap;
mod range;

pub use bzip::{Bzip2Reader, Bzip2Writer};
pub use buffered::{
    BufferedRead, BufferedReadWrite, BufferedReader, BufferedWrite, BufferedWriter,
    SeekableBufferedReader, SeekableBufferedReadWrite, SeekableBufferedWriter,
};
pub use file::FileStream;
pub use gzip::{GzipReader, GzipWriter};
pub use hex::HexEncodeWriter;
pub use mem::{AutoGrownMemStream, MemStream, SeekableMemStream};
pub use mmap::MmapStream;
pub use range::RangeStream;

use crate::error::{end_of_file, out_of_space};
use crate::Result;

/// Where a [`Seekable::seek_from`] offset is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    Begin,
    Current,
    End,
}

/// A byte source. `read` mirrors `std::io::Read::read` (a short read is not
/// an error); `ensure_read` is the all-or-nothing variant, raising
/// `EndOfFile` if the stream runs dry before `buf` is full.
pub trait Input {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    fn ensure_read(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read(&mut buf[filled..])?;
            if n == 0 {
                return Err(end_of_file(format!(
                    "ensure_read: wanted {} bytes, got {}",
                    buf.len(),
                    filled
                )));
            }
            filled += n;
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut b = [0u8; 1];
        self.ensure_read(&mut b)?;
        Ok(b[0])
    }

    fn eof(&mut self) -> bool {
        let mut probe = [0u8; 1];
        match self.read(&mut probe) {
            Ok(0) => true,
            Ok(_) => false,
            Err(_) => true,
        }
    }
}

/// A byte sink. `ensure_write` raises `OutOfSpace` on a short write, the
/// output-side mirror of `ensure_read`'s `EndOfFile`.
pub trait Output {
    fn write(&mut self, buf: &[u8]) -> Result<usize>;
    fn flush(&mut self) -> Result<()>;

    fn ensure_write(&mut self, buf: &[u8]) -> Result<()> {
        let mut written = 0;
        while written < buf.len() {
            let n = self.write(&buf[written..])?;
            if n == 0 {
                return Err(out_of_space(format!(
                    "ensure_write: wanted {} bytes, wrote {}",
                    buf.len(),
                    written
                )));
            }
            written += n;
        }
        Ok(())
    }

    fn write_byte(&mut self, b: u8) -> Result<()> {
        self.ensure_write(&[b])
    }
}

/// Arbitrary absolute/relative/end-relative positioning, `tell`, `size`.
pub trait Seekable {
    fn tell(&mut self) -> Result<u64>;
    fn size(&mut self) -> Result<u64>;
    fn seek_from(&mut self, offset: i64, whence: Whence) -> Result<u64>;

    fn seek(&mut self, pos: u64) -> Result<u64> {
        self.seek_from(pos as i64, Whence::Begin)
    }

    fn rewind(&mut self) -> Result<()> {
        self.seek(0).map(|_| ())
    }
}

/// Zero-copy read: hand the caller a pointer into the stream's own backing
/// memory rather than copying into a caller buffer, grounded on
/// `original_source/terark-base/.../ZeroCopy.hpp`. Only implementable by
/// streams whose backing memory is stable across the call — mem and mmap
/// streams, never the gzip/bzip2 streams.
pub trait ZeroCopyRead {
    /// Returns a window of up to `len` bytes starting at the current
    /// position, without advancing it. The caller must call
    /// [`Self::zc_advance`] to consume what it used.
    fn zc_read(&mut self, len: usize) -> Result<&[u8]>;
    fn zc_advance(&mut self, n: usize);
}

pub trait ZeroCopyWrite {
    /// Returns a writable window of up to `len` bytes starting at the
    /// current position, without advancing it.
    fn zc_write(&mut self, len: usize) -> Result<&mut [u8]>;
    fn zc_advance(&mut self, n: usize);
}
