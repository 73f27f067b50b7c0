//! Gzip stream: wraps `flate2`'s compressor state.
//! Input-only or output-only, never both — a compressed stream can't be
//! seeked or read back through the same handle that's writing it.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use super::{Input, Output};
use crate::Result;

pub struct GzipReader<R: std::io::Read> {
    inner: GzDecoder<R>,
}

impl<R: std::io::Read> GzipReader<R> {
    pub fn new(inner: R) -> Self {
        GzipReader {
            inner: GzDecoder::new(inner),
        }
    }
}

impl<R: std::io::Read> Input for GzipReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(std::io::Read::read(&mut self.inner, buf)?)
    }
}

pub struct GzipWriter<W: std::io::Write> {
    inner: GzEncoder<W>,
}

impl<W: std::io::Write> GzipWriter<W> {
    pub fn new(inner: W) -> Self {
        GzipWriter {
            inner: GzEncoder::new(inner, Compression::default()),
        }
    }

    pub fn with_level(inner: W, level: u32) -> Self {
        GzipWriter {
            inner: GzEncoder::new(inner, Compression::new(level)),
        }
    }

    /// Flushes and finalises the gzip trailer, returning the underlying
    /// sink. Must be called (or the writer dropped, which best-effort
    /// finishes and swallows errors) before the compressed
    /// bytes are valid to read back.
    pub fn finish(self) -> Result<W> {
        Ok(self.inner.finish()?)
    }
}

impl<W: std::io::Write> Output for GzipWriter<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        Ok(std::io::Write::write(&mut self.inner, buf)?)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(std::io::Write::flush(&mut self.inner)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn test_gzip_roundtrip() {
        let payload = b"hello gzip world, hello gzip world";
        let mut w = GzipWriter::new(Vec::new());
        w.ensure_write(payload).unwrap();
        let compressed = w.finish().unwrap();

        let mut r = GzipReader::new(&compressed[..]);
        let mut out = vec![0u8; payload.len()];
        r.ensure_read(&mut out).unwrap();
        assert_eq!(&out, payload);
    }
}
