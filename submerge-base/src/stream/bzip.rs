//! Bzip2 stream, the `bzip2` crate's mirror of
//! [`super::gzip`]. Same input-xor-output role split.

use bzip2::read::BzDecoder;
use bzip2::write::BzEncoder;
use bzip2::Compression;

use super::{Input, Output};
use crate::Result;

pub struct Bzip2Reader<R: std::io::Read> {
    inner: BzDecoder<R>,
}

impl<R: std::io::Read> Bzip2Reader<R> {
    pub fn new(inner: R) -> Self {
        Bzip2Reader {
            inner: BzDecoder::new(inner),
        }
    }
}

impl<R: std::io::Read> Input for Bzip2Reader<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(std::io::Read::read(&mut self.inner, buf)?)
    }
}

pub struct Bzip2Writer<W: std::io::Write> {
    inner: BzEncoder<W>,
}

impl<W: std::io::Write> Bzip2Writer<W> {
    pub fn new(inner: W) -> Self {
        Bzip2Writer {
            inner: BzEncoder::new(inner, Compression::default()),
        }
    }

    pub fn finish(self) -> Result<W> {
        Ok(self.inner.finish()?)
    }
}

impl<W: std::io::Write> Output for Bzip2Writer<W> {
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
    fn test_bzip2_roundtrip() {
        let payload = b"hello bzip2 world, hello bzip2 world";
        let mut w = Bzip2Writer::new(Vec::new());
        w.ensure_write(payload).unwrap();
        let compressed = w.finish().unwrap();

        let mut r = Bzip2Reader::new(&compressed[..]);
        let mut out = vec![0u8; payload.len()];
        r.ensure_read(&mut out).unwrap();
        assert_eq!(&out, payload);
    }
}
