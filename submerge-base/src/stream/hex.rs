//! Hex-encoding output wrapper, grounded on `original_source/
//! terark-base/src/terark/io/HexCodingStream.hpp`/`.cpp`: hex-encodes
//! every byte written before forwarding it to an underlying stream. Handy
//! for debugging dumps of otherwise-binary records. Output-only.

use super::Output;
use crate::Result;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

pub struct HexEncodeWriter<W> {
    inner: W,
}

impl<W: Output> HexEncodeWriter<W> {
    pub fn new(inner: W) -> Self {
        HexEncodeWriter { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Output> Output for HexEncodeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let mut encoded = Vec::with_capacity(buf.len() * 2);
        for &b in buf {
            encoded.push(HEX_DIGITS[(b >> 4) as usize]);
            encoded.push(HEX_DIGITS[(b & 0xf) as usize]);
        }
        self.inner.ensure_write(&encoded)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }
}
