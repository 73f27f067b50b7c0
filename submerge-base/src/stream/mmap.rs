//! Memory-mapped stream.
//!
//! A common approach elsewhere is an explicit `(file_pos, in_memory_base,
//! in_memory_end)` window that remaps on a seek falling outside it,
//! aligned down to the OS allocation granularity. `memmap2` maps the whole
//! file at once on modern 64-bit targets (virtual address space is cheap),
//! which is the idiomatic simplification here — remapping a sub-window only
//! matters on 32-bit address spaces, which this crate does not target (see
//! DESIGN.md). What's kept from the lifecycle contract: opening
//! sizes/truncates the file up front, and closing flushes any write region
//! and aggregates I/O errors into one `Error` carrying the file path.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use memmap2::{MmapMut, MmapOptions};

use super::{Input, Output, Seekable, Whence, ZeroCopyRead, ZeroCopyWrite};
use crate::error::{open_file, out_of_space};
use crate::Result;

pub struct MmapStream {
    map: MmapMut,
    len: usize,
    pos: usize,
    path: PathBuf,
}

impl MmapStream {
    /// Opens `path`, truncating/extending it to exactly `size` bytes, and
    /// maps the whole file read-write.
    pub fn open_sized(path: impl AsRef<Path>, size: u64) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .map_err(|e| open_file(format!("{}: {e}", path.display())))?;
        file.set_len(size)
            .map_err(|e| open_file(format!("{}: set_len: {e}", path.display())))?;
        let map = unsafe {
            MmapOptions::new()
                .map_mut(&file)
                .map_err(|e| open_file(format!("{}: mmap: {e}", path.display())))?
        };
        Ok(MmapStream {
            map,
            len: size as usize,
            pos: 0,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.map[..self.len]
    }

    /// Flushes dirty pages to disk. `flush` surfaces
    /// the one error `memmap2` can raise at this layer, and `Drop` best-
    /// effort unmaps (mmap's `Drop` impl does not raise; destructors here
    /// must not raise either).
    pub fn sync(&mut self) -> Result<()> {
        self.map
            .flush()
            .map_err(|e| out_of_space(format!("{}: msync: {e}", self.path.display())))
    }
}

impl Input for MmapStream {
    fn read(&mut self, out: &mut [u8]) -> Result<usize> {
        let avail = self.len - self.pos;
        let n = out.len().min(avail);
        out[..n].copy_from_slice(&self.map[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Output for MmapStream {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        if self.pos >= self.len {
            return Ok(0);
        }
        let n = data.len().min(self.len - self.pos);
        self.map[self.pos..self.pos + n].copy_from_slice(&data[..n]);
        self.pos += n;
        Ok(n)
    }

    fn flush(&mut self) -> Result<()> {
        self.sync()
    }
}

impl Seekable for MmapStream {
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
        if new_pos < 0 || new_pos as usize > self.len {
            return Err(out_of_space("seek outside mapped window"));
        }
        // A "remap" here is a no-op because the whole file is always
        // mapped; repositioning is purely a matter of updating `pos`.
        self.pos = new_pos as usize;
        Ok(self.pos as u64)
    }
}

impl ZeroCopyRead for MmapStream {
    fn zc_read(&mut self, len: usize) -> Result<&[u8]> {
        let n = len.min(self.len - self.pos);
        Ok(&self.map[self.pos..self.pos + n])
    }

    fn zc_advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.len);
    }
}

impl ZeroCopyWrite for MmapStream {
    fn zc_write(&mut self, len: usize) -> Result<&mut [u8]> {
        let n = len.min(self.len.saturating_sub(self.pos));
        Ok(&mut self.map[self.pos..self.pos + n])
    }

    fn zc_advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.len);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn test_mmap_roundtrip() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("submerge-base-test-mmap-{}.bin", std::process::id()));
        {
            let mut m = MmapStream::open_sized(&path, 16).unwrap();
            m.ensure_write(b"0123456789abcdef").unwrap();
            m.sync().unwrap();
        }
        {
            let mut m = MmapStream::open_sized(&path, 16).unwrap();
            let mut out = [0u8; 16];
            m.ensure_read(&mut out).unwrap();
            assert_eq!(&out, b"0123456789abcdef");
        }
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_mmap_zero_copy_window() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("submerge-base-test-mmap-zc-{}.bin", std::process::id()));
        let mut m = MmapStream::open_sized(&path, 8).unwrap();
        {
            let w = m.zc_write(8).unwrap();
            w.copy_from_slice(b"abcdefgh");
        }
        m.zc_advance(8);
        assert_eq!(m.as_slice(), b"abcdefgh");
        std::fs::remove_file(&path).unwrap();
    }
}
