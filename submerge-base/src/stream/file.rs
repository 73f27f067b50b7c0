//! File-backed stream: wraps the platform file handle
//! and implements all three roles directly over `std::fs::File`. A C
//! stdio-style `FileStream` typically peeks into its own buffer for a
//! fast path; this wraps the raw `File` (unbuffered) instead — the
//! fast-path pointer-peeking is provided by [`super::buffered`]
//! overlaying this stream, which is the idiomatic split in a
//! language without a libc stdio buffer to reach into.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::{Input, Output, Seekable, Whence};
use crate::error::open_file;
use crate::Result;

pub struct FileStream {
    file: File,
    path: PathBuf,
}

impl FileStream {
    pub fn open_read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| open_file(format!("{}: {e}", path.display())))?;
        Ok(FileStream { file, path })
    }

    pub fn create_write(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| open_file(format!("{}: {e}", path.display())))?;
        Ok(FileStream { file, path })
    }

    pub fn open_read_write(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .map_err(|e| open_file(format!("{}: {e}", path.display())))?;
        Ok(FileStream { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn try_clone(&self) -> Result<Self> {
        let file = self
            .file
            .try_clone()
            .map_err(|e| open_file(format!("{}: {e}", self.path.display())))?;
        Ok(FileStream {
            file,
            path: self.path.clone(),
        })
    }
}

impl Input for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.file.read(buf)?)
    }
}

impl Output for FileStream {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        Ok(self.file.write(buf)?)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(self.file.flush()?)
    }
}

impl Seekable for FileStream {
    fn tell(&mut self) -> Result<u64> {
        Ok(self.file.stream_position()?)
    }

    fn size(&mut self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn seek_from(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        let from = match whence {
            Whence::Begin => SeekFrom::Start(offset as u64),
            Whence::Current => SeekFrom::Current(offset),
            Whence::End => SeekFrom::End(offset),
        };
        Ok(self.file.seek(from)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn test_file_stream_roundtrip() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("submerge-base-test-{}.bin", std::process::id()));
        {
            let mut w = FileStream::create_write(&path).unwrap();
            w.ensure_write(b"hello file").unwrap();
            w.flush().unwrap();
        }
        {
            let mut r = FileStream::open_read(&path).unwrap();
            let mut out = vec![0u8; 10];
            r.ensure_read(&mut out).unwrap();
            assert_eq!(&out, b"hello file");
            assert_eq!(r.size().unwrap(), 10);
        }
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_file_stream_seek_whence() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("submerge-base-test-seek-{}.bin", std::process::id()));
        let mut s = FileStream::open_read_write(&path).unwrap();
        s.ensure_write(b"0123456789").unwrap();
        s.seek_from(-4, Whence::End).unwrap();
        assert_eq!(s.tell().unwrap(), 6);
        std::fs::remove_file(&path).unwrap();
    }
}
