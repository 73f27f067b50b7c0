//! Minimal illustrative consumer of `submerge-base`: a small file format
//! (4-byte magic, one endianness tag byte, then a versioned DataIO record)
//! and the `dump` inspection routine the `submerge` binary exposes as
//! `submerge dump <path>`.

use std::path::{Path, PathBuf};

use submerge_base::dataio::{
    load_versioned, save_versioned, BigEndian, DataIoReader, DataIoWriter, LittleEndian,
    VarInt, Versioned,
};
use submerge_base::stream::{BufferedReader, BufferedWriter, FileStream, Input, Output, Seekable};
use submerge_base::{data_format, Result};

const MAGIC: &[u8; 4] = b"SMRG";

/// The record every `.smrg` file carries after the magic/endian prefix.
/// `CURRENT_VERSION` bumps whenever a field is added; older files still
/// load via `Versioned::load_body`'s version-gated reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub label: String,
    pub record_count: u64,
}

impl Versioned for Header {
    const CURRENT_VERSION: u32 = 1;

    fn save_body<S: Output, E: submerge_base::dataio::Endian, P: submerge_base::dataio::IntPolicy>(
        &self,
        w: &mut DataIoWriter<S, E, P>,
    ) -> Result<()> {
        w.save(&self.label)?;
        w.save(&self.record_count)
    }

    fn load_body<S: Input, E: submerge_base::dataio::Endian, P: submerge_base::dataio::IntPolicy>(
        r: &mut DataIoReader<S, E, P>,
        _loaded_version: u32,
    ) -> Result<Self> {
        let label = r.load()?;
        let record_count = r.load()?;
        Ok(Header { label, record_count })
    }
}

/// Writes a `.smrg` file: magic, a little-endian tag byte, then `header` as
/// a versioned var-int DataIO record.
pub fn write_file(path: impl AsRef<Path>, header: &Header) -> Result<()> {
    let file = FileStream::create_write(path)?;
    let mut buffered = BufferedWriter::new(file);
    buffered.ensure_write(MAGIC)?;
    buffered.ensure_write(&[0u8])?; // 0 = little-endian, 1 = big-endian
    let mut w: DataIoWriter<_, LittleEndian, VarInt> = DataIoWriter::new(buffered);
    save_versioned(&mut w, header)?;
    w.flush()?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub endian: &'static str,
    pub version: u32,
    pub header: Header,
}

/// Opens `path`, validates the magic, and loads its versioned header,
/// inferring endianness from the file's own tag byte rather than assuming
/// the host's.
pub fn inspect(path: impl AsRef<Path>) -> Result<FileSummary> {
    let path = path.as_ref().to_path_buf();
    let mut file = FileStream::open_read(&path)?;
    let size_bytes = file.size()?;
    let mut buffered = BufferedReader::new(file);

    let mut magic = [0u8; 4];
    buffered.ensure_read(&mut magic)?;
    if &magic != MAGIC {
        return Err(data_format(format!(
            "{}: not a submerge file (bad magic)",
            path.display()
        )));
    }
    let tag = buffered.read_byte()?;

    let (version, header, endian) = match tag {
        0 => {
            let mut r: DataIoReader<_, LittleEndian, VarInt> = DataIoReader::new(buffered);
            let header: Header = load_versioned(&mut r)?;
            (Header::CURRENT_VERSION, header, "little")
        }
        1 => {
            let mut r: DataIoReader<_, BigEndian, VarInt> = DataIoReader::new(buffered);
            let header: Header = load_versioned(&mut r)?;
            (Header::CURRENT_VERSION, header, "big")
        }
        other => {
            return Err(data_format(format!(
                "{}: unknown endianness tag {other}",
                path.display()
            )))
        }
    };

    Ok(FileSummary {
        path,
        size_bytes,
        endian,
        version,
        header,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn test_write_then_inspect_roundtrip() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("submerge-lib-test-{}.smrg", std::process::id()));
        let header = Header {
            label: "demo".to_string(),
            record_count: 7,
        };
        write_file(&path, &header).unwrap();
        let summary = inspect(&path).unwrap();
        assert_eq!(summary.endian, "little");
        assert_eq!(summary.header, header);
        assert!(summary.size_bytes > 4);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_inspect_rejects_bad_magic() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("submerge-lib-test-badmagic-{}.smrg", std::process::id()));
        std::fs::write(&path, b"NOPE0123").unwrap();
        assert!(inspect(&path).is_err());
        std::fs::remove_file(&path).unwrap();
    }
}
