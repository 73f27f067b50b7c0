//! Versioning: a type may declare a current version `V`.
//! `save` emits a `VarInt` version tag then the fields for that version;
//! `load` reads the tag `L` and raises `BadVersion` if `L > V`, else calls
//! the user's load with `L`, which may use [`since`] to conditionally read
//! fields added in a later version than the one actually on the wire.

use crate::dataio::{DataIo, DataIoReader, DataIoWriter, Endian, IntPolicy};
use crate::error::bad_version;
use crate::stream::{Input, Output};
use crate::Result;

/// A type with an explicit current version, saved/loaded with a leading
/// version tag so trailing optional fields can be added across releases
/// without breaking readers of older data.
pub trait Versioned: Sized {
    /// The version this build writes. Must only increase across releases.
    const CURRENT_VERSION: u32;

    fn save_body<S: Output, E: Endian, P: IntPolicy>(
        &self,
        w: &mut DataIoWriter<S, E, P>,
    ) -> Result<()>;

    /// Loads the body given the version tag actually read from the wire
    /// (`loaded_version <= Self::CURRENT_VERSION`, already checked by
    /// [`save_versioned`]/[`load_versioned`]).
    fn load_body<S: Input, E: Endian, P: IntPolicy>(
        r: &mut DataIoReader<S, E, P>,
        loaded_version: u32,
    ) -> Result<Self>;
}

pub fn save_versioned<T: Versioned, S: Output, E: Endian, P: IntPolicy>(
    w: &mut DataIoWriter<S, E, P>,
    value: &T,
) -> Result<()> {
    w.write_u32(T::CURRENT_VERSION)?;
    value.save_body(w)
}

pub fn load_versioned<T: Versioned, S: Input, E: Endian, P: IntPolicy>(
    r: &mut DataIoReader<S, E, P>,
) -> Result<T> {
    let loaded_version = r.read_u32()?;
    if loaded_version > T::CURRENT_VERSION {
        return Err(bad_version(format!(
            "version {loaded_version} newer than supported {}",
            T::CURRENT_VERSION
        )));
    }
    T::load_body(r, loaded_version)
}

/// Reads and returns `field_loader()`'s result if `loaded_version >=
/// min_version`, else returns `default`. Lets `load_body` implementations
/// read a field conditionally on the version actually present on the
/// wire.
pub fn since<T>(
    loaded_version: u32,
    min_version: u32,
    default: T,
    field_loader: impl FnOnce() -> Result<T>,
) -> Result<T> {
    if loaded_version >= min_version {
        field_loader()
    } else {
        Ok(default)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dataio::{DataIoReader, DataIoWriter, LittleEndian, VarInt};
    use crate::stream::AutoGrownMemStream;
    use test_log::test;

    #[derive(Debug, PartialEq, Eq)]
    struct Config {
        name: String,
        retries: u32,
        // Added in version 2; absent from version-1 data, defaults to 0.
        timeout_ms: u32,
    }

    impl Versioned for Config {
        const CURRENT_VERSION: u32 = 2;

        fn save_body<S: Output, E: Endian, P: IntPolicy>(
            &self,
            w: &mut DataIoWriter<S, E, P>,
        ) -> Result<()> {
            w.save(&self.name)?;
            w.save(&self.retries)?;
            w.save(&self.timeout_ms)
        }

        fn load_body<S: Input, E: Endian, P: IntPolicy>(
            r: &mut DataIoReader<S, E, P>,
            loaded_version: u32,
        ) -> Result<Self> {
            let name = r.load()?;
            let retries = r.load()?;
            let timeout_ms = since(loaded_version, 2, 0u32, || r.load())?;
            Ok(Config {
                name,
                retries,
                timeout_ms,
            })
        }
    }

    #[test]
    fn test_versioned_roundtrip() {
        let cfg = Config {
            name: "svc".into(),
            retries: 3,
            timeout_ms: 500,
        };
        let mut w: DataIoWriter<_, LittleEndian, VarInt> = DataIoWriter::new(AutoGrownMemStream::new());
        save_versioned(&mut w, &cfg).unwrap();
        let bytes = w.into_inner().into_vec();
        let mut r: DataIoReader<_, LittleEndian, VarInt> =
            DataIoReader::new(AutoGrownMemStream::from(bytes));
        let back: Config = load_versioned(&mut r).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_versioned_rejects_newer_than_supported() {
        let mut w: DataIoWriter<_, LittleEndian, VarInt> = DataIoWriter::new(AutoGrownMemStream::new());
        w.write_u32(99).unwrap(); // bogus future version tag
        let bytes = w.into_inner().into_vec();
        let mut r: DataIoReader<_, LittleEndian, VarInt> =
            DataIoReader::new(AutoGrownMemStream::from(bytes));
        let result: Result<Config> = load_versioned(&mut r);
        assert!(result.is_err());
    }
}
