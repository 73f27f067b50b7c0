//! Container `DataIo` impls: sequences, ordered associative containers,
//! strings, fixed-size arrays, and small tuples. All size-prefixed
//! containers use [`DataIoWriter::write_size`]/[`DataIoReader::read_size`]
//! regardless of the active [`IntPolicy`], keeping the count prefix
//! always-compact.

use std::collections::{BTreeMap, BTreeSet};

use crate::dataio::{DataIo, DataIoReader, DataIoWriter, Endian, IntPolicy};
use crate::error::data_format;
use crate::stream::{Input, Output};
use crate::{ByteVec, IntVec, Result, UintVec};

impl DataIo for String {
    fn dio_save<S: Output, E: Endian, P: IntPolicy>(
        &self,
        w: &mut DataIoWriter<S, E, P>,
    ) -> Result<()> {
        w.write_size(self.len())?;
        w.write_bytes(self.as_bytes())
    }

    fn dio_load<S: Input, E: Endian, P: IntPolicy>(r: &mut DataIoReader<S, E, P>) -> Result<Self> {
        let len = r.read_size()?;
        let mut buf = vec![0u8; len];
        r.read_bytes(&mut buf)?;
        String::from_utf8(buf).map_err(|e| data_format(format!("string is not valid utf-8: {e}")))
    }
}

impl<T: DataIo> DataIo for Vec<T> {
    fn dio_save<S: Output, E: Endian, P: IntPolicy>(
        &self,
        w: &mut DataIoWriter<S, E, P>,
    ) -> Result<()> {
        w.write_size(self.len())?;
        for item in self {
            item.dio_save(w)?;
        }
        Ok(())
    }

    fn dio_load<S: Input, E: Endian, P: IntPolicy>(r: &mut DataIoReader<S, E, P>) -> Result<Self> {
        let len = r.read_size()?;
        let mut out = Vec::with_capacity(len.min(1 << 20));
        for _ in 0..len {
            out.push(T::dio_load(r)?);
        }
        Ok(out)
    }
}

impl<K: DataIo + Ord, V: DataIo> DataIo for BTreeMap<K, V> {
    fn dio_save<S: Output, E: Endian, P: IntPolicy>(
        &self,
        w: &mut DataIoWriter<S, E, P>,
    ) -> Result<()> {
        w.write_size(self.len())?;
        for (k, v) in self {
            k.dio_save(w)?;
            v.dio_save(w)?;
        }
        Ok(())
    }

    fn dio_load<S: Input, E: Endian, P: IntPolicy>(r: &mut DataIoReader<S, E, P>) -> Result<Self> {
        let len = r.read_size()?;
        let mut out = BTreeMap::new();
        for _ in 0..len {
            let k = K::dio_load(r)?;
            let v = V::dio_load(r)?;
            out.insert(k, v);
        }
        Ok(out)
    }
}

impl<T: DataIo + Ord> DataIo for BTreeSet<T> {
    fn dio_save<S: Output, E: Endian, P: IntPolicy>(
        &self,
        w: &mut DataIoWriter<S, E, P>,
    ) -> Result<()> {
        w.write_size(self.len())?;
        for item in self {
            item.dio_save(w)?;
        }
        Ok(())
    }

    fn dio_load<S: Input, E: Endian, P: IntPolicy>(r: &mut DataIoReader<S, E, P>) -> Result<Self> {
        let len = r.read_size()?;
        let mut out = BTreeSet::new();
        for _ in 0..len {
            out.insert(T::dio_load(r)?);
        }
        Ok(out)
    }
}

/// Fixed-size arrays have no size prefix — the count is implied by `N`,
/// grounded on `DataIO_save_nonDumpable` over `T[N]`. Always saves/loads
/// element-by-element through `T::dio_save`/`dio_load`, including when
/// `T` is [`crate::dataio::Dumpable`] (e.g. `[u32; 4]`): there is no
/// memcpy fast path for a bare array passed directly to `save`/`load`,
/// only [`crate::dataio_dumpable_struct!`] gets one, by memcpy-ing the
/// *whole enclosing struct* (array fields included) in one shot. The
/// `Dumpable for [T; N]` marker in [`crate::dataio::dump`] exists only so
/// that blanket memcpy can cover a `#[repr(C)]` struct with an array field;
/// it is never consulted here.
impl<T: DataIo, const N: usize> DataIo for [T; N] {
    fn dio_save<S: Output, E: Endian, P: IntPolicy>(
        &self,
        w: &mut DataIoWriter<S, E, P>,
    ) -> Result<()> {
        for item in self {
            item.dio_save(w)?;
        }
        Ok(())
    }

    fn dio_load<S: Input, E: Endian, P: IntPolicy>(r: &mut DataIoReader<S, E, P>) -> Result<Self> {
        let mut items: Vec<T> = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(T::dio_load(r)?);
        }
        match items.try_into() {
            Ok(arr) => Ok(arr),
            Err(_) => unreachable!("exactly N items were pushed above"),
        }
    }
}

impl DataIo for ByteVec {
    fn dio_save<S: Output, E: Endian, P: IntPolicy>(
        &self,
        w: &mut DataIoWriter<S, E, P>,
    ) -> Result<()> {
        w.write_size(self.len())?;
        w.write_bytes(self.as_slice())
    }

    fn dio_load<S: Input, E: Endian, P: IntPolicy>(r: &mut DataIoReader<S, E, P>) -> Result<Self> {
        let len = r.read_size()?;
        let mut buf = vec![0u8; len];
        r.read_bytes(&mut buf)?;
        Ok(ByteVec::from(buf))
    }
}

/// Bit-packed integer vectors wire through their own persisted layout
/// (count, width, packed array — `UintVec::save_layout`/`load_layout`),
/// prefixed with the layout's byte length so a reader can skip over one
/// without decoding it.
impl DataIo for UintVec {
    fn dio_save<S: Output, E: Endian, P: IntPolicy>(
        &self,
        w: &mut DataIoWriter<S, E, P>,
    ) -> Result<()> {
        let layout = self.save_layout();
        w.write_size(layout.len())?;
        w.write_bytes(&layout)
    }

    fn dio_load<S: Input, E: Endian, P: IntPolicy>(r: &mut DataIoReader<S, E, P>) -> Result<Self> {
        let len = r.read_size()?;
        let mut buf = vec![0u8; len];
        r.read_bytes(&mut buf)?;
        let (vec, consumed) = UintVec::load_layout(&buf)?;
        if consumed != len {
            return Err(data_format("UintVec: trailing bytes after layout"));
        }
        Ok(vec)
    }
}

impl DataIo for IntVec {
    fn dio_save<S: Output, E: Endian, P: IntPolicy>(
        &self,
        w: &mut DataIoWriter<S, E, P>,
    ) -> Result<()> {
        let layout = self.save_layout();
        w.write_size(layout.len())?;
        w.write_bytes(&layout)
    }

    fn dio_load<S: Input, E: Endian, P: IntPolicy>(r: &mut DataIoReader<S, E, P>) -> Result<Self> {
        let len = r.read_size()?;
        let mut buf = vec![0u8; len];
        r.read_bytes(&mut buf)?;
        let (vec, consumed) = IntVec::load_layout(&buf)?;
        if consumed != len {
            return Err(data_format("IntVec: trailing bytes after layout"));
        }
        Ok(vec)
    }
}

macro_rules! impl_dataio_tuple {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: DataIo),+> DataIo for ($($name,)+) {
            fn dio_save<S: Output, E: Endian, P: IntPolicy>(
                &self,
                w: &mut DataIoWriter<S, E, P>,
            ) -> Result<()> {
                $( self.$idx.dio_save(w)?; )+
                Ok(())
            }

            fn dio_load<S: Input, E: Endian, P: IntPolicy>(
                r: &mut DataIoReader<S, E, P>,
            ) -> Result<Self> {
                Ok(( $( $name::dio_load(r)?, )+ ))
            }
        }
    };
}

impl_dataio_tuple!(A: 0, B: 1);
impl_dataio_tuple!(A: 0, B: 1, C: 2);
impl_dataio_tuple!(A: 0, B: 1, C: 2, D: 3);

#[cfg(test)]
mod test {
    use super::*;
    use crate::dataio::{DataIoReader, DataIoWriter, LittleEndian, VarInt};
    use crate::stream::AutoGrownMemStream;
    use test_log::test;

    fn roundtrip<T: DataIo + PartialEq + std::fmt::Debug>(value: T) {
        let mut w: DataIoWriter<_, LittleEndian, VarInt> = DataIoWriter::new(AutoGrownMemStream::new());
        w.save(&value).unwrap();
        let bytes = w.into_inner().into_vec();
        let mut r: DataIoReader<_, LittleEndian, VarInt> =
            DataIoReader::new(AutoGrownMemStream::from(bytes));
        let back: T = r.load().unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_string_roundtrip() {
        roundtrip("hello, world".to_string());
        roundtrip(String::new());
    }

    #[test]
    fn test_vec_roundtrip() {
        roundtrip::<Vec<i32>>(vec![1, -2, 3, i32::MIN, i32::MAX]);
        roundtrip::<Vec<String>>(vec!["a".into(), "bb".into(), "".into()]);
    }

    #[test]
    fn test_btreemap_roundtrip() {
        let mut m = BTreeMap::new();
        m.insert("a".to_string(), 1u32);
        m.insert("b".to_string(), 2u32);
        roundtrip(m);
    }

    #[test]
    fn test_btreeset_roundtrip() {
        let mut s = BTreeSet::new();
        s.insert(3i32);
        s.insert(1i32);
        s.insert(2i32);
        roundtrip(s);
    }

    #[test]
    fn test_fixed_array_roundtrip() {
        roundtrip::<[u32; 4]>([1, 2, 3, 4]);
    }

    #[test]
    fn test_bytevec_roundtrip() {
        roundtrip(ByteVec::from(vec![1, 2, 3, 4, 5]));
        roundtrip(ByteVec::new());
    }

    #[test]
    fn test_uintvec_roundtrip() {
        roundtrip(UintVec::build_from(&[7, 3, 5, 1, 300]).unwrap());
    }

    #[test]
    fn test_intvec_roundtrip() {
        roundtrip(IntVec::build_from(&[-100, -3, 0, 7, 4096]).unwrap());
    }

    #[test]
    fn test_tuple_roundtrip() {
        roundtrip((1i32, "two".to_string()));
        roundtrip((1i32, 2i64, 3u8));
        roundtrip((1u8, 2u16, 3u32, 4u64));
    }
}
