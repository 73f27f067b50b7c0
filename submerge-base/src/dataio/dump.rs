//! Dump-detection: the "trivially dumpable" fast path — a type whose wire
//! form under a matching-endian DataIO equals its in-memory image,
//! letting `memcpy` replace per-field encode/decode.
//!
//! Rust has no compile-time reflection to detect this automatically (a
//! C++ equivalent might use function-overload SFINAE over a recursive
//! size-sum); the fallback here is code generation
//! driven by a field-list macro. [`dataio_dumpable_struct!`] is that macro:
//! given a `#[repr(C)]`, `Copy` struct and its field list in declaration
//! order, it marks the type [`Dumpable`] and implements [`DataIo`] with a
//! single `memcpy` on matching endianness, falling back to ordinary
//! per-field recursive save/load (each field already endian-aware) when
//! the target endianness differs from the host's — the "byte-swap chain"
//! is just the fields' own `DataIo` impls at that point, not a bulk
//! reversal of the whole blob (swapping a multi-field struct's bytes as
//! one unit would scramble field boundaries).

use crate::dataio::{DataIo, DataIoReader, DataIoWriter, Endian, IntPolicy, HOST_LITTLE};
use crate::error::data_format;
use crate::stream::{Input, Output};
use crate::Result;

/// Marker for types whose byte layout matches their matching-endian wire
/// form exactly: `size_of::<T>()` equals the sum of the wire sizes of its
/// fields, with no padding. Unsafe because a wrong impl (e.g. on a type
/// with padding bytes) lets [`save_dumpable`]/[`load_dumpable`] read or
/// write uninitialised padding bytes.
///
/// # Safety
/// Implementors must be `Copy`, `#[repr(C)]` (or otherwise have a defined,
/// padding-free layout), and have no interior pointers/references — the
/// same "plain old data" contract `bytemuck::Pod` states.
pub unsafe trait Dumpable: Copy + 'static {}

macro_rules! impl_dumpable_scalar {
    ($($t:ty),*) => { $(unsafe impl Dumpable for $t {})* };
}
impl_dumpable_scalar!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64, bool);

// Lets a `#[repr(C)]` struct with a fixed-array field of dumpable elements
// (e.g. `[u32; 4]`) still qualify as `Dumpable` as a whole, so
// `dataio_dumpable_struct!` can memcpy the entire struct including that
// field. `DataIo for [T; N]` in `container.rs` never consults this marker —
// a bare array passed to `save`/`load` directly always goes element-by-element.
impl<T: Dumpable, const N: usize> Dumpable for [T; N] {}

/// Fast-path save for a [`Dumpable`] `T` on a matching-endian DataIO: a
/// single `memcpy` of `size_of::<T>()` bytes. Callers needing the
/// mismatched-endian fallback should implement [`DataIo`] directly (see
/// [`dataio_dumpable_struct!`]) rather than calling this unconditionally.
pub fn save_dumpable<T: Dumpable, S: Output, E: Endian, P: IntPolicy>(
    w: &mut DataIoWriter<S, E, P>,
    value: &T,
) -> Result<()> {
    let bytes = unsafe {
        std::slice::from_raw_parts((value as *const T) as *const u8, std::mem::size_of::<T>())
    };
    w.write_bytes(bytes)
}

pub fn load_dumpable<T: Dumpable, S: Input, E: Endian, P: IntPolicy>(
    r: &mut DataIoReader<S, E, P>,
) -> Result<T> {
    let mut buf = vec![0u8; std::mem::size_of::<T>()];
    r.read_bytes(&mut buf)?;
    if buf.len() != std::mem::size_of::<T>() {
        return Err(data_format("dumpable load: short read"));
    }
    // Safety: `T: Dumpable` guarantees a padding-free, `Copy` layout of
    // exactly this size, so the byte buffer is a valid bit pattern for it
    // on a matching-endian DataIO (the only path that calls this directly;
    // see `dataio_dumpable_struct!` for the mismatched-endian fallback).
    Ok(unsafe { std::ptr::read(buf.as_ptr() as *const T) })
}

/// Implements [`Dumpable`] and [`DataIo`] for a plain struct: under
/// [`FixedInt`](crate::dataio::FixedInt) on a matching-endian DataIO, saves/
/// loads via one `memcpy` ([`save_dumpable`]/[`load_dumpable`]); every other
/// combination (mismatched endian, or [`VarInt`](crate::dataio::VarInt)
/// regardless of endian) falls back to per-field `DataIo::dio_save`/
/// `dio_load` calls, in declaration order, each field responsible for its
/// own byte swap or var-encoding.
///
/// The memcpy path is gated on `FixedInt` because it dumps the struct's raw
/// in-memory bytes; `VarInt` fields don't have a fixed in-memory wire size,
/// so a memcpy under `VarInt` would write a different byte sequence (and
/// length) than the per-field path would on the same host, and the two
/// would disagree with each other across hosts of different endianness.
/// Per-field `dio_save`/`dio_load` already reads `P::IS_VAR` itself, so it
/// produces identical `VarInt` bytes no matter which host runs it — dumpable
/// is strictly a `FixedInt`-only optimization.
///
/// ```ignore
/// #[repr(C)]
/// #[derive(Clone, Copy)]
/// struct Point { x: i32, y: i32 }
/// dataio_dumpable_struct!(Point { x: i32, y: i32 });
/// ```
#[macro_export]
macro_rules! dataio_dumpable_struct {
    ($t:ty { $($field:ident : $ft:ty),* $(,)? }) => {
        unsafe impl $crate::dataio::Dumpable for $t {}

        impl $crate::dataio::DataIo for $t {
            fn dio_save<S: $crate::stream::Output, E: $crate::dataio::Endian, P: $crate::dataio::IntPolicy>(
                &self,
                w: &mut $crate::dataio::DataIoWriter<S, E, P>,
            ) -> $crate::Result<()> {
                if !P::IS_VAR && E::LITTLE == $crate::dataio::host_is_little() {
                    $crate::dataio::save_dumpable::<Self, S, E, P>(w, self)
                } else {
                    $( $crate::dataio::DataIo::dio_save(&self.$field, w)?; )*
                    Ok(())
                }
            }

            fn dio_load<S: $crate::stream::Input, E: $crate::dataio::Endian, P: $crate::dataio::IntPolicy>(
                r: &mut $crate::dataio::DataIoReader<S, E, P>,
            ) -> $crate::Result<Self> {
                if !P::IS_VAR && E::LITTLE == $crate::dataio::host_is_little() {
                    $crate::dataio::load_dumpable::<Self, S, E, P>(r)
                } else {
                    Ok(Self { $( $field: $crate::dataio::DataIo::dio_load(r)?, )* })
                }
            }
        }
    };
}

/// Exposed for [`dataio_dumpable_struct!`]'s expansion, which can't see
/// the crate-private `HOST_LITTLE` const directly from a downstream crate.
pub fn host_is_little() -> bool {
    HOST_LITTLE
}
