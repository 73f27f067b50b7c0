//! Variable-length integer codecs.
//!
//! Two families coexist, chosen per-stream by the caller, never mixed
//! within one stream:
//!
//! - **Continuation-bit ("var")**: LEB128-style little-endian 7-bit groups,
//!   high bit set on every byte but the last. 1..5 bytes for 32-bit values,
//!   1..10 bytes for 64-bit.
//! - **Length-prefixed ("30/61")**: the low 2 (32-bit) or 3 (64-bit) bits of
//!   the first byte directly encode `byte_count - 1`; the value occupies the
//!   remaining bits, little-endian across the whole prefix run.
//!
//! Both expose a fast path operating on a raw byte slice with a known
//! sufficient remaining-length, used by `buffered.rs` when the underlying
//! buffer can guarantee the worst-case byte count without a stream call.

use crate::error::data_format;
use crate::Result;

// ---------------------------------------------------------------------
// ZigZag mapping: interleave signed values so
// small-magnitude values of either sign encode compactly. `i64::MIN` maps
// to `1` as the documented special case (it has no positive negation).
// ---------------------------------------------------------------------

#[inline]
pub fn zigzag_encode32(x: i32) -> u32 {
    ((x << 1) ^ (x >> 31)) as u32
}

#[inline]
pub fn zigzag_decode32(u: u32) -> i32 {
    ((u >> 1) as i32) ^ -((u & 1) as i32)
}

#[inline]
pub fn zigzag_encode64(x: i64) -> u64 {
    ((x << 1) ^ (x >> 63)) as u64
}

#[inline]
pub fn zigzag_decode64(u: u64) -> i64 {
    ((u >> 1) as i64) ^ -((u & 1) as i64)
}

// ---------------------------------------------------------------------
// Continuation-bit ("var") encoding.
// ---------------------------------------------------------------------

pub const VAR_U32_MAX_BYTES: usize = 5;
pub const VAR_U64_MAX_BYTES: usize = 10;

/// Encode `v` as a continuation-bit varint, appending bytes to `out`.
pub fn encode_var_u32(mut v: u32, out: &mut Vec<u8>) {
    loop {
        let b = (v & 0x7f) as u8;
        v >>= 7;
        if v == 0 {
            out.push(b);
            break;
        } else {
            out.push(b | 0x80);
        }
    }
}

pub fn encode_var_u64(mut v: u64, out: &mut Vec<u8>) {
    loop {
        let b = (v & 0x7f) as u8;
        v >>= 7;
        if v == 0 {
            out.push(b);
            break;
        } else {
            out.push(b | 0x80);
        }
    }
}

pub fn encode_var_i32(v: i32, out: &mut Vec<u8>) {
    encode_var_u32(zigzag_encode32(v), out)
}

pub fn encode_var_i64(v: i64, out: &mut Vec<u8>) {
    encode_var_u64(zigzag_encode64(v), out)
}

/// Decode one continuation-bit `u32` from `buf`, returning `(value,
/// bytes_consumed)`. Raises `DataFormat` if no terminating byte (high bit
/// clear) appears within [`VAR_U32_MAX_BYTES`].
pub fn decode_var_u32(buf: &[u8]) -> Result<(u32, usize)> {
    let mut result: u32 = 0;
    for i in 0..VAR_U32_MAX_BYTES {
        let byte = *buf
            .get(i)
            .ok_or_else(|| data_format("var_uint32: buffer exhausted"))?;
        result |= ((byte & 0x7f) as u32) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((result, i + 1));
        }
    }
    Err(data_format("var_uint32: no terminator within 5 bytes"))
}

pub fn decode_var_u64(buf: &[u8]) -> Result<(u64, usize)> {
    let mut result: u64 = 0;
    for i in 0..VAR_U64_MAX_BYTES {
        let byte = *buf
            .get(i)
            .ok_or_else(|| data_format("var_uint64: buffer exhausted"))?;
        result |= ((byte & 0x7f) as u64) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((result, i + 1));
        }
    }
    Err(data_format("var_uint64: no terminator within 10 bytes"))
}

pub fn decode_var_i32(buf: &[u8]) -> Result<(i32, usize)> {
    let (u, n) = decode_var_u32(buf)?;
    Ok((zigzag_decode32(u), n))
}

pub fn decode_var_i64(buf: &[u8]) -> Result<(i64, usize)> {
    let (u, n) = decode_var_u64(buf)?;
    Ok((zigzag_decode64(u), n))
}

/// Fast path: caller guarantees `buf.len() >= VAR_U32_MAX_BYTES` (the
/// worst case), so no bounds check is needed per byte. Grounded on the
/// `FAST_READ_VAR_UINT32` macro.
#[inline]
pub fn decode_var_u32_fast(buf: &[u8]) -> (u32, usize) {
    debug_assert!(buf.len() >= VAR_U32_MAX_BYTES);
    let mut result: u32 = (buf[0] & 0x7f) as u32;
    if buf[0] & 0x80 == 0 {
        return (result, 1);
    }
    result |= ((buf[1] & 0x7f) as u32) << 7;
    if buf[1] & 0x80 == 0 {
        return (result, 2);
    }
    result |= ((buf[2] & 0x7f) as u32) << 14;
    if buf[2] & 0x80 == 0 {
        return (result, 3);
    }
    result |= ((buf[3] & 0x7f) as u32) << 21;
    if buf[3] & 0x80 == 0 {
        return (result, 4);
    }
    result |= ((buf[4] & 0x7f) as u32) << 28;
    (result, 5)
}

#[inline]
pub fn decode_var_u64_fast(buf: &[u8]) -> (u64, usize) {
    debug_assert!(buf.len() >= VAR_U64_MAX_BYTES);
    let mut result: u64 = 0;
    for i in 0..VAR_U64_MAX_BYTES {
        let byte = buf[i];
        result |= ((byte & 0x7f) as u64) << (7 * i);
        if byte & 0x80 == 0 {
            return (result, i + 1);
        }
    }
    (result, VAR_U64_MAX_BYTES)
}

/// Decode a continuation-bit varint walking *backwards* from `buf` (which
/// points one-past the last byte of the encoding), recovering the value and
/// the number of bytes it occupied. Used by formats that store a trailing
/// length/offset that must be read right-to-left (`original_source`'s
/// `reverse_get_var_uint32`/`64`).
pub fn decode_var_u32_reverse(buf_end: &[u8]) -> Result<(u32, usize)> {
    // Each byte of a forward encoding has its continuation bit set in every
    // byte except the last; walking backwards, every byte we see has the
    // continuation bit set except the final (leftmost) one we consume.
    let mut bytes_rev = Vec::with_capacity(VAR_U32_MAX_BYTES);
    let mut idx = buf_end.len();
    loop {
        if idx == 0 {
            return Err(data_format("var_uint32 reverse: ran off start of buffer"));
        }
        idx -= 1;
        bytes_rev.push(buf_end[idx]);
        if bytes_rev.len() > 1 && bytes_rev[bytes_rev.len() - 1] & 0x80 == 0 {
            // A non-continuation byte other than the first one we saw
            // means we've walked into the *previous* varint.
            return Err(data_format("var_uint32 reverse: malformed encoding"));
        }
        if bytes_rev.len() == VAR_U32_MAX_BYTES {
            break;
        }
        // Stop once the byte we just captured starts a valid encoding: that
        // happens when the byte *before* it (one further back) does not
        // have its continuation bit set, or we've hit the start of buf_end.
        if idx == 0 || buf_end[idx - 1] & 0x80 == 0 {
            break;
        }
    }
    bytes_rev.reverse();
    let (v, n) = decode_var_u32(&bytes_rev)?;
    Ok((v, n))
}

pub fn decode_var_i32_reverse(buf_end: &[u8]) -> Result<(i32, usize)> {
    let (u, n) = decode_var_u32_reverse(buf_end)?;
    Ok((zigzag_decode32(u), n))
}

pub fn decode_var_u64_reverse(buf_end: &[u8]) -> Result<(u64, usize)> {
    let mut bytes_rev = Vec::with_capacity(VAR_U64_MAX_BYTES);
    let mut idx = buf_end.len();
    loop {
        if idx == 0 {
            return Err(data_format("var_uint64 reverse: ran off start of buffer"));
        }
        idx -= 1;
        bytes_rev.push(buf_end[idx]);
        if bytes_rev.len() == VAR_U64_MAX_BYTES {
            break;
        }
        if idx == 0 || buf_end[idx - 1] & 0x80 == 0 {
            break;
        }
    }
    bytes_rev.reverse();
    let (v, n) = decode_var_u64(&bytes_rev)?;
    Ok((v, n))
}

pub fn decode_var_i64_reverse(buf_end: &[u8]) -> Result<(i64, usize)> {
    let (u, n) = decode_var_u64_reverse(buf_end)?;
    Ok((zigzag_decode64(u), n))
}

// ---------------------------------------------------------------------
// Length-prefixed ("30/61") encoding.
// ---------------------------------------------------------------------

pub const LEN30_MAX_BYTES: usize = 4;
pub const LEN61_MAX_BYTES: usize = 8;

/// Encode `v` (at most 30 significant bits) as 1..4 bytes: the first
/// byte's low 2 bits carry `n - 1`, the value is shifted left by 2 and
/// spread little-endian across the `n` bytes.
pub fn encode_len30_u32(v: u32) -> Result<Vec<u8>> {
    if v >= (1u32 << 30) {
        return Err(data_format("value exceeds 30 bits for len30 encoding"));
    }
    let shifted = (v << 2) as u64;
    let n = byte_count_for_value(shifted, LEN30_MAX_BYTES);
    let mut word = shifted | (n as u64 - 1);
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        out.push((word & 0xff) as u8);
        word >>= 8;
    }
    Ok(out)
}

pub fn encode_len61_u64(v: u64) -> Result<Vec<u8>> {
    if v >= (1u64 << 61) {
        return Err(data_format("value exceeds 61 bits for len61 encoding"));
    }
    let shifted = v << 3;
    let n = byte_count_for_value(shifted, LEN61_MAX_BYTES);
    let mut word = shifted | (n as u64 - 1);
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        out.push((word & 0xff) as u8);
        word >>= 8;
    }
    Ok(out)
}

fn byte_count_for_value(shifted_value: u64, max_bytes: usize) -> usize {
    // Minimum n such that shifted_value fits in 8*n bits, at least 1.
    let mut n = 1;
    while n < max_bytes && shifted_value >= (1u64 << (8 * n)) {
        n += 1;
    }
    n
}

/// Decode: one little-endian word load over `n = (first_byte & mask) + 1`
/// bytes, masked to exactly those bits. `buf` need only have `n` valid
/// bytes starting at 0; this never reads beyond `first_byte_offset + n`.
pub fn decode_len30_u32(buf: &[u8]) -> Result<(u32, usize)> {
    let first = *buf.first().ok_or_else(|| data_format("len30: empty buffer"))?;
    let n = ((first & 0b11) + 1) as usize;
    if buf.len() < n {
        return Err(data_format("len30: buffer shorter than encoded length"));
    }
    let mut word: u64 = 0;
    for i in 0..n {
        word |= (buf[i] as u64) << (8 * i);
    }
    let mask = (1u64 << (8 * n)) - 1;
    let value = ((word & mask) >> 2) as u32;
    Ok((value, n))
}

pub fn decode_len61_u64(buf: &[u8]) -> Result<(u64, usize)> {
    let first = *buf.first().ok_or_else(|| data_format("len61: empty buffer"))?;
    let n = ((first & 0b111) + 1) as usize;
    if buf.len() < n {
        return Err(data_format("len61: buffer shorter than encoded length"));
    }
    let mut word: u64 = 0;
    for i in 0..n {
        word |= (buf[i] as u64) << (8 * i);
    }
    let mask = if n == 8 { u64::MAX } else { (1u64 << (8 * n)) - 1 };
    let value = (word & mask) >> 3;
    Ok((value, n))
}

pub fn encode_len30_i32(v: i32) -> Result<Vec<u8>> {
    encode_len30_u32(zigzag_encode32(v))
}
pub fn decode_len30_i32(buf: &[u8]) -> Result<(i32, usize)> {
    let (u, n) = decode_len30_u32(buf)?;
    Ok((zigzag_decode32(u), n))
}
pub fn encode_len61_i64(v: i64) -> Result<Vec<u8>> {
    encode_len61_u64(zigzag_encode64(v))
}
pub fn decode_len61_i64(buf: &[u8]) -> Result<(i64, usize)> {
    let (u, n) = decode_len61_u64(buf)?;
    Ok((zigzag_decode64(u), n))
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn test_var_roundtrip_300() {
        let mut out = Vec::new();
        encode_var_u32(300, &mut out);
        assert_eq!(out, vec![0xAC, 0x02]);
        let (v, n) = decode_var_u32(&out).unwrap();
        assert_eq!(v, 300);
        assert_eq!(n, 2);
    }

    #[test]
    fn test_var_signed_minus_one() {
        let mut out = Vec::new();
        encode_var_i32(-1, &mut out);
        assert_eq!(out, vec![0x01]);
        let (v, _) = decode_var_i32(&out).unwrap();
        assert_eq!(v, -1);
    }

    #[test]
    fn test_var_i32_min_special_case() {
        let mut out = Vec::new();
        encode_var_i32(i32::MIN, &mut out);
        let (v, _) = decode_var_i32(&out).unwrap();
        assert_eq!(v, i32::MIN);
    }

    #[test]
    fn test_var_i64_min_special_case() {
        let mut out = Vec::new();
        encode_var_i64(i64::MIN, &mut out);
        let (v, _) = decode_var_i64(&out).unwrap();
        assert_eq!(v, i64::MIN);
    }

    #[test]
    fn test_var_all_continuation_bytes_is_data_format() {
        let buf = [0x80u8; VAR_U32_MAX_BYTES];
        assert!(decode_var_u32(&buf).is_err());
        let buf64 = [0x80u8; VAR_U64_MAX_BYTES];
        assert!(decode_var_u64(&buf64).is_err());
    }

    #[test]
    fn test_var_roundtrip_exhaustive_u32_samples() {
        for v in [0u32, 1, 127, 128, 16383, 16384, u32::MAX, 1 << 21, 1 << 28] {
            let mut out = Vec::new();
            encode_var_u32(v, &mut out);
            assert!(out.len() <= VAR_U32_MAX_BYTES);
            let (got, n) = decode_var_u32(&out).unwrap();
            assert_eq!(got, v);
            assert_eq!(n, out.len());
        }
    }

    #[test]
    fn test_var_fast_path_matches_slow_path() {
        for v in [0u32, 1, 300, 1 << 20, u32::MAX] {
            let mut out = vec![0u8; VAR_U32_MAX_BYTES];
            let mut enc = Vec::new();
            encode_var_u32(v, &mut enc);
            out[..enc.len()].copy_from_slice(&enc);
            let (slow, slow_n) = decode_var_u32(&enc).unwrap();
            let (fast, fast_n) = decode_var_u32_fast(&out);
            assert_eq!(slow, fast);
            assert_eq!(slow_n, fast_n);
        }
    }

    #[test]
    fn test_reverse_var_roundtrip() {
        for v in [0u32, 1, 300, 1 << 20, u32::MAX] {
            let mut enc = Vec::new();
            encode_var_u32(v, &mut enc);
            let (got, n) = decode_var_u32_reverse(&enc).unwrap();
            assert_eq!(got, v);
            assert_eq!(n, enc.len());
        }
    }

    #[test]
    fn test_reverse_var_u64_roundtrip() {
        for v in [0u64, 1, 300, 1 << 40, u64::MAX] {
            let mut enc = Vec::new();
            encode_var_u64(v, &mut enc);
            let (got, n) = decode_var_u64_reverse(&enc).unwrap();
            assert_eq!(got, v);
            assert_eq!(n, enc.len());
        }
    }

    #[test]
    fn test_len30_roundtrip() {
        let enc = encode_len30_u32(0x12345).unwrap();
        assert_eq!(enc.len(), 3);
        assert_eq!(enc[0] & 0b11, 0b10);
        let (v, n) = decode_len30_u32(&enc).unwrap();
        assert_eq!(v, 0x12345);
        assert_eq!(n, 3);
    }

    #[test]
    fn test_len30_rejects_oversize() {
        assert!(encode_len30_u32(1 << 30).is_err());
        assert!(encode_len30_u32((1 << 30) - 1).is_ok());
    }

    #[test]
    fn test_len30_never_reads_past_declared_length() {
        let enc = encode_len30_u32(5).unwrap();
        // A buffer exactly as long as the first byte demands must decode
        // successfully even if nothing follows it.
        let (v, n) = decode_len30_u32(&enc[..n_from(&enc)]).unwrap();
        assert_eq!(v, 5);
        assert_eq!(n, enc.len());
    }

    fn n_from(enc: &[u8]) -> usize {
        ((enc[0] & 0b11) + 1) as usize
    }

    #[test]
    fn test_len61_roundtrip() {
        for v in [0u64, 1, 74565, 1 << 40, (1u64 << 61) - 1] {
            let enc = encode_len61_u64(v).unwrap();
            let (got, n) = decode_len61_u64(&enc).unwrap();
            assert_eq!(got, v);
            assert_eq!(n, enc.len());
        }
    }

    #[test]
    fn test_len61_rejects_oversize() {
        assert!(encode_len61_u64(1u64 << 61).is_err());
    }

    #[test]
    fn test_zigzag_mapping() {
        assert_eq!(zigzag_encode32(0), 0);
        assert_eq!(zigzag_encode32(-1), 1);
        assert_eq!(zigzag_encode32(1), 2);
        assert_eq!(zigzag_decode32(zigzag_encode32(i32::MIN)), i32::MIN);
    }
}
