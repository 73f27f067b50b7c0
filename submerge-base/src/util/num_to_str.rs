//! Fast integer-to-decimal formatting, grounded on `num_to_str.hpp`/`.cpp`:
//! writes digits directly into a caller-supplied buffer back-to-front,
//! avoiding the locale-aware libc `sprintf` path for the same reason.

/// Formats `v` into `buf` (at least 20 bytes) and returns the written
/// slice, most-significant digit first. Never allocates.
pub fn format_u64(mut v: u64, buf: &mut [u8; 20]) -> &[u8] {
    let mut i = buf.len();
    loop {
        i -= 1;
        buf[i] = b'0' + (v % 10) as u8;
        v /= 10;
        if v == 0 {
            break;
        }
    }
    &buf[i..]
}

/// Formats `v` into `buf` (at least 20 bytes), including a leading `-` for
/// negative values, and returns the written slice.
pub fn format_i64(v: i64, buf: &mut [u8; 20]) -> &[u8] {
    if v >= 0 {
        return format_u64(v as u64, buf);
    }
    // `i64::MIN.unsigned_abs()` handles the one value whose magnitude
    // overflows `i64`.
    let magnitude = v.unsigned_abs();
    let mut i = buf.len();
    let mut rest = magnitude;
    loop {
        i -= 1;
        buf[i] = b'0' + (rest % 10) as u8;
        rest /= 10;
        if rest == 0 {
            break;
        }
    }
    i -= 1;
    buf[i] = b'-';
    &buf[i..]
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    fn as_str<'a>(bytes: &'a [u8]) -> &'a str {
        std::str::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_format_u64() {
        let mut buf = [0u8; 20];
        assert_eq!(as_str(format_u64(0, &mut buf)), "0");
        assert_eq!(as_str(format_u64(42, &mut buf)), "42");
        assert_eq!(as_str(format_u64(u64::MAX, &mut buf)), u64::MAX.to_string());
    }

    #[test]
    fn test_format_i64() {
        let mut buf = [0u8; 20];
        assert_eq!(as_str(format_i64(0, &mut buf)), "0");
        assert_eq!(as_str(format_i64(-42, &mut buf)), "-42");
        assert_eq!(as_str(format_i64(i64::MIN, &mut buf)), i64::MIN.to_string());
        assert_eq!(as_str(format_i64(i64::MAX, &mut buf)), i64::MAX.to_string());
    }
}
